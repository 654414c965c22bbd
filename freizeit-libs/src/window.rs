use crate::time::{at_wall_clock, TimeRange};
use chrono::{FixedOffset, NaiveDate, NaiveTime};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// A participant's daily active period as wall-clock times in the configured offset.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct WorkingWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl WorkingWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> WorkingWindow {
        WorkingWindow { start, end }
    }

    /// Builds a window from `(hour, minute)` pairs, `None` for out-of-range values.
    ///
    /// ```
    /// use freizeit_libs::window::WorkingWindow;
    ///
    /// let window = WorkingWindow::from_hm((7, 30), (18, 0)).unwrap();
    /// assert_eq!(window.to_string(), "07:30 - 18:00");
    /// assert!(WorkingWindow::from_hm((24, 0), (18, 0)).is_none());
    /// ```
    pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Option<WorkingWindow> {
        Some(WorkingWindow {
            start: NaiveTime::from_hms_opt(start.0, start.1, 0)?,
            end: NaiveTime::from_hms_opt(end.0, end.1, 0)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Latest start and earliest end of all `windows`.
    /// The result may be empty; `None` only when there are no windows at all.
    ///
    /// ```
    /// use freizeit_libs::window::WorkingWindow;
    ///
    /// let windows = vec![
    ///     WorkingWindow::from_hm((9, 0), (18, 0)).unwrap(),
    ///     WorkingWindow::from_hm((7, 30), (16, 0)).unwrap(),
    /// ];
    ///
    /// assert_eq!(
    ///     WorkingWindow::intersect(&windows),
    ///     WorkingWindow::from_hm((9, 0), (16, 0))
    /// );
    /// assert_eq!(WorkingWindow::intersect(&[]), None);
    /// ```
    pub fn intersect<'a, I>(windows: I) -> Option<WorkingWindow>
    where
        I: IntoIterator<Item = &'a WorkingWindow>,
    {
        windows.into_iter().fold(None, |common, window| {
            Some(match common {
                None => *window,
                Some(common) => WorkingWindow {
                    start: common.start.max(window.start),
                    end: common.end.min(window.end),
                },
            })
        })
    }

    /// Materialises the window on `date`.
    pub fn on(&self, date: NaiveDate, offset: &FixedOffset) -> Option<TimeRange> {
        Some(TimeRange::new(
            at_wall_clock(date, self.start, offset)?,
            at_wall_clock(date, self.end, offset)?,
        ))
    }
}

impl fmt::Display for WorkingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}
