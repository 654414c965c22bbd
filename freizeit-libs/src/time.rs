use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use itertools::Itertools;
use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Every instant handled by the scheduler carries its own fixed offset.
pub type Timestamp = DateTime<FixedOffset>;

/// Half-open [start, end) range of instants
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeRange(pub Timestamp, pub Timestamp);

impl TimeRange {
    /// Construct a new Time Range
    /// Range is half-open on [start, end)
    /// # Examples
    /// ```
    /// use chrono::DateTime;
    /// use freizeit_libs::time::TimeRange;
    ///
    /// let start = DateTime::parse_from_rfc3339("2025-07-15T09:00:00+05:30").unwrap();
    /// let end = DateTime::parse_from_rfc3339("2025-07-15T10:30:00+05:30").unwrap();
    /// let range = TimeRange::new(start, end);
    ///
    /// assert_eq!(range.start(), start);
    /// assert_eq!(range.minutes(), 90);
    /// ```
    pub fn new(start: Timestamp, end: Timestamp) -> TimeRange {
        TimeRange(start, end)
    }

    pub fn start(self) -> Timestamp {
        self.0
    }

    pub fn end(self) -> Timestamp {
        self.1
    }

    /// Whole minutes between start and end, rounded down.
    /// Inverted ranges give a negative count.
    pub fn minutes(self) -> i64 {
        (self.1 - self.0).num_seconds().div_euclid(60)
    }

    pub fn is_empty(self) -> bool {
        self.1 <= self.0
    }

    /// True when `other` lies entirely inside `self`
    pub fn covers(self, other: TimeRange) -> bool {
        self.0 <= other.0 && other.1 <= self.1
    }

    pub fn overlaps(self, other: TimeRange) -> bool {
        self.0 < other.1 && other.0 < self.1
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.0.format("%Y-%m-%d %H:%M"),
            self.1.format("%H:%M")
        )
    }
}

/// Pins a wall-clock time on `date` to `offset`.
pub fn at_wall_clock(date: NaiveDate, time: NaiveTime, offset: &FixedOffset) -> Option<Timestamp> {
    offset.from_local_datetime(&date.and_time(time)).single()
}

pub trait Available {
    fn get_availability(self, window: TimeRange, min_minutes: i64) -> Vec<TimeRange>;
}

impl<T, R> Available for T
where
    T: Iterator<Item = R>,
    R: Borrow<TimeRange>,
{
    /// Self is busy times that cannot be scheduled.
    /// This performs a set exclusion `window - self` in a single sweep over the busy
    /// times sorted by start. Overlapping and touching busy times merge through the
    /// cursor, which only ever moves forward. Gaps shorter than `min_minutes`, or
    /// shorter than one whole minute, are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::DateTime;
    /// use freizeit_libs::time::{Available, TimeRange};
    ///
    /// let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap();
    /// let window = TimeRange::new(at("2025-07-15T09:00:00+05:30"), at("2025-07-15T18:00:00+05:30"));
    /// let busy = vec![
    ///     TimeRange::new(at("2025-07-15T11:00:00+05:30"), at("2025-07-15T12:00:00+05:30")),
    ///     TimeRange::new(at("2025-07-15T09:00:00+05:30"), at("2025-07-15T10:00:00+05:30")),
    /// ];
    ///
    /// assert_eq!(
    ///     busy.iter().get_availability(window, 30),
    ///     vec![
    ///         TimeRange::new(at("2025-07-15T10:00:00+05:30"), at("2025-07-15T11:00:00+05:30")),
    ///         TimeRange::new(at("2025-07-15T12:00:00+05:30"), at("2025-07-15T18:00:00+05:30")),
    ///     ]
    /// );
    /// ```
    fn get_availability(self, window: TimeRange, min_minutes: i64) -> Vec<TimeRange> {
        let mut free = Vec::new();
        let mut cursor = window.start();

        for busy in self
            .map(|busy| *busy.borrow())
            .sorted_by_key(|busy| busy.start())
        {
            // Nothing starting at or after the window end can shape a gap inside it
            if busy.start() >= window.end() {
                break;
            }

            if cursor < busy.start() {
                push_gap(&mut free, TimeRange(cursor, busy.start()), min_minutes);
            }

            cursor = cursor.max(busy.end());
            trace!("busy {} moves cursor to {}", busy, cursor);
        }

        if cursor < window.end() {
            push_gap(&mut free, TimeRange(cursor, window.end()), min_minutes);
        }

        free
    }
}

fn push_gap(free: &mut Vec<TimeRange>, gap: TimeRange, min_minutes: i64) {
    if gap.minutes() >= min_minutes.max(1) {
        free.push(gap);
    }
}

pub trait TotalMinutes {
    fn total_minutes(self) -> i64;
}

impl<T, R> TotalMinutes for T
where
    T: Iterator<Item = R>,
    R: Borrow<TimeRange>,
{
    /// Sums the whole minutes of every range, ignoring inverted ones
    ///
    /// # Examples
    /// ```
    /// use chrono::DateTime;
    /// use freizeit_libs::time::{TimeRange, TotalMinutes};
    ///
    /// let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap();
    /// let times = vec![
    ///     TimeRange::new(at("2025-07-15T09:00:00+05:30"), at("2025-07-15T09:45:00+05:30")),
    ///     TimeRange::new(at("2025-07-15T16:00:00+05:30"), at("2025-07-15T18:00:00+05:30")),
    /// ];
    ///
    /// assert_eq!(times.iter().total_minutes(), 165);
    /// ```
    fn total_minutes(self) -> i64 {
        self.map(|time| time.borrow().minutes().max(0)).sum()
    }
}
