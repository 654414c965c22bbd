use crate::time::{TimeRange, Timestamp};
use chrono::{FixedOffset, NaiveDate};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One calendar entry of one participant.
///
/// The wire names follow the calendar export the scheduler is fed with
/// (`StartTime`, `EndTime`, `Summary`, `NumAttendees`, `Attendees`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyInterval {
    #[cfg_attr(feature = "serde", serde(rename = "StartTime"))]
    pub start: Timestamp,
    #[cfg_attr(feature = "serde", serde(rename = "EndTime"))]
    pub end: Timestamp,
    #[cfg_attr(feature = "serde", serde(rename = "Summary", default = "untitled"))]
    pub label: String,
    #[cfg_attr(feature = "serde", serde(rename = "NumAttendees", default))]
    pub attendee_count: u32,
    #[cfg_attr(feature = "serde", serde(rename = "Attendees", default))]
    pub attendees: Vec<String>,
}

#[cfg(feature = "serde")]
fn untitled() -> String {
    String::from("No Title")
}

impl BusyInterval {
    pub fn new(start: Timestamp, end: Timestamp, label: &str) -> BusyInterval {
        BusyInterval {
            start,
            end,
            label: label.to_string(),
            attendee_count: 0,
            attendees: vec![],
        }
    }

    /// Replaces the attendee list; the count follows the number of distinct entries.
    pub fn with_attendees(mut self, attendees: Vec<String>) -> BusyInterval {
        let mut distinct = attendees.clone();
        distinct.sort_unstable();
        distinct.dedup();
        self.attendee_count = distinct.len() as u32;
        self.attendees = attendees;
        self
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    /// Off-hours entries are recognised by an exact label match.
    pub fn is_off_hours(&self, off_hours_label: &str) -> bool {
        self.label == off_hours_label
    }

    /// The calendar date this entry starts on, read in `offset`.
    pub fn date_in(&self, offset: &FixedOffset) -> NaiveDate {
        self.start.with_timezone(offset).date_naive()
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FreeSlot {
    pub start: Timestamp,
    pub end: Timestamp,
    pub duration_minutes: i64,
}

impl FreeSlot {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

impl From<TimeRange> for FreeSlot {
    fn from(time: TimeRange) -> Self {
        FreeSlot {
            start: time.start(),
            end: time.end(),
            duration_minutes: time.minutes(),
        }
    }
}

impl fmt::Display for FreeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({} mins)",
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            self.duration_minutes
        )
    }
}

/// Which candidate-date set produced a scheduling decision
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CascadePass {
    /// Dates on the preferred weekday, or any weekday without a preference
    Preferred,
    /// Remaining Monday to Friday dates
    Weekday,
    Weekend,
}

impl fmt::Display for CascadePass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CascadePass::Preferred => "preferred",
            CascadePass::Weekday => "weekday",
            CascadePass::Weekend => "weekend",
        })
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SchedulingCandidate {
    pub date: NaiveDate,
    pub start: Timestamp,
    pub end: Timestamp,
    pub pass: CascadePass,
}

impl SchedulingCandidate {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum SchedulingError {
    #[error("Cannot look for a common slot without any participants")]
    InsufficientInput,
    #[error("Meeting duration must be a positive number of minutes, got {minutes}")]
    InvalidDuration { minutes: i64 },
    #[error("{participant} has {shapes} different off-hours patterns")]
    InconsistentOffHours { participant: String, shapes: usize },
}
