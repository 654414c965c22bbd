use crate::window::WorkingWindow;
use chrono::{FixedOffset, NaiveTime, Offset, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a participant's working window is read off their off-hours entries.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum InferencePolicy {
    /// The first off-hours entry in input order. Nothing is sorted.
    #[default]
    First,
    /// The most frequent off-hours shape; ties go to the shape seen first.
    Majority,
    /// Every off-hours entry must share one shape.
    Strict,
}

/// Everything the scheduler would otherwise hard-code.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Offset every wall-clock time and calendar date is read in
    #[cfg_attr(
        feature = "serde",
        serde(rename = "utc_offset_minutes", with = "offset_minutes")
    )]
    pub offset: FixedOffset,
    /// Used for participants without any off-hours entry
    pub default_window: WorkingWindow,
    /// Hours assumed when off-hours have to be synthesized for a missing calendar
    pub fallback_window: WorkingWindow,
    pub lookahead_days: u32,
    pub off_hours_label: String,
    pub inference: InferencePolicy,
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            offset: FixedOffset::east_opt(330 * 60).unwrap_or_else(|| Utc.fix()),
            default_window: WorkingWindow::new(hm(7, 30), hm(18, 0)),
            fallback_window: WorkingWindow::new(hm(9, 0), hm(17, 0)),
            lookahead_days: 30,
            off_hours_label: String::from("Off Hours"),
            inference: InferencePolicy::First,
        }
    }
}

impl SchedulerConfig {
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_default_window(mut self, window: WorkingWindow) -> Self {
        self.default_window = window;
        self
    }

    pub fn with_inference(mut self, inference: InferencePolicy) -> Self {
        self.inference = inference;
        self
    }
}

#[cfg(feature = "serde")]
mod offset_minutes {
    use chrono::FixedOffset;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(offset: &FixedOffset, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(offset.local_minus_utc() / 60)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FixedOffset, D::Error> {
        let minutes = i32::deserialize(deserializer)?;
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| D::Error::custom(format!("utc offset of {} minutes is out of range", minutes)))
    }
}
