use crate::config::{InferencePolicy, SchedulerConfig};
use crate::data::{BusyInterval, SchedulingError};
use crate::time::TimeRange;
use crate::window::WorkingWindow;
use chrono::{FixedOffset, NaiveDate, NaiveTime};
use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub intervals: Vec<BusyInterval>,
}

impl Participant {
    /// Constructs a new Participant with the calendar entries in `intervals`.
    /// Entries labelled as off-hours describe when this participant does not work,
    /// everything else is a time they *cannot* meet.
    pub fn new(id: &str, intervals: Vec<BusyInterval>) -> Participant {
        Participant {
            id: id.to_string(),
            intervals,
        }
    }

    pub fn off_hours<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a BusyInterval> + 'a {
        self.intervals
            .iter()
            .filter(move |interval| interval.is_off_hours(label))
    }

    pub fn working_window(&self, config: &SchedulerConfig) -> Result<WorkingWindow, SchedulingError> {
        infer_working_window(self, config)
    }

    /// Busy times starting on `date`, off-hours excluded.
    pub fn busy_on<'a>(
        &'a self,
        date: NaiveDate,
        config: &'a SchedulerConfig,
    ) -> impl Iterator<Item = TimeRange> + 'a {
        self.intervals
            .iter()
            .filter(move |interval| {
                !interval.is_off_hours(&config.off_hours_label)
                    && interval.date_in(&config.offset) == date
            })
            .map(BusyInterval::range)
    }

    pub fn dates<'a>(&'a self, offset: &'a FixedOffset) -> impl Iterator<Item = NaiveDate> + 'a {
        self.intervals.iter().map(move |interval| interval.date_in(offset))
    }
}

/// Wall-clock start and end of an off-hours entry
type Shape = (NaiveTime, NaiveTime);

fn shape(interval: &BusyInterval, offset: &FixedOffset) -> Shape {
    (
        interval.start.with_timezone(offset).time(),
        interval.end.with_timezone(offset).time(),
    )
}

/// Derives the daily working window of `participant` from their off-hours entries.
///
/// Off-hours are expected to span the overnight gap: from the end of one working day
/// to the start of the next. The working window then starts where the sampled off-hours
/// entry ends and ends where it starts. Entries of any other shape produce a
/// meaningless window; nothing checks that the start precedes the end.
///
/// Without any off-hours entry the configured default window applies.
///
/// ```
/// use chrono::DateTime;
/// use freizeit_libs::{
///     config::SchedulerConfig, data::BusyInterval, participant::{infer_working_window, Participant},
///     window::WorkingWindow,
/// };
///
/// let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap();
/// let participant = Participant::new(
///     "userthree",
///     vec![BusyInterval::new(
///         at("2025-07-13T16:00:00+05:30"),
///         at("2025-07-14T07:30:00+05:30"),
///         "Off Hours",
///     )],
/// );
///
/// let config = SchedulerConfig::default();
/// assert_eq!(
///     infer_working_window(&participant, &config),
///     Ok(WorkingWindow::from_hm((7, 30), (16, 0)).unwrap())
/// );
/// assert_eq!(
///     infer_working_window(&Participant::new("new-hire", vec![]), &config),
///     Ok(config.default_window)
/// );
/// ```
pub fn infer_working_window(
    participant: &Participant,
    config: &SchedulerConfig,
) -> Result<WorkingWindow, SchedulingError> {
    let shapes: Vec<Shape> = participant
        .off_hours(&config.off_hours_label)
        .map(|interval| shape(interval, &config.offset))
        .collect();

    let sample = match config.inference {
        InferencePolicy::First => shapes.first().copied(),
        InferencePolicy::Majority => majority(&shapes),
        InferencePolicy::Strict => {
            let mut distinct = shapes.clone();
            distinct.sort_unstable();
            distinct.dedup();
            if distinct.len() > 1 {
                return Err(SchedulingError::InconsistentOffHours {
                    participant: participant.id.clone(),
                    shapes: distinct.len(),
                });
            }
            distinct.first().copied()
        }
    };

    let window = match sample {
        Some((off_start, off_end)) => WorkingWindow::new(off_end, off_start),
        None => {
            debug!("{} has no off-hours, using {}", participant.id, config.default_window);
            config.default_window
        }
    };

    trace!(
        "{} works {} ({} off-hours entries, {:?} policy)",
        participant.id,
        window,
        shapes.len(),
        config.inference
    );

    Ok(window)
}

fn majority(shapes: &[Shape]) -> Option<Shape> {
    let mut tally: Vec<(Shape, usize)> = Vec::new();
    for shape in shapes {
        match tally.iter_mut().find(|(seen, _)| seen == shape) {
            Some((_, count)) => *count += 1,
            None => tally.push((*shape, 1)),
        }
    }

    tally
        .into_iter()
        .fold(None, |best: Option<(Shape, usize)>, (shape, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((shape, count)),
        })
        .map(|(shape, _)| shape)
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for Participant {
    /// A week of entries around 2025-07-14 in +05:30. Lengths may be zero or negative
    /// so fuzzing also covers malformed calendars.
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        use chrono::Duration;

        let offset = FixedOffset::east_opt(330 * 60).ok_or(arbitrary::Error::IncorrectFormat)?;
        let base = crate::time::at_wall_clock(
            NaiveDate::from_ymd_opt(2025, 7, 14).ok_or(arbitrary::Error::IncorrectFormat)?,
            NaiveTime::from_hms_opt(0, 0, 0).ok_or(arbitrary::Error::IncorrectFormat)?,
            &offset,
        )
        .ok_or(arbitrary::Error::IncorrectFormat)?;

        let id = u.arbitrary::<u8>()?;
        let len = u.arbitrary_len::<(u16, i16, bool)>()?.min(48);
        let mut intervals = Vec::with_capacity(len);
        for _ in 0..len {
            let start = base + Duration::minutes(i64::from(u.arbitrary::<u16>()? % (7 * 24 * 60)));
            let end = start + Duration::minutes(i64::from(u.arbitrary::<i16>()? % (24 * 60)));
            let label = if u.arbitrary::<bool>()? { "Off Hours" } else { "Busy" };
            intervals.push(BusyInterval::new(start, end, label));
        }

        Ok(Participant::new(&id.to_string(), intervals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, busy, off_hours};

    fn window(start: (u32, u32), end: (u32, u32)) -> WorkingWindow {
        WorkingWindow::from_hm(start, end).unwrap()
    }

    fn shifting_worker() -> Participant {
        Participant::new(
            "shifting",
            vec![
                off_hours("2025-07-13T17:00:00+05:30", "2025-07-14T08:00:00+05:30"),
                off_hours("2025-07-14T18:00:00+05:30", "2025-07-15T09:00:00+05:30"),
                busy("2025-07-15T10:00:00+05:30", "2025-07-15T11:00:00+05:30", "Standup"),
                off_hours("2025-07-15T18:00:00+05:30", "2025-07-16T09:00:00+05:30"),
            ],
        )
    }

    #[test]
    fn first_policy_uses_input_order() {
        let config = SchedulerConfig::default();
        assert_eq!(shifting_worker().working_window(&config), Ok(window((8, 0), (17, 0))));

        let mut reversed = shifting_worker();
        reversed.intervals.reverse();
        assert_eq!(reversed.working_window(&config), Ok(window((9, 0), (18, 0))));
    }

    #[test]
    fn majority_policy_takes_most_common_shape() {
        let config = SchedulerConfig::default().with_inference(InferencePolicy::Majority);
        assert_eq!(shifting_worker().working_window(&config), Ok(window((9, 0), (18, 0))));
    }

    #[test]
    fn majority_ties_go_to_first_seen() {
        let config = SchedulerConfig::default().with_inference(InferencePolicy::Majority);
        let participant = Participant::new(
            "tied",
            vec![
                off_hours("2025-07-13T17:00:00+05:30", "2025-07-14T08:00:00+05:30"),
                off_hours("2025-07-14T18:00:00+05:30", "2025-07-15T09:00:00+05:30"),
            ],
        );
        assert_eq!(participant.working_window(&config), Ok(window((8, 0), (17, 0))));
    }

    #[test]
    fn strict_policy_rejects_mixed_shapes() {
        let config = SchedulerConfig::default().with_inference(InferencePolicy::Strict);
        assert_eq!(
            shifting_worker().working_window(&config),
            Err(SchedulingError::InconsistentOffHours {
                participant: "shifting".to_string(),
                shapes: 2,
            })
        );

        let mut steady = shifting_worker();
        steady.intervals.remove(0);
        assert_eq!(steady.working_window(&config), Ok(window((9, 0), (18, 0))));
    }

    #[test]
    fn configured_default_window_without_off_hours() {
        let config = SchedulerConfig::default().with_default_window(window((10, 0), (15, 30)));
        let participant = Participant::new(
            "new-hire",
            vec![busy("2025-07-14T11:00:00+05:30", "2025-07-14T12:00:00+05:30", "Onboarding")],
        );
        assert_eq!(participant.working_window(&config), Ok(window((10, 0), (15, 30))));
    }

    #[test]
    fn label_must_match_exactly() {
        let config = SchedulerConfig::default();
        let participant = Participant::new(
            "lowercase",
            vec![busy("2025-07-13T18:00:00+05:30", "2025-07-14T09:00:00+05:30", "off hours")],
        );
        assert_eq!(participant.working_window(&config), Ok(config.default_window));
    }

    #[test]
    fn wall_clock_read_in_configured_offset() {
        let config = SchedulerConfig::default();
        let participant = Participant::new(
            "utc",
            vec![off_hours("2025-07-13T12:30:00+00:00", "2025-07-14T03:30:00+00:00")],
        );
        assert_eq!(participant.working_window(&config), Ok(window((9, 0), (18, 0))));
    }

    #[test]
    fn daytime_off_hours_give_inverted_window() {
        let config = SchedulerConfig::default();
        let participant = Participant::new(
            "odd",
            vec![off_hours("2025-07-14T12:00:00+05:30", "2025-07-14T13:00:00+05:30")],
        );
        let inferred = participant.working_window(&config).unwrap();
        assert_eq!(inferred, window((13, 0), (12, 0)));
        assert!(inferred.is_empty());
    }

    #[test]
    fn busy_on_skips_off_hours_and_other_dates() {
        let config = SchedulerConfig::default();
        let date = at("2025-07-15T00:00:00+05:30").date_naive();
        let busy: Vec<_> = shifting_worker().busy_on(date, &config).collect();

        assert_eq!(
            busy,
            vec![TimeRange::new(
                at("2025-07-15T10:00:00+05:30"),
                at("2025-07-15T11:00:00+05:30")
            )]
        );
    }
}
