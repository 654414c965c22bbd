use crate::config::SchedulerConfig;
use crate::data::{CascadePass, FreeSlot, SchedulingCandidate, SchedulingError};
use crate::meeting::{candidate_dates, free_slots_within, working_windows};
use crate::participant::Participant;
use crate::time::Timestamp;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use log::{debug, info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const WEEKDAYS: [(Weekday, &str); 7] = [
    (Weekday::Mon, "Monday"),
    (Weekday::Tue, "Tuesday"),
    (Weekday::Wed, "Wednesday"),
    (Weekday::Thu, "Thursday"),
    (Weekday::Fri, "Friday"),
    (Weekday::Sat, "Saturday"),
    (Weekday::Sun, "Sunday"),
];

pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAYS[day.num_days_from_monday() as usize].1
}

pub fn is_workday(day: Weekday) -> bool {
    day.num_days_from_monday() < 5
}

/// Order in which weekday names are looked for in a day preference
const PRECEDENCE: [Weekday; 7] = [
    Weekday::Thu,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Reads a weekday out of free text, ignoring case.
/// When several weekdays are named, Thursday beats Monday through Friday in order,
/// and the weekend comes last. Where a name appears in the text does not matter.
///
/// ```
/// use chrono::Weekday;
/// use freizeit_libs::schedule::parse_day_preference;
///
/// assert_eq!(parse_day_preference("Let's meet on THURSDAY"), Some(Weekday::Thu));
/// assert_eq!(parse_day_preference("friday or tuesday"), Some(Weekday::Tue));
/// assert_eq!(parse_day_preference("any weekday"), None);
/// ```
pub fn parse_day_preference(preference: &str) -> Option<Weekday> {
    let preference = preference.to_lowercase();
    PRECEDENCE
        .iter()
        .copied()
        .find(|day| preference.contains(&weekday_name(*day).to_lowercase()))
}

impl CascadePass {
    fn admits(self, day: Weekday, preferred: Option<Weekday>) -> bool {
        match self {
            CascadePass::Preferred => match preferred {
                Some(preferred) => day == preferred,
                None => is_workday(day),
            },
            CascadePass::Weekday => is_workday(day),
            CascadePass::Weekend => !is_workday(day),
        }
    }
}

/// One possible meeting time
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub date: NaiveDate,
    pub weekday: String,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Length of the free slot the meeting would sit in
    pub available_minutes: i64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

fn meeting_length(minutes: i64) -> Result<Duration, SchedulingError> {
    if minutes <= 0 {
        return Err(SchedulingError::InvalidDuration { minutes });
    }
    Duration::try_minutes(minutes).ok_or(SchedulingError::InvalidDuration { minutes })
}

fn meeting_end(slot: &FreeSlot, length: Duration, minutes: i64) -> Result<Timestamp, SchedulingError> {
    slot.start
        .checked_add_signed(length)
        .ok_or(SchedulingError::InvalidDuration { minutes })
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Scheduler {
        Scheduler { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// See [`crate::meeting::find_common_free_slots`]
    pub fn find_common_free_slots(
        &self,
        participants: &[Participant],
        date: NaiveDate,
        min_duration_minutes: i64,
    ) -> Result<Vec<FreeSlot>, SchedulingError> {
        crate::meeting::find_common_free_slots(participants, date, min_duration_minutes, &self.config)
    }

    /// Picks the meeting time for `participants`.
    ///
    /// Candidate dates are the dates any calendar entry starts on. They are tried in three
    /// passes, each in ascending order and never trying a date twice:
    ///
    /// 1. dates on the weekday named in `day_preference`, or every Monday to Friday date
    ///    when it names none
    /// 2. the remaining Monday to Friday dates
    /// 3. Saturdays and Sundays
    ///
    /// The first date with a free slot of at least `duration_minutes` wins, and the meeting
    /// starts at the beginning of its earliest such slot. No later date is looked at.
    ///
    /// `Ok(None)` means no date in the look-ahead can hold the meeting.
    ///
    /// # Errors
    /// `SchedulingError::InsufficientInput` without participants,
    /// `SchedulingError::InvalidDuration` for a duration that is not a positive number of
    /// minutes, and whatever the inference policy rejects.
    ///
    /// ```
    /// use chrono::DateTime;
    /// use freizeit_libs::{
    ///     config::SchedulerConfig, data::{BusyInterval, CascadePass}, participant::Participant,
    ///     schedule::Scheduler,
    /// };
    ///
    /// let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap();
    /// let participants = vec![Participant::new(
    ///     "userone",
    ///     vec![
    ///         // Wednesday and Thursday nights
    ///         BusyInterval::new(at("2025-07-16T18:00:00+05:30"), at("2025-07-17T09:00:00+05:30"), "Off Hours"),
    ///         BusyInterval::new(at("2025-07-17T18:00:00+05:30"), at("2025-07-18T09:00:00+05:30"), "Off Hours"),
    ///         BusyInterval::new(at("2025-07-17T09:00:00+05:30"), at("2025-07-17T10:00:00+05:30"), "Standup"),
    ///     ],
    /// )];
    ///
    /// let scheduler = Scheduler::new(SchedulerConfig::default());
    /// let candidate = scheduler
    ///     .select_meeting_slot(&participants, 30, "thursday please")
    ///     .unwrap()
    ///     .unwrap();
    ///
    /// assert_eq!(candidate.start, at("2025-07-17T10:00:00+05:30"));
    /// assert_eq!(candidate.end, at("2025-07-17T10:30:00+05:30"));
    /// assert_eq!(candidate.pass, CascadePass::Preferred);
    /// ```
    pub fn select_meeting_slot(
        &self,
        participants: &[Participant],
        duration_minutes: i64,
        day_preference: &str,
    ) -> Result<Option<SchedulingCandidate>, SchedulingError> {
        let length = meeting_length(duration_minutes)?;
        let windows = working_windows(participants, &self.config)?;
        let dates = candidate_dates(participants, &self.config.offset);
        let preferred = parse_day_preference(day_preference);

        debug!(
            "{} candidate date(s), preference {:?} -> {:?}",
            dates.len(),
            day_preference,
            preferred.map(weekday_name)
        );

        let mut tried = BTreeSet::new();

        for pass in [CascadePass::Preferred, CascadePass::Weekday, CascadePass::Weekend] {
            for &date in dates.iter().filter(|date| pass.admits(date.weekday(), preferred)) {
                if !tried.insert(date) {
                    continue;
                }

                let slots =
                    free_slots_within(participants, &windows, date, duration_minutes, &self.config)?;

                if let Some(slot) = slots.first() {
                    let candidate = SchedulingCandidate {
                        date,
                        start: slot.start,
                        end: meeting_end(slot, length, duration_minutes)?,
                        pass,
                    };
                    info!(
                        "scheduling {} minutes on {} ({}) at {} in the {} pass",
                        duration_minutes,
                        date,
                        weekday_name(date.weekday()),
                        candidate.start.format("%H:%M"),
                        pass
                    );
                    return Ok(Some(candidate));
                }
            }

            warn!("no {} minute slot in the {} pass", duration_minutes, pass);
        }

        info!(
            "no feasible {} minute slot across {} candidate date(s)",
            duration_minutes,
            dates.len()
        );
        Ok(None)
    }

    /// Every place a meeting of `duration_minutes` fits, earliest first.
    /// An empty `preferred_days` considers every candidate date.
    pub fn suggest_meeting_times(
        &self,
        participants: &[Participant],
        duration_minutes: i64,
        preferred_days: &[Weekday],
    ) -> Result<Vec<Suggestion>, SchedulingError> {
        let length = meeting_length(duration_minutes)?;
        let windows = working_windows(participants, &self.config)?;

        let mut suggestions = Vec::new();
        for date in candidate_dates(participants, &self.config.offset)
            .into_iter()
            .filter(|date| preferred_days.is_empty() || preferred_days.contains(&date.weekday()))
        {
            for slot in free_slots_within(participants, &windows, date, duration_minutes, &self.config)? {
                suggestions.push(Suggestion {
                    date,
                    weekday: weekday_name(date.weekday()).to_string(),
                    start: slot.start,
                    end: meeting_end(&slot, length, duration_minutes)?,
                    available_minutes: slot.duration_minutes,
                });
            }
        }

        suggestions.sort_by_key(|suggestion| suggestion.start);
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, busy, date, default_fixture, off_hours, working_week};

    fn scheduler() -> Scheduler {
        Scheduler::new(SchedulerConfig::default())
    }

    #[test]
    fn preference_names_all_seven_days() {
        for (day, name) in WEEKDAYS.iter() {
            assert_eq!(parse_day_preference(&format!("on {}!", name.to_uppercase())), Some(*day));
        }
        assert_eq!(parse_day_preference(""), None);
        assert_eq!(parse_day_preference("next week sometime"), None);
    }

    #[test]
    fn several_days_named_follow_fixed_precedence() {
        assert_eq!(parse_day_preference("friday or thursday"), Some(Weekday::Thu));
        assert_eq!(parse_day_preference("Wednesday, else Monday"), Some(Weekday::Mon));
        assert_eq!(parse_day_preference("sunday or friday"), Some(Weekday::Fri));
        assert_eq!(parse_day_preference("sunday or saturday"), Some(Weekday::Sat));

        let candidate = scheduler()
            .select_meeting_slot(&default_fixture(), 30, "friday or thursday")
            .unwrap()
            .unwrap();
        assert_eq!(candidate.date, date("2025-07-17"));
        assert_eq!(candidate.pass, CascadePass::Preferred);
    }

    #[test]
    fn thursday_preference_on_default_fixture() {
        let candidate = scheduler()
            .select_meeting_slot(&default_fixture(), 30, "thursday")
            .unwrap()
            .unwrap();

        assert_eq!(candidate.date, date("2025-07-17"));
        assert_eq!(candidate.start, at("2025-07-17T09:00:00+05:30"));
        assert_eq!(candidate.end, at("2025-07-17T09:30:00+05:30"));
        assert_eq!(candidate.pass, CascadePass::Preferred);
    }

    #[test]
    fn without_preference_first_weekday_wins() {
        let candidate = scheduler()
            .select_meeting_slot(&default_fixture(), 60, "whenever works")
            .unwrap()
            .unwrap();

        // Sunday the 13th is skipped, Monday has userthree's 1:1 until 10:00
        assert_eq!(candidate.date, date("2025-07-14"));
        assert_eq!(candidate.start, at("2025-07-14T10:00:00+05:30"));
        assert_eq!(candidate.end, at("2025-07-14T11:00:00+05:30"));
    }

    #[test]
    fn busy_thursday_falls_back_to_first_free_weekday() {
        let mut participants = default_fixture();
        participants[1]
            .intervals
            .push(busy("2025-07-17T08:00:00+05:30", "2025-07-17T17:00:00+05:30", "Offsite"));

        let candidate = scheduler()
            .select_meeting_slot(&participants, 30, "Thursday")
            .unwrap()
            .unwrap();

        assert_eq!(candidate.date, date("2025-07-14"));
        assert_eq!(candidate.start, at("2025-07-14T10:00:00+05:30"));
        assert_eq!(candidate.pass, CascadePass::Weekday);
    }

    #[test]
    fn weekend_is_the_last_resort() {
        let mut calendar = vec![
            off_hours("2025-07-18T18:00:00+05:30", "2025-07-19T09:00:00+05:30"),
            off_hours("2025-07-19T18:00:00+05:30", "2025-07-20T09:00:00+05:30"),
        ];
        calendar.push(busy("2025-07-18T09:00:00+05:30", "2025-07-18T18:00:00+05:30", "Release"));
        let participants = vec![Participant::new("solo", calendar)];

        let candidate = scheduler()
            .select_meeting_slot(&participants, 45, "friday")
            .unwrap()
            .unwrap();

        assert_eq!(candidate.date, date("2025-07-19"));
        assert_eq!(candidate.start, at("2025-07-19T09:00:00+05:30"));
        assert_eq!(candidate.end, at("2025-07-19T09:45:00+05:30"));
        assert_eq!(candidate.pass, CascadePass::Weekend);
    }

    #[test]
    fn saturday_preference_is_tried_first() {
        let participants = vec![Participant::new("solo", working_week((9, 0), (17, 0)))];

        let candidate = scheduler()
            .select_meeting_slot(&participants, 30, "saturday morning")
            .unwrap()
            .unwrap();

        assert_eq!(candidate.date, date("2025-07-19"));
        assert_eq!(candidate.pass, CascadePass::Preferred);
    }

    #[test]
    fn no_room_anywhere_is_none() {
        // the common window is seven hours long
        assert_eq!(
            scheduler().select_meeting_slot(&default_fixture(), 7 * 60 + 1, "thursday"),
            Ok(None)
        );
    }

    #[test]
    fn first_slot_that_fits_not_first_slot() {
        let mut calendar = working_week((9, 0), (17, 0));
        calendar.push(busy("2025-07-15T09:20:00+05:30", "2025-07-15T13:00:00+05:30", "Training"));
        let participants = vec![Participant::new("solo", calendar)];

        let candidate = scheduler()
            .select_meeting_slot(&participants, 30, "tuesday")
            .unwrap()
            .unwrap();
        assert_eq!(candidate.start, at("2025-07-15T13:00:00+05:30"));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            scheduler().select_meeting_slot(&[], 30, "monday"),
            Err(SchedulingError::InsufficientInput)
        );
        assert_eq!(
            scheduler().select_meeting_slot(&default_fixture(), 0, "monday"),
            Err(SchedulingError::InvalidDuration { minutes: 0 })
        );
        assert_eq!(
            scheduler().select_meeting_slot(&default_fixture(), i64::MAX, "monday"),
            Err(SchedulingError::InvalidDuration { minutes: i64::MAX })
        );
    }

    #[test]
    fn participants_without_entries_have_no_dates() {
        let participants = vec![Participant::new("a", vec![]), Participant::new("b", vec![])];
        assert_eq!(scheduler().select_meeting_slot(&participants, 30, "monday"), Ok(None));
    }

    #[test]
    fn suggestions_are_chronological() {
        let suggestions = scheduler()
            .suggest_meeting_times(&default_fixture(), 30, &[])
            .unwrap();

        assert!(suggestions.windows(2).all(|pair| pair[0].start <= pair[1].start));
        assert_eq!(suggestions[0].date, date("2025-07-13"));
        assert_eq!(suggestions[0].weekday, "Sunday");
        assert!(suggestions
            .iter()
            .all(|s| s.end - s.start == Duration::minutes(30) && s.available_minutes >= 30));
    }

    #[test]
    fn suggestions_respect_preferred_days() {
        let suggestions = scheduler()
            .suggest_meeting_times(&default_fixture(), 30, &[Weekday::Wed])
            .unwrap();

        assert_eq!(
            suggestions.iter().map(|s| (s.start, s.available_minutes)).collect::<Vec<_>>(),
            vec![
                (at("2025-07-16T09:00:00+05:30"), 60),
                (at("2025-07-16T11:00:00+05:30"), 300),
            ]
        );
    }
}
