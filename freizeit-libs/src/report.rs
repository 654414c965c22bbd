use crate::data::{FreeSlot, SchedulingError};
use crate::meeting::{candidate_dates, free_slots_within, working_windows};
use crate::participant::Participant;
use crate::schedule::{weekday_name, Scheduler, Suggestion};
use crate::time::TotalMinutes;
use crate::window::WorkingWindow;
use chrono::{Datelike, NaiveDate};
use log::debug;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantWindow {
    pub participant: String,
    pub window: WorkingWindow,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub weekday: String,
    pub slots: Vec<FreeSlot>,
}

/// Who works when, and what is free on every candidate date.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityReport {
    pub min_duration_minutes: i64,
    pub windows: Vec<ParticipantWindow>,
    pub days: Vec<DayAvailability>,
    pub total_slots: usize,
    pub total_free_minutes: i64,
    /// The earliest few places a meeting of `min_duration_minutes` fits
    pub suggestions: Vec<Suggestion>,
}

const TOP_SUGGESTIONS: usize = 3;

impl Scheduler {
    /// Free slots of at least `min_duration_minutes` on every candidate date.
    ///
    /// With the `rayon` feature the dates are computed in parallel; the report is the
    /// same either way.
    pub fn analyze(
        &self,
        participants: &[Participant],
        min_duration_minutes: i64,
    ) -> Result<AvailabilityReport, SchedulingError> {
        let config = self.config();
        let windows = working_windows(participants, config)?;
        let dates = candidate_dates(participants, &config.offset);

        let day = |date: &NaiveDate| -> Result<DayAvailability, SchedulingError> {
            Ok(DayAvailability {
                date: *date,
                weekday: weekday_name(date.weekday()).to_string(),
                slots: free_slots_within(participants, &windows, *date, min_duration_minutes, config)?,
            })
        };

        #[cfg(feature = "rayon")]
        let days = dates.par_iter().map(day).collect::<Result<Vec<_>, _>>()?;
        #[cfg(not(feature = "rayon"))]
        let days = dates.iter().map(day).collect::<Result<Vec<_>, _>>()?;

        let total_slots = days.iter().map(|day| day.slots.len()).sum();
        let total_free_minutes = days
            .iter()
            .flat_map(|day| day.slots.iter().map(FreeSlot::range))
            .total_minutes();

        // Slots shorter than a minute never make it into a report
        let mut suggestions = if min_duration_minutes > 0 {
            self.suggest_meeting_times(participants, min_duration_minutes, &[])?
        } else {
            vec![]
        };
        suggestions.truncate(TOP_SUGGESTIONS);

        debug!(
            "{} slot(s), {} free minutes across {} date(s)",
            total_slots,
            total_free_minutes,
            days.len()
        );

        Ok(AvailabilityReport {
            min_duration_minutes,
            windows: participants
                .iter()
                .zip(windows)
                .map(|(participant, window)| ParticipantWindow {
                    participant: participant.id.clone(),
                    window,
                })
                .collect(),
            days,
            total_slots,
            total_free_minutes,
            suggestions,
        })
    }
}

impl fmt::Display for AvailabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Working hours:")?;
        for entry in &self.windows {
            writeln!(f, "  {}: {}", entry.participant, entry.window)?;
        }

        if let (Some(first), Some(last)) = (self.days.first(), self.days.last()) {
            writeln!(f, "\nDates: {} to {}", first.date, last.date)?;
        }

        for day in &self.days {
            writeln!(f, "\n{} ({}):", day.date, day.weekday)?;
            if day.slots.is_empty() {
                writeln!(f, "  no common free time")?;
            }
            for (i, slot) in day.slots.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, slot)?;
            }
        }

        writeln!(
            f,
            "\n{} slot(s), {} free minutes",
            self.total_slots, self.total_free_minutes
        )?;

        if !self.suggestions.is_empty() {
            writeln!(f, "\nSuggestions ({} mins):", self.min_duration_minutes)?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(
                    f,
                    "  {}. {} ({}) at {}",
                    i + 1,
                    suggestion.date,
                    suggestion.weekday,
                    suggestion.start.format("%H:%M")
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::test_utils::{at, date, default_fixture};

    #[test]
    fn reports_every_candidate_date() {
        let scheduler = Scheduler::new(SchedulerConfig::default());
        let report = scheduler.analyze(&default_fixture(), 30).unwrap();

        assert_eq!(
            report
                .windows
                .iter()
                .map(|w| (w.participant.as_str(), w.window.to_string()))
                .collect::<Vec<_>>(),
            vec![
                ("userone.amd@gmail.com", "09:00 - 18:00".to_string()),
                ("usertwo.amd@gmail.com", "09:00 - 18:00".to_string()),
                ("userthree.amd@gmail.com", "07:30 - 16:00".to_string()),
            ]
        );

        assert_eq!(report.days.len(), 6);
        assert_eq!(report.days[0].weekday, "Sunday");
        assert!(report.days[2].slots.is_empty());
        assert_eq!(report.days[2].date, date("2025-07-15"));

        // 13th, 17th, 18th whole days, 14th after the 1:1, 16th around the customer call
        assert_eq!(report.total_slots, 6);
        assert_eq!(report.total_free_minutes, 3 * 420 + 360 + 60 + 300);

        assert_eq!(report.suggestions.len(), 3);
        assert_eq!(report.suggestions[0].start, at("2025-07-13T09:00:00+05:30"));
        assert_eq!(report.suggestions[1].start, at("2025-07-14T10:00:00+05:30"));
        assert_eq!(report.suggestions[2].start, at("2025-07-16T09:00:00+05:30"));
    }

    #[test]
    fn renders_plain_text() {
        let scheduler = Scheduler::new(SchedulerConfig::default());
        let text = scheduler.analyze(&default_fixture(), 30).unwrap().to_string();

        assert!(text.contains("userthree.amd@gmail.com: 07:30 - 16:00"));
        assert!(text.contains("2025-07-15 (Tuesday):\n  no common free time"));
        assert!(text.contains("1. 11:00 - 16:00 (300 mins)") || text.contains("2. 11:00 - 16:00 (300 mins)"));
        assert!(text.contains("Dates: 2025-07-13 to 2025-07-18"));
    }

    #[test]
    fn needs_participants() {
        let scheduler = Scheduler::new(SchedulerConfig::default());
        assert_eq!(scheduler.analyze(&[], 30), Err(SchedulingError::InsufficientInput));
    }
}
