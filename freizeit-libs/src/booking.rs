use crate::config::SchedulerConfig;
use crate::data::{BusyInterval, SchedulingCandidate};
use crate::participant::Participant;
use crate::time::Timestamp;
use chrono::NaiveDate;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Events starting this close to the meeting count as nearby
const NEARBY_SECONDS: i64 = 60 * 60;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub organizer: String,
    pub invitees: Vec<String>,
    pub subject: String,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeCalendar {
    pub email: String,
    pub events: Vec<BusyInterval>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearbyEvent {
    pub participant: String,
    pub label: String,
    pub start: Timestamp,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insights {
    /// Other meetings each attendee already has on the meeting's date
    pub meetings_that_day: BTreeMap<String, usize>,
    pub nearby_events: Vec<NearbyEvent>,
    pub attendee_count: usize,
}

/// A chosen slot turned into a calendar entry on everybody's calendar.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub date: NaiveDate,
    pub duration_minutes: i64,
    pub event: BusyInterval,
    pub attendees: Vec<AttendeeCalendar>,
    pub insights: Insights,
}

impl Booking {
    /// Adds the meeting to the calendar of the organizer and every invitee.
    ///
    /// Calendars come from `participants` by id; an attendee without one gets a calendar
    /// holding just the new meeting. Every calendar is sorted by start afterwards.
    pub fn assemble(
        candidate: &SchedulingCandidate,
        request: &BookingRequest,
        participants: &[Participant],
        config: &SchedulerConfig,
    ) -> Booking {
        let emails: Vec<String> = std::iter::once(&request.organizer)
            .chain(request.invitees.iter())
            .unique()
            .cloned()
            .collect();

        let event = BusyInterval::new(candidate.start, candidate.end, &request.subject)
            .with_attendees(emails.clone());

        let attendees = emails
            .iter()
            .map(|email| {
                let mut events = participants
                    .iter()
                    .find(|participant| &participant.id == email)
                    .map(|participant| participant.intervals.clone())
                    .unwrap_or_default();
                events.push(event.clone());
                events.sort_by_key(|event| event.start);

                AttendeeCalendar {
                    email: email.clone(),
                    events,
                }
            })
            .collect();

        Booking {
            date: candidate.date,
            duration_minutes: candidate.range().minutes(),
            insights: insights(candidate, participants, emails.len(), config),
            event,
            attendees,
        }
    }
}

fn insights(
    candidate: &SchedulingCandidate,
    participants: &[Participant],
    attendee_count: usize,
    config: &SchedulerConfig,
) -> Insights {
    let meetings = |participant: &Participant| {
        participant
            .intervals
            .iter()
            .filter(|interval| !interval.is_off_hours(&config.off_hours_label))
            .cloned()
            .collect_vec()
    };

    let meetings_that_day = participants
        .iter()
        .map(|participant| {
            let count = meetings(participant)
                .iter()
                .filter(|interval| interval.date_in(&config.offset) == candidate.date)
                .count();
            (participant.id.clone(), count)
        })
        .collect();

    let nearby_events = participants
        .iter()
        .flat_map(|participant| {
            meetings(participant)
                .into_iter()
                .filter(move |interval| (interval.start - candidate.start).num_seconds().abs() < NEARBY_SECONDS)
                .map(move |interval| NearbyEvent {
                    participant: participant.id.clone(),
                    label: interval.label,
                    start: interval.start,
                })
        })
        .collect();

    Insights {
        meetings_that_day,
        nearby_events,
        attendee_count,
    }
}
