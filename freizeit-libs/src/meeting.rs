use crate::config::SchedulerConfig;
use crate::data::{FreeSlot, SchedulingError};
use crate::participant::Participant;
use crate::time::Available;
use crate::window::WorkingWindow;
use chrono::{FixedOffset, NaiveDate};
use itertools::Itertools;
use log::{debug, warn};

/// Finds the times on `date` when every participant is working and nobody is busy.
///
/// Each participant's working window is inferred from their off-hours, the windows are
/// intersected, and every non-off-hours entry starting on `date` is subtracted from the
/// result. Only free stretches of at least `min_duration_minutes` (and at least one
/// whole minute) are returned, in chronological order.
///
/// An empty intersection of working windows is not an error, there is simply no room
/// on that date.
///
/// # Errors
/// `SchedulingError::InsufficientInput` without participants, and whatever the
/// configured inference policy rejects.
///
/// ```
/// use chrono::DateTime;
/// use freizeit_libs::{
///     config::SchedulerConfig, data::BusyInterval, meeting::find_common_free_slots,
///     participant::Participant,
/// };
///
/// let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap();
/// let off = BusyInterval::new(at("2025-07-14T18:00:00+05:30"), at("2025-07-15T09:00:00+05:30"), "Off Hours");
/// let workshop = BusyInterval::new(at("2025-07-15T09:00:00+05:30"), at("2025-07-15T16:00:00+05:30"), "Workshop");
///
/// let participants = vec![
///     Participant::new("userone", vec![off.clone()]),
///     Participant::new("usertwo", vec![off, workshop]),
/// ];
///
/// let date = at("2025-07-15T00:00:00+05:30").date_naive();
/// let slots = find_common_free_slots(&participants, date, 30, &SchedulerConfig::default()).unwrap();
///
/// assert_eq!(slots.len(), 1);
/// assert_eq!(slots[0].start, at("2025-07-15T16:00:00+05:30"));
/// assert_eq!(slots[0].end, at("2025-07-15T18:00:00+05:30"));
/// assert_eq!(slots[0].duration_minutes, 120);
/// ```
pub fn find_common_free_slots(
    participants: &[Participant],
    date: NaiveDate,
    min_duration_minutes: i64,
    config: &SchedulerConfig,
) -> Result<Vec<FreeSlot>, SchedulingError> {
    let windows = working_windows(participants, config)?;
    free_slots_within(participants, &windows, date, min_duration_minutes, config)
}

/// Infers every participant's window once, in participant order.
pub fn working_windows(
    participants: &[Participant],
    config: &SchedulerConfig,
) -> Result<Vec<WorkingWindow>, SchedulingError> {
    if participants.is_empty() {
        return Err(SchedulingError::InsufficientInput);
    }

    participants
        .iter()
        .map(|participant| {
            let window = participant.working_window(config)?;
            debug!("{} works {}", participant.id, window);
            Ok(window)
        })
        .collect()
}

/// The free-slot sweep for one date with working windows already inferred.
pub(crate) fn free_slots_within(
    participants: &[Participant],
    windows: &[WorkingWindow],
    date: NaiveDate,
    min_duration_minutes: i64,
    config: &SchedulerConfig,
) -> Result<Vec<FreeSlot>, SchedulingError> {
    let common = match WorkingWindow::intersect(windows) {
        Some(common) if !common.is_empty() => common,
        Some(common) => {
            warn!("working hours do not overlap on {} ({})", date, common);
            return Ok(vec![]);
        }
        None => return Err(SchedulingError::InsufficientInput),
    };

    let window = match common.on(date, &config.offset) {
        Some(window) => window,
        None => return Ok(vec![]),
    };

    let slots = participants
        .iter()
        .flat_map(|participant| participant.busy_on(date, config))
        .get_availability(window, min_duration_minutes)
        .into_iter()
        .map(FreeSlot::from)
        .collect_vec();

    debug!(
        "{}: {} free slot(s) of at least {} minutes within {}",
        date,
        slots.len(),
        min_duration_minutes,
        common
    );

    Ok(slots)
}

/// Every distinct date any entry starts on, ascending.
pub fn candidate_dates(participants: &[Participant], offset: &FixedOffset) -> Vec<NaiveDate> {
    participants
        .iter()
        .flat_map(|participant| participant.dates(offset))
        .sorted_unstable()
        .dedup()
        .collect()
}
