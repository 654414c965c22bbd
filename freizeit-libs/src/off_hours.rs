use crate::config::SchedulerConfig;
use crate::data::BusyInterval;
use crate::time::{at_wall_clock, TimeRange, Timestamp};
use chrono::Duration;
use log::debug;

/// The look-ahead window starting at `now`, read in the configured offset.
pub fn lookahead(now: Timestamp, config: &SchedulerConfig) -> Option<TimeRange> {
    let start = now.with_timezone(&config.offset);
    let end = start.checked_add_signed(Duration::try_days(i64::from(config.lookahead_days))?)?;
    Some(TimeRange::new(start, end))
}

/// Stand-in calendar for a participant whose real one could not be fetched.
///
/// One off-hours entry per date from `range.start()` through `range.end()`, inclusive,
/// running from the end of the fallback working window on that date to its start on the
/// next date. The participant then looks available for the whole fallback window of every
/// day in the range.
///
/// ```
/// use chrono::DateTime;
/// use freizeit_libs::{config::SchedulerConfig, off_hours::synthesize_off_hours, time::TimeRange};
///
/// let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap();
/// let range = TimeRange::new(at("2025-07-14T12:34:55+05:30"), at("2025-07-16T08:00:00+05:30"));
/// let entries = synthesize_off_hours(range, &SchedulerConfig::default());
///
/// assert_eq!(entries.len(), 3);
/// assert_eq!(entries[0].start, at("2025-07-14T17:00:00+05:30"));
/// assert_eq!(entries[0].end, at("2025-07-15T09:00:00+05:30"));
/// assert_eq!(entries[2].end, at("2025-07-17T09:00:00+05:30"));
/// assert!(entries.iter().all(|entry| entry.label == "Off Hours"));
/// ```
pub fn synthesize_off_hours(range: TimeRange, config: &SchedulerConfig) -> Vec<BusyInterval> {
    let last = range.end().with_timezone(&config.offset).date_naive();
    let mut date = range.start().with_timezone(&config.offset).date_naive();
    let mut entries = Vec::new();

    while date <= last {
        let next = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };

        let start = at_wall_clock(date, config.fallback_window.end, &config.offset);
        let end = at_wall_clock(next, config.fallback_window.start, &config.offset);
        if let (Some(start), Some(end)) = (start, end) {
            entries.push(
                BusyInterval::new(start, end, &config.off_hours_label)
                    .with_attendees(vec![String::from("SELF")]),
            );
        }

        date = next;
    }

    debug!("synthesized {} off-hours entries for {}", entries.len(), range);
    entries
}
