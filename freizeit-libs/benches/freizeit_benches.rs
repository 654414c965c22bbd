use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use freizeit_libs::{
    config::SchedulerConfig, find_common_free_slots, BusyInterval, Participant, Scheduler,
};

/// Thirty days of nights off plus a handful of meetings per day, skewed per participant.
fn calendars(people: usize, days: i64) -> Vec<Participant> {
    let start = DateTime::parse_from_rfc3339("2025-07-01T00:00:00+05:30").unwrap();
    let hours = |day: i64, minutes: i64| start + Duration::days(day) + Duration::minutes(minutes);

    (0..people)
        .map(|person| {
            let skew = (person as i64 % 4) * 15;
            let mut intervals = Vec::new();
            for day in 0..days {
                intervals.push(BusyInterval::new(
                    hours(day, 18 * 60 - skew),
                    hours(day + 1, 9 * 60 - skew),
                    "Off Hours",
                ));
                for meeting in 0..4 {
                    let at = 9 * 60 + meeting * 90 + (person as i64 * 7 + day * 11) % 45;
                    intervals.push(BusyInterval::new(
                        hours(day, at),
                        hours(day, at + 30),
                        "Sync",
                    ));
                }
            }
            Participant::new(&format!("person{}@example.com", person), intervals)
        })
        .collect()
}

fn find_and_select(c: &mut Criterion) {
    let participants = calendars(10, 30);
    let config = SchedulerConfig::default().with_offset(FixedOffset::east_opt(330 * 60).unwrap());
    let scheduler = Scheduler::new(config.clone());
    let date = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();

    c.bench_function("find_common_free_slots", |b| {
        b.iter(|| black_box(find_common_free_slots(&participants, date, 30, &config)))
    });

    c.bench_function("select_meeting_slot", |b| {
        b.iter(|| black_box(scheduler.select_meeting_slot(&participants, 45, "thursday")))
    });

    c.bench_function("select_meeting_slot_exhausted", |b| {
        b.iter(|| black_box(scheduler.select_meeting_slot(&participants, 300, "friday")))
    });

    c.bench_function("analyze", |b| {
        b.iter(|| black_box(scheduler.analyze(&participants, 30)))
    });
}

criterion_group!(benches, find_and_select);
criterion_main!(benches);
