#![no_main]
use freizeit_libs::{config::SchedulerConfig, find_common_free_slots, Participant, Scheduler};
use libfuzzer_sys::fuzz_target;

const PREFERENCES: [&str; 4] = ["", "monday", "Thursday please", "sunday or saturday"];

fuzz_target!(|data: (Vec<Participant>, u16, u8)| {
    // Only the first run installs the logger, later ones get an error back
    #[cfg(feature = "log")]
    let _ = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(std::io::stdout())
        .apply();

    let (participants, duration, preference) = data;
    let duration = i64::from(duration % 600) + 1;
    let preference = PREFERENCES[usize::from(preference) % PREFERENCES.len()];
    let config = SchedulerConfig::default();

    if let Ok(Some(candidate)) =
        Scheduler::new(config.clone()).select_meeting_slot(&participants, duration, preference)
    {
        assert_eq!(
            candidate.range().minutes(),
            duration,
            "Meeting length differs from request: {:?}",
            candidate
        );

        let slots = find_common_free_slots(&participants, candidate.date, duration, &config)
            .expect("selection succeeded so the finder must too");
        assert!(
            slots
                .iter()
                .any(|slot| slot.start == candidate.start && slot.range().covers(candidate.range())),
            "Candidate {:?} is not the start of a free slot in {:?}",
            candidate,
            slots
        );
    }
});
