#![no_main]
use chrono::NaiveDate;
use freizeit_libs::{config::SchedulerConfig, find_common_free_slots, Participant};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<Participant>, i16, u8)| {
    let (participants, min_duration, day) = data;
    let config = SchedulerConfig::default();
    let date = match NaiveDate::from_ymd_opt(2025, 7, 14)
        .and_then(|d| d.checked_add_days(chrono::Days::new(u64::from(day % 8))))
    {
        Some(date) => date,
        None => return,
    };

    let slots = match find_common_free_slots(&participants, date, i64::from(min_duration), &config) {
        Ok(slots) => slots,
        Err(_) => return,
    };

    for slot in &slots {
        assert!(slot.start < slot.end, "Empty slot returned: {}", slot);
        assert!(
            slot.duration_minutes >= i64::from(min_duration).max(1),
            "Slot shorter than requested: {}",
            slot
        );
        assert_eq!(slot.duration_minutes, (slot.end - slot.start).num_minutes());

        let collision = participants.iter().flat_map(|p| p.busy_on(date, &config)).find(|busy| {
            busy.start() < busy.end() && busy.start() < slot.end && slot.start < busy.end()
        });
        assert!(collision.is_none(), "Slot {} overlaps busy {:?}", slot, collision);
    }

    assert!(
        slots.windows(2).all(|pair| pair[0].end <= pair[1].start),
        "Slots out of order or overlapping: {:?}",
        slots
    );
});
