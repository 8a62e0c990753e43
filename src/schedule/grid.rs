use chrono::NaiveDate;

use super::slot_utils::at_minutes;
use super::types::{CourtSchedule, Slot};

/// Builds the ordered slot grid for one court on one date.
///
/// Slot `i` starts at `open_time + i * slot_minutes`. A trailing period shorter
/// than one slot is not represented. Inverted hours or an unsupported slot
/// length give an empty grid; a closed or misconfigured court is a valid state.
/// Unsupported lengths are reported by the caller, once per schedule.
pub fn produce_slots(date: NaiveDate, schedule: &CourtSchedule) -> Vec<Slot> {
    if !schedule.has_supported_granularity() {
        return Vec::new();
    }

    let count = schedule.slot_count();
    let mut slots = Vec::with_capacity(count as usize);
    for index in 0..count {
        let start_minutes = schedule.open_time + index * schedule.slot_minutes;
        let (Some(start), Some(end)) = (
            at_minutes(date, start_minutes),
            at_minutes(date, start_minutes + schedule.slot_minutes),
        ) else {
            // Slots past chrono's last representable instant
            break;
        };
        slots.push(Slot { index, start, end });
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::OpenDays;
    use chrono::Timelike;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn hourly_grid_covers_open_window() {
        let schedule = CourtSchedule::new(OpenDays::ALL, 480, 1320, 60, 1500.0);
        let slots = produce_slots(date(), &schedule);

        assert_eq!(slots.len(), 14);
        assert_eq!(slots[0].start.hour(), 8);
        assert_eq!(slots[13].end.hour(), 22);
        for (i, slot) in slots.iter().enumerate() {
            assert_eq!(slot.index as usize, i);
            assert_eq!(slot.end - slot.start, chrono::Duration::minutes(60));
        }
    }

    #[test]
    fn slots_are_contiguous_and_non_overlapping() {
        let schedule = CourtSchedule::new(OpenDays::ALL, 510, 1290, 30, 0.0);
        let slots = produce_slots(date(), &schedule);

        assert_eq!(slots.len(), (1290 - 510) / 30);
        for pair in slots.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn partial_trailing_period_is_dropped() {
        // 08:00-10:30 with hourly slots holds two whole slots
        let schedule = CourtSchedule::new(OpenDays::ALL, 480, 630, 60, 0.0);
        let slots = produce_slots(date(), &schedule);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].end.hour(), 10);
        assert_eq!(slots[1].end.minute(), 0);
    }

    #[test]
    fn inverted_hours_give_empty_grid() {
        let schedule = CourtSchedule::new(OpenDays::ALL, 600, 480, 60, 0.0);
        assert!(produce_slots(date(), &schedule).is_empty());

        let equal = CourtSchedule::new(OpenDays::ALL, 600, 600, 30, 0.0);
        assert!(produce_slots(date(), &equal).is_empty());
    }

    #[test]
    fn unsupported_granularity_gives_empty_grid() {
        let schedule = CourtSchedule::new(OpenDays::ALL, 480, 1320, 45, 0.0);
        assert!(produce_slots(date(), &schedule).is_empty());

        let zero = CourtSchedule::new(OpenDays::ALL, 480, 1320, 0, 0.0);
        assert!(produce_slots(date(), &zero).is_empty());
    }

    #[test]
    fn grid_may_end_at_midnight() {
        let schedule = CourtSchedule::new(OpenDays::ALL, 1380, 1440, 60, 0.0);
        let slots = produce_slots(date(), &schedule);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].end.date(), date().succ_opt().unwrap());
    }

    #[test]
    fn grid_on_last_date_keeps_representable_slots() {
        let schedule = CourtSchedule::new(OpenDays::ALL, 1320, 1440, 60, 0.0);
        let slots = produce_slots(NaiveDate::MAX, &schedule);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start.hour(), 22);
    }

    #[test]
    fn grid_is_deterministic() {
        let schedule = CourtSchedule::new(OpenDays::WEEKDAYS, 480, 600, 30, 0.0);
        assert_eq!(produce_slots(date(), &schedule), produce_slots(date(), &schedule));
    }
}
