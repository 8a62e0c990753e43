use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};

use super::grid::produce_slots;
use super::slot_utils::{is_active_day, minutes_of_day};
use super::taken::TakenByDate;
use super::types::{AvailabilityMap, CourtSchedule, ReservationRange, SlotAvailability, SlotStatus};

/// Everything the overlay needs for one computation.
/// `now` is civil time in the court's zone.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityRequest<'a> {
    pub range_start: NaiveDate,
    pub range_end_exclusive: NaiveDate,
    pub schedule: &'a CourtSchedule,
    pub reservations: &'a [ReservationRange],
    pub now: NaiveDateTime,
}

/// Computes slot statuses for every bookable day in `[range_start, range_end_exclusive)`.
///
/// Days before today and days the court is closed are left out of the map.
/// Active days always get a key, even when their grid is empty. On today's
/// date a free slot whose start minute is already behind `now` is `Past`;
/// a reserved slot stays `Taken` regardless of time.
///
/// Never fails: bad reservations are dropped, bad schedules give empty grids.
pub fn compute_availability(request: &AvailabilityRequest<'_>) -> AvailabilityMap {
    let mut availability = AvailabilityMap::new();
    let today = request.now.date();
    let now_minutes = minutes_of_day(request.now);
    let taken = TakenByDate::from_reservations(request.reservations);
    if !request.schedule.has_supported_granularity() {
        warn!(
            "court schedule uses unsupported slot length of {} minutes, no slots generated",
            request.schedule.slot_minutes
        );
    }

    let mut day = request.range_start;
    while day < request.range_end_exclusive {
        if day >= today && is_active_day(&day, request.schedule.open_days) {
            let statuses: Vec<SlotAvailability> = produce_slots(day, request.schedule)
                .into_iter()
                .map(|slot| {
                    let status = if taken.is_taken(day, slot.index) {
                        SlotStatus::Taken
                    } else if day == today && minutes_of_day(slot.start) < now_minutes {
                        SlotStatus::Past
                    } else {
                        SlotStatus::Available
                    };
                    SlotAvailability { slot, status }
                })
                .collect();
            availability.insert(day, statuses);
        }

        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    debug!(
        "computed availability for {} day(s) in [{}, {}), {} reservation(s) dropped",
        availability.len(),
        request.range_start,
        request.range_end_exclusive,
        taken.dropped().len()
    );
    availability
}

/// Why a whole day is shaded in a calendar view, if it is.
/// `Past` wins over `Inactive`; `None` means the day is bookable.
pub fn day_status(date: NaiveDate, schedule: &CourtSchedule, now: NaiveDateTime) -> Option<SlotStatus> {
    if date < now.date() {
        Some(SlotStatus::Past)
    } else if !is_active_day(&date, schedule.open_days) {
        Some(SlotStatus::Inactive)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::OpenDays;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::sync::atomic::{AtomicUsize, Ordering};

    // 2025-06-02 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    fn morning_schedule() -> CourtSchedule {
        CourtSchedule::new(OpenDays::WEEKDAYS, 480, 600, 60, 1000.0)
    }

    fn statuses(map: &AvailabilityMap, date: NaiveDate) -> Vec<(u32, SlotStatus)> {
        map[&date].iter().map(|s| (s.slot.index, s.status)).collect()
    }

    #[test]
    fn taken_and_past_on_today() {
        let schedule = morning_schedule();
        let reservations = [ReservationRange::new(monday(), 0, 1)];
        let request = AvailabilityRequest {
            range_start: monday(),
            range_end_exclusive: monday().succ_opt().unwrap(),
            schedule: &schedule,
            reservations: &reservations,
            now: at(monday(), 9, 30),
        };

        let map = compute_availability(&request);
        assert_eq!(
            statuses(&map, monday()),
            vec![(0, SlotStatus::Taken), (1, SlotStatus::Past)]
        );
    }

    #[test]
    fn taken_wins_over_past() {
        let schedule = morning_schedule();
        let reservations = [ReservationRange::new(monday(), 0, 2)];
        let request = AvailabilityRequest {
            range_start: monday(),
            range_end_exclusive: monday().succ_opt().unwrap(),
            schedule: &schedule,
            reservations: &reservations,
            now: at(monday(), 23, 0),
        };

        let map = compute_availability(&request);
        assert!(map[&monday()].iter().all(|s| s.status == SlotStatus::Taken));
    }

    #[test]
    fn slot_starting_this_minute_is_still_available() {
        let schedule = morning_schedule();
        let request = AvailabilityRequest {
            range_start: monday(),
            range_end_exclusive: monday().succ_opt().unwrap(),
            schedule: &schedule,
            reservations: &[],
            now: at(monday(), 9, 0),
        };

        let map = compute_availability(&request);
        assert_eq!(
            statuses(&map, monday()),
            vec![(0, SlotStatus::Past), (1, SlotStatus::Available)]
        );
    }

    #[test]
    fn future_days_are_never_past() {
        let schedule = morning_schedule();
        let tuesday = monday().succ_opt().unwrap();
        let request = AvailabilityRequest {
            range_start: tuesday,
            range_end_exclusive: tuesday.succ_opt().unwrap(),
            schedule: &schedule,
            reservations: &[],
            now: at(monday(), 23, 59),
        };

        let map = compute_availability(&request);
        assert!(map[&tuesday].iter().all(|s| s.status == SlotStatus::Available));
    }

    #[test]
    fn past_and_closed_days_are_absent() {
        let schedule = morning_schedule();
        // Sunday 2025-06-01 through Saturday 2025-06-07, now is Wednesday
        let sunday = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let reservations = [ReservationRange::new(monday(), 0, 1), ReservationRange::new(saturday, 0, 1)];
        let request = AvailabilityRequest {
            range_start: sunday,
            range_end_exclusive: saturday.succ_opt().unwrap(),
            schedule: &schedule,
            reservations: &reservations,
            now: at(wednesday, 7, 0),
        };

        let map = compute_availability(&request);
        let days: Vec<NaiveDate> = map.keys().copied().collect();
        assert_eq!(
            days,
            vec![
                wednesday,
                NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
            ]
        );
        // Before opening, nothing on today is past yet
        assert!(map[&wednesday].iter().all(|s| s.status == SlotStatus::Available));
    }

    #[test]
    fn misconfigured_schedule_keeps_active_day_with_empty_grid() {
        let schedule = CourtSchedule::new(OpenDays::WEEKDAYS, 600, 480, 60, 0.0);
        let request = AvailabilityRequest {
            range_start: monday(),
            range_end_exclusive: monday().succ_opt().unwrap(),
            schedule: &schedule,
            reservations: &[],
            now: at(monday(), 7, 0),
        };

        let map = compute_availability(&request);
        assert_eq!(map.len(), 1);
        assert!(map[&monday()].is_empty());
    }

    #[test]
    fn reversed_range_is_empty() {
        let schedule = morning_schedule();
        let request = AvailabilityRequest {
            range_start: monday().succ_opt().unwrap(),
            range_end_exclusive: monday(),
            schedule: &schedule,
            reservations: &[],
            now: at(monday(), 7, 0),
        };
        assert!(compute_availability(&request).is_empty());
    }

    #[test]
    fn bad_reservations_do_not_poison_the_batch() {
        let schedule = morning_schedule();
        let reservations = [ReservationRange::new(monday(), 1, -3), ReservationRange::new(monday(), 1, 1)];
        let request = AvailabilityRequest {
            range_start: monday(),
            range_end_exclusive: monday().succ_opt().unwrap(),
            schedule: &schedule,
            reservations: &reservations,
            now: at(monday(), 6, 0),
        };

        let map = compute_availability(&request);
        assert_eq!(
            statuses(&map, monday()),
            vec![(0, SlotStatus::Available), (1, SlotStatus::Taken)]
        );
    }

    #[test]
    fn same_inputs_same_output() {
        let schedule = CourtSchedule::new(OpenDays::ALL, 480, 1320, 30, 800.0);
        let reservations = [
            ReservationRange::new(monday(), 2, 2),
            ReservationRange::new(monday(), 3, 3),
        ];
        let request = AvailabilityRequest {
            range_start: monday(),
            range_end_exclusive: NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(),
            schedule: &schedule,
            reservations: &reservations,
            now: at(monday(), 12, 15),
        };
        assert_eq!(compute_availability(&request), compute_availability(&request));
    }

    #[test]
    fn day_status_shades_past_then_inactive() {
        let schedule = morning_schedule();
        let now = at(monday(), 10, 0);
        let sunday = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();

        assert_eq!(day_status(sunday, &schedule, now), Some(SlotStatus::Past));
        assert_eq!(day_status(saturday, &schedule, now), Some(SlotStatus::Inactive));
        assert_eq!(day_status(monday(), &schedule, now), None);
    }

    // Counts warnings about the 50-minute schedule used below, which no other test uses
    struct GranularityWarnings(AtomicUsize);

    impl Log for GranularityWarnings {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Warn
        }

        fn log(&self, record: &Record) {
            if record.level() == Level::Warn && record.args().to_string().contains("of 50 minutes") {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn flush(&self) {}
    }

    static GRANULARITY_WARNINGS: GranularityWarnings = GranularityWarnings(AtomicUsize::new(0));

    #[test]
    fn unsupported_granularity_is_reported_once_per_computation() {
        let _ = log::set_logger(&GRANULARITY_WARNINGS);
        log::set_max_level(LevelFilter::Warn);

        let schedule = CourtSchedule::new(OpenDays::ALL, 480, 1320, 50, 0.0);
        let request = AvailabilityRequest {
            range_start: monday(),
            range_end_exclusive: NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(),
            schedule: &schedule,
            reservations: &[],
            now: at(monday(), 7, 0),
        };

        let map = compute_availability(&request);
        assert_eq!(map.len(), 7);
        assert!(map.values().all(Vec::is_empty));
        assert_eq!(GRANULARITY_WARNINGS.0.load(Ordering::SeqCst), 1);
    }
}
