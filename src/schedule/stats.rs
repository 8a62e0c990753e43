use chrono::NaiveDate;
use serde::Serialize;

use super::grid::produce_slots;
use super::taken::TakenByDate;
use super::types::{CourtSchedule, ReservationRange, Slot};

/// One slot of the statistics grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OccupancySlot {
    pub slot: Slot,
    pub reserved: bool,
}

/// Reservation load of a single court on one date.
///
/// Unlike the booking view, the whole grid is shown: no past or closed-day
/// suppression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayOccupancy {
    pub date: NaiveDate,
    pub slots: Vec<OccupancySlot>,
    pub total: usize,
    pub taken: usize,
    pub free: usize,
}

impl DayOccupancy {
    /// Fraction of the grid that is reserved, 0.0 for an empty grid
    pub fn occupancy_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.taken as f64 / self.total as f64
        }
    }

    /// Revenue of the reserved slots at the court's list price
    pub fn booked_value(&self, schedule: &CourtSchedule) -> f64 {
        self.taken as f64 * schedule.price
    }
}

/// Marks each slot of `date` as reserved or free.
/// Reservation indices beyond the grid are ignored.
pub fn day_occupancy(date: NaiveDate, schedule: &CourtSchedule, reservations: &[ReservationRange]) -> DayOccupancy {
    let taken = TakenByDate::from_reservations(reservations);
    let slots: Vec<OccupancySlot> = produce_slots(date, schedule)
        .into_iter()
        .map(|slot| OccupancySlot {
            reserved: taken.is_taken(date, slot.index),
            slot,
        })
        .collect();

    let total = slots.len();
    let reserved = slots.iter().filter(|s| s.reserved).count();
    DayOccupancy {
        date,
        slots,
        total,
        taken: reserved,
        free: total - reserved,
    }
}
