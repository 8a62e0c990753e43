pub mod types;
pub mod slot_utils;
pub mod clock;
pub mod grid;
pub mod taken;
pub mod overlay;
pub mod cache;
pub mod stats;

pub use types::{
    AvailabilityMap, CourtSchedule, OpenDays, ReservationRange, Slot, SlotAvailability, SlotStatus,
};
pub use clock::{CivilZone, Clock, FixedClock, SystemClock};
pub use grid::produce_slots;
pub use taken::{TakenByDate, TakenSet};
pub use overlay::{compute_availability, day_status, AvailabilityRequest};
pub use cache::AvailabilityCache;
pub use stats::{day_occupancy, DayOccupancy};
