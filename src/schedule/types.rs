use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// Supported slot granularities in minutes
pub const SUPPORTED_SLOT_MINUTES: [u32; 2] = [30, 60];

/// Minutes in a civil day
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Weekdays a court accepts bookings on.
/// Bit 0 = Sunday .. bit 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u8")]
pub struct OpenDays(u8);

impl OpenDays {
    pub const NONE: OpenDays = OpenDays(0);
    pub const ALL: OpenDays = OpenDays(0b111_1111);
    pub const WEEKDAYS: OpenDays = OpenDays(0b011_1110);

    /// Builds a set from a raw mask, dropping anything above bit 6
    pub const fn from_bits(mask: u32) -> Self {
        Self((mask & 0b111_1111) as u8)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, day: Weekday) -> bool {
        (self.0 >> day.num_days_from_sunday()) & 1 == 1
    }

    /// Enabled weekdays, Sunday first
    pub fn weekdays(self) -> Vec<Weekday> {
        const ORDER: [Weekday; 7] = [
            Weekday::Sun,
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ];
        ORDER.into_iter().filter(|d| self.contains(*d)).collect()
    }
}

impl From<u32> for OpenDays {
    fn from(mask: u32) -> Self {
        OpenDays::from_bits(mask)
    }
}

impl From<OpenDays> for u8 {
    fn from(days: OpenDays) -> Self {
        days.0
    }
}

impl FromIterator<Weekday> for OpenDays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mask = iter
            .into_iter()
            .fold(0u32, |acc, d| acc | (1 << d.num_days_from_sunday()));
        OpenDays::from_bits(mask)
    }
}

/// Opening configuration of a single bookable court
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtSchedule {
    pub open_days: OpenDays,
    /// Minute of day the first slot starts at
    pub open_time: u32,
    /// Minute of day the court closes (may be 1440)
    pub close_time: u32,
    pub slot_minutes: u32,
    pub price: f64,
}

impl CourtSchedule {
    pub fn new(open_days: OpenDays, open_time: u32, close_time: u32, slot_minutes: u32, price: f64) -> Self {
        Self {
            open_days,
            open_time,
            close_time,
            slot_minutes,
            price,
        }
    }

    /// A schedule whose grid is empty on every day.
    /// Used when the source data could not be interpreted.
    pub fn closed(open_days: OpenDays, price: f64) -> Self {
        Self::new(open_days, 0, 0, 60, price)
    }

    pub fn has_supported_granularity(&self) -> bool {
        SUPPORTED_SLOT_MINUTES.contains(&self.slot_minutes)
    }

    /// Number of whole slots between opening and closing
    pub fn slot_count(&self) -> u32 {
        if self.close_time <= self.open_time || !self.has_supported_granularity() {
            return 0;
        }
        (self.close_time - self.open_time) / self.slot_minutes
    }
}

/// One bookable unit on a specific date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub index: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Occupied slots as reported by the booking backend.
///
/// Fields stay signed so bad backend values survive until the overlay drops them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRange {
    pub date: NaiveDate,
    pub slot_index_from: i64,
    pub slot_count: i64,
}

impl ReservationRange {
    pub fn new(date: NaiveDate, slot_index_from: i64, slot_count: i64) -> Self {
        Self {
            date,
            slot_index_from,
            slot_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Taken,
    Past,
    Inactive,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "available",
            SlotStatus::Taken => "taken",
            SlotStatus::Past => "past",
            SlotStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub slot: Slot,
    pub status: SlotStatus,
}

/// Per-date slot statuses. Past and closed days are absent keys.
pub type AvailabilityMap = BTreeMap<NaiveDate, Vec<SlotAvailability>>;
