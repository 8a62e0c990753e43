use std::io;
use std::path::Path;

use csv::{Reader, ReaderBuilder};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ReservationWarning;
use crate::schedule::slot_utils::{parse_clock_time, parse_iso_date};
use crate::schedule::{CourtSchedule, OpenDays, ReservationRange};

/// Slot length assumed when a court row leaves it blank
pub const DEFAULT_SLOT_MINUTES: u32 = 60;

/// A court row as stored in the courts CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub court_id: u32,
    pub name: String,
    /// Weekday bitmask, bit 0 = Sunday
    pub open_days: u32,
    pub open_time: String,
    pub close_time: String,
    pub slot_minutes: Option<u32>,
    pub price: f64,
}

impl Court {
    /// Converts the row into a schedule for the availability engine.
    ///
    /// Unparsable opening hours degrade to a closed schedule instead of an
    /// error, so one broken court never takes down a whole view.
    pub fn schedule(&self) -> CourtSchedule {
        let open_days = OpenDays::from_bits(self.open_days);
        let slot_minutes = self.slot_minutes.unwrap_or(DEFAULT_SLOT_MINUTES);

        match (parse_clock_time(&self.open_time), parse_clock_time(&self.close_time)) {
            (Ok(open), Ok(close)) => CourtSchedule::new(open_days, open, close, slot_minutes, self.price),
            (Err(e), _) | (_, Err(e)) => {
                warn!("court {} ({}) has unusable hours: {}", self.court_id, self.name, e);
                CourtSchedule::closed(open_days, self.price)
            }
        }
    }
}

/// A reservation row as reported by the booking backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub reservation_id: u64,
    pub court_id: u32,
    /// `YYYY-MM-DD`
    pub date: String,
    pub slot_index_from: Option<i64>,
    pub slot_count: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub paid: bool,
    #[serde(default)]
    pub price_applied: Option<f64>,
}

impl ReservationRecord {
    /// Converts the row into an occupied slot range.
    /// Count and index bounds are checked later by the overlay.
    pub fn to_range(&self) -> Result<ReservationRange, ReservationWarning> {
        let date = parse_iso_date(&self.date).map_err(|_| ReservationWarning::MalformedDate {
            reservation_id: self.reservation_id,
            input: self.date.clone(),
        })?;
        match (self.slot_index_from, self.slot_count) {
            (Some(from), Some(count)) => Ok(ReservationRange::new(date, from, count)),
            _ => Err(ReservationWarning::MissingSlots {
                reservation_id: self.reservation_id,
            }),
        }
    }
}

/// Parses a boolean value from various string representations
fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "yes" || lower == "true" || lower == "1"
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(parse_bool).unwrap_or(false))
}

/// Loads courts from a CSV file. Rows that cannot be read are skipped.
pub fn load_courts<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Court>, csv::Error> {
    let reader = Reader::from_path(csv_path)?;
    read_rows(reader, "court")
}

/// Loads reservations from a CSV file. Rows that cannot be read are skipped.
pub fn load_reservations<P: AsRef<Path>>(csv_path: P) -> Result<Vec<ReservationRecord>, csv::Error> {
    let reader = Reader::from_path(csv_path)?;
    read_rows(reader, "reservation")
}

/// Reads reservations from any CSV source, e.g. an uploaded body
pub fn read_reservations<R: io::Read>(source: R) -> Result<Vec<ReservationRecord>, csv::Error> {
    let reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(source);
    read_rows(reader, "reservation")
}

fn read_rows<T, R>(mut reader: Reader<R>, kind: &str) -> Result<Vec<T>, csv::Error>
where
    T: for<'de> Deserialize<'de>,
    R: io::Read,
{
    // Fail early on a missing or unreadable header row
    reader.headers()?;

    let mut rows = Vec::new();
    for (line, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                let warning = ReservationWarning::UnreadableRow {
                    reason: format!("{} row {}: {}", kind, line + 2, e),
                };
                warn!("{}", warning);
            }
        }
    }
    Ok(rows)
}

/// Reservation ranges for one court, dropping rows that cannot be converted
pub fn reservations_for_court(records: &[ReservationRecord], court_id: u32) -> Vec<ReservationRange> {
    records
        .iter()
        .filter(|r| r.court_id == court_id)
        .filter_map(|r| match r.to_range() {
            Ok(range) => Some(range),
            Err(warning) => {
                warn!("dropping reservation: {}", warning);
                None
            }
        })
        .collect()
}
