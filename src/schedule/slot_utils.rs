//! Civil day and minute arithmetic.
//!
//! All instants here are `NaiveDateTime` values already expressed in the
//! court's civil zone (see [`super::clock::CivilZone`]). Working on naive
//! wall-clock values means day stepping never shifts the time of day, DST
//! or not.

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{ScheduleError, ScheduleResult};
use super::types::OpenDays;

/// Truncates an instant to midnight of the same civil date
pub fn start_of_day(instant: NaiveDateTime) -> NaiveDateTime {
    instant.date().and_time(NaiveTime::MIN)
}

/// Formats the civil date of an instant as `YYYY-MM-DD`
pub fn iso_date(instant: NaiveDateTime) -> String {
    instant.format("%Y-%m-%d").to_string()
}

/// Moves an instant by whole calendar days, keeping its wall-clock time.
/// Returns `None` only when leaving chrono's representable range.
pub fn add_days(instant: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    instant.checked_add_signed(Duration::try_days(days)?)
}

/// Minutes elapsed since midnight, in `[0, 1440)`
pub fn minutes_of_day(instant: NaiveDateTime) -> u32 {
    instant.hour() * 60 + instant.minute()
}

/// Whether the weekday of `day` is enabled in the court's open-day mask
pub fn is_active_day<D: Datelike>(day: &D, open_days: OpenDays) -> bool {
    open_days.contains(day.weekday())
}

/// Parses `H:MM` or `HH:MM` into minutes since midnight.
///
/// The components are not range checked: `25:00` parses to 1500. Schedule
/// invariants are enforced (or tolerated) by the callers.
pub fn parse_hhmm(text: &str) -> ScheduleResult<u32> {
    let malformed = || ScheduleError::MalformedTime {
        input: text.to_string(),
    };

    let (hours, minutes) = text.trim().split_once(':').ok_or_else(malformed)?;
    if !(1..=2).contains(&hours.len()) || minutes.len() != 2 {
        return Err(malformed());
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let hours: u32 = hours.parse().map_err(|_| malformed())?;
    let minutes: u32 = minutes.parse().map_err(|_| malformed())?;
    Ok(hours * 60 + minutes)
}

/// Like [`parse_hhmm`] but also accepts a trailing `:SS`, as database
/// TIME columns are often rendered. Seconds must be numeric and are dropped.
pub fn parse_clock_time(text: &str) -> ScheduleResult<u32> {
    let trimmed = text.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();
    match parts.as_slice() {
        [_, _] => parse_hhmm(trimmed),
        [hours, minutes, seconds]
            if seconds.len() == 2 && seconds.bytes().all(|b| b.is_ascii_digit()) =>
        {
            parse_hhmm(&format!("{}:{}", hours, minutes)).map_err(|_| ScheduleError::MalformedTime {
                input: text.to_string(),
            })
        }
        _ => Err(ScheduleError::MalformedTime {
            input: text.to_string(),
        }),
    }
}

/// Formats minutes since midnight as `HH:MM`. 1440 renders as `24:00`.
pub fn minutes_to_hhmm(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parses a `YYYY-MM-DD` civil date
pub fn parse_iso_date(text: &str) -> ScheduleResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| ScheduleError::MalformedDate {
        input: text.to_string(),
    })
}

/// Civil instant at `minutes` past midnight of `date`.
/// Minutes beyond one day roll into the following date; `None` past chrono's last date.
pub fn at_minutes(date: NaiveDate, minutes: u32) -> Option<NaiveDateTime> {
    date.and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::minutes(i64::from(minutes)))
}

/// The date `days` calendar days after `date`, or `None` past chrono's last date
pub fn days_after(date: NaiveDate, days: u32) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(days)))
}
