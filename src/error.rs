//! Error types shared across the crate.
//!
//! Nothing in here is allowed to escape the availability computation itself:
//! `ScheduleError` is raised at the boundary (CSV loading, form validation),
//! `ReservationWarning` is collected and logged while a batch keeps going.

use chrono::NaiveDate;

/// Result type for schedule parsing and validation
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Errors raised when court schedule data cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// A time string did not look like `H:MM` / `HH:MM`.
    #[error("malformed time '{input}': expected H:MM or HH:MM")]
    MalformedTime { input: String },

    /// A date string did not look like `YYYY-MM-DD`.
    #[error("malformed date '{input}': expected YYYY-MM-DD")]
    MalformedDate { input: String },

    /// Slot granularity outside the supported set.
    #[error("unsupported slot length of {minutes} minutes (expected 30 or 60)")]
    UnsupportedSlotMinutes { minutes: u32 },
}

/// A reservation entry that was dropped from a batch.
///
/// These are diagnostics, never fatal: the rest of the batch is still applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReservationWarning {
    #[error("reservation on {date} has non-positive slot count {slot_count}")]
    NonPositiveCount { date: NaiveDate, slot_count: i64 },

    #[error("reservation on {date} starts at negative slot index {slot_index_from}")]
    NegativeIndex { date: NaiveDate, slot_index_from: i64 },

    #[error("reservation on {date} overflows the slot index range ({slot_index_from} + {slot_count})")]
    IndexOverflow {
        date: NaiveDate,
        slot_index_from: i64,
        slot_count: i64,
    },

    #[error("reservation {reservation_id} has malformed date '{input}'")]
    MalformedDate { reservation_id: u64, input: String },

    #[error("reservation {reservation_id} is missing slot fields")]
    MissingSlots { reservation_id: u64 },

    #[error("skipped unreadable reservation row: {reason}")]
    UnreadableRow { reason: String },
}

/// Errors from the court registration form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("court name is required")]
    MissingName,

    #[error("at least one opening day must be selected")]
    NoOpenDays,

    #[error("opening time {open} must be before closing time {close}")]
    InvertedHours { open: String, close: String },

    #[error("closing time {close} is past midnight")]
    CloseAfterMidnight { close: String },

    #[error("no {slot_minutes}-minute slot fits between {open} and {close}")]
    NoSlotFits {
        open: String,
        close: String,
        slot_minutes: u32,
    },

    #[error("price must be a non-negative whole number, got {price}")]
    InvalidPrice { price: f64 },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Errors while loading the application configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnv { name: String, value: String },

    #[error("unknown timezone '{name}': expected an IANA name such as Europe/Madrid")]
    UnknownTimezone { name: String },

    #[error("default range of {default_days} day(s) exceeds the maximum of {max_days}")]
    InvalidRange { default_days: u32, max_days: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_time_message_names_input() {
        let err = ScheduleError::MalformedTime {
            input: "8h".to_string(),
        };
        assert_eq!(err.to_string(), "malformed time '8h': expected H:MM or HH:MM");
    }

    #[test]
    fn form_error_wraps_schedule_error() {
        let err: FormError = ScheduleError::UnsupportedSlotMinutes { minutes: 45 }.into();
        assert!(err.to_string().contains("45 minutes"));
    }
}
