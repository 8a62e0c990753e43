use serde::{Deserialize, Serialize};

use crate::error::{FormError, ScheduleError};
use crate::parser::Court;
use crate::schedule::slot_utils::parse_hhmm;
use crate::schedule::types::{MINUTES_PER_DAY, SUPPORTED_SLOT_MINUTES};
use crate::schedule::{CourtSchedule, OpenDays};

/// Court registration request from the club onboarding form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtForm {
    pub name: String,
    /// Weekday bitmask, bit 0 = Sunday
    pub open_days: u32,
    pub open_time: String,
    pub close_time: String,
    pub slot_minutes: u32,
    pub price: f64,
}

impl CourtForm {
    /// Builds the stored court row. Call after [`validate_court_form`].
    pub fn into_court(self, court_id: u32) -> Court {
        Court {
            court_id,
            name: self.name.trim().to_string(),
            open_days: u32::from(OpenDays::from_bits(self.open_days).bits()),
            open_time: self.open_time.trim().to_string(),
            close_time: self.close_time.trim().to_string(),
            slot_minutes: Some(self.slot_minutes),
            price: self.price,
        }
    }
}

/// Validates a court form and returns the schedule it describes.
///
/// This is the strict gate in front of the availability engine: anything it
/// accepts produces at least one slot on every open day.
pub fn validate_court_form(form: &CourtForm) -> Result<CourtSchedule, FormError> {
    if form.name.trim().is_empty() {
        return Err(FormError::MissingName);
    }

    let open_days = OpenDays::from_bits(form.open_days);
    if open_days.is_empty() {
        return Err(FormError::NoOpenDays);
    }

    let open = parse_hhmm(&form.open_time)?;
    let close = parse_hhmm(&form.close_time)?;
    if open >= close {
        return Err(FormError::InvertedHours {
            open: form.open_time.clone(),
            close: form.close_time.clone(),
        });
    }
    if close > MINUTES_PER_DAY {
        return Err(FormError::CloseAfterMidnight {
            close: form.close_time.clone(),
        });
    }

    if !SUPPORTED_SLOT_MINUTES.contains(&form.slot_minutes) {
        return Err(ScheduleError::UnsupportedSlotMinutes {
            minutes: form.slot_minutes,
        }
        .into());
    }
    if close - open < form.slot_minutes {
        return Err(FormError::NoSlotFits {
            open: form.open_time.clone(),
            close: form.close_time.clone(),
            slot_minutes: form.slot_minutes,
        });
    }

    // Prices are whole currency units
    if !form.price.is_finite() || form.price < 0.0 || form.price.fract() != 0.0 {
        return Err(FormError::InvalidPrice { price: form.price });
    }

    Ok(CourtSchedule::new(open_days, open, close, form.slot_minutes, form.price))
}
