//! Application configuration.
//!
//! Values come from an optional TOML file and can be overridden by
//! environment variables:
//!
//! - `COURT_SLOTS_CONFIG`: path of the TOML file (default: `court-slots.toml`)
//! - `PORT`: web server port (default: 8080)
//! - `COURTS_CSV`: courts file (default: `data/courts.csv`)
//! - `RESERVATIONS_CSV`: reservations file (default: `data/reservations.csv`)
//! - `COURT_TIMEZONE`: IANA zone of courts and reservations (default: `UTC`)
//! - `MAX_RANGE_DAYS`: longest availability range served (default: 62)

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::schedule::CivilZone;

pub const DEFAULT_CONFIG_PATH: &str = "court-slots.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub courts_csv: PathBuf,
    pub reservations_csv: PathBuf,
    /// IANA zone of the booking backend's civil time, e.g. `Europe/Madrid`
    pub timezone: String,
    /// Days shown when a request gives no end date
    pub default_range_days: u32,
    /// Upper bound on the number of days one availability request may span
    pub max_range_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            courts_csv: PathBuf::from("data/courts.csv"),
            reservations_csv: PathBuf::from("data/reservations.csv"),
            timezone: "UTC".to_string(),
            default_range_days: 7,
            max_range_days: 62,
        }
    }
}

impl AppConfig {
    /// Loads the config file (if present) and applies environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("COURT_SLOTS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies overrides from a variable lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = parse_env("PORT", &port)?;
        }
        if let Some(path) = lookup("COURTS_CSV") {
            self.courts_csv = PathBuf::from(path);
        }
        if let Some(path) = lookup("RESERVATIONS_CSV") {
            self.reservations_csv = PathBuf::from(path);
        }
        if let Some(name) = lookup("COURT_TIMEZONE") {
            self.timezone = name.trim().to_string();
        }
        if let Some(days) = lookup("MAX_RANGE_DAYS") {
            self.max_range_days = parse_env("MAX_RANGE_DAYS", &days)?;
        }
        // Validate eagerly so a bad zone or range fails at startup
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.zone()?;
        if self.default_range_days > self.max_range_days {
            return Err(ConfigError::InvalidRange {
                default_days: self.default_range_days,
                max_days: self.max_range_days,
            });
        }
        Ok(())
    }

    pub fn zone(&self) -> Result<CivilZone, ConfigError> {
        CivilZone::from_name(&self.timezone).ok_or_else(|| ConfigError::UnknownTimezone {
            name: self.timezone.clone(),
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}
