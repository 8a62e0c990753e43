//! # court-slots
//!
//! Slot availability for padel court booking.
//!
//! Given a court's opening days, hours and slot length plus the reservations
//! reported by the booking backend, [`schedule::compute_availability`] works
//! out which slots of each day in a date range are available, taken or
//! already past. Closed days and days before today are left out.
//!
//! The rest of the crate is the plumbing around that computation:
//!
//! - [`parser`]: CSV loading of courts and reservations
//! - [`form`]: court registration validation and CSV export
//! - [`display`]: labels and text reports
//! - [`web`]: actix-web JSON API
//! - [`config`]: TOML + environment configuration

pub mod config;
pub mod display;
pub mod error;
pub mod form;
pub mod parser;
pub mod schedule;
pub mod web;
