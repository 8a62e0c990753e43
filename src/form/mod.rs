pub mod submission;
pub mod export;

pub use submission::{validate_court_form, CourtForm};
pub use export::export_court_to_csv;
