use std::fs::OpenOptions;
use std::path::Path;

use csv::WriterBuilder;

use crate::parser::Court;

/// Appends a court row to the courts CSV read by [`crate::parser::load_courts`].
///
/// The header row is written only when the file does not exist yet (or is empty).
pub fn export_court_to_csv(court: &Court, csv_path: &Path) -> Result<(), csv::Error> {
    let needs_header = std::fs::metadata(csv_path)
        .map(|m| m.len() == 0)
        .unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let mut wtr = WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    wtr.serialize(court)?;
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::load_courts;

    fn court(id: u32, name: &str) -> Court {
        Court {
            court_id: id,
            name: name.to_string(),
            open_days: 127,
            open_time: "08:00".to_string(),
            close_time: "22:00".to_string(),
            slot_minutes: Some(30),
            price: 1200.0,
        }
    }

    #[test]
    fn appended_courts_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courts.csv");

        export_court_to_csv(&court(1, "Central"), &path).unwrap();
        export_court_to_csv(&court(2, "Covered, north"), &path).unwrap();

        let courts = load_courts(&path).unwrap();
        assert_eq!(courts, vec![court(1, "Central"), court(2, "Covered, north")]);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("court_id").count(), 1);
    }
}
