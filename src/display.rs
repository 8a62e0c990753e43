use std::fs::File;
use std::io::Write;

use crate::parser::{Court, ReservationRecord};
use crate::schedule::slot_utils::{minutes_of_day, minutes_to_hhmm};
use crate::schedule::{AvailabilityMap, CourtSchedule, OpenDays};

const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Lists enabled weekdays, e.g. `Mon, Tue, Wed`. An empty mask renders as `-`.
pub fn format_open_days(mask: u32) -> String {
    let days = OpenDays::from_bits(mask);
    let labels: Vec<&str> = (0..7)
        .filter(|i| (days.bits() >> i) & 1 == 1)
        .map(|i| WEEKDAY_LABELS[i])
        .collect();
    if labels.is_empty() {
        "-".to_string()
    } else {
        labels.join(", ")
    }
}

/// Formats the opening window of a court as `HH:MM - HH:MM`
pub fn format_hours(court: &Court) -> String {
    let open = if court.open_time.trim().is_empty() { "-" } else { court.open_time.trim() };
    let close = if court.close_time.trim().is_empty() { "-" } else { court.close_time.trim() };
    format!("{} - {}", open, close)
}

/// Time window covered by a reservation, e.g. `09:00 -> 11:00`.
/// Returns `-` when the reservation or schedule cannot be interpreted.
pub fn reservation_time_label(record: &ReservationRecord, schedule: &CourtSchedule) -> String {
    let (Some(from), Some(count)) = (record.slot_index_from, record.slot_count) else {
        return "-".to_string();
    };
    if from < 0 || count <= 0 || record.date.trim().is_empty() || schedule.slot_minutes == 0 {
        return "-".to_string();
    }

    let slot = i64::from(schedule.slot_minutes);
    let start = i64::from(schedule.open_time) + from * slot;
    let end = i64::from(schedule.open_time) + (from + count) * slot;
    match (u32::try_from(start), u32::try_from(end)) {
        (Ok(start), Ok(end)) => format!("{} -> {}", minutes_to_hhmm(start), minutes_to_hhmm(end)),
        _ => "-".to_string(),
    }
}

/// Amount charged for a reservation, `$ 0` when unknown
pub fn reservation_amount_label(record: &ReservationRecord) -> String {
    match record.price_applied {
        Some(amount) if amount.is_finite() => format!("$ {}", amount),
        _ => "$ 0".to_string(),
    }
}

/// Paid reservations are confirmed; unpaid ones count as cancelled
pub fn reservation_state_label(record: &ReservationRecord) -> &'static str {
    if record.paid {
        "CONFIRMED"
    } else {
        "CANCELLED"
    }
}

/// Renders an availability map as text, one line per slot
pub fn render_availability(court: &Court, availability: &AvailabilityMap) -> String {
    let mut out = String::new();
    out.push_str(&format!("** {} ({}) **\n", court.name, format_open_days(court.open_days)));

    if availability.is_empty() {
        out.push_str("  no bookable days in range\n");
        return out;
    }

    for (date, slots) in availability {
        out.push_str(&format!("{} ({})\n", date.format("%Y-%m-%d"), date.format("%a")));
        if slots.is_empty() {
            out.push_str("  [NO SLOTS]\n");
        }
        for entry in slots {
            // Measure the end from the start so a midnight close prints 24:00
            let start = minutes_of_day(entry.slot.start);
            let end = start + (entry.slot.end - entry.slot.start).num_minutes() as u32;
            out.push_str(&format!(
                "  {}-{} {}\n",
                minutes_to_hhmm(start),
                minutes_to_hhmm(end),
                entry.status.as_str()
            ));
        }
    }
    out
}

/// Prints a court's availability in a readable format
pub fn print_availability(court: &Court, availability: &AvailabilityMap) {
    print!("{}", render_availability(court, availability));
}

/// Writes a court's availability report to a file
pub fn write_availability_to_file(
    court: &Court,
    availability: &AvailabilityMap,
    filename: &str,
) -> std::io::Result<()> {
    let mut file = File::create(filename)?;
    file.write_all(render_availability(court, availability).as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{compute_availability, AvailabilityRequest, ReservationRange};
    use chrono::NaiveDate;

    fn court() -> Court {
        Court {
            court_id: 1,
            name: "Central".to_string(),
            open_days: 0b011_1110,
            open_time: "08:00".to_string(),
            close_time: "10:00".to_string(),
            slot_minutes: Some(60),
            price: 1500.0,
        }
    }

    fn record(from: Option<i64>, count: Option<i64>) -> ReservationRecord {
        ReservationRecord {
            reservation_id: 1,
            court_id: 1,
            date: "2025-06-02".to_string(),
            slot_index_from: from,
            slot_count: count,
            paid: true,
            price_applied: Some(3000.0),
        }
    }

    #[test]
    fn open_days_labels() {
        assert_eq!(format_open_days(0b011_1110), "Mon, Tue, Wed, Thu, Fri");
        assert_eq!(format_open_days(0b100_0001), "Sun, Sat");
        assert_eq!(format_open_days(0), "-");
    }

    #[test]
    fn hours_label_uses_placeholders() {
        assert_eq!(format_hours(&court()), "08:00 - 10:00");
        let mut blank = court();
        blank.close_time = String::new();
        assert_eq!(format_hours(&blank), "08:00 - -");
    }

    #[test]
    fn reservation_labels() {
        let schedule = court().schedule();
        assert_eq!(reservation_time_label(&record(Some(0), Some(2)), &schedule), "08:00 -> 10:00");
        assert_eq!(reservation_time_label(&record(None, Some(2)), &schedule), "-");
        assert_eq!(reservation_time_label(&record(Some(1), Some(0)), &schedule), "-");

        let mut unpaid = record(Some(0), Some(1));
        assert_eq!(reservation_amount_label(&unpaid), "$ 3000");
        assert_eq!(reservation_state_label(&unpaid), "CONFIRMED");
        unpaid.paid = false;
        unpaid.price_applied = None;
        assert_eq!(reservation_amount_label(&unpaid), "$ 0");
        assert_eq!(reservation_state_label(&unpaid), "CANCELLED");
    }

    #[test]
    fn renders_one_line_per_slot() {
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let schedule = court().schedule();
        let reservations = [ReservationRange::new(monday, 0, 1)];
        let availability = compute_availability(&AvailabilityRequest {
            range_start: monday,
            range_end_exclusive: monday.succ_opt().unwrap(),
            schedule: &schedule,
            reservations: &reservations,
            now: monday.and_hms_opt(9, 30, 0).unwrap(),
        });

        let text = render_availability(&court(), &availability);
        assert_eq!(
            text,
            "** Central (Mon, Tue, Wed, Thu, Fri) **\n2025-06-02 (Mon)\n  08:00-09:00 taken\n  09:00-10:00 past\n"
        );
    }

    #[test]
    fn writes_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        write_availability_to_file(&court(), &AvailabilityMap::new(), path.to_str().unwrap()).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("no bookable days"));
    }
}
