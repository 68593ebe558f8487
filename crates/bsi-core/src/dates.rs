//! Spreadsheet date serial conversion

use crate::record::{DescriptionField, PersonRecord};
use chrono::{Days, NaiveDate};

/// Day zero of the 1900 date system as spreadsheets count it
/// (1899-12-30, which absorbs the fictitious 1900-02-29).
fn serial_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Convert a date serial to `DD/MM/YYYY`.
///
/// Returns `None` when the value is not purely numeric, is not above
/// `threshold`, or lands outside the calendar range. The fractional part
/// (time of day) is dropped.
pub fn convert_serial(value: &str, threshold: f64) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !is_plain_number(trimmed) {
        return None;
    }

    let serial: f64 = trimmed.replace(',', ".").parse().ok()?;
    if !serial.is_finite() || serial <= threshold {
        return None;
    }

    let date = serial_epoch()?.checked_add_days(Days::new(serial.floor() as u64))?;
    Some(date.format("%d/%m/%Y").to_string())
}

/// Digits with at most one decimal separator
fn is_plain_number(value: &str) -> bool {
    let mut separators = 0;
    for c in value.chars() {
        match c {
            '0'..='9' => {}
            '.' | ',' => separators += 1,
            _ => return false,
        }
    }
    separators <= 1 && value.chars().any(|c| c.is_ascii_digit())
}

/// Rewrite the seniority and arrival-date fields when they hold a serial
pub fn convert_record_dates(record: &mut PersonRecord, threshold: f64) {
    for field in [DescriptionField::Seniority, DescriptionField::ArrivalDate] {
        let slot = record.description.get_mut(field);
        if let Some(converted) = convert_serial(slot, threshold) {
            *slot = converted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NO_DATA;

    #[test]
    fn test_convert_known_serials() {
        assert_eq!(convert_serial("45000", 10_000.0).as_deref(), Some("15/03/2023"));
        assert_eq!(convert_serial("44927", 10_000.0).as_deref(), Some("01/01/2023"));
        assert_eq!(convert_serial("36526.75", 10_000.0).as_deref(), Some("01/01/2000"));
    }

    #[test]
    fn test_small_numbers_are_left_alone() {
        assert_eq!(convert_serial("4,7", 10_000.0), None);
        assert_eq!(convert_serial("12", 10_000.0), None);
        assert_eq!(convert_serial("10000", 10_000.0), None);
    }

    #[test]
    fn test_non_numeric_values_are_left_alone() {
        assert_eq!(convert_serial("19/03/2021", 10_000.0), None);
        assert_eq!(convert_serial("4,7 an(s)", 10_000.0), None);
        assert_eq!(convert_serial(NO_DATA, 10_000.0), None);
        assert_eq!(convert_serial("", 10_000.0), None);
        assert_eq!(convert_serial("1.2.3", 10_000.0), None);
    }

    #[test]
    fn test_convert_record_dates() {
        let mut record = PersonRecord::new(
            "A".into(),
            "a".into(),
            std::iter::empty::<&str>(),
            NO_DATA,
        );
        record.description.arrival_date = "45000".to_string();
        record.description.seniority = "3 ans".to_string();
        record.description.job_title = "45000".to_string();

        convert_record_dates(&mut record, 10_000.0);

        assert_eq!(record.description.arrival_date, "15/03/2023");
        assert_eq!(record.description.seniority, "3 ans");
        assert_eq!(record.description.job_title, "45000");
    }
}
