use chrono::{Duration, NaiveDate};

/// Days between the 1900 spreadsheet epoch and 1970-01-01.
const UNIX_EPOCH_SERIAL: f64 = 25569.0;

/// Converts a 1900-epoch spreadsheet serial number to a calendar date,
/// truncating any time-of-day fraction. Returns `None` for non-finite
/// serials or dates outside chrono's range.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = (serial - UNIX_EPOCH_SERIAL).floor() as i64;
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(days))
}

/// ISO `YYYY-MM-DD` rendering of a serial date, as the store's date columns
/// expect.
pub fn serial_to_iso_date(serial: f64) -> Option<String> {
    serial_to_date(serial).map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_45000_is_2023_03_15() {
        assert_eq!(serial_to_iso_date(45000.0).as_deref(), Some("2023-03-15"));
    }

    #[test]
    fn test_serial_at_unix_epoch() {
        assert_eq!(serial_to_iso_date(25569.0).as_deref(), Some("1970-01-01"));
    }

    #[test]
    fn test_fractional_serial_truncates_time_of_day() {
        // 45000.99 is still the same calendar day as 45000.
        assert_eq!(serial_to_iso_date(45000.99).as_deref(), Some("2023-03-15"));
    }

    #[test]
    fn test_non_finite_serial_is_none() {
        assert_eq!(serial_to_date(f64::NAN), None);
        assert_eq!(serial_to_date(f64::INFINITY), None);
    }
}
