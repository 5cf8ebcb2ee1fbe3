//! Date plumbing for the `DD/MM/YYYY` format Educamos uses everywhere.

use chrono::{NaiveDate, Utc};
use chrono_tz::Europe::Madrid;

/// Parse an Educamos-style `DD/MM/YYYY` date.
pub fn parse_spanish_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%d/%m/%Y").ok()
}

/// Reformat `DD/MM/YYYY` to ISO `YYYY-MM-DD`, passing unparseable input
/// through unchanged so a drifted cell still surfaces something.
pub fn spanish_to_iso(text: &str) -> String {
    match parse_spanish_date(text) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => text.trim().to_string(),
    }
}

/// Today in the school's timezone. All Educamos deployments this serves run
/// on Spanish civil time, and "today" for due dates must agree with the
/// school's clock, not the server's.
pub fn today_madrid() -> NaiveDate {
    Utc::now().with_timezone(&Madrid).date_naive()
}

/// Today as `DD/MM/YYYY`, the format the grid endpoints expect.
pub fn today_spanish() -> String {
    today_madrid().format("%d/%m/%Y").to_string()
}

/// Today as ISO `YYYY-MM-DD`.
pub fn today_iso() -> String {
    today_madrid().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spanish_dates() {
        let date = parse_spanish_date("05/09/2025").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 9, 5).unwrap());
        assert!(parse_spanish_date("2025-09-05").is_none());
        assert!(parse_spanish_date("32/01/2025").is_none());
    }

    #[test]
    fn iso_conversion_passes_through_garbage() {
        assert_eq!(spanish_to_iso("05/09/2025"), "2025-09-05");
        assert_eq!(spanish_to_iso(" 24/12/2024 "), "2024-12-24");
        assert_eq!(spanish_to_iso("mañana"), "mañana");
    }
}
