//! Date display helpers for the pt-BR locale.

use chrono::NaiveDate;

/// Formats a date as `DD/MM/YYYY` for user-facing display.
#[must_use]
pub fn format_br_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Parses a `DD/MM/YYYY` date as entered in forms.
///
/// # Errors
///
/// Returns a `chrono::ParseError` if the input is not a valid date in
/// that format.
pub fn parse_br_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(text, "%d/%m/%Y")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_br_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(format_br_date(date), "07/03/2026");
    }

    #[test]
    fn test_parse_br_date() {
        let parsed = parse_br_date("25/12/2025").unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2025, 12, 25).unwrap());
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(parse_br_date("31/02/2025").is_err());
        assert!(parse_br_date("2025-01-01").is_err());
    }
}
