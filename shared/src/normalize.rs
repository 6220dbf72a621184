//! Date and identifier normalization for CSV fields.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

use crate::models::ORPHAN;
use crate::{Error, Result};

fn parenthetical_re() -> &'static Regex {
    static PARENTHETICAL_RE: OnceLock<Regex> = OnceLock::new();
    PARENTHETICAL_RE.get_or_init(|| Regex::new(r"\(([^)]*)\)").expect("valid parenthetical regex"))
}

fn digits_re() -> &'static Regex {
    static DIGITS_RE: OnceLock<Regex> = OnceLock::new();
    DIGITS_RE.get_or_init(|| Regex::new(r"\d+").expect("valid digits regex"))
}

/// Parse an external `MM/DD/YY` date, reading the year as `2000 + YY`.
///
/// Month and day may omit their leading zero (`9/5/24`). Anything that is not
/// three numeric fields naming a real calendar date is rejected.
pub fn parse_external_date(s: &str) -> Result<NaiveDate> {
    let malformed = || Error::MalformedInput(format!("invalid date '{}', expected MM/DD/YY", s));

    let fields: Vec<&str> = s.split('/').collect();
    let [month, day, year] = fields.as_slice() else {
        return Err(malformed());
    };

    let month = parse_field(month).ok_or_else(malformed)?;
    let day = parse_field(day).ok_or_else(malformed)?;
    let year = parse_field(year).ok_or_else(malformed)?;

    NaiveDate::from_ymd_opt(2000 + year as i32, month, day).ok_or_else(malformed)
}

fn parse_field(field: &str) -> Option<u32> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Format a date as the internal `M-D-YY` key: no zero padding, year modulo 100.
pub fn format_internal_date(date: &NaiveDate) -> String {
    format!("{}-{}-{}", date.month(), date.day(), date.year() % 100)
}

/// Return the text inside the first `( ... )` group of a caption, or the caption itself.
pub fn extract_identifier(caption: &str) -> &str {
    parenthetical_re()
        .captures(caption)
        .and_then(|caps| caps.get(1))
        .map_or(caption, |m| m.as_str())
}

/// Map a day-of-cycle field such as `US D4` to `US Day 4`.
///
/// Fields without any digit map to the [`ORPHAN`] sentinel. The `-` case
/// (no cycle day, use the block schedule) is handled by the caller.
pub fn extract_cycle_identifier(day_field: &str) -> String {
    match digits_re().find(day_field) {
        Some(digits) => format!("US Day {}", digits.as_str()),
        None => ORPHAN.to_string(),
    }
}

/// Drop every ` - US` marker from a label.
pub fn strip_us_suffix(label: &str) -> String {
    label.replace(" - US", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_round_trip() {
        for (input, expected) in [
            ("09/05/24", "9-5-24"),
            ("9/5/24", "9-5-24"),
            ("12/31/99", "12-31-99"),
            ("01/01/00", "1-1-0"),
            ("02/29/24", "2-29-24"),
        ] {
            let date = parse_external_date(input).unwrap();
            assert_eq!(format_internal_date(&date), expected, "input {}", input);
        }
    }

    #[test]
    fn test_year_is_two_thousand_based() {
        let date = parse_external_date("03/14/15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2015, 3, 14).unwrap());
    }

    #[test]
    fn test_rejects_malformed_dates() {
        for input in ["", "9/5", "9/5/24/1", "Sep/5/24", "13/01/24", "02/30/24", "9/5/2024", "+9/5/24", " 9/5/24"] {
            let err = parse_external_date(input).unwrap_err();
            assert!(matches!(err, Error::MalformedInput(_)), "input {:?}", input);
        }
    }

    #[test]
    fn test_extract_identifier() {
        assert_eq!(extract_identifier("US Day 2 (X Day - US)"), "X Day - US");
        assert_eq!(extract_identifier("US Day 2"), "US Day 2");
        assert_eq!(extract_identifier("Assembly (Late Start) (ignored)"), "Late Start");
    }

    #[test]
    fn test_extract_cycle_identifier() {
        assert_eq!(extract_cycle_identifier("US D4"), "US Day 4");
        assert_eq!(extract_cycle_identifier("Day 12"), "US Day 12");
        assert_eq!(extract_cycle_identifier("no digits here"), ORPHAN);
        assert_eq!(extract_cycle_identifier(""), ORPHAN);
    }

    #[test]
    fn test_strip_us_suffix() {
        assert_eq!(strip_us_suffix("Late Start - US"), "Late Start");
        assert_eq!(strip_us_suffix("US Day 3"), "US Day 3");
    }
}
