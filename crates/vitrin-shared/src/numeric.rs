//! Locale-aware numeric helpers for currency and mileage fields.
//!
//! Display formatting groups digits with `.` (Turkish convention, e.g.
//! `1.250.000`). The wire format carries bare digits, so every numeric
//! field is stripped before it enters the submission payload. The pair is
//! idempotent: `format(strip(s))` is a fixed point for any valid input.

use crate::constants::THOUSANDS_SEPARATOR;

/// Remove thousand separators (`.`, `,` and spaces) from a numeric string.
///
/// Non-separator characters are preserved untouched, so invalid input is
/// still visible to validation afterwards.
pub fn strip_thousands(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '.' && *c != ',' && !c.is_whitespace())
        .collect()
}

/// Group a digit string in threes with the display separator.
///
/// Input is stripped first; anything that is not a pure digit string after
/// stripping is returned as-is rather than mangled.
pub fn format_thousands(s: &str) -> String {
    let digits = strip_thousands(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return digits;
    }

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            out.push(THOUSANDS_SEPARATOR);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_removes_separators() {
        assert_eq!(strip_thousands("1.250.000"), "1250000");
        assert_eq!(strip_thousands("1,250,000"), "1250000");
        assert_eq!(strip_thousands("1 250 000"), "1250000");
        assert_eq!(strip_thousands("42"), "42");
    }

    #[test]
    fn test_format_groups_in_threes() {
        assert_eq!(format_thousands("1234567"), "1.234.567");
        assert_eq!(format_thousands("1000"), "1.000");
        assert_eq!(format_thousands("999"), "999");
        assert_eq!(format_thousands(""), "");
    }

    #[test]
    fn test_format_strip_idempotence() {
        for s in ["1.250.000", "12345", "7", "100.000", "1,234"] {
            let once = format_thousands(&strip_thousands(s));
            let twice = format_thousands(&strip_thousands(&once));
            assert_eq!(once, twice);
            assert_eq!(strip_thousands(&once), strip_thousands(s));
        }
    }

    #[test]
    fn test_non_numeric_left_visible() {
        // Validation, not formatting, decides what to do with garbage.
        assert_eq!(format_thousands("12a4"), "12a4");
        assert_eq!(strip_thousands("12a4"), "12a4");
    }
}
