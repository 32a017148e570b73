//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so create and update paths enforce the same invariants.

use chrono::NaiveDate;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

pub(crate) const CATEGORY_NAME_MAX: usize = 50;
pub(crate) const DESCRIPTION_MAX: usize = 200;
pub(crate) const PERSON_NAME_MAX: usize = 50;
pub(crate) const PASSWORD_MIN: usize = 8;
/// Largest accepted amount, in minor units of any currency.
pub(crate) const AMOUNT_MAX_MINOR: i64 = 1_000_000_000_000;

/// Trim surrounding whitespace, enforcing a length range in chars.
///
/// Inner whitespace is kept as typed.
pub(crate) fn normalize_text(value: &str, label: &str, max: usize) -> ResultEngine<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(EngineError::InvalidName(format!("{label} must not be empty")));
    }
    if len > max {
        return Err(EngineError::InvalidName(format!(
            "{label} must be at most {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Comparison key for names: accents stripped, lowercase, punctuation
/// collapsed to single spaces.
pub(crate) fn normalize_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    out.trim_end().to_string()
}

/// Uniqueness key of a category name: the trimmed name, lowercased.
pub(crate) fn category_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trimmed display name and its uniqueness key.
pub(crate) fn normalize_category_name(value: &str) -> ResultEngine<(String, String)> {
    let display = normalize_text(value, "category name", CATEGORY_NAME_MAX)?;
    let key = category_key(&display);
    Ok((display, key))
}

pub(crate) fn normalize_description(value: &str) -> ResultEngine<String> {
    normalize_text(value, "description", DESCRIPTION_MAX)
}

/// `#RRGGBB`, stored uppercase.
pub(crate) fn normalize_color(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    let valid = trimmed.len() == 7
        && trimmed.starts_with('#')
        && trimmed[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(EngineError::InvalidColor(format!(
            "expected #RRGGBB, got '{trimmed}'"
        )));
    }
    Ok(trimmed.to_ascii_uppercase())
}

pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    let invalid = || EngineError::InvalidEmail(format!("'{email}' is not a valid email"));
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }
    Ok(email)
}

pub(crate) fn validate_password(value: &str) -> ResultEngine<()> {
    if value.chars().count() < PASSWORD_MIN {
        return Err(EngineError::InvalidPassword(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }
    Ok(())
}

pub(crate) fn validate_positive_amount(amount_minor: i64) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(
            "amount must be greater than 0".to_string(),
        ));
    }
    if amount_minor > AMOUNT_MAX_MINOR {
        return Err(EngineError::InvalidAmount(format!(
            "amount must be at most {AMOUNT_MAX_MINOR} minor units"
        )));
    }
    Ok(())
}

/// First day of `(year, month)` and first day of the following month.
pub(crate) fn month_bounds(year: i32, month: u32) -> ResultEngine<(NaiveDate, NaiveDate)> {
    let invalid = || EngineError::InvalidPeriod(format!("invalid month {year}-{month:02}"));
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(invalid)?;
    Ok((start, end))
}

/// Parses an ISO 8601 calendar date (`YYYY-MM-DD`).
pub fn parse_date(value: &str) -> ResultEngine<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidDate(format!("'{trimmed}' is not a YYYY-MM-DD date")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ignores_case_accents_and_punctuation() {
        assert_eq!(normalize_key("Food & Dining"), "food dining");
        assert_eq!(normalize_key("  Caffè  "), "caffe");
        assert_eq!(normalize_key("BILLS/utilities"), "bills utilities");
    }

    #[test]
    fn category_name_limits() {
        assert!(normalize_category_name("").is_err());
        assert!(normalize_category_name("   ").is_err());
        assert!(normalize_category_name(&"x".repeat(51)).is_err());
        let (display, key) = normalize_category_name("  Coffee  Shop ").unwrap();
        assert_eq!(display, "Coffee  Shop");
        assert_eq!(key, "coffee  shop");
        assert_ne!(category_key("Food Dining"), category_key("Food & Dining"));
        assert_eq!(category_key("FOOD & dining"), category_key("Food & Dining"));
    }

    #[test]
    fn amounts_are_positive_and_capped() {
        assert!(validate_positive_amount(1).is_ok());
        assert!(validate_positive_amount(AMOUNT_MAX_MINOR).is_ok());
        assert!(validate_positive_amount(0).is_err());
        assert!(validate_positive_amount(AMOUNT_MAX_MINOR + 1).is_err());
        assert!(validate_positive_amount(i64::MAX).is_err());
    }

    #[test]
    fn colors_must_be_hex_rgb() {
        assert_eq!(normalize_color("#ef4444").unwrap(), "#EF4444");
        assert!(normalize_color("ef4444").is_err());
        assert!(normalize_color("#12345G").is_err());
        assert!(normalize_color("#1234").is_err());
    }

    #[test]
    fn emails_are_lowercased_and_checked() {
        assert_eq!(normalize_email(" Ann@Example.COM ").unwrap(), "ann@example.com");
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("ann@localhost").is_err());
        assert!(normalize_email("a@b@c.com").is_err());
    }

    #[test]
    fn description_length_is_bounded() {
        assert!(normalize_description("   ").is_err());
        assert!(normalize_description(&"d".repeat(200)).is_ok());
        assert!(normalize_description(&"d".repeat(201)).is_err());
    }

    #[test]
    fn month_bounds_wrap_december() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(month_bounds(2024, 13).is_err());
        assert!(month_bounds(2024, 0).is_err());
    }

    #[test]
    fn dates_parse_strictly() {
        assert_eq!(
            parse_date("2024-03-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("05/03/2024").is_err());
    }
}
