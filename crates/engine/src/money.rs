use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine};

/// Decimal places of the common scale used when adding amounts of different
/// currencies. No ISO 4217 currency uses more.
pub const AGGREGATE_SCALE: u8 = 4;

/// Money amount represented as an integer number of **minor units** of its
/// currency.
///
/// Use this type for user-facing amounts to avoid floating-point drift.
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let amount = Money::parse("12.34", Currency::USD).unwrap();
/// assert_eq!(amount.amount_minor, 1234);
/// assert_eq!(amount.to_string(), "12.34 USD");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    pub amount_minor: i64,
    pub currency: Currency,
}

impl Money {
    #[must_use]
    pub const fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Parses a decimal string expressed in major units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - at most `currency.minor_units()` fractional digits
    /// - rejects empty/invalid strings and values that overflow `i64`
    pub fn parse(input: &str, currency: Currency) -> ResultEngine<Self> {
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {}", input.trim()));
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped.trim())
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped.trim())
        } else {
            (false, trimmed)
        };

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let major_str = parts.next().ok_or_else(invalid)?;
        let minor_str = parts.next().unwrap_or("");
        if parts.next().is_some() {
            return Err(invalid());
        }
        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !minor_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let digits = usize::from(currency.minor_units());
        if minor_str.len() > digits {
            return Err(EngineError::InvalidAmount(format!(
                "too many decimals for {currency}: at most {digits}"
            )));
        }

        let scale = 10i64.checked_pow(u32::from(currency.minor_units())).ok_or_else(overflow)?;
        let major: i64 = major_str.parse().map_err(|_| overflow())?;
        let minor: i64 = if minor_str.is_empty() {
            0
        } else {
            let padded = format!("{minor_str:0<digits$}");
            padded.parse().map_err(|_| invalid())?
        };

        let total = major
            .checked_mul(scale)
            .and_then(|v| v.checked_add(minor))
            .ok_or_else(overflow)?;
        let amount_minor = if negative {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(Self::new(amount_minor, currency))
    }

    /// The same value expressed in minor units of `to`.
    ///
    /// Fails with `InvalidAmount` when `to` has fewer decimals and the amount
    /// cannot be written with them exactly (`12.34 USD` has no `JPY` form).
    pub fn rescale(self, to: Currency) -> ResultEngine<Self> {
        let from_units = u32::from(self.currency.minor_units());
        let to_units = u32::from(to.minor_units());
        let amount_minor = if to_units >= from_units {
            10i64
                .checked_pow(to_units - from_units)
                .and_then(|factor| self.amount_minor.checked_mul(factor))
                .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?
        } else {
            let factor = 10i64.pow(from_units - to_units);
            if self.amount_minor % factor != 0 {
                return Err(EngineError::InvalidAmount(format!(
                    "{self} cannot be expressed in {to} without losing precision"
                )));
            }
            self.amount_minor / factor
        };
        Ok(Self::new(amount_minor, to))
    }

    /// Value as a count of `10^-AGGREGATE_SCALE` major units.
    ///
    /// `1.00 USD` and `100 JPY` become `10_000` and `1_000_000`: their sum is
    /// the nominal `101` at the aggregate scale.
    #[must_use]
    pub fn aggregate_units(self) -> i128 {
        let shift = AGGREGATE_SCALE.saturating_sub(self.currency.minor_units());
        i128::from(self.amount_minor) * 10i128.pow(u32::from(shift))
    }

    /// Value in major units, for collaborators that speak floating point.
    #[must_use]
    pub fn as_major(self) -> f64 {
        self.amount_minor as f64 / 10f64.powi(i32::from(self.currency.minor_units()))
    }
}

/// Formats a minor-unit amount as a plain decimal string (no currency code).
#[must_use]
pub fn format_minor(amount_minor: i64, minor_units: u8) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let abs = amount_minor.unsigned_abs();
    if minor_units == 0 {
        return format!("{sign}{abs}");
    }
    let scale = 10u64.pow(u32::from(minor_units));
    let width = usize::from(minor_units);
    format!("{sign}{}.{:0width$}", abs / scale, abs % scale)
}

/// Narrows an aggregate-scale total back to `i64`.
pub(crate) fn aggregate_total(total: i128) -> ResultEngine<i64> {
    i64::try_from(total)
        .map_err(|_| EngineError::InvalidAmount("total out of range".to_string()))
}

/// Converts an aggregate-scale total to minor units of `currency`, rounding
/// half away from zero.
pub(crate) fn aggregate_to_minor(total: i128, currency: Currency) -> ResultEngine<i64> {
    let shift = AGGREGATE_SCALE.saturating_sub(currency.minor_units());
    let factor = 10i128.pow(u32::from(shift));
    let half = factor / 2;
    let rounded = if factor == 1 {
        total
    } else if total >= 0 {
        (total + half) / factor
    } else {
        (total - half) / factor
    };
    aggregate_total(rounded)
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            format_minor(self.amount_minor, self.currency.minor_units()),
            self.currency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_minor_units() {
        assert_eq!(Money::new(0, Currency::USD).to_string(), "0.00 USD");
        assert_eq!(Money::new(1, Currency::USD).to_string(), "0.01 USD");
        assert_eq!(Money::new(125_000, Currency::USD).to_string(), "1250.00 USD");
        assert_eq!(Money::new(-1050, Currency::EUR).to_string(), "-10.50 EUR");
        let jpy = Currency::try_from("JPY").unwrap();
        assert_eq!(Money::new(500, jpy).to_string(), "500 JPY");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        let usd = Currency::USD;
        assert_eq!(Money::parse("10", usd).unwrap().amount_minor, 1000);
        assert_eq!(Money::parse("10.5", usd).unwrap().amount_minor, 1050);
        assert_eq!(Money::parse("10,50", usd).unwrap().amount_minor, 1050);
        assert_eq!(Money::parse("-0.01", usd).unwrap().amount_minor, -1);
        assert_eq!(Money::parse("+1.00", usd).unwrap().amount_minor, 100);
        assert_eq!(Money::parse("  2.30 ", usd).unwrap().amount_minor, 230);
    }

    #[test]
    fn parse_rejects_garbage_and_excess_decimals() {
        let usd = Currency::USD;
        assert!(Money::parse("12.345", usd).is_err());
        assert!(Money::parse("", usd).is_err());
        assert!(Money::parse("abc", usd).is_err());
        assert!(Money::parse("1.2.3", usd).is_err());
        assert!(Money::parse("NaN", usd).is_err());
        assert!(Money::parse("99999999999999999999", usd).is_err());
        let jpy = Currency::try_from("JPY").unwrap();
        assert!(Money::parse("10.5", jpy).is_err());
        assert_eq!(Money::parse("1050", jpy).unwrap().amount_minor, 1050);
    }

    #[test]
    fn rescale_keeps_the_value() {
        let jpy = Currency::try_from("JPY").unwrap();
        let kwd = Currency::try_from("KWD").unwrap();

        let yen = Money::new(5000, Currency::USD).rescale(jpy).unwrap();
        assert_eq!(yen, Money::new(50, jpy));
        assert_eq!(yen.rescale(Currency::USD).unwrap().amount_minor, 5000);
        assert_eq!(
            Money::new(1250, Currency::USD).rescale(kwd).unwrap().amount_minor,
            12_500
        );

        let err = Money::new(1234, Currency::USD).rescale(jpy).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert!(Money::new(i64::MAX, jpy).rescale(Currency::USD).is_err());
    }

    #[test]
    fn aggregate_units_share_one_scale() {
        let jpy = Currency::try_from("JPY").unwrap();
        let usd = Money::new(100, Currency::USD).aggregate_units();
        let yen = Money::new(100, jpy).aggregate_units();
        assert_eq!(usd, 10_000);
        assert_eq!(yen, 1_000_000);
        assert_eq!(aggregate_total(usd + yen).unwrap(), 1_010_000);
        assert!(aggregate_total(i128::from(i64::MAX) + 1).is_err());
    }

    #[test]
    fn aggregate_to_minor_rounds_half_away_from_zero() {
        let jpy = Currency::try_from("JPY").unwrap();
        assert_eq!(aggregate_to_minor(1_010_000, Currency::USD).unwrap(), 10_100);
        assert_eq!(aggregate_to_minor(12_345, Currency::USD).unwrap(), 123);
        assert_eq!(aggregate_to_minor(12_350, Currency::USD).unwrap(), 124);
        assert_eq!(aggregate_to_minor(-12_350, Currency::USD).unwrap(), -124);
        assert_eq!(aggregate_to_minor(15_000, jpy).unwrap(), 2);
    }

    #[test]
    fn as_major_scales_by_exponent() {
        assert!((Money::new(5000, Currency::USD).as_major() - 50.0).abs() < f64::EPSILON);
    }
}
