//! Currency conversion through an external exchange-rate collaborator.
//!
//! Conversion reads rates only and never touches stored data.

use std::{collections::HashMap, future::Future};

use serde::Serialize;
use thiserror::Error;

use crate::{Currency, EngineError, Money, ResultEngine};

/// Failure reported by a rate collaborator.
#[derive(Debug, Error)]
#[error("exchange rate lookup failed: {0}")]
pub struct RateError(pub String);

/// External service publishing exchange rates.
pub trait RateProvider: Send + Sync {
    /// Rates from one unit of `base` to every currency the service knows,
    /// keyed by three letter code.
    fn latest_rates(
        &self,
        base: Currency,
    ) -> impl Future<Output = Result<HashMap<String, f64>, RateError>> + Send;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Conversion {
    pub from: Money,
    pub to: Money,
    pub rate: f64,
}

/// Converts `amount` (major units, e.g. `"12.50"`) from one currency to another.
///
/// Fails with:
/// - `InvalidCurrency` if `from` is not an ISO 4217 code;
/// - `InvalidAmount` if the amount does not parse or is not positive;
/// - `UnsupportedCurrency` if the provider has no rate for `to`;
/// - `RateUnavailable` if the provider fails.
pub async fn convert<P: RateProvider>(
    provider: &P,
    from: &str,
    to: &str,
    amount: &str,
) -> ResultEngine<Conversion> {
    let from = Currency::try_from(from)?;
    let to_code = to.trim().to_ascii_uppercase();
    let original = Money::parse(amount, from)?;
    if original.amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(
            "amount must be greater than 0".to_string(),
        ));
    }

    let rates = provider.latest_rates(from).await.map_err(|err| {
        tracing::warn!("rate provider failed for {from}: {err}");
        EngineError::RateUnavailable(err.to_string())
    })?;

    let rate = rates
        .get(&to_code)
        .copied()
        .filter(|rate| rate.is_finite() && *rate > 0.0)
        .ok_or_else(|| EngineError::UnsupportedCurrency(to_code.clone()))?;
    let to = Currency::try_from(to_code.as_str())
        .map_err(|_| EngineError::UnsupportedCurrency(to_code.clone()))?;

    let converted_minor = convert_minor(original, to, rate)?;
    Ok(Conversion {
        from: original,
        to: Money::new(converted_minor, to),
        rate,
    })
}

fn convert_minor(amount: Money, to: Currency, rate: f64) -> ResultEngine<i64> {
    let scaled = amount.as_major() * rate * 10f64.powi(i32::from(to.minor_units()));
    let rounded = scaled.round();
    if !rounded.is_finite() || rounded >= i64::MAX as f64 {
        return Err(EngineError::InvalidAmount(
            "converted amount too large".to_string(),
        ));
    }
    Ok(rounded as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRates(HashMap<String, f64>);

    impl RateProvider for FixedRates {
        async fn latest_rates(&self, _base: Currency) -> Result<HashMap<String, f64>, RateError> {
            Ok(self.0.clone())
        }
    }

    struct Offline;

    impl RateProvider for Offline {
        async fn latest_rates(&self, _base: Currency) -> Result<HashMap<String, f64>, RateError> {
            Err(RateError("connection refused".to_string()))
        }
    }

    fn usd_rates() -> FixedRates {
        FixedRates(HashMap::from([
            ("EUR".to_string(), 0.9),
            ("JPY".to_string(), 150.0),
        ]))
    }

    #[tokio::test]
    async fn converts_between_minor_units() {
        let conversion = convert(&usd_rates(), "usd", "EUR", "10.00").await.unwrap();
        assert_eq!(conversion.from, Money::new(1000, Currency::USD));
        assert_eq!(conversion.to, Money::new(900, Currency::EUR));

        let conversion = convert(&usd_rates(), "USD", "JPY", "1.50").await.unwrap();
        assert_eq!(conversion.to.amount_minor, 225);
    }

    #[tokio::test]
    async fn unknown_target_is_unsupported() {
        let err = convert(&usd_rates(), "USD", "GBP", "1").await.unwrap_err();
        assert_eq!(err, EngineError::UnsupportedCurrency("GBP".to_string()));
    }

    #[tokio::test]
    async fn rejects_bad_input_before_calling_provider() {
        assert!(matches!(
            convert(&Offline, "XXQ", "EUR", "1").await,
            Err(EngineError::InvalidCurrency(_))
        ));
        assert!(matches!(
            convert(&Offline, "USD", "EUR", "0").await,
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn provider_failure_is_reported() {
        assert!(matches!(
            convert(&Offline, "USD", "EUR", "5").await,
            Err(EngineError::RateUnavailable(_))
        ));
    }
}
