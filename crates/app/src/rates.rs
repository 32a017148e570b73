//! HTTP client for the public exchange-rate service.
use std::{collections::HashMap, time::Duration};

use engine::{Currency, RateError, RateProvider};
use serde::Deserialize;

use crate::error::Result;

/// Response of `GET {base_url}/{CODE}`; fields other than `rates` are ignored.
#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: HashMap<String, f64>,
}

#[derive(Debug, Clone)]
pub struct ExchangeRateApi {
    base_url: String,
    http: reqwest::Client,
}

impl ExchangeRateApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self, base: Currency) -> String {
        format!("{}/{}", self.base_url, base.code())
    }
}

impl RateProvider for ExchangeRateApi {
    async fn latest_rates(&self, base: Currency) -> std::result::Result<HashMap<String, f64>, RateError> {
        let endpoint = self.endpoint(base);
        tracing::debug!(%endpoint, "fetching exchange rates");

        let res = self
            .http
            .get(&endpoint)
            .send()
            .await
            .map_err(|err| RateError(err.to_string()))?;
        if !res.status().is_success() {
            return Err(RateError(format!("{endpoint} answered {}", res.status())));
        }

        let body = res
            .json::<LatestRates>()
            .await
            .map_err(|err| RateError(err.to_string()))?;
        Ok(body.rates)
    }
}
