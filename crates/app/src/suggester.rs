//! HTTP adapter for an external category suggestion service.
//!
//! The service receives `{"description": ..., "categories": [...]}` and
//! answers `{"category": "<name>"}` or `{"category": null}`.
use std::time::Duration;

use engine::{CategorySuggester, SuggestError};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Serialize)]
struct SuggestRequest<'a> {
    description: &'a str,
    categories: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpSuggester {
    url: String,
    http: reqwest::Client,
}

impl HttpSuggester {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.to_string(),
            http,
        })
    }
}

impl CategorySuggester for HttpSuggester {
    async fn suggest(
        &self,
        description: &str,
        categories: &[String],
    ) -> std::result::Result<Option<String>, SuggestError> {
        let res = self
            .http
            .post(&self.url)
            .json(&SuggestRequest {
                description,
                categories,
            })
            .send()
            .await
            .map_err(|err| SuggestError(err.to_string()))?;
        if !res.status().is_success() {
            return Err(SuggestError(format!("{} answered {}", self.url, res.status())));
        }

        let body = res
            .json::<SuggestResponse>()
            .await
            .map_err(|err| SuggestError(err.to_string()))?;
        Ok(body.category)
    }
}
