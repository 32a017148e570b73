//! Settings for `fintrack`.
//!
//! Read from an optional `settings.toml` (or the file passed with `--config`)
//! and then from `FINTRACK__*` environment variables, e.g.
//! `FINTRACK__APP__LEVEL=debug` or `FINTRACK__DATABASE__SQLITE=/tmp/ft.db`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("fintrack.db".to_string())
    }
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Rates {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            base_url: "https://api.exchangerate-api.com/v4/latest".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Optional category suggestion service. Without `url` only local matching
/// is used.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Suggest {
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Suggest {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub rates: Rates,
    pub suggest: Suggest,
}

impl Settings {
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_CONFIG_PATH)).required(false))
            .add_source(
                Environment::with_prefix("FINTRACK")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}
