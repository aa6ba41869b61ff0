use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::constants::DEFAULT_WORKER_COUNT;
use crate::error::{Result, ScraperError};

/// Runtime configuration, read from an optional `config.toml` with
/// environment-variable overrides (`SPREADSHEET_ID`, `SHEETS_TOKEN`,
/// `WORKER_COUNT`).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default)]
    pub sheets_token: String,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
}

fn default_worker_count() -> usize {
    DEFAULT_WORKER_COUNT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheets_token: String::new(),
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = if Path::new("config.toml").exists() {
            let raw = std::fs::read_to_string("config.toml")?;
            toml::from_str(&raw)?
        } else {
            Config::default()
        };

        if let Ok(id) = std::env::var("SPREADSHEET_ID") {
            config.spreadsheet_id = id;
        }
        if let Ok(token) = std::env::var("SHEETS_TOKEN") {
            config.sheets_token = token;
        }
        if let Ok(count) = std::env::var("WORKER_COUNT") {
            config.worker_count = count
                .parse()
                .map_err(|_| ScraperError::Config(format!("invalid WORKER_COUNT: {count}")))?;
        }

        if config.spreadsheet_id.is_empty() {
            return Err(ScraperError::Config(
                "spreadsheet_id is not set (config.toml or SPREADSHEET_ID)".to_string(),
            ));
        }
        if config.sheets_token.is_empty() {
            return Err(ScraperError::Config(
                "sheets_token is not set (config.toml or SHEETS_TOKEN)".to_string(),
            ));
        }

        info!(worker_count = config.worker_count, "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_fills_defaults_for_missing_fields() {
        let config: Config = toml::from_str(r#"spreadsheet_id = "abc""#).unwrap();
        assert_eq!(config.spreadsheet_id, "abc");
        assert_eq!(config.worker_count, DEFAULT_WORKER_COUNT);
        assert!(config.sheets_token.is_empty());
    }

    #[test]
    fn toml_overrides_worker_count() {
        let config: Config = toml::from_str("worker_count = 8").unwrap();
        assert_eq!(config.worker_count, 8);
    }
}
