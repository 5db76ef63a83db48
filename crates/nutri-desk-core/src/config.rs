//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use nutri_desk_lookup::{LookupConfig, DEFAULT_BASE_URL};
use thiserror::Error;
use tracing::{info, warn};

pub const DB_PATH_VAR: &str = "NUTRI_DESK_DB_PATH";
pub const API_KEY_VAR: &str = "NUTRITION_API_KEY";
pub const API_URL_VAR: &str = "NUTRITION_API_URL";
pub const API_TIMEOUT_VAR: &str = "NUTRITION_API_TIMEOUT_SECS";

pub const DEFAULT_DB_PATH: &str = "nutri-desk.sqlite3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Environment variable {0} is not set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: PathBuf,
    /// Nutrition API key, `None` when lookups are unavailable
    pub api_key: Option<String>,
    pub api_url: String,
    pub api_timeout: Duration,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using `get` to read variables.
    pub fn from_lookup<F>(get: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = get(DB_PATH_VAR).unwrap_or_else(|| {
            info!("{DB_PATH_VAR} not set, using default: {DEFAULT_DB_PATH}");
            DEFAULT_DB_PATH.to_string()
        });

        let api_key = get(API_KEY_VAR).filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!("{API_KEY_VAR} not set, nutrition lookup disabled");
        }

        let api_url = get(API_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let api_timeout = match get(API_TIMEOUT_VAR) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    warn!("Invalid {API_TIMEOUT_VAR} value: {raw}");
                    ConfigError::Invalid {
                        key: API_TIMEOUT_VAR,
                        value: raw.clone(),
                    }
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            db_path: PathBuf::from(db_path),
            api_key,
            api_url,
            api_timeout,
        })
    }

    /// Settings for the nutrition lookup client.
    pub fn lookup_config(&self) -> ConfigResult<LookupConfig> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(ConfigError::Missing(API_KEY_VAR))?;

        Ok(LookupConfig {
            base_url: self.api_url.clone(),
            api_key,
            timeout: self.api_timeout,
        })
    }
}
