//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Collect database, logging and dispatcher settings in one place.
//! - Read overrides from `GEOREMIND_*` environment variables.
//!
//! # Invariants
//! - Invalid values are rejected, never silently replaced by defaults.

use crate::geofence::dispatcher::DispatcherConfig;
use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;
use std::path::PathBuf;

pub const DEFAULT_DB_FILE_NAME: &str = "georemind.sqlite3";

pub const ENV_DB_PATH: &str = "GEOREMIND_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "GEOREMIND_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "GEOREMIND_LOG_DIR";
pub const ENV_MAX_CONCURRENT_LOOKUPS: &str = "GEOREMIND_MAX_CONCURRENT_LOOKUPS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Empty(&'static str),
    InvalidNumber { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(key) => write!(f, "{key} cannot be empty"),
            Self::InvalidNumber { key, value } => {
                write!(f, "{key} must be a positive integer, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
    pub max_concurrent_lookups: Option<NonZeroUsize>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            max_concurrent_lookups: None,
        }
    }
}

impl CoreConfig {
    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DB_PATH) {
            config.db_path = PathBuf::from(non_empty(ENV_DB_PATH, &value)?);
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.log_level = non_empty(ENV_LOG_LEVEL, &value)?.to_string();
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(non_empty(ENV_LOG_DIR, &value)?));
        }
        if let Some(value) = lookup(ENV_MAX_CONCURRENT_LOOKUPS) {
            let trimmed = value.trim();
            let limit = trimmed
                .parse::<NonZeroUsize>()
                .map_err(|_| ConfigError::InvalidNumber {
                    key: ENV_MAX_CONCURRENT_LOOKUPS,
                    value: trimmed.to_string(),
                })?;
            config.max_concurrent_lookups = Some(limit);
        }

        Ok(config)
    }

    pub fn dispatcher(&self) -> DispatcherConfig {
        DispatcherConfig {
            max_concurrent_lookups: self.max_concurrent_lookups,
        }
    }
}

fn non_empty<'a>(key: &'static str, value: &'a str) -> Result<&'a str, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty(key));
    }
    Ok(trimmed)
}
