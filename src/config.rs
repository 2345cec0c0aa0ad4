//! Engine configuration
//!
//! Every field has a default, so `{}` is a complete configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::index::BackendPreference;
use crate::observability::{log_event_with_fields, Event, LogLevel};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings of an indexed collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Numeric comparison backend
    #[serde(default)]
    pub backend: BackendPreference,

    /// Order rows by the first timestamp field present
    #[serde(default = "default_sort_by_timestamp")]
    pub sort_by_timestamp: bool,

    /// Deepest query tree accepted
    #[serde(default = "default_max_query_depth")]
    pub max_query_depth: usize,

    /// Minimum level of structured log lines
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_sort_by_timestamp() -> bool {
    true
}

fn default_max_query_depth() -> usize {
    64
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendPreference::default(),
            sort_by_timestamp: default_sort_by_timestamp(),
            max_query_depth: default_max_query_depth(),
            log_level: LogLevel::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a JSON configuration document
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;

        log_event_with_fields(Event::ConfigLoaded, &[("path", path.display().to_string().as_str())]);
        Ok(config)
    }

    pub fn with_backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_timestamp_ordering(mut self, enabled: bool) -> Self {
        self.sort_by_timestamp = enabled;
        self
    }

    pub fn with_max_query_depth(mut self, depth: usize) -> Self {
        self.max_query_depth = depth;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.max_query_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max_query_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
