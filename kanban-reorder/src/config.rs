//! Configuration for the reorder engine and dispatcher, loaded with Figment.
//!
//! Sources in precedence order (later overrides earlier):
//! 1. Built-in defaults
//! 2. An optional config file (TOML, YAML or JSON, chosen by extension)
//! 3. `KANBAN_REORDER_` environment variables; nested keys use `__`
//!    (`KANBAN_REORDER_DISPATCH__MAX_ATTEMPTS=5`)

use crate::validate::{AssignmentPolicy, DEFAULT_MAX_ASSIGNEES};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "KANBAN_REORDER_";

/// Droppable id the drag library uses for the unassigned pool
pub const DEFAULT_POOL_DROPPABLE_ID: &str = "user-list";

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration parsing failed
    #[error("Failed to parse configuration: {source}")]
    ParseError { source: Box<figment::Error> },

    /// Invalid configuration value
    #[error("Invalid configuration value for key '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration file format not supported
    #[error("Unsupported configuration file format: {path}")]
    UnsupportedFormat { path: PathBuf },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

/// Remote dispatch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Attempts per remote call, including the first
    pub max_attempts: u32,
    /// Delay between attempts, multiplied by the attempt number
    pub retry_backoff_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff_ms: 100,
        }
    }
}

impl DispatchConfig {
    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(u64::from(attempt)))
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderConfig {
    /// Maximum users on a single task
    pub max_assignees: usize,
    /// Droppable id that denotes the unassigned pool
    pub pool_droppable_id: String,
    pub dispatch: DispatchConfig,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            max_assignees: DEFAULT_MAX_ASSIGNEES,
            pool_droppable_id: DEFAULT_POOL_DROPPABLE_ID.to_string(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl ReorderConfig {
    /// Load from defaults and environment only
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load from defaults, an optional file, then environment
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path)?.extract()?;
        config.validate()?;
        debug!(?config, "loaded reorder configuration");
        Ok(config)
    }

    /// Build the figment with all sources in precedence order
    pub fn figment(path: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => {
                    return Err(ConfigError::UnsupportedFormat {
                        path: path.to_path_buf(),
                    })
                }
            };
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_assignees == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_assignees".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.dispatch.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "dispatch.max_attempts".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.pool_droppable_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "pool_droppable_id".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Assignment policy derived from this configuration
    pub fn policy(&self) -> AssignmentPolicy {
        AssignmentPolicy {
            max_assignees: self.max_assignees,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReorderConfig::default();
        assert_eq!(config.max_assignees, 3);
        assert_eq!(config.pool_droppable_id, "user-list");
        assert_eq!(config.dispatch.max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backoff_scales_with_attempt() {
        let dispatch = DispatchConfig {
            max_attempts: 3,
            retry_backoff_ms: 50,
        };
        assert_eq!(dispatch.backoff(1), Duration::from_millis(50));
        assert_eq!(dispatch.backoff(3), Duration::from_millis(150));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = ReorderConfig {
            max_assignees: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "max_assignees"
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = ReorderConfig::figment(Some(Path::new("reorder.ini"))).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_policy() {
        let config = ReorderConfig {
            max_assignees: 5,
            ..Default::default()
        };
        assert_eq!(config.policy().max_assignees, 5);
    }
}
