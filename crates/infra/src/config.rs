//! Service configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_MAX_BATCH_SIZE: &str = "EVENTSHARE_MAX_BATCH_SIZE";
pub const ENV_HISTORY_PAGE_SIZE: &str = "EVENTSHARE_HISTORY_PAGE_SIZE";
pub const ENV_MAX_HISTORY_PAGE_SIZE: &str = "EVENTSHARE_MAX_HISTORY_PAGE_SIZE";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Tunables for the event, history and sharing services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Largest accepted `batch_create` request.
    pub max_batch_size: usize,
    /// History page size when the caller does not ask for one.
    pub history_page_size: u32,
    /// Upper bound on any requested history page size.
    pub max_history_page_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 100,
            history_page_size: 50,
            max_history_page_size: 1000,
        }
    }
}

impl ServiceConfig {
    /// Load from `EVENTSHARE_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup (environment, test map, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            max_batch_size: parse(&lookup, ENV_MAX_BATCH_SIZE)?.unwrap_or(defaults.max_batch_size),
            history_page_size: parse(&lookup, ENV_HISTORY_PAGE_SIZE)?
                .unwrap_or(defaults.history_page_size),
            max_history_page_size: parse(&lookup, ENV_MAX_HISTORY_PAGE_SIZE)?
                .unwrap_or(defaults.max_history_page_size),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch_size == 0 {
            return Err(invalid(ENV_MAX_BATCH_SIZE, "0", "must be at least 1"));
        }
        if self.history_page_size == 0 {
            return Err(invalid(ENV_HISTORY_PAGE_SIZE, "0", "must be at least 1"));
        }
        if self.history_page_size > self.max_history_page_size {
            return Err(invalid(
                ENV_HISTORY_PAGE_SIZE,
                &self.history_page_size.to_string(),
                "must not exceed the maximum history page size",
            ));
        }
        Ok(())
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| invalid(key, &raw, &e.to_string())),
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (ENV_MAX_BATCH_SIZE, "10"),
            (ENV_HISTORY_PAGE_SIZE, " 20 "),
        ]))
        .unwrap();
        assert_eq!(config.max_batch_size, 10);
        assert_eq!(config.history_page_size, 20);
        assert_eq!(config.max_history_page_size, 1000);
    }

    #[test]
    fn rejects_garbage_and_zero() {
        let err = ServiceConfig::from_lookup(lookup(&[(ENV_MAX_BATCH_SIZE, "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == ENV_MAX_BATCH_SIZE));

        assert!(ServiceConfig::from_lookup(lookup(&[(ENV_MAX_BATCH_SIZE, "0")])).is_err());
        assert!(
            ServiceConfig::from_lookup(lookup(&[
                (ENV_HISTORY_PAGE_SIZE, "500"),
                (ENV_MAX_HISTORY_PAGE_SIZE, "100"),
            ]))
            .is_err()
        );
    }

    #[test]
    fn deserializes_partial_documents() {
        let config: ServiceConfig =
            serde_json::from_value(serde_json::json!({ "max_batch_size": 5 })).unwrap();
        assert_eq!(config.max_batch_size, 5);
        assert_eq!(config.history_page_size, 50);
    }
}
