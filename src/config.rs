//! # Configuration
//!
//! [`FetchConfig`] describes where resources live and which failure policy a
//! batch uses by default. It can be deserialized (e.g. from a JSON file) or
//! read from the environment:
//!
//! | Variable                    | Default              |
//! |-----------------------------|----------------------|
//! | `BATCH_FETCH_BASE_URL`      | *(required)*         |
//! | `BATCH_FETCH_RESOURCE_PATH` | `/api/users/{key}`   |
//! | `BATCH_FETCH_POLICY`        | `collect-all`        |

use crate::coordinator::FailurePolicy;
use crate::error::ConfigError;
use crate::transport::http::KEY_PLACEHOLDER;
use serde::{Deserialize, Serialize};

pub const ENV_BASE_URL: &str = "BATCH_FETCH_BASE_URL";
pub const ENV_RESOURCE_PATH: &str = "BATCH_FETCH_RESOURCE_PATH";
pub const ENV_POLICY: &str = "BATCH_FETCH_POLICY";

pub const DEFAULT_RESOURCE_PATH: &str = "/api/users/{key}";

/// Settings for [`HttpTransport`](crate::transport::HttpTransport) and the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Scheme, host and optional port, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Path appended to `base_url`; must contain `{key}`.
    pub resource_path: String,
    /// Policy used by [`BatchFetchCoordinator::fetch_batch`](crate::coordinator::BatchFetchCoordinator::fetch_batch).
    pub policy: FailurePolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            resource_path: DEFAULT_RESOURCE_PATH.to_string(),
            policy: FailurePolicy::default(),
        }
    }
}

impl FetchConfig {
    /// Load from `BATCH_FETCH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup. Used by [`FetchConfig::from_env`]
    /// and by tests, which should not mutate the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(ENV_BASE_URL).ok_or(ConfigError::Missing(ENV_BASE_URL))?;
        let resource_path =
            lookup(ENV_RESOURCE_PATH).unwrap_or_else(|| DEFAULT_RESOURCE_PATH.to_string());
        let policy = match lookup(ENV_POLICY) {
            Some(raw) => raw.parse()?,
            None => FailurePolicy::default(),
        };

        let config = Self {
            base_url,
            resource_path,
            policy,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Missing("base_url"));
        }
        if !self.resource_path.contains(KEY_PLACEHOLDER) {
            return Err(ConfigError::Invalid {
                field: "resource_path",
                reason: format!("'{}' has no {} placeholder", self.resource_path, KEY_PLACEHOLDER),
            });
        }
        Ok(())
    }
}
