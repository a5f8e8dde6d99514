//! Framework configuration.

use crate::command::domain::ScopeId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default bound on outbound response calls, in milliseconds.
const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 10_000;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid configuration JSON.
    #[error("invalid framework configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A zero timeout would fail every response call.
    #[error("response timeout must be greater than zero")]
    ZeroTimeout,
}

/// Tunables of a [`crate::command::services::CommandFramework`].
///
/// # Examples
///
/// ```
/// use dawn::config::FrameworkConfig;
///
/// let config = FrameworkConfig::from_json(r#"{"default_scopes": ["42"], "prune_remote": false}"#)
///     .expect("valid configuration");
/// assert!(!config.prune_remote);
/// assert_eq!(config.response_timeout_ms, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Scopes applied to commands that neither choose a scope nor inherit one
    /// from their module. Empty means global.
    pub default_scopes: Vec<ScopeId>,
    /// Whether synchronization deletes remote commands absent locally.
    pub prune_remote: bool,
    /// Bound on every outbound response call, in milliseconds.
    pub response_timeout_ms: u64,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            default_scopes: Vec::new(),
            prune_remote: true,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
        }
    }
}

impl FrameworkConfig {
    /// Parses configuration from JSON; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the JSON is malformed or the timeout is
    /// zero.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        if config.response_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(config)
    }

    /// Sets the default scopes.
    #[must_use]
    pub fn with_default_scopes(mut self, scopes: impl IntoIterator<Item = ScopeId>) -> Self {
        self.default_scopes = scopes.into_iter().collect();
        self
    }

    /// Enables or disables deletion of remote-only commands.
    #[must_use]
    pub const fn with_prune_remote(mut self, prune_remote: bool) -> Self {
        self.prune_remote = prune_remote;
        self
    }

    /// Sets the bound on outbound response calls, at millisecond precision.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] when the bound is under one
    /// millisecond.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        if millis == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.response_timeout_ms = millis;
        Ok(self)
    }

    /// Returns the bound on outbound response calls.
    #[must_use]
    pub const fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}
