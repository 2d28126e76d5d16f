//! Store configuration.
//!
//! [`StoreConfig`] is plain serde data with defaults for every field, so it
//! can be built in code or loaded from a TOML snippet.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// What the strict-mode watcher does when state changes outside a commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationPolicy {
    /// Log a warning and record the violation. Never interrupts the caller.
    #[default]
    Report,
    /// Record the violation, then panic. Meant for debugging sessions.
    Panic,
}

/// Configuration for a [`Store`](crate::Store).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Watch the whole state tree and flag changes made outside a commit.
    pub strict: bool,
    /// How strict-mode violations are surfaced.
    pub violation_policy: ViolationPolicy,
    /// Emit a debug event for every commit and dispatch.
    pub log_commits: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            strict: false,
            violation_policy: ViolationPolicy::Report,
            log_commits: true,
        }
    }
}

impl StoreConfig {
    /// The default configuration with strict mode enabled.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML. Missing keys take their defaults.
    ///
    /// ```
    /// use canopy_store::{StoreConfig, ViolationPolicy};
    ///
    /// let config = StoreConfig::from_toml_str("strict = true\nviolation_policy = \"panic\"").unwrap();
    /// assert!(config.strict);
    /// assert_eq!(config.violation_policy, ViolationPolicy::Panic);
    /// assert!(config.log_commits);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_lenient() {
        let config = StoreConfig::default();
        assert!(!config.strict);
        assert_eq!(config.violation_policy, ViolationPolicy::Report);
        assert!(config.log_commits);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(StoreConfig::from_toml_str("").unwrap(), StoreConfig::default());
    }

    #[test]
    fn partial_toml() {
        let config = StoreConfig::from_toml_str("log_commits = false").unwrap();
        assert!(!config.log_commits);
        assert!(!config.strict);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = StoreConfig::from_toml_str("strict = \"yes\"").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn strict_constructor() {
        assert!(StoreConfig::strict().strict);
    }
}
