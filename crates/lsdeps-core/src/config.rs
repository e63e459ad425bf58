use crate::error::Error;
use crate::pkg::registry::{RegistryClient, DEFAULT_REGISTRY};
use serde::{Deserialize, Serialize};

/// Runtime configuration for the lsdeps CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Base URL of the npm registry.
    pub registry: String,

    /// Hide the per-package progress line.
    pub silent: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            json_logs: false,
            verbosity: 0,
            registry: DEFAULT_REGISTRY.to_string(),
            silent: false,
        }
    }
}

impl Config {
    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Set the registry base URL.
    #[must_use]
    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = registry.into();
        self
    }

    /// Hide progress output.
    #[must_use]
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Build a registry client for the configured registry.
    pub fn registry_client(&self) -> Result<RegistryClient, Error> {
        RegistryClient::new(&self.registry).map_err(Error::Registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_public_registry() {
        let config = Config::default();
        assert_eq!(config.registry, DEFAULT_REGISTRY);
        assert!(!config.silent);
        assert!(config.registry_client().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_verbosity(2)
            .with_json_logs(true)
            .with_registry("http://127.0.0.1:4873/")
            .with_silent(true);
        assert_eq!(config.verbosity, 2);
        assert!(config.json_logs);
        assert!(config.silent);
        assert_eq!(
            config.registry_client().unwrap().base_url().as_str(),
            "http://127.0.0.1:4873/"
        );
    }

    #[test]
    fn test_invalid_registry() {
        let err = Config::default()
            .with_registry("::nope::")
            .registry_client()
            .unwrap_err();
        assert!(matches!(err, Error::Registry(_)));
    }
}
