//! Configuration System
//!
//! Layered configuration for the provider, HTTP client and logging. Sources,
//! lowest precedence first: built-in defaults, the global config file, the
//! workspace `config/config.toml` and `config/{BLOODLINK_ENV}.toml`, then
//! `BLOODLINK__SECTION__KEY` environment variables.

use crate::error::{ApiError, BackendError};
use crate::logging::LoggingConfig;
use crate::provider::{CompletionOptions, GenerationBackend, HttpTimeouts, ProviderFactory};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use crate::provider::{ProviderConfig, ProviderType};

mod loader;
mod merge;
mod sources;

pub use loader::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::workspace_file::environment_name;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BloodlinkConfig {
    /// Generation backend; flows cannot be invoked without one
    #[serde(default)]
    pub provider: Option<ProviderConfig>,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Provider HTTP client settings. A value of 0 disables that timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeouts(&self) -> HttpTimeouts {
        let secs = |value: u64| (value > 0).then(|| Duration::from_secs(value));
        HttpTimeouts {
            connect: secs(self.connect_timeout_secs),
            request: secs(self.request_timeout_secs),
        }
    }
}

/// Configuration validation problems
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssue {
    Provider(String),
    Logging(String),
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigIssue::Provider(msg) => write!(f, "Provider: {}", msg),
            ConfigIssue::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ConfigIssue {}

impl BloodlinkConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ConfigIssue>> {
        let mut issues = Vec::new();

        if let Some(provider) = &self.provider {
            if let Err(e) = provider.validate() {
                issues.push(ConfigIssue::Provider(e));
            }
        }

        if let Err(e) = self.logging.validate() {
            issues.push(ConfigIssue::Logging(e));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// Validate and fold all problems into one `ApiError`.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|issues| {
            let messages: Vec<String> = issues.iter().map(|issue| issue.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })
    }

    /// Sampling options for flow adapters; provider defaults when configured.
    pub fn completion_options(&self) -> CompletionOptions {
        self.provider
            .as_ref()
            .map(|provider| provider.default_options.clone())
            .unwrap_or_default()
    }

    /// Build the configured generation backend.
    pub fn create_backend(&self) -> Result<Box<dyn GenerationBackend>, ApiError> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            BackendError::NotConfigured(
                "No provider configured; add a [provider] section or BLOODLINK__PROVIDER__* variables"
                    .to_string(),
            )
        })?;
        let model_provider = provider.to_model_provider()?;
        Ok(ProviderFactory::create_client(
            &model_provider,
            self.http.timeouts(),
        )?)
    }
}
