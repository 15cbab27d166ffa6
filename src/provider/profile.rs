//! Provider configuration as read from config files.

use super::{CompletionOptions, ModelProvider};
use crate::error::BackendError;
use reqwest::Url;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    Gemini,
    Ollama,
    #[serde(rename = "local")]
    LocalCustom,
}

impl ProviderType {
    pub fn slug(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::Gemini => "gemini",
            ProviderType::Ollama => "ollama",
            ProviderType::LocalCustom => "local",
        }
    }

    /// Environment variables consulted, in order, when no key is configured.
    pub fn api_key_env_vars(&self) -> &'static [&'static str] {
        match self {
            ProviderType::OpenAI => &["OPENAI_API_KEY"],
            ProviderType::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            ProviderType::Ollama | ProviderType::LocalCustom => &[],
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderType::OpenAI | ProviderType::Gemini)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider_type: ProviderType,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override; required for `local`
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub default_options: CompletionOptions,
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if self.provider_type == ProviderType::LocalCustom && self.endpoint.is_none() {
            return Err("Local providers require an endpoint".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            Url::parse(endpoint).map_err(|e| format!("Invalid endpoint URL '{}': {}", endpoint, e))?;
        }
        if let Some(temperature) = self.default_options.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(format!(
                    "Temperature must be between 0.0 and 2.0, got {}",
                    temperature
                ));
            }
        }
        Ok(())
    }

    /// Configured key first, then the provider's environment variables.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|key| !key.is_empty()) {
            return Some(key.clone());
        }
        self.provider_type
            .api_key_env_vars()
            .iter()
            .find_map(|name| lookup(name).filter(|key| !key.is_empty()))
    }

    pub fn to_model_provider(&self) -> Result<ModelProvider, BackendError> {
        self.to_model_provider_with_key(self.resolve_api_key())
    }

    fn to_model_provider_with_key(&self, api_key: Option<String>) -> Result<ModelProvider, BackendError> {
        let missing_key = || {
            BackendError::NotConfigured(format!(
                "No API key for {} (set provider.api_key or {})",
                self.provider_type.slug(),
                self.provider_type.api_key_env_vars().join(" / ")
            ))
        };

        match self.provider_type {
            ProviderType::OpenAI => Ok(ModelProvider::OpenAI {
                model: self.model.clone(),
                api_key: api_key.ok_or_else(missing_key)?,
                base_url: self.endpoint.clone(),
            }),
            ProviderType::Gemini => Ok(ModelProvider::Gemini {
                model: self.model.clone(),
                api_key: api_key.ok_or_else(missing_key)?,
                base_url: self.endpoint.clone(),
            }),
            ProviderType::Ollama => Ok(ModelProvider::Ollama {
                model: self.model.clone(),
                base_url: self.endpoint.clone(),
            }),
            ProviderType::LocalCustom => Ok(ModelProvider::LocalCustom {
                model: self.model.clone(),
                endpoint: self.endpoint.clone().ok_or_else(|| {
                    BackendError::NotConfigured("Local providers require an endpoint".to_string())
                })?,
                api_key,
            }),
        }
    }
}
