//! Generation Backends
//!
//! The single outbound seam of the crate. A flow hands a backend a rendered
//! prompt together with the JSON-Schema descriptor of the answer it expects;
//! the backend returns whatever the service produced (structured JSON, raw text
//! or nothing) and leaves coercion to the flow. Concrete clients talk to
//! OpenAI-compatible chat completion endpoints (OpenAI, Ollama, custom local
//! servers) and to Google's Generative Language API.

use crate::error::BackendError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub mod gemini;
pub mod openai;
pub mod profile;

pub use gemini::GeminiClient;
pub use openai::OpenAICompatibleClient;
pub use profile::{ProviderConfig, ProviderType};

/// Model provider selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelProvider {
    OpenAI {
        model: String,
        api_key: String,
        base_url: Option<String>, // For custom endpoints (e.g., Azure OpenAI)
    },
    Gemini {
        model: String,
        api_key: String,
        base_url: Option<String>,
    },
    Ollama {
        model: String,
        base_url: Option<String>, // Default: http://localhost:11434
    },
    LocalCustom {
        model: String,
        endpoint: String, // Full endpoint URL (e.g., http://localhost:8080/v1)
        api_key: Option<String>,
    },
}

/// Sampling options forwarded to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    #[serde(default)]
    pub temperature: Option<f32>, // 0.0-2.0
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub top_p: Option<f32>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: Some(1.0),
            max_tokens: None,
            top_p: None,
        }
    }
}

/// One outbound generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Name of the output schema; some providers require one.
    pub schema_name: String,
    pub prompt: String,
    /// JSON-Schema descriptor of the expected answer.
    pub output_schema: Value,
    pub options: CompletionOptions,
}

/// What came back from the provider, before any schema coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    Structured(Value),
    Text(String),
    Empty,
}

impl RawResponse {
    /// Wrap provider message text; blank text counts as no answer.
    pub fn from_text(content: Option<String>) -> Self {
        match content {
            Some(text) if !text.trim().is_empty() => RawResponse::Text(text),
            _ => RawResponse::Empty,
        }
    }
}

/// A text-generation service that can answer against an output schema.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn submit(&self, request: GenerationRequest) -> Result<RawResponse, BackendError>;

    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;
}

/// HTTP timeouts applied to every provider client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Option<Duration>,
    /// `None` leaves the overall request unbounded.
    pub request: Option<Duration>,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Some(Duration::from_secs(10)),
            request: Some(Duration::from_secs(120)),
        }
    }
}

pub(crate) fn build_provider_http_client(timeouts: HttpTimeouts) -> Result<Client, BackendError> {
    let mut builder = Client::builder().no_proxy();
    if let Some(connect) = timeouts.connect {
        builder = builder.connect_timeout(connect);
    }
    if let Some(request) = timeouts.request {
        builder = builder.timeout(request);
    }
    builder
        .build()
        .map_err(|e| BackendError::Transport(format!("Failed to create HTTP client: {}", e)))
}

// Transport-level failures from reqwest
pub(crate) fn map_http_error(error: reqwest::Error) -> BackendError {
    if let Some(status) = error.status() {
        map_status(status.as_u16(), &error.to_string())
    } else if error.is_timeout() {
        BackendError::Transport(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        BackendError::Transport(format!("Connection error: {}", error))
    } else {
        BackendError::Transport(format!("HTTP error: {}", error))
    }
}

pub(crate) fn map_status(status: u16, body: &str) -> BackendError {
    match status {
        401 | 403 => BackendError::AuthFailed(format!("Authentication failed: {}", body)),
        404 => BackendError::ModelNotFound(format!("Model not found: {}", body)),
        429 => BackendError::RateLimited(format!("Rate limit exceeded: {}", body)),
        _ => BackendError::RequestFailed(format!(
            "Request failed with status {}: {}",
            status, body
        )),
    }
}

/// Reads the body of a non-success response and classifies it.
pub(crate) async fn error_for_response(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    map_status(status, &error_text)
}

/// Provider factory for creating backend clients
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_client(
        provider: &ModelProvider,
        timeouts: HttpTimeouts,
    ) -> Result<Box<dyn GenerationBackend>, BackendError> {
        match provider {
            ModelProvider::OpenAI {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(OpenAICompatibleClient::openai(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
                timeouts,
            )?)),
            ModelProvider::Gemini {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(GeminiClient::new(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
                timeouts,
            )?)),
            ModelProvider::Ollama { model, base_url } => Ok(Box::new(
                OpenAICompatibleClient::ollama(model.clone(), base_url.clone(), timeouts)?,
            )),
            ModelProvider::LocalCustom {
                model,
                endpoint,
                api_key,
            } => Ok(Box::new(OpenAICompatibleClient::local(
                model.clone(),
                endpoint.clone(),
                api_key.clone(),
                timeouts,
            )?)),
        }
    }
}
