//! OpenAI-compatible chat completions client.
//!
//! Serves OpenAI itself, Ollama's `/v1` compatibility layer and any custom local
//! server speaking the same protocol. The output schema travels as a
//! `json_schema` response format.

use super::{
    build_provider_http_client, error_for_response, map_http_error, GenerationBackend,
    GenerationRequest, HttpTimeouts, RawResponse,
};
use crate::error::BackendError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    response_format: Value,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: OpenAIMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Client for any endpoint implementing `POST {base}/chat/completions`.
pub struct OpenAICompatibleClient {
    client: Client,
    provider_name: &'static str,
    model: String,
    api_key: Option<String>,
    completions_url: String,
}

impl OpenAICompatibleClient {
    pub fn openai(
        model: String,
        api_key: String,
        base_url: Option<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, BackendError> {
        let base_url = base_url.unwrap_or_else(|| OPENAI_DEFAULT_BASE_URL.to_string());
        Self::build("openai", model, Some(api_key), &base_url, timeouts)
    }

    pub fn ollama(
        model: String,
        base_url: Option<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, BackendError> {
        let base_url = base_url.unwrap_or_else(|| OLLAMA_DEFAULT_BASE_URL.to_string());
        let base_url = format!("{}/v1", base_url.trim_end_matches('/'));
        Self::build("ollama", model, None, &base_url, timeouts)
    }

    pub fn local(
        model: String,
        endpoint: String,
        api_key: Option<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, BackendError> {
        Self::build("local", model, api_key, &endpoint, timeouts)
    }

    fn build(
        provider_name: &'static str,
        model: String,
        api_key: Option<String>,
        base_url: &str,
        timeouts: HttpTimeouts,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_provider_http_client(timeouts)?,
            provider_name,
            model,
            api_key,
            completions_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn completions_url(&self) -> &str {
        &self.completions_url
    }

    fn request_body<'a>(&'a self, request: &GenerationRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: Some(request.prompt.clone()),
            }],
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
            top_p: request.options.top_p,
            response_format: json!({
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "schema": request.output_schema,
                    "strict": false,
                },
            }),
            stream: false,
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAICompatibleClient {
    async fn submit(&self, request: GenerationRequest) -> Result<RawResponse, BackendError> {
        let body = self.request_body(&request);

        let mut http = self
            .client
            .post(&self.completions_url)
            .header("Content-Type", "application/json");
        if let Some(api_key) = &self.api_key {
            http = http.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = http.json(&body).send().await.map_err(map_http_error)?;
        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            BackendError::InvalidEnvelope(format!("Failed to parse response: {}", e))
        })?;

        let Some(choice) = completion.choices.into_iter().next() else {
            debug!(provider = self.provider_name, "No choices in response");
            return Ok(RawResponse::Empty);
        };
        debug!(
            provider = self.provider_name,
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            "Completion received"
        );
        Ok(RawResponse::from_text(choice.message.content))
    }

    fn provider_name(&self) -> &str {
        self.provider_name
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
