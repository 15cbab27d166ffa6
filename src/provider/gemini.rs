//! Google Generative Language (Gemini) client.
//!
//! Uses `generateContent` with JSON output mode: the output schema is converted
//! to the OpenAPI subset the API accepts and sent as `responseSchema`.

use super::{
    build_provider_http_client, error_for_response, map_http_error, GenerationBackend,
    GenerationRequest, HttpTimeouts, RawResponse,
};
use crate::error::BackendError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Schema keywords understood by `responseSchema`.
const SUPPORTED_SCHEMA_KEYS: &[&str] = &[
    "type",
    "format",
    "description",
    "nullable",
    "enum",
    "properties",
    "required",
    "items",
    "minimum",
    "maximum",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        model: String,
        api_key: String,
        base_url: Option<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, BackendError> {
        if api_key.is_empty() {
            return Err(BackendError::NotConfigured(
                "Gemini requires an API key".to_string(),
            ));
        }
        let base_url = base_url.unwrap_or_else(|| GEMINI_DEFAULT_BASE_URL.to_string());
        Ok(Self {
            client: build_provider_http_client(timeouts)?,
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn generate_url(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    fn request_body(request: &GenerationRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.options.temperature,
                max_output_tokens: request.options.max_tokens,
                top_p: request.options.top_p,
                response_mime_type: "application/json",
                response_schema: to_gemini_schema(&request.output_schema),
            },
        }
    }
}

/// Convert a JSON-Schema descriptor to Gemini's schema dialect: upper-case type
/// names, unsupported keywords dropped.
pub fn to_gemini_schema(schema: &Value) -> Value {
    let Some(object) = schema.as_object() else {
        return schema.clone();
    };

    let mut converted = Map::new();
    for (key, value) in object {
        if !SUPPORTED_SCHEMA_KEYS.contains(&key.as_str()) {
            continue;
        }
        let value = match key.as_str() {
            "type" => match value.as_str() {
                Some(name) => Value::String(name.to_ascii_uppercase()),
                None => value.clone(),
            },
            "properties" => match value.as_object() {
                Some(properties) => Value::Object(
                    properties
                        .iter()
                        .map(|(name, property)| (name.clone(), to_gemini_schema(property)))
                        .collect(),
                ),
                None => value.clone(),
            },
            "items" => to_gemini_schema(value),
            _ => value.clone(),
        };
        converted.insert(key.clone(), value);
    }
    Value::Object(converted)
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn submit(&self, request: GenerationRequest) -> Result<RawResponse, BackendError> {
        let body = Self::request_body(&request);

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            BackendError::InvalidEnvelope(format!("Failed to parse response: {}", e))
        })?;

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            debug!(provider = "gemini", "No candidates in response");
            return Ok(RawResponse::Empty);
        };
        debug!(
            provider = "gemini",
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
            "Candidate received"
        );

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();
        Ok(RawResponse::from_text(Some(text)))
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
