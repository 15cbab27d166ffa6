//! Error types for the bloodlink generative flows.

use thiserror::Error;

/// Input rejected by a schema before any backend call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Expected a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Field '{field}' must be {expected}, got {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Field '{field}' has value '{value}', expected one of: {}", .allowed.join(", "))]
    NotInEnum {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("Field '{field}' is outside the supported integer range: {value}")]
    IntegerOutOfRange { field: &'static str, value: String },

    #[error("Field '{field}' must be at least {minimum}, got {actual}")]
    BelowMinimum {
        field: &'static str,
        minimum: i64,
        actual: i64,
    },
}

/// Prompt template construction and rendering errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template '{template}' references unknown field '{placeholder}'")]
    UnknownPlaceholder {
        template: String,
        placeholder: String,
    },

    #[error("Template '{template}' has an unterminated placeholder at byte {offset}")]
    UnterminatedPlaceholder { template: String, offset: usize },

    #[error("Template '{template}' has an empty placeholder at byte {offset}")]
    EmptyPlaceholder { template: String, offset: usize },

    #[error("Template '{template}' has no value for '{placeholder}'")]
    MissingValue {
        template: String,
        placeholder: String,
    },
}

/// Failures talking to a text-generation backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Provider authentication failed: {0}")]
    AuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Provider model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    #[error("Provider transport error: {0}")]
    Transport(String),

    #[error("Provider returned an unreadable envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Typed failure of a single flow invocation.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Backend unavailable for flow '{flow}': {source}")]
    BackendUnavailable {
        flow: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("Backend output for flow '{flow}' does not match its schema: {detail}")]
    SchemaMismatch { flow: &'static str, detail: String },

    #[error("Backend returned no parseable content for flow '{flow}'")]
    EmptyResponse { flow: &'static str },

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

impl FlowError {
    /// Only backend outages are worth retrying; the caller decides whether to.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FlowError::BackendUnavailable { .. })
    }
}

/// Application-level errors (configuration, I/O, CLI).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown flow: {0} (expected fulfillment, notification, or insights)")]
    UnknownFlow(String),

    #[error("Invalid input document: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
