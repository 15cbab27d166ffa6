//! Generative Flows
//!
//! A flow is an (input schema, output schema, prompt template) triple bound to
//! a single backend call. `FlowAdapter` runs the shared contract for every
//! flow:
//!
//! 1. validate the input against the input schema (rejected inputs never reach
//!    the backend),
//! 2. render the template with the validated fields,
//! 3. submit the prompt plus the output schema descriptor to the backend once,
//! 4. coerce the answer to the output schema, failing on any missing or
//!    mistyped field.
//!
//! There are no retries and no shared state between invocations.

use crate::error::{FlowError, TemplateError};
use crate::provider::{CompletionOptions, GenerationBackend, GenerationRequest};
use crate::schema::Schema;
use crate::template::PromptTemplate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info, warn};

pub mod fulfillment;
pub mod insights;
pub mod notification;
pub mod response;

pub use fulfillment::{
    FulfillmentFlow, FulfillmentRequest, FulfillmentResult, ALL_AVAILABLE_DONORS,
};
pub use insights::{InsightsFlow, InsightsRequest, InsightsResult};
pub use notification::{NotificationFlow, NotificationRequest, NotificationResult};

/// Static description of one flow.
pub trait Flow: Send + Sync + 'static {
    type Input: Serialize + Send + Sync;
    type Output: DeserializeOwned + Serialize + Send;

    /// Stable name, used in logs, errors and on the command line.
    const NAME: &'static str;
    const INPUT_SCHEMA: Schema;
    const OUTPUT_SCHEMA: Schema;
    const TEMPLATE: &'static str;
}

/// Runs a flow against any backend.
pub struct FlowAdapter<F: Flow> {
    template: PromptTemplate,
    options: CompletionOptions,
    _flow: PhantomData<fn() -> F>,
}

impl<F: Flow> fmt::Debug for FlowAdapter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowAdapter")
            .field("flow", &F::NAME)
            .field("options", &self.options)
            .finish()
    }
}

impl<F: Flow> FlowAdapter<F> {
    /// Compile the flow's template; a placeholder without a matching input
    /// field fails here.
    pub fn new(options: CompletionOptions) -> Result<Self, TemplateError> {
        let template = PromptTemplate::compile(F::NAME, F::TEMPLATE, &F::INPUT_SCHEMA)?;
        Ok(Self {
            template,
            options,
            _flow: PhantomData,
        })
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    /// Validate and render without calling a backend.
    pub fn render(&self, input: &F::Input) -> Result<String, FlowError> {
        self.render_json(&to_candidate(input))
    }

    pub fn render_json(&self, candidate: &Value) -> Result<String, FlowError> {
        let fields = F::INPUT_SCHEMA.validate(candidate)?;
        Ok(self.template.render(&fields)?)
    }

    /// Typed invocation.
    pub async fn invoke(
        &self,
        backend: &dyn GenerationBackend,
        input: &F::Input,
    ) -> Result<F::Output, FlowError> {
        let output = self.invoke_json(backend, &to_candidate(input)).await?;
        serde_json::from_value(Value::Object(output)).map_err(|e| FlowError::SchemaMismatch {
            flow: F::NAME,
            detail: e.to_string(),
        })
    }

    /// Untyped invocation; the returned object holds exactly the declared
    /// output fields.
    pub async fn invoke_json(
        &self,
        backend: &dyn GenerationBackend,
        candidate: &Value,
    ) -> Result<Map<String, Value>, FlowError> {
        let started = Instant::now();
        let result = self.run(backend, candidate).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => info!(flow = F::NAME, elapsed_ms, "Flow completed"),
            Err(e) => warn!(flow = F::NAME, elapsed_ms, error = %e, "Flow failed"),
        }
        result
    }

    async fn run(
        &self,
        backend: &dyn GenerationBackend,
        candidate: &Value,
    ) -> Result<Map<String, Value>, FlowError> {
        let fields = F::INPUT_SCHEMA.validate(candidate)?;
        let prompt = self.template.render(&fields)?;

        debug!(
            flow = F::NAME,
            provider = backend.provider_name(),
            model = backend.model_name(),
            prompt_len = prompt.len(),
            "Submitting prompt"
        );

        let request = GenerationRequest {
            schema_name: F::OUTPUT_SCHEMA.name.to_string(),
            prompt,
            output_schema: F::OUTPUT_SCHEMA.to_json_schema(),
            options: self.options.clone(),
        };
        let raw = backend
            .submit(request)
            .await
            .map_err(|source| FlowError::BackendUnavailable {
                flow: F::NAME,
                source,
            })?;

        response::coerce(F::NAME, &F::OUTPUT_SCHEMA, raw)
    }
}

// Serializing a plain record cannot fail in practice; if it does, the null
// candidate is rejected by validation instead of panicking.
fn to_candidate<T: Serialize>(input: &T) -> Value {
    serde_json::to_value(input).unwrap_or(Value::Null)
}

/// The flows known to this crate, for dynamic dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    Fulfillment,
    Notification,
    Insights,
}

impl FlowKind {
    pub const ALL: [FlowKind; 3] = [
        FlowKind::Fulfillment,
        FlowKind::Notification,
        FlowKind::Insights,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FlowKind::Fulfillment => FulfillmentFlow::NAME,
            FlowKind::Notification => NotificationFlow::NAME,
            FlowKind::Insights => InsightsFlow::NAME,
        }
    }

    pub fn input_schema(&self) -> Schema {
        match self {
            FlowKind::Fulfillment => FulfillmentFlow::INPUT_SCHEMA,
            FlowKind::Notification => NotificationFlow::INPUT_SCHEMA,
            FlowKind::Insights => InsightsFlow::INPUT_SCHEMA,
        }
    }

    pub fn output_schema(&self) -> Schema {
        match self {
            FlowKind::Fulfillment => FulfillmentFlow::OUTPUT_SCHEMA,
            FlowKind::Notification => NotificationFlow::OUTPUT_SCHEMA,
            FlowKind::Insights => InsightsFlow::OUTPUT_SCHEMA,
        }
    }

    pub fn render_json(
        &self,
        options: &CompletionOptions,
        candidate: &Value,
    ) -> Result<String, FlowError> {
        match self {
            FlowKind::Fulfillment => {
                FlowAdapter::<FulfillmentFlow>::new(options.clone())?.render_json(candidate)
            }
            FlowKind::Notification => {
                FlowAdapter::<NotificationFlow>::new(options.clone())?.render_json(candidate)
            }
            FlowKind::Insights => {
                FlowAdapter::<InsightsFlow>::new(options.clone())?.render_json(candidate)
            }
        }
    }

    pub async fn invoke_json(
        &self,
        backend: &dyn GenerationBackend,
        options: &CompletionOptions,
        candidate: &Value,
    ) -> Result<Map<String, Value>, FlowError> {
        match self {
            FlowKind::Fulfillment => {
                FlowAdapter::<FulfillmentFlow>::new(options.clone())?
                    .invoke_json(backend, candidate)
                    .await
            }
            FlowKind::Notification => {
                FlowAdapter::<NotificationFlow>::new(options.clone())?
                    .invoke_json(backend, candidate)
                    .await
            }
            FlowKind::Insights => {
                FlowAdapter::<InsightsFlow>::new(options.clone())?
                    .invoke_json(backend, candidate)
                    .await
            }
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FlowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fulfillment" | "fulfill" => Ok(FlowKind::Fulfillment),
            "notification" | "notify" => Ok(FlowKind::Notification),
            "insights" => Ok(FlowKind::Insights),
            _ => Err(s.to_string()),
        }
    }
}
