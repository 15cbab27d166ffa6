//! CLI route: single route table and run context. Dispatches to flows and presentation.

use crate::cli::help::{command_name, requires_backend};
use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{format_flow_list, format_flow_result, format_prompt, format_schemas};
use crate::config::{BloodlinkConfig, ConfigLoader};
use crate::error::{ApiError, BackendError, FlowError};
use crate::flow::{
    Flow, FlowAdapter, FlowKind, FulfillmentFlow, FulfillmentRequest, InsightsFlow,
    InsightsRequest, NotificationFlow, NotificationRequest,
};
use crate::provider::GenerationBackend;
use crate::stats::PlatformStats;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: BloodlinkConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        config.ensure_valid()?;
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: BloodlinkConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn config(&self) -> &BloodlinkConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    /// The backend is only built for commands that call it.
    pub fn execute(&self, command: &Commands, format: OutputFormat) -> Result<String, ApiError> {
        if requires_backend(command) {
            let backend = self.config.create_backend()?;
            info!(
                provider = backend.provider_name(),
                model = backend.model_name(),
                "Generation backend ready"
            );
            self.route(command, format, Some(backend.as_ref()))
        } else {
            self.route(command, format, None)
        }
    }

    /// Execute against a caller-supplied backend.
    pub fn execute_with_backend(
        &self,
        command: &Commands,
        format: OutputFormat,
        backend: &dyn GenerationBackend,
    ) -> Result<String, ApiError> {
        self.route(command, format, Some(backend))
    }

    fn route(
        &self,
        command: &Commands,
        format: OutputFormat,
        backend: Option<&dyn GenerationBackend>,
    ) -> Result<String, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        debug!(command = name, workspace = %self.workspace_root.display(), "Executing command");

        let result = self.route_inner(command, format, backend);
        debug!(
            command = name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn route_inner(
        &self,
        command: &Commands,
        format: OutputFormat,
        backend: Option<&dyn GenerationBackend>,
    ) -> Result<String, ApiError> {
        match command {
            Commands::Flows => Ok(format_flow_list(format)),
            Commands::Schema { flow } => Ok(format_schemas(parse_flow(flow)?, format)),
            Commands::Render { flow, input } => {
                let kind = parse_flow(flow)?;
                let document = read_input_document(input)?;
                let prompt = kind.render_json(&self.config.completion_options(), &document)?;
                Ok(format_prompt(kind, &prompt, format))
            }
            Commands::Run { flow, input } => {
                let kind = parse_flow(flow)?;
                let document = read_input_document(input)?;
                let backend = require_backend(backend)?;
                let options = self.config.completion_options();
                let result = block_on(kind.invoke_json(backend, &options, &document))??;
                Ok(format_flow_result(kind, &result, format))
            }
            Commands::Fulfill {
                blood_type,
                units,
                urgency,
                donor_availability,
                details,
            } => {
                let request = FulfillmentRequest {
                    blood_type: blood_type.clone(),
                    units_required: *units,
                    urgency: *urgency,
                    donor_availability: donor_availability.clone(),
                    request_details: details.clone(),
                };
                let result = self.run_typed::<FulfillmentFlow>(backend, &request)?;
                present(FlowKind::Fulfillment, &result, format)
            }
            Commands::Notify {
                blood_type,
                urgency,
                units,
                unavailable,
            } => {
                let request = NotificationRequest {
                    blood_type: blood_type.clone(),
                    urgency: *urgency,
                    units_required: *units,
                    donor_availability: !*unavailable,
                };
                let result = self.run_typed::<NotificationFlow>(backend, &request)?;
                present(FlowKind::Notification, &result, format)
            }
            Commands::Insights {
                donor_data,
                request_data,
                regional_data,
                stats,
            } => {
                let request = match stats {
                    Some(path) => load_platform_stats(path)?.to_insights_request(),
                    None => InsightsRequest {
                        donor_data: donor_data.clone(),
                        request_data: request_data.clone(),
                        regional_data: regional_data.clone(),
                    },
                };
                let result = self.run_typed::<InsightsFlow>(backend, &request)?;
                present(FlowKind::Insights, &result, format)
            }
        }
    }

    fn run_typed<F: Flow>(
        &self,
        backend: Option<&dyn GenerationBackend>,
        input: &F::Input,
    ) -> Result<F::Output, ApiError> {
        let backend = require_backend(backend)?;
        let adapter =
            FlowAdapter::<F>::new(self.config.completion_options()).map_err(FlowError::from)?;
        Ok(block_on(adapter.invoke(backend, input))??)
    }
}

fn parse_flow(name: &str) -> Result<FlowKind, ApiError> {
    name.parse::<FlowKind>().map_err(ApiError::UnknownFlow)
}

fn require_backend(
    backend: Option<&dyn GenerationBackend>,
) -> Result<&dyn GenerationBackend, ApiError> {
    backend.ok_or_else(|| {
        ApiError::Backend(BackendError::NotConfigured(
            "No generation backend available".to_string(),
        ))
    })
}

fn block_on<T>(future: impl Future<Output = T>) -> Result<T, ApiError> {
    let runtime = tokio::runtime::Runtime::new()?;
    Ok(runtime.block_on(future))
}

fn present<T: Serialize>(kind: FlowKind, result: &T, format: OutputFormat) -> Result<String, ApiError> {
    match serde_json::to_value(result) {
        Ok(Value::Object(fields)) => Ok(format_flow_result(kind, &fields, format)),
        Ok(other) => Err(FlowError::SchemaMismatch {
            flow: kind.name(),
            detail: format!("result serialized to {} instead of an object", other),
        }
        .into()),
        Err(e) => Err(FlowError::SchemaMismatch {
            flow: kind.name(),
            detail: e.to_string(),
        }
        .into()),
    }
}

/// Read a JSON document from a file, or from stdin when the path is "-".
pub fn read_input_document(path: &Path) -> Result<Value, ApiError> {
    let contents = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(path)?
    };
    serde_json::from_str(&contents)
        .map_err(|e| ApiError::InvalidInput(format!("{}: {}", path.display(), e)))
}

/// Platform statistics from a `.json` file, or TOML otherwise.
pub fn load_platform_stats(path: &Path) -> Result<PlatformStats, ApiError> {
    let contents = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let parsed = if is_json {
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    } else {
        toml::from_str(&contents).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| ApiError::InvalidInput(format!("{}: {}", path.display(), e)))
}
