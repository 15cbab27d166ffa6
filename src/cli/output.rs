//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, FlowError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Flow(flow_error) if flow_error.is_retryable() => {
            format!("{}\nThe generation service may be unavailable; retrying later may succeed.", e)
        }
        ApiError::Flow(FlowError::Validation(_)) => {
            format!("{}\nRun `bloodlink schema <flow>` to see the expected input.", e)
        }
        _ => e.to_string(),
    }
}
