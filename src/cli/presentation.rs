//! CLI presentation: text and json formatters for flow listings, schemas, prompts and results.

use crate::cli::parse::OutputFormat;
use crate::flow::FlowKind;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::{json, Map, Value};

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn format_flow_list(format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let flows: Vec<Value> = FlowKind::ALL
                .iter()
                .map(|kind| {
                    json!({
                        "name": kind.name(),
                        "input": kind.input_schema().name,
                        "input_fields": kind.input_schema().field_names(),
                        "output": kind.output_schema().name,
                        "output_fields": kind.output_schema().field_names(),
                    })
                })
                .collect();
            pretty(&json!({ "flows": flows, "total": flows.len() }))
        }
        OutputFormat::Text => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Flow", "Input", "Input fields", "Output", "Output fields"]);
            for kind in FlowKind::ALL {
                table.add_row(vec![
                    kind.name().to_string(),
                    kind.input_schema().name.to_string(),
                    kind.input_schema().field_names().join(", "),
                    kind.output_schema().name.to_string(),
                    kind.output_schema().field_names().join(", "),
                ]);
            }
            table.to_string()
        }
    }
}

pub fn format_schemas(kind: FlowKind, format: OutputFormat) -> String {
    let input = kind.input_schema().to_json_schema();
    let output = kind.output_schema().to_json_schema();
    match format {
        OutputFormat::Json => pretty(&json!({
            "flow": kind.name(),
            "input": input,
            "output": output,
        })),
        OutputFormat::Text => format!(
            "{}\n{}\n\n{}\n{}",
            format!("Input ({})", kind.input_schema().name).bold(),
            pretty(&input),
            format!("Output ({})", kind.output_schema().name).bold(),
            pretty(&output)
        ),
    }
}

pub fn format_prompt(kind: FlowKind, prompt: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => pretty(&json!({ "flow": kind.name(), "prompt": prompt })),
        OutputFormat::Text => prompt.to_string(),
    }
}

/// Fields are shown in output-schema order.
pub fn format_flow_result(kind: FlowKind, result: &Map<String, Value>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => pretty(&Value::Object(result.clone())),
        OutputFormat::Text => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Field", "Value"]);
            for name in kind.output_schema().field_names() {
                if let Some(value) = result.get(name) {
                    table.add_row(vec![name.to_string(), display_value(value)]);
                }
            }
            format!("{}\n{}", kind.output_schema().name.bold(), table)
        }
    }
}
