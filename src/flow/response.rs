//! Coercion of raw backend answers to an output schema.

use crate::error::FlowError;
use crate::provider::RawResponse;
use crate::schema::Schema;
use serde_json::{Map, Value};

/// Turn a raw answer into an object holding exactly `schema`'s fields.
///
/// No content at all (or text with no JSON object in it) is `EmptyResponse`;
/// JSON that is not an object, or lacks or mistypes a declared field, is
/// `SchemaMismatch`.
pub fn coerce(
    flow: &'static str,
    schema: &Schema,
    raw: RawResponse,
) -> Result<Map<String, Value>, FlowError> {
    let value = match raw {
        RawResponse::Structured(Value::Null) | RawResponse::Empty => {
            return Err(FlowError::EmptyResponse { flow })
        }
        RawResponse::Structured(value) => value,
        RawResponse::Text(text) => parse_text(&text).ok_or(FlowError::EmptyResponse { flow })?,
    };

    schema
        .validate(&value)
        .map_err(|e| FlowError::SchemaMismatch {
            flow,
            detail: e.to_string(),
        })
}

/// Best-effort JSON extraction from model text.
pub fn parse_text(text: &str) -> Option<Value> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Some(value);
    }
    body.match_indices('{')
        .filter_map(|(start, _)| balanced_object(&body[start..]))
        .find_map(|slice| serde_json::from_str(slice).ok())
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") on the opening line
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

/// The balanced `{ ... }` that `text` opens with, honoring string literals.
fn balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
