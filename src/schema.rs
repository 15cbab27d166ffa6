//! Flow Schemas
//!
//! Declarative descriptions of the records a flow accepts and produces. A schema
//! is a static list of fields, each with a kind and a description. The same
//! schema drives three things: input validation before a backend call, output
//! coercion after it, and the JSON-Schema descriptor sent to the backend so it
//! knows what shape to answer with.

use crate::error::ValidationError;
use serde_json::{json, Map, Value};

/// The type and constraints of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer { minimum: Option<i64> },
    Boolean,
    /// A string restricted to the listed values (exact, case-sensitive).
    Enum(&'static [&'static str]),
}

impl FieldKind {
    /// Human-readable expectation used in validation messages.
    pub fn expectation(&self) -> &'static str {
        match self {
            FieldKind::String | FieldKind::Enum(_) => "a string",
            FieldKind::Integer { .. } => "an integer",
            FieldKind::Boolean => "a boolean",
        }
    }
}

/// One named field of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

impl FieldSpec {
    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::String,
            description,
        }
    }

    pub const fn integer(name: &'static str, minimum: Option<i64>, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer { minimum },
            description,
        }
    }

    pub const fn boolean(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Boolean,
            description,
        }
    }

    pub const fn one_of(
        name: &'static str,
        allowed: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Enum(allowed),
            description,
        }
    }
}

/// An object shape: every listed field is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { name, fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.name).collect()
    }

    pub fn validate(&self, candidate: &Value) -> Result<Map<String, Value>, ValidationError> {
        validate(self, candidate)
    }

    /// JSON-Schema descriptor handed to generation backends.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in self.fields {
            let property = match field.kind {
                FieldKind::String => json!({
                    "type": "string",
                    "description": field.description,
                }),
                FieldKind::Integer { minimum: Some(minimum) } => json!({
                    "type": "integer",
                    "minimum": minimum,
                    "description": field.description,
                }),
                FieldKind::Integer { minimum: None } => json!({
                    "type": "integer",
                    "description": field.description,
                }),
                FieldKind::Boolean => json!({
                    "type": "boolean",
                    "description": field.description,
                }),
                FieldKind::Enum(allowed) => json!({
                    "type": "string",
                    "enum": allowed,
                    "description": field.description,
                }),
            };
            properties.insert(field.name.to_string(), property);
        }

        json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": self.field_names(),
            "additionalProperties": false,
        })
    }
}

/// Validate `candidate` against `schema`.
///
/// Fields are checked in declaration order and the first violation wins, so
/// the outcome for a given candidate never varies. On success the returned
/// object holds exactly the declared fields; unknown keys are dropped and
/// integral floats (`2.0`) are normalized to integers.
pub fn validate(schema: &Schema, candidate: &Value) -> Result<Map<String, Value>, ValidationError> {
    let object = candidate.as_object().ok_or(ValidationError::NotAnObject {
        found: json_type_name(candidate),
    })?;

    let mut validated = Map::with_capacity(schema.fields.len());
    for field in schema.fields {
        let value = match object.get(field.name) {
            None | Some(Value::Null) => {
                return Err(ValidationError::MissingField { field: field.name })
            }
            Some(value) => value,
        };
        validated.insert(field.name.to_string(), check_field(field, value)?);
    }
    Ok(validated)
}

fn check_field(field: &FieldSpec, value: &Value) -> Result<Value, ValidationError> {
    let wrong_type = || ValidationError::WrongType {
        field: field.name,
        expected: field.kind.expectation(),
        found: json_type_name(value),
    };

    match field.kind {
        FieldKind::String => value.as_str().map(|_| value.clone()).ok_or_else(wrong_type),
        FieldKind::Boolean => value.as_bool().map(Value::Bool).ok_or_else(wrong_type),
        FieldKind::Integer { minimum } => {
            if value.is_u64() && value.as_i64().is_none() {
                return Err(ValidationError::IntegerOutOfRange {
                    field: field.name,
                    value: value.to_string(),
                });
            }
            let number = as_integer(value).ok_or_else(wrong_type)?;
            if let Some(minimum) = minimum {
                if number < minimum {
                    return Err(ValidationError::BelowMinimum {
                        field: field.name,
                        minimum,
                        actual: number,
                    });
                }
            }
            Ok(Value::from(number))
        }
        FieldKind::Enum(allowed) => {
            let text = value.as_str().ok_or_else(wrong_type)?;
            if allowed.contains(&text) {
                Ok(value.clone())
            } else {
                Err(ValidationError::NotInEnum {
                    field: field.name,
                    value: text.to_string(),
                    allowed,
                })
            }
        }
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    if let Some(number) = value.as_i64() {
        return Some(number);
    }
    let float = value.as_f64()?;
    if float.is_finite() && float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 {
        Some(float as i64)
    } else {
        None
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a fractional number",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
