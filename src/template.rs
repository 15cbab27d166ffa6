//! Prompt templates.
//!
//! A template is fixed text with `{{{field}}}` placeholders. Templates are
//! compiled against the input schema of their flow, so a placeholder naming a
//! field the schema does not declare is rejected when the flow is built rather
//! than when a prompt is rendered. Rendering is plain substitution: no
//! conditionals, no loops, no escaping.

use crate::error::TemplateError;
use crate::schema::Schema;
use serde_json::{Map, Value};

const OPEN: &str = "{{{";
const CLOSE: &str = "}}}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A compiled prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse `source` and check every placeholder against `schema`.
    pub fn compile(name: &str, source: &str, schema: &Schema) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after_open = &rest[start + OPEN.len()..];
            let end = after_open
                .find(CLOSE)
                .ok_or_else(|| TemplateError::UnterminatedPlaceholder {
                    template: name.to_string(),
                    offset: offset + start,
                })?;

            let placeholder = after_open[..end].trim();
            if placeholder.is_empty() {
                return Err(TemplateError::EmptyPlaceholder {
                    template: name.to_string(),
                    offset: offset + start,
                });
            }
            if schema.field(placeholder).is_none() {
                return Err(TemplateError::UnknownPlaceholder {
                    template: name.to_string(),
                    placeholder: placeholder.to_string(),
                });
            }
            segments.push(Segment::Placeholder(placeholder.to_string()));

            let consumed = start + OPEN.len() + end + CLOSE.len();
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute `fields` into the template.
    pub fn render(&self, fields: &Map<String, Value>) -> Result<String, TemplateError> {
        let mut rendered = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder(name) => {
                    let value = fields
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingValue {
                            template: self.name.clone(),
                            placeholder: name.clone(),
                        })?;
                    push_value(&mut rendered, value);
                }
            }
        }
        Ok(rendered)
    }
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::String(text) => out.push_str(text),
        Value::Null => {}
        other => out.push_str(&other.to_string()),
    }
}
