//! Core types shared by the mapper, resolver and validator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type tag used for structured values that have no narrower primitive.
pub const JSON_TYPE: &str = "json";

/// Union and intersection keywords, in the order the mapper visits them.
pub const COMPOSITION_KEYWORDS: &[&str] = &["anyOf", "allOf", "oneOf"];

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Normalized property descriptor consumed by property-editing surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityProperty {
    pub id: String,
    /// Prefixed property name.
    pub name: String,
    pub label: String,
    /// Resolved primitive type. Never empty once mapping has finished.
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Schema `default`, or the literal of a `const` schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub required: bool,
    /// Hint text taken from `$comment`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Copy of the schema node this property came from, kept for later
    /// type resolution and value validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
    /// Member type tags of a union/intersection, in order of first appearance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregated_types: Option<Vec<String>>,
}

/// Primitive type derived from a raw schema.
///
/// Ambiguous schemas (array-valued `type`, unions) derive several types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PrimitiveType {
    Single(String),
    Multiple(Vec<String>),
}

impl PrimitiveType {
    /// Returns the single type, or `None` for multi-typed schemas.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            PrimitiveType::Single(t) => Some(t),
            PrimitiveType::Multiple(_) => None,
        }
    }
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}
