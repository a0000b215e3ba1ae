//! Shared wire-decoding helpers for the resource mappers.
//!
//! # Design
//! Absent or `null` fields get the documented default; a field that is
//! present in the wrong shape is a hard [`ApiError::Decode`]. Defaults never
//! paper over malformed data.

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A polymorphic sub-object reference.
///
/// The API inlines some related resources as a bare name string on creation
/// and expands them into full objects on fetch; both shapes are kept as-is
/// and resolved lazily through [`Reference::name`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    Name(String),
    Embedded(Map<String, Value>),
}

impl Reference {
    /// The referenced resource's name, when one is resolvable.
    pub fn name(&self) -> Option<&str> {
        match self {
            Reference::Name(name) => Some(name),
            Reference::Embedded(fields) => fields.get("name").and_then(Value::as_str),
        }
    }
}

/// `null` counts as absent everywhere.
fn field<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    match raw.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

fn wrong_shape(key: &str, value: &Value, expected: &str) -> ApiError {
    ApiError::Decode(format!("field {key:?}: expected {expected}, got {value}"))
}

pub fn opt_string(raw: &Map<String, Value>, key: &str) -> Result<Option<String>, ApiError> {
    match field(raw, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(wrong_shape(key, other, "a string")),
    }
}

pub fn string_or_empty(raw: &Map<String, Value>, key: &str) -> Result<String, ApiError> {
    Ok(opt_string(raw, key)?.unwrap_or_default())
}

pub fn bool_or(raw: &Map<String, Value>, key: &str, default: bool) -> Result<bool, ApiError> {
    match field(raw, key) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(wrong_shape(key, other, "a boolean")),
    }
}

pub fn count_or_zero(raw: &Map<String, Value>, key: &str) -> Result<u64, ApiError> {
    match field(raw, key) {
        None => Ok(0),
        Some(value) => value
            .as_u64()
            .ok_or_else(|| wrong_shape(key, value, "a non-negative integer")),
    }
}

pub fn string_list(raw: &Map<String, Value>, key: &str) -> Result<Vec<String>, ApiError> {
    match field(raw, key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(wrong_shape(key, other, "a list of strings")),
            })
            .collect(),
        Some(other) => Err(wrong_shape(key, other, "a list of strings")),
    }
}

pub fn timestamp(
    raw: &Map<String, Value>,
    key: &str,
) -> Result<Option<DateTime<FixedOffset>>, ApiError> {
    match field(raw, key) {
        None => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s).map(Some).map_err(|e| {
            ApiError::Decode(format!("field {key:?}: unparseable timestamp {s:?}: {e}"))
        }),
        Some(other) => Err(wrong_shape(key, other, "an ISO-8601 timestamp string")),
    }
}

pub fn reference(raw: &Map<String, Value>, key: &str) -> Result<Option<Reference>, ApiError> {
    match field(raw, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(Reference::Name(s.clone()))),
        Some(Value::Object(fields)) => Ok(Some(Reference::Embedded(fields.clone()))),
        Some(other) => Err(wrong_shape(key, other, "a string or an object")),
    }
}

/// A decoded entity body must be a JSON object.
pub fn expect_object(value: Value) -> Result<Map<String, Value>, ApiError> {
    match value {
        Value::Object(raw) => Ok(raw),
        other => Err(ApiError::Decode(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Operations that decode an entity require a non-empty response body.
pub(crate) fn require_body(value: Option<Value>) -> Result<Value, ApiError> {
    value.ok_or_else(|| ApiError::Decode("empty response body".to_string()))
}

/// Normalize the shapes a list endpoint may answer with: a paginated
/// `{"results": [...]}` envelope, a bare array, or — defensively — a single
/// object, wrapped as a one-element list. One malformed element fails the
/// whole list.
pub fn object_list(value: Value) -> Result<Vec<Map<String, Value>>, ApiError> {
    match value {
        Value::Array(items) => items.into_iter().map(expect_object).collect(),
        Value::Object(mut raw) => match raw.remove("results") {
            Some(Value::Array(items)) => items.into_iter().map(expect_object).collect(),
            Some(other) => Err(ApiError::Decode(format!(
                "field \"results\": expected a list, got {other}"
            ))),
            None => Ok(vec![raw]),
        },
        other => Err(ApiError::Decode(format!(
            "expected a list or object response, got {other}"
        ))),
    }
}
