use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which the payload lives in every raw document.
pub const DATA_KEY: &str = "data";

/// Loosely typed on-disk shape of a scrape artifact: metadata keys plus `data`.
///
/// Handlers work on this shape so that files carrying partial or inferred
/// metadata (a CSV file only knows what its name says) can still be read,
/// converted and written. [`crate::Envelope`] is the validated, typed view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawDocument(Map<String, Value>);

impl RawDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON value; only objects are raw documents.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Payload portion; an explicit `null` counts as absent.
    pub fn data(&self) -> Option<&Value> {
        self.0.get(DATA_KEY).filter(|v| !v.is_null())
    }

    /// Everything except the payload.
    pub fn meta(&self) -> RawDocument {
        Self(
            self.0
                .iter()
                .filter(|(key, _)| key.as_str() != DATA_KEY)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String field lookup; empty strings are treated as missing.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Array-of-scalars lookup, rendered as strings (used for `args`).
    pub fn get_str_list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Replaces the payload, keeping the `data` key even when `None`.
    pub fn with_data(mut self, data: Option<Value>) -> Self {
        self.0
            .insert(DATA_KEY.to_string(), data.unwrap_or(Value::Null));
        self
    }
}
