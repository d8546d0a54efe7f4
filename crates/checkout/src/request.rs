//! Checkout request envelope and consumed-key tracking.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CheckoutError;

/// Transport-only keys that must never be applied to the order.
const TRANSPORT_KEYS: [&str; 4] = ["_token", "_params", "_redirect", "_request"];

/// The raw checkout submission: a schema-less key → value bag.
///
/// Stages pull the fields they understand out of this bag and mark them
/// consumed; whatever is left over is merged onto the order (whitelisted)
/// by the final free-form merge stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutRequest {
    values: Map<String, Value>,
}

impl CheckoutRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a request from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, CheckoutError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(CheckoutError::Validation(
                crate::error::ValidationErrors::single(
                    "request",
                    format!("Expected an object, got {}", type_name(&other)),
                ),
            )),
        }
    }

    /// Sets a field, for building requests in code.
    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Returns the raw value for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns true if the key is present with a non-null value.
    pub fn has(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(v) if !v.is_null())
    }

    /// Returns the value for a key as a non-empty string slice.
    pub fn str_value(&self, key: &str) -> Option<&str> {
        match self.values.get(key).and_then(Value::as_str) {
            Some(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Returns the `customer` field as an object, if it is one.
    pub fn customer_object(&self) -> Option<&Map<String, Value>> {
        self.values.get("customer").and_then(Value::as_object)
    }

    /// Iterates over all key/value pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The set of request keys already interpreted by a pipeline stage.
///
/// Seeded with the transport-only keys and grown monotonically as stages
/// claim the fields they understand; there is deliberately no removal
/// operation. The free-form merge stage skips every consumed key.
#[derive(Debug, Clone)]
pub struct ConsumedKeys {
    keys: BTreeSet<String>,
}

impl ConsumedKeys {
    /// Creates the initial set containing only transport keys.
    pub fn new() -> Self {
        Self {
            keys: TRANSPORT_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Marks a key as consumed.
    pub fn consume(&mut self, key: impl Into<String>) {
        self.keys.insert(key.into());
    }

    /// Marks several keys as consumed.
    pub fn consume_all<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        for key in keys {
            self.consume(key);
        }
    }

    /// Returns true if the key has been consumed.
    pub fn is_consumed(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Returns how many keys are consumed.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if no keys are consumed. Never the case in practice:
    /// the set is seeded with the transport keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for ConsumedKeys {
    fn default() -> Self {
        Self::new()
    }
}
