//! Raw startup records.
//!
//! A record is an untyped JSON object carrying an `@type` discriminator. All
//! accessors are defensive: a missing key or a value of the wrong shape
//! resolves to `None` (or an empty slice), never to an error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the namespaced type string of a record.
pub const DISCRIMINATOR_KEY: &str = "@type";

/// A single message from the startup payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: Map<String, Value>,
}

impl RawRecord {
    /// Wrap an already-parsed JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// The record's type discriminator, or `""` when absent.
    pub fn discriminator(&self) -> &str {
        self.str_field(DISCRIMINATOR_KEY).unwrap_or("")
    }

    /// Borrow the underlying field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Whether the record has the given key at all (even if null).
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Raw value lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String field.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// String or number field rendered as text.
    ///
    /// Identifiers and timestamps arrive as either JSON strings or numbers
    /// depending on the message kind.
    pub fn text_field(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Integer field. Floats with no fractional part are accepted.
    pub fn int_field(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(value_as_int)
    }

    /// Float field.
    pub fn float_field(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Array field; absent or non-array values yield an empty slice.
    pub fn array_field(&self, key: &str) -> &[Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the key holds an array (as opposed to being absent or mistyped).
    pub fn has_array(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Array(_)))
    }

    /// Object field.
    pub fn object_field(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    /// Nested object wrapped as a record.
    pub fn record_field(&self, key: &str) -> Option<RawRecord> {
        self.object_field(key).cloned().map(RawRecord::new)
    }

    /// Array field with every element converted to a record.
    pub fn records_field(&self, key: &str) -> Vec<RawRecord> {
        self.array_field(key).iter().cloned().map(RawRecord::from).collect()
    }

    /// Array of strings; non-string elements are skipped.
    pub fn string_list_field(&self, key: &str) -> Vec<String> {
        self.array_field(key)
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    }
}

impl From<Value> for RawRecord {
    /// Non-object values become empty records with no discriminator.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Integer view of a JSON value, accepting integral floats.
pub fn value_as_int(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f.is_finite() => Some(f as i64),
        _ => None,
    }
}
