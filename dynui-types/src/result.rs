//! Function results as produced by the function-execution backend, and a
//! lenient reader over their payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static NULL: Value = Value::Null;

/// Outcome of one executed function call.
///
/// Only `success == true` results carry a payload the engine acts on. Fields
/// other than `success`, `data` and `error` are kept in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FunctionResult {
    /// A successful result wrapping `data`.
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            extra: Map::new(),
        }
    }

    /// A failed result with an error message and no payload.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            extra: Map::new(),
        }
    }

    /// Returns the meaningful payload of a successful result.
    ///
    /// Backends wrap payloads either directly under `data` or one level deeper
    /// under `data.data`; both collapse to the same value here. A successful
    /// result without `data` yields `null`, which readers treat as an empty
    /// object. Failed results yield `None`.
    pub fn payload(&self) -> Option<&Value> {
        if !self.success {
            return None;
        }
        let data = match &self.data {
            Some(data) => data,
            None => return Some(&NULL),
        };
        match data.get("data") {
            Some(inner) if inner.is_object() || inner.is_array() => Some(inner),
            _ => Some(data),
        }
    }
}

/// Lenient accessor over a JSON payload.
///
/// Every getter takes a list of candidate keys (backends are inconsistent about
/// `camelCase` vs `snake_case`) and falls back to a default instead of failing.
#[derive(Debug, Clone, Copy)]
pub struct PayloadReader<'a> {
    value: &'a Value,
}

impl<'a> PayloadReader<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// First present, non-null value among `keys`.
    pub fn get(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|k| self.value.get(*k))
            .find(|v| !v.is_null())
    }

    pub fn str_or(&self, keys: &[&str], default: &str) -> String {
        match self.get(keys) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => default.to_string(),
        }
    }

    pub fn opt_str(&self, keys: &[&str]) -> Option<String> {
        match self.get(keys) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Numeric value, also accepting numeric strings such as `"12.50"`.
    pub fn f64_or(&self, keys: &[&str], default: f64) -> f64 {
        match self.get(keys) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    pub fn u64_or(&self, keys: &[&str], default: u64) -> u64 {
        match self.get(keys) {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Array value, or an empty list when absent or not an array.
    pub fn array(&self, keys: &[&str]) -> &'a [Value] {
        match self.get(keys) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        }
    }

    /// Nested object reader; absent objects read as empty.
    pub fn object(&self, keys: &[&str]) -> PayloadReader<'a> {
        match self.get(keys) {
            Some(v) if v.is_object() => PayloadReader::new(v),
            _ => PayloadReader::new(&NULL),
        }
    }
}
