use serde::{Serialize, Serializer};

/// A supplementary attribute value carried alongside a log entry.
///
/// Attributes arrive as untyped JSON (from a message body that is itself a
/// JSON object) and leave as GELF additional fields, which only allow
/// strings and numbers. Booleans are kept distinct so they survive the trip
/// as JSON `true`/`false`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl FieldValue {
    /// Convert an arbitrary JSON value into a field value.
    ///
    /// `null` yields `None`. Arrays and objects are kept as their compact
    /// JSON text.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(Self::String(s)),
            serde_json::Value::Number(n) => Some(Self::Number(n)),
            serde_json::Value::Bool(b) => Some(Self::Bool(b)),
            other => Some(Self::String(other.to_string())),
        }
    }

    /// Consume the value, rendering non-strings as their JSON text.
    pub fn into_string(self) -> String {
        match self {
            Self::String(s) => s,
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Number(n) => n.serialize(serializer),
            Self::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}
