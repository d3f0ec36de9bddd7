use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::field::FieldValue;

/// GELF specification version emitted in every envelope.
pub const GELF_VERSION: &str = "1.1";

/// A GELF 1.1 message, as accepted by Graylog.
///
/// Additional fields are stored without their leading underscore; it is
/// added during serialization. `id` is reserved by the server and never
/// emitted as an additional field.
#[derive(Debug, Clone, PartialEq)]
pub struct GelfMessage {
    pub version: String,
    /// Host that produced the message.
    pub host: String,
    /// Single-line summary.
    pub short_message: String,
    /// Full message (multi-line text, stack traces). Omitted when `None` or empty.
    pub full_message: Option<String>,
    /// Unix timestamp in seconds, fractional part carries sub-second precision.
    pub timestamp: f64,
    /// Syslog severity, 0 (emergency) ..= 7 (debug).
    pub level: u8,
    /// Originating application.
    pub facility: String,
    /// Additional fields (sent with a `_` prefix).
    pub additional: BTreeMap<String, FieldValue>,
}

impl GelfMessage {
    pub fn new(host: impl Into<String>, short_message: impl Into<String>) -> Self {
        Self {
            version: GELF_VERSION.to_string(),
            host: host.into(),
            short_message: short_message.into(),
            full_message: None,
            timestamp: 0.0,
            level: 1,
            facility: String::new(),
            additional: BTreeMap::new(),
        }
    }

    /// Serialize to the JSON bytes sent on the wire.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Look up an additional field by its name without the `_` prefix.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.additional.get(name)
    }
}

impl Serialize for GelfMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("version", &self.version)?;
        map.serialize_entry("host", &self.host)?;
        map.serialize_entry("short_message", &self.short_message)?;
        if let Some(full) = self.full_message.as_deref().filter(|f| !f.is_empty()) {
            map.serialize_entry("full_message", full)?;
        }
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.serialize_entry("level", &self.level)?;
        map.serialize_entry("facility", &self.facility)?;

        for (key, value) in &self.additional {
            let key = key.strip_prefix('_').unwrap_or(key);
            if key == "id" {
                continue;
            }
            map.serialize_entry(&format!("_{key}"), value)?;
        }
        map.end()
    }
}
