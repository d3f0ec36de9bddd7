//! Message body enrichment.
//!
//! Applications sometimes log a whole JSON object as the message; its keys
//! become supplementary attributes. Multi-line messages are split so the
//! short message stays on one line.

use jg_protocol::FieldValue;

use crate::types::LogEntry;

/// Messages at or below this length are never treated as JSON.
const JSON_MESSAGE_MIN_LEN: usize = 64;

/// JSON key that overrides the short message.
const MESSAGE_KEY: &str = "Message";
/// JSON key that overrides the full message.
const FULL_MESSAGE_KEY: &str = "FullMessage";

/// Cheap shape check: `{"` after leading whitespace, and long enough.
pub fn looks_like_json(message: &str) -> bool {
    message.len() > JSON_MESSAGE_MIN_LEN && message.trim_start().starts_with("{\"")
}

/// Derive `full_message` and `fields` from the raw message.
pub fn enrich(entry: &mut LogEntry) {
    if looks_like_json(&entry.message) {
        expand_json(entry);
    }
    split_first_line(entry);
}

/// Merge a JSON object message into the entry. Returns false (leaving the
/// entry untouched) when the body does not parse as an object.
fn expand_json(entry: &mut LogEntry) -> bool {
    let map = match serde_json::from_str::<serde_json::Value>(&entry.message) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(_) => return false,
        Err(e) => {
            tracing::trace!(error = %e, "message looked like JSON but did not parse");
            return false;
        }
    };

    let mut message = None;
    for (key, value) in map {
        let Some(value) = FieldValue::from_json(value) else {
            continue;
        };
        match key.as_str() {
            MESSAGE_KEY => message = Some(value.into_string()),
            FULL_MESSAGE_KEY => entry.full_message = Some(value.into_string()),
            _ => {
                entry.fields.insert(key, value);
            }
        }
    }

    if let Some(message) = message {
        entry.message = message;
    }
    true
}

fn split_first_line(entry: &mut LogEntry) {
    let Some((first, _)) = entry.message.split_once('\n') else {
        return;
    };
    let first = first.trim_end_matches('\r').to_string();
    let original = std::mem::replace(&mut entry.message, first);
    if entry.full_message.is_none() {
        entry.full_message = Some(original);
    }
}
