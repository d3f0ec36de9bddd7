//! Conversion of journal entries to GELF envelopes.

use std::collections::BTreeMap;

use jg_journal::LogEntry;
use jg_protocol::{FieldValue, GelfMessage};

/// Additional fields every envelope carries, empty when the entry lacks them.
fn well_known_fields(entry: &LogEntry) -> [(&'static str, &str); 17] {
    let app = &entry.app;
    [
        ("Boot_id", entry.boot_id.as_str()),
        ("Pid", entry.pid.as_str()),
        ("Uid", entry.uid.as_str()),
        ("Logger", app.logger.as_str()),
        ("EventId", app.event_id.as_str()),
        ("Exception", app.exception.as_str()),
        ("Exception_Type", app.exception_type.as_str()),
        ("Exception_Stacktrace", app.exception_stacktrace.as_str()),
        ("Inner_Exception", app.inner_exception.as_str()),
        ("Inner_Exception_Type", app.inner_exception_type.as_str()),
        ("Inner_Exception_Stacktrace", app.inner_exception_stacktrace.as_str()),
        ("Request_Id", app.request_id.as_str()),
        ("Request_Path", app.request_path.as_str()),
        ("Status_Code", app.status_code.as_str()),
        ("Query_String", app.query_string.as_str()),
        ("Correlation_Id", app.correlation_id.as_str()),
        ("Member_Id", app.member_id.as_str()),
    ]
}

/// Build the envelope for an entry.
///
/// Attributes expanded from a JSON message win over well-known fields of
/// the same name. A leading `_` on an attribute name is dropped, since the
/// wire format adds it back.
pub fn to_gelf(entry: &LogEntry) -> GelfMessage {
    let mut additional: BTreeMap<String, FieldValue> = well_known_fields(entry)
        .into_iter()
        .map(|(key, value)| (key.to_string(), FieldValue::from(value)))
        .collect();
    additional.extend(
        entry
            .fields
            .iter()
            .map(|(key, value)| {
                let key = key.strip_prefix('_').unwrap_or(key);
                (key.to_string(), value.clone())
            }),
    );

    let mut message = GelfMessage::new(entry.hostname.clone(), entry.message.clone());
    message.full_message = entry.full_message.clone();
    message.timestamp = entry.timestamp_secs();
    message.level = entry.severity.level();
    message.facility = entry.facility().to_string();
    message.additional = additional;
    message
}
