//! systemd journal JSON output parser (`journalctl -o json`).

use crate::types::LogEntry;

/// Deserialize a single journal record.
///
/// Numeric fields sent as strings are coerced; a field that fails to coerce
/// rejects the whole line.
pub fn parse_record(line: &str) -> Option<LogEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<LogEntry>(line) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::trace!(error = %e, "skipping unparseable journal line");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    const NGINX_LINE: &str = r#"{"__CURSOR":"s=6b1e;i=1a2;b=9f3c;m=2e1;t=60df;x=77aa","__REALTIME_TIMESTAMP":"1704164645123456","__MONOTONIC_TIMESTAMP":"3021993","_BOOT_ID":"9f3c","_TRANSPORT":"stdout","PRIORITY":"6","SYSLOG_FACILITY":"3","SYSLOG_IDENTIFIER":"nginx","MESSAGE":"2024-01-02 03:04:05 [error] disk full","_PID":"812","_UID":"33","_GID":"33","_COMM":"nginx","_EXE":"/usr/sbin/nginx","_CMDLINE":"nginx: worker process","_SYSTEMD_CGROUP":"/system.slice/nginx.service","_SYSTEMD_UNIT":"nginx.service","_MACHINE_ID":"0c5f","_HOSTNAME":"web01","__SEQNUM":"418"}"#;

    #[test]
    fn parse_full_record() {
        let entry = parse_record(NGINX_LINE).unwrap();
        assert_eq!(entry.cursor, "s=6b1e;i=1a2;b=9f3c;m=2e1;t=60df;x=77aa");
        assert_eq!(entry.realtime_timestamp, 1_704_164_645_123_456);
        assert_eq!(entry.monotonic_timestamp, "3021993");
        assert_eq!(entry.boot_id, "9f3c");
        assert_eq!(entry.transport, "stdout");
        assert_eq!(entry.severity, Severity::Info);
        assert_eq!(entry.syslog_identifier, "nginx");
        assert_eq!(entry.message, "2024-01-02 03:04:05 [error] disk full");
        assert_eq!(entry.pid, "812");
        assert_eq!(entry.comm, "nginx");
        assert_eq!(entry.systemd_unit, "nginx.service");
        assert_eq!(entry.hostname, "web01");
        assert_eq!(entry.machine_id, "0c5f");
    }

    #[test]
    fn missing_fields_take_zero_values() {
        let entry = parse_record(r#"{"MESSAGE":"hello"}"#).unwrap();
        assert_eq!(entry.realtime_timestamp, 0);
        assert_eq!(entry.severity, Severity::default());
        assert!(entry.hostname.is_empty());
        assert_eq!(entry.facility(), "");
    }

    #[test]
    fn non_string_field_rejects_line() {
        // Binary journal payloads arrive as byte arrays.
        assert!(parse_record(r#"{"MESSAGE":[104,105]}"#).is_none());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(parse_record("  {\"MESSAGE\":\"x\"}\r").is_some());
    }
}
