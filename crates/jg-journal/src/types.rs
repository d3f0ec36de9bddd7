//! Core journal types: severity levels and the parsed log entry.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use jg_protocol::FieldValue;
use serde::{Deserialize, Deserializer};

// ── Severity ──────────────────────────────────────────────────

/// Syslog severity level.
///
/// Discriminants are the standard numeric levels, so ordering is from most
/// to least severe: Emergency < Alert < ... < Debug.
///
/// The default is the zero level. It is what an unmapped severity word
/// resolves to, mirroring the numeric field's zero value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    #[default]
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

/// Severity words recognized in message text, matched lower-case.
const SEVERITY_WORDS: &[(&str, Severity)] = &[
    ("emergency", Severity::Emergency),
    ("emerg", Severity::Emergency),
    ("alert", Severity::Alert),
    ("critical", Severity::Critical),
    ("crit", Severity::Critical),
    ("error", Severity::Error),
    ("err", Severity::Error),
    ("warning", Severity::Warning),
    ("warn", Severity::Warning),
    ("notice", Severity::Notice),
    ("info", Severity::Info),
    ("debug", Severity::Debug),
];

impl Severity {
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Alert => "alert",
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Map a numeric syslog level (0–7) to a `Severity`.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Emergency),
            1 => Some(Self::Alert),
            2 => Some(Self::Critical),
            3 => Some(Self::Error),
            4 => Some(Self::Warning),
            5 => Some(Self::Notice),
            6 => Some(Self::Info),
            7 => Some(Self::Debug),
            _ => None,
        }
    }

    /// Exact lookup in the severity word table. Expects a lower-case word.
    pub fn from_word(word: &str) -> Option<Self> {
        SEVERITY_WORDS
            .iter()
            .find(|(w, _)| *w == word)
            .map(|(_, sev)| *sev)
    }

    /// Lower-case `word` and look it up, falling back to the default level.
    pub fn resolve_word(word: &str) -> Self {
        Self::from_word(&word.to_lowercase()).unwrap_or_default()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Application fields ────────────────────────────────────────

/// Optional application-defined journal fields, as written by structured
/// loggers (exception details, request correlation).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppFields {
    #[serde(rename = "LOGGER", default)]
    pub logger: String,
    #[serde(rename = "EVENTID", default)]
    pub event_id: String,
    #[serde(rename = "EXCEPTION", default)]
    pub exception: String,
    #[serde(rename = "EXCEPTION_TYPE", default)]
    pub exception_type: String,
    #[serde(rename = "EXCEPTION_STACKTRACE", default)]
    pub exception_stacktrace: String,
    #[serde(rename = "INNEREXCEPTION", default)]
    pub inner_exception: String,
    #[serde(rename = "INNEREXCEPTION_TYPE", default)]
    pub inner_exception_type: String,
    #[serde(rename = "INNEREXCEPTION_STACKTRACE", default)]
    pub inner_exception_stacktrace: String,
    #[serde(rename = "STATUSCODE", default)]
    pub status_code: String,
    #[serde(rename = "QUERYSTRING", default)]
    pub query_string: String,
    #[serde(rename = "MEMBERID", default)]
    pub member_id: String,
    #[serde(rename = "CORRELATIONID", default)]
    pub correlation_id: String,
    #[serde(rename = "REQUESTPATH", default)]
    pub request_path: String,
    #[serde(rename = "REQUESTID", default)]
    pub request_id: String,
}

// ── Log Entry ─────────────────────────────────────────────────

/// One journal record, as emitted by `journalctl --output=json`.
///
/// Field names follow the journal's documented convention. Missing fields
/// take their zero value. `full_message` and `fields` are never read from
/// the record itself; they are derived from `message` during parsing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "__CURSOR", default)]
    pub cursor: String,
    /// Wall-clock time in microseconds since the Unix epoch.
    #[serde(rename = "__REALTIME_TIMESTAMP", default, deserialize_with = "quoted_i64")]
    pub realtime_timestamp: i64,
    #[serde(rename = "__MONOTONIC_TIMESTAMP", default)]
    pub monotonic_timestamp: String,
    #[serde(rename = "_BOOT_ID", default)]
    pub boot_id: String,
    #[serde(rename = "_TRANSPORT", default)]
    pub transport: String,
    #[serde(rename = "PRIORITY", default, deserialize_with = "quoted_severity")]
    pub severity: Severity,
    #[serde(rename = "SYSLOG_FACILITY", default)]
    pub syslog_facility: String,
    #[serde(rename = "SYSLOG_IDENTIFIER", default)]
    pub syslog_identifier: String,
    /// Short message. Single line once parsing has finished.
    #[serde(rename = "MESSAGE", default)]
    pub message: String,
    #[serde(rename = "_PID", default)]
    pub pid: String,
    #[serde(rename = "_UID", default)]
    pub uid: String,
    #[serde(rename = "_GID", default)]
    pub gid: String,
    /// Process name.
    #[serde(rename = "_COMM", default)]
    pub comm: String,
    #[serde(rename = "_EXE", default)]
    pub exe: String,
    #[serde(rename = "_CMDLINE", default)]
    pub cmdline: String,
    #[serde(rename = "_SYSTEMD_CGROUP", default)]
    pub systemd_cgroup: String,
    #[serde(rename = "_SYSTEMD_SESSION", default)]
    pub systemd_session: String,
    #[serde(rename = "_SYSTEMD_OWNER_UID", default)]
    pub systemd_owner_uid: String,
    #[serde(rename = "_SYSTEMD_UNIT", default)]
    pub systemd_unit: String,
    #[serde(rename = "_SOURCE_REALTIME_TIMESTAMP", default)]
    pub source_realtime_timestamp: String,
    #[serde(rename = "_MACHINE_ID", default)]
    pub machine_id: String,
    #[serde(rename = "_HOSTNAME", default)]
    pub hostname: String,
    #[serde(flatten)]
    pub app: AppFields,
    /// Multi-line original text, or the `FullMessage` of a JSON message.
    #[serde(skip)]
    pub full_message: Option<String>,
    /// Supplementary attributes expanded from a JSON message body.
    #[serde(skip)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl LogEntry {
    /// Facility key: the syslog identifier, or the process name when the
    /// source left the identifier empty (php-fpm does).
    pub fn facility(&self) -> &str {
        if self.syslog_identifier.is_empty() {
            &self.comm
        } else {
            &self.syslog_identifier
        }
    }

    /// Real timestamp as seconds since the Unix epoch.
    pub fn timestamp_secs(&self) -> f64 {
        self.realtime_timestamp as f64 / 1_000_000.0
    }

    pub fn realtime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_micros(self.realtime_timestamp).single()
    }

    /// Microseconds elapsed between the entry's real timestamp and `now`.
    pub fn age_micros(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp_micros().saturating_sub(self.realtime_timestamp)
    }
}

// ── Quoted numeric fields ─────────────────────────────────────

/// The journal writes numbers as JSON strings; accept both forms.
#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(i64),
    Text(String),
}

fn quoted_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Numeric::deserialize(deserializer)? {
        Numeric::Int(n) => Ok(n),
        Numeric::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn quoted_severity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Severity, D::Error> {
    let level = quoted_i64(deserializer)?;
    Ok(u8::try_from(level)
        .ok()
        .and_then(Severity::from_level)
        .unwrap_or_default())
}
