//! Message normalization.
//!
//! Daemons prepend their own boilerplate (timestamps, bracketed levels,
//! pool names) to what they log. A per-facility rule strips that prefix and,
//! when the rule has a `Priority` capture group, recovers the severity from
//! the text, overriding the numeric PRIORITY field.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{LogError, LogResult};
use crate::types::{LogEntry, Severity};

/// Name of the capture group holding a severity word.
pub const PRIORITY_GROUP: &str = "Priority";

/// Application timestamp stripped from every message, whatever its facility.
static TIMESTAMP_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^20[0-9]{2}[/\-][01][0-9][/\-][0-3][0-9] [0-2]?[0-9]:[0-5][0-9]:[0-5][0-9](?:[,.][0-9]+)? ")
        .unwrap()
});

/// Facility-specific prefixes, keyed by syslog identifier or process name.
const BUILTIN_RULES: &[(&str, &str)] = &[
    ("nginx", r"\[(?P<Priority>[a-z]+)\] "),
    ("java", r"(?P<Priority>[A-Z]+): "),
    ("mysqld", r"^[0-9]+ \[(?P<Priority>[A-Z][a-z]+)\] "),
    (
        "searchd",
        r"^\[([A-Z][a-z]{2} ){2} [0-9]+ [0-2][0-9]:[0-5][0-9]:[0-5][0-9]\.[0-9]{3} 20[0-9][0-9]\] \[[ 0-9]+\] ",
    ),
    (
        "jenkins",
        r"^[A-Z][a-z]{2} [01][0-9], 20[0-9][0-9] [0-2]?[0-9]:[0-5][0-9]:[0-5][0-9] [AP]M ",
    ),
    ("php-fpm", r"^pool [a-z_0-9\[\]\-]+: "),
    (
        "syncthing",
        r"^\[[0-9A-Z]{5}\] [0-2][0-9]:[0-5][0-9]:[0-5][0-9] (?P<Priority>INFO): ",
    ),
];

static BUILTIN: LazyLock<RuleSet> = LazyLock::new(|| {
    let mut rules = RuleSet::new();
    for (facility, pattern) in BUILTIN_RULES {
        rules
            .insert(facility, pattern)
            .unwrap_or_else(|e| panic!("builtin rule is invalid: {e}"));
    }
    rules
});

/// A compiled prefix pattern for one facility.
#[derive(Debug, Clone)]
pub struct NormalizationRule {
    pattern: Regex,
    captures_severity: bool,
}

impl NormalizationRule {
    pub fn new(facility: &str, pattern: &str) -> LogResult<Self> {
        let pattern = Regex::new(pattern).map_err(|e| LogError::Regex {
            facility: facility.to_string(),
            message: e.to_string(),
        })?;
        let captures_severity = pattern
            .capture_names()
            .flatten()
            .any(|name| name == PRIORITY_GROUP);
        Ok(Self {
            pattern,
            captures_severity,
        })
    }

    pub fn captures_severity(&self) -> bool {
        self.captures_severity
    }
}

/// Read-only table of normalization rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: HashMap<String, NormalizationRule>,
}

impl RuleSet {
    /// An empty rule set. Only the timestamp prefix is stripped.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in rules, compiled once per process.
    pub fn builtin() -> &'static RuleSet {
        &BUILTIN
    }

    /// Register (or replace) the rule for `facility`.
    pub fn insert(&mut self, facility: &str, pattern: &str) -> LogResult<()> {
        let rule = NormalizationRule::new(facility, pattern)?;
        self.rules.insert(facility.to_string(), rule);
        Ok(())
    }

    pub fn get(&self, facility: &str) -> Option<&NormalizationRule> {
        self.rules.get(facility)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule for an entry: by syslog identifier first, then process name.
    pub fn lookup(&self, entry: &LogEntry) -> Option<&NormalizationRule> {
        self.get(&entry.syslog_identifier)
            .or_else(|| self.get(&entry.comm))
    }

    /// Clean up the entry's short message in place.
    pub fn normalize(&self, entry: &mut LogEntry) {
        strip_timestamp(&mut entry.message);

        let Some(rule) = self.lookup(entry) else {
            return;
        };

        let (span, severity) = {
            let Some(caps) = rule.pattern.captures(&entry.message) else {
                return;
            };
            let severity = rule.captures_severity.then(|| {
                let word = caps.name(PRIORITY_GROUP).map_or("", |m| m.as_str());
                Severity::resolve_word(word)
            });
            (caps.get(0).map(|m| m.range()), severity)
        };

        if let Some(severity) = severity {
            tracing::trace!(
                facility = %entry.facility(),
                severity = %severity,
                "severity recovered from message text"
            );
            entry.severity = severity;
        }
        if let Some(span) = span {
            entry.message.replace_range(span, "");
        }
    }
}

/// Normalize with the built-in rules.
pub fn normalize(entry: &mut LogEntry) {
    RuleSet::builtin().normalize(entry);
}

fn strip_timestamp(message: &mut String) {
    if let Some(span) = TIMESTAMP_PREFIX.find(message).map(|m| m.range()) {
        message.replace_range(span, "");
    }
}
