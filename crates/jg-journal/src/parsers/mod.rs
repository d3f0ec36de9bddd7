//! Journal line parsing.
//!
//! `journalctl --output=json` writes one JSON object per line. Parsing a
//! line yields a [`LogEntry`] whose message has already been enriched
//! (JSON bodies expanded, multi-line bodies split).

pub mod journal_json;
pub mod message;

use crate::types::LogEntry;

/// Parse one line of journal JSON output.
///
/// Returns `None` for blank or malformed lines; the caller drops them.
pub fn parse_line(line: &str) -> Option<LogEntry> {
    let mut entry = journal_json::parse_record(line)?;
    message::enrich(&mut entry);
    Some(entry)
}
