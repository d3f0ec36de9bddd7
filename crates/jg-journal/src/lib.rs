//! systemd journal ingestion for journal-gelf.
//!
//! Parses `journalctl --output=json` lines into [`LogEntry`] values,
//! expands JSON and multi-line message bodies, and normalizes messages with
//! per-facility prefix rules. A `JournalSource` abstraction (real
//! `journalctl` child or in-memory mock) supplies the raw lines.

pub mod error;
pub mod mock;
pub mod normalize;
pub mod parsers;
pub mod source;
pub mod types;

// Re-export key types for convenience
pub use error::{LogError, LogResult};
pub use mock::MockJournalSource;
pub use normalize::{NormalizationRule, RuleSet, normalize};
pub use parsers::parse_line;
pub use source::{JournalSource, JournalctlSource};
pub use types::{AppFields, LogEntry, Severity};
