//! journal-gelf forwarder, library crate.
//!
//! Wires the journal source, normalization and GELF transport into a
//! pipeline with a single coalescing slot and an idle flusher. Re-exports
//! the modules so the end-to-end tests can drive a `Forwarder` with mock
//! collaborators.

pub mod config;
pub mod delivery;
pub mod envelope;
pub mod flusher;
pub mod ingest;
pub mod pipeline;
pub mod slot;

pub use config::{ConfigError, ForwarderConfig, PipelineSettings, Tuning};
pub use delivery::Deliverer;
pub use ingest::IngestStats;
pub use pipeline::{Forwarder, RunStats};
pub use slot::PendingSlot;
