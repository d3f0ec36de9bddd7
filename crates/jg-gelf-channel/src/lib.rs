//! GELF transport for journal-gelf.
//!
//! Provides the outbound path to Graylog:
//! - `Transport` trait for sending envelopes (mockable in tests)
//! - `UdpTransport`, GELF over UDP with chunking, gzip by default
//! - `encode`, wire encoding and truncation of oversized messages
//! - `MockTransport` for testing without a server

pub mod chunk;
pub mod config;
pub mod encode;
pub mod error;
pub mod mock;
pub mod transport;

// Re-exports for convenience.
pub use config::GelfConfig;
pub use encode::Compression;
pub use error::{GelfError, GelfResult};
pub use mock::MockTransport;
pub use transport::{Transport, UdpTransport};
