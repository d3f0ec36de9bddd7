use crate::encode::Compression;

/// GELF endpoint settings.
#[derive(Debug, Clone)]
pub struct GelfConfig {
    /// Graylog GELF UDP input, as `host:port`.
    pub endpoint: String,
    /// Largest datagram sent, chunk header included. Bigger payloads are chunked.
    pub chunk_size: usize,
    pub compression: Compression,
}

impl GelfConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            chunk_size: default_chunk_size(),
            compression: Compression::default(),
        }
    }
}

/// Fits a single Ethernet frame on most WAN paths.
pub fn default_chunk_size() -> usize {
    1420
}
