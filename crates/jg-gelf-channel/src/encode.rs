//! Wire encoding: JSON, optional gzip, and truncation of oversized messages.
//!
//! Graylog accepts at most 128 chunks per message. When the encoded payload
//! would not fit, the message text is cut down (full message first, then
//! the short message) and marked as truncated rather than rejected.

use std::io::Write;

use flate2::write::GzEncoder;
use jg_protocol::GelfMessage;
use serde::Deserialize;

use crate::chunk::{CHUNK_HEADER_LEN, MAX_CHUNKS};
use crate::error::{GelfError, GelfResult};

/// Appended to text that was cut to fit.
pub const TRUNCATION_MARKER: &str = " [truncated]";

const MAX_SHRINK_ROUNDS: usize = 16;

/// Payload compression. Graylog detects gzip by its magic bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    #[default]
    Gzip,
}

/// Largest encoded payload a message may have at `chunk_size`.
pub fn capacity(chunk_size: usize) -> usize {
    chunk_size.saturating_sub(CHUNK_HEADER_LEN) * MAX_CHUNKS
}

/// Encode `message` for the wire, truncating its text if the result would
/// exceed `capacity` bytes.
pub fn encode(
    message: &GelfMessage,
    compression: Compression,
    capacity: usize,
) -> GelfResult<Vec<u8>> {
    let mut payload = encode_once(message, compression)?;
    if payload.len() <= capacity {
        return Ok(payload);
    }

    let original = payload.len();
    let mut trimmed = message.clone();
    for _ in 0..MAX_SHRINK_ROUNDS {
        if !shrink(&mut trimmed, payload.len(), capacity) {
            break;
        }
        payload = encode_once(&trimmed, compression)?;
        if payload.len() <= capacity {
            tracing::warn!(
                facility = %message.facility,
                original_bytes = original,
                sent_bytes = payload.len(),
                "GELF message truncated to fit"
            );
            return Ok(payload);
        }
    }

    Err(GelfError::TooLarge {
        size: payload.len(),
        max_chunks: MAX_CHUNKS,
    })
}

fn encode_once(message: &GelfMessage, compression: Compression) -> GelfResult<Vec<u8>> {
    let json = message
        .to_bytes()
        .map_err(|e| GelfError::Serialization(e.to_string()))?;
    match compression {
        Compression::None => Ok(json),
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::fast());
            encoder
                .write_all(&json)
                .and_then(|()| encoder.finish())
                .map_err(|e| GelfError::Serialization(format!("gzip: {e}")))
        }
    }
}

/// Cut the text field carrying most of the payload in proportion to the
/// overshoot. Returns false when there is no text left to cut.
fn shrink(message: &mut GelfMessage, size: usize, capacity: usize) -> bool {
    let text = match message.full_message.as_mut() {
        Some(full) if !full.is_empty() => full,
        _ if !message.short_message.is_empty() => &mut message.short_message,
        _ => return false,
    };

    let len = text.len();
    if len <= TRUNCATION_MARKER.len() * 2 {
        text.clear();
        return true;
    }

    // Aim a tenth under the proportional share, and always make progress.
    let proportional = (len as u128 * capacity as u128 / size as u128) as usize;
    let mut keep = proportional.saturating_mul(9) / 10;
    if keep + TRUNCATION_MARKER.len() >= len {
        keep = len / 2;
    }
    while !text.is_char_boundary(keep) {
        keep -= 1;
    }
    text.truncate(keep);
    text.push_str(TRUNCATION_MARKER);
    true
}
