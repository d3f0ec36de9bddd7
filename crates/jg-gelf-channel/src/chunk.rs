//! GELF UDP chunking.
//!
//! A payload larger than one datagram is split into chunks, each prefixed
//! with a 12-byte header: the magic bytes `0x1e 0x0f`, an 8-byte message
//! id shared by all chunks, the sequence number and the chunk count.
//! Graylog reassembles at most 128 chunks per message.

use uuid::Uuid;

use crate::error::{GelfError, GelfResult};

pub const CHUNK_MAGIC: [u8; 2] = [0x1e, 0x0f];
pub const CHUNK_HEADER_LEN: usize = 12;
pub const MAX_CHUNKS: usize = 128;

/// A fresh message id. Taken from the random tail of a v7 UUID.
pub fn message_id() -> [u8; 8] {
    let uuid = Uuid::now_v7();
    let mut id = [0u8; 8];
    id.copy_from_slice(&uuid.as_bytes()[8..]);
    id
}

/// Split `payload` into datagrams of at most `chunk_size` bytes.
///
/// A payload that fits is returned as a single unframed datagram.
pub fn split(payload: &[u8], chunk_size: usize, id: [u8; 8]) -> GelfResult<Vec<Vec<u8>>> {
    if payload.len() <= chunk_size {
        return Ok(vec![payload.to_vec()]);
    }
    if chunk_size <= CHUNK_HEADER_LEN {
        return Err(GelfError::Other(format!(
            "chunk size {chunk_size} leaves no room for data"
        )));
    }

    let data_len = chunk_size - CHUNK_HEADER_LEN;
    let count = payload.len().div_ceil(data_len);
    if count > MAX_CHUNKS {
        return Err(GelfError::TooLarge {
            size: payload.len(),
            max_chunks: MAX_CHUNKS,
        });
    }

    Ok(payload
        .chunks(data_len)
        .enumerate()
        .map(|(seq, data)| {
            let mut datagram = Vec::with_capacity(CHUNK_HEADER_LEN + data.len());
            datagram.extend_from_slice(&CHUNK_MAGIC);
            datagram.extend_from_slice(&id);
            // Both fit in a byte: count <= MAX_CHUNKS.
            datagram.push(seq as u8);
            datagram.push(count as u8);
            datagram.extend_from_slice(data);
            datagram
        })
        .collect())
}
