//! GELF transport: fire-and-forget delivery of envelopes to Graylog.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use jg_protocol::GelfMessage;
use tokio::net::{UdpSocket, lookup_host};

use crate::chunk;
use crate::config::GelfConfig;
use crate::encode::{self, Compression};
use crate::error::{GelfError, GelfResult};

// ── Transport trait ───────────────────────────────────────────

/// Abstraction over the outbound GELF path.
///
/// Enables mocking in tests without a Graylog server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Encode and transmit one message.
    async fn send(&self, message: &GelfMessage) -> GelfResult<()>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, message: &GelfMessage) -> GelfResult<()> {
        (**self).send(message).await
    }
}

// ── UdpTransport ──────────────────────────────────────────────

/// GELF over UDP, gzip-compressed by default, chunked when a payload exceeds
/// one datagram.
///
/// The socket is connected to the endpoint, so an ICMP rejection of an
/// earlier datagram surfaces as an error on a later `send`.
pub struct UdpTransport {
    socket: UdpSocket,
    chunk_size: usize,
    compression: Compression,
}

impl UdpTransport {
    /// Resolve the endpoint, bind an ephemeral local port and connect to it.
    pub async fn connect(config: &GelfConfig) -> GelfResult<Self> {
        let endpoint = lookup_host(config.endpoint.as_str())
            .await
            .map_err(|e| GelfError::Connection(format!("{}: {e}", config.endpoint)))?
            .next()
            .ok_or_else(|| {
                GelfError::Connection(format!("{}: no address found", config.endpoint))
            })?;

        let local = if endpoint.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| GelfError::Connection(format!("bind {local}: {e}")))?;
        socket
            .connect(endpoint)
            .await
            .map_err(|e| GelfError::Connection(format!("connect {endpoint}: {e}")))?;

        tracing::info!(
            endpoint = %endpoint,
            chunk_size = config.chunk_size,
            compression = ?config.compression,
            "GELF transport ready"
        );

        Ok(Self {
            socket,
            chunk_size: config.chunk_size,
            compression: config.compression,
        })
    }

    pub fn local_addr(&self) -> GelfResult<SocketAddr> {
        self.socket
            .local_addr()
            .map_err(|e| GelfError::Other(e.to_string()))
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&self, message: &GelfMessage) -> GelfResult<()> {
        let payload = encode::encode(
            message,
            self.compression,
            encode::capacity(self.chunk_size),
        )?;
        let datagrams = chunk::split(&payload, self.chunk_size, chunk::message_id())?;

        for datagram in &datagrams {
            let sent = self
                .socket
                .send(datagram)
                .await
                .map_err(|e| GelfError::Send(e.to_string()))?;
            if sent != datagram.len() {
                return Err(GelfError::Send(format!(
                    "short write: {sent} of {} bytes",
                    datagram.len()
                )));
            }
        }

        tracing::trace!(
            bytes = payload.len(),
            datagrams = datagrams.len(),
            "GELF message sent"
        );
        Ok(())
    }
}
