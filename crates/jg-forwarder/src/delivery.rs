//! Delivery with unbounded retry.

use std::time::Duration;

use jg_gelf_channel::Transport;
use jg_journal::LogEntry;
use tokio::time;

use crate::envelope;

/// Sends entries to the GELF endpoint, retrying each until it is accepted.
pub struct Deliverer<T> {
    transport: T,
    backoff: Duration,
}

impl<T: Transport> Deliverer<T> {
    pub fn new(transport: T, backoff: Duration) -> Self {
        Self { transport, backoff }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Deliver one entry. Never gives up; every failed attempt is logged and
    /// followed by a pause of `backoff`.
    ///
    /// Returns the number of failed attempts before the send went through.
    pub async fn deliver(&self, entry: LogEntry) -> u32 {
        let message = envelope::to_gelf(&entry);
        let mut failures = 0u32;

        loop {
            match self.transport.send(&message).await {
                Ok(()) => {
                    if failures > 0 {
                        tracing::info!(
                            failures,
                            facility = %message.facility,
                            "delivered after retries"
                        );
                    }
                    return failures;
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    tracing::error!(
                        error = %e,
                        attempt = failures,
                        backoff_secs = self.backoff.as_secs(),
                        "GELF delivery failed, retrying"
                    );
                    time::sleep(self.backoff).await;
                }
            }
        }
    }
}
