//! Mock GELF transport for testing without a Graylog server.
//!
//! Records every delivered message and can be told to fail a number of
//! times before accepting sends.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use jg_protocol::GelfMessage;

use crate::error::{GelfError, GelfResult};
use crate::transport::Transport;

/// Mock implementation of the `Transport` trait.
///
/// Thread-safe via `Mutex` (fine for test contexts).
pub struct MockTransport {
    sent: Mutex<Vec<GelfMessage>>,
    failures_remaining: AtomicUsize,
    attempts: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::failing(0)
    }

    /// Fail the next `failures` sends, then succeed.
    pub fn failing(failures: usize) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failures_remaining: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Messages accepted so far, in send order.
    pub fn sent(&self) -> Vec<GelfMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Short messages accepted so far, in send order.
    pub fn sent_messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.short_message.clone())
            .collect()
    }

    pub fn last_sent(&self) -> Option<GelfMessage> {
        self.sent.lock().unwrap().last().cloned()
    }

    /// Number of `send` calls, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, message: &GelfMessage) -> GelfResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(GelfError::Send("mock: connection refused".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
