//! Shared test harness for E2E integration tests.
//!
//! Drives a real `Forwarder` with a `MockJournalSource` on the input side
//! and either a `MockTransport` or a loopback UDP receiver on the output.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use flate2::read::GzDecoder;
use serde_json::{Value, json};
use tokio::net::UdpSocket;

use jg_forwarder::{Forwarder, PipelineSettings, RunStats};
use jg_gelf_channel::MockTransport;
use jg_journal::{JournalSource, RuleSet};

/// Realtime timestamp of every harness line, well in the past.
pub const REALTIME: &str = "1704164645000000";

/// One `journalctl --output=json` line with the usual envelope fields.
pub fn journal_line(identifier: &str, priority: &str, message: &str) -> String {
    journal_record(json!({
        "SYSLOG_IDENTIFIER": identifier,
        "PRIORITY": priority,
        "MESSAGE": message,
    }))
}

/// Merge `extra` over a base record and serialize it as one line.
pub fn journal_record(extra: Value) -> String {
    let mut record = json!({
        "__CURSOR": "s=e2e;i=1",
        "__REALTIME_TIMESTAMP": REALTIME,
        "_BOOT_ID": "boot-e2e",
        "_HOSTNAME": "web01",
        "_PID": "4242",
        "_UID": "33",
        "_TRANSPORT": "journal",
    });
    if let (Some(base), Value::Object(extra)) = (record.as_object_mut(), extra) {
        base.extend(extra);
    }
    record.to_string()
}

/// Pipeline timings with the retry pause shortened for tests.
pub fn settings() -> PipelineSettings {
    PipelineSettings {
        retry_backoff: Duration::from_secs(1),
        ..PipelineSettings::default()
    }
}

/// Forwarder wired to a shared `MockTransport`.
pub struct TestHarness {
    pub transport: Arc<MockTransport>,
    pub forwarder: Forwarder<Arc<MockTransport>>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_transport(MockTransport::new())
    }

    pub fn with_transport(transport: MockTransport) -> Self {
        let transport = Arc::new(transport);
        let forwarder = Forwarder::new(transport.clone(), RuleSet::builtin().clone(), settings());
        Self {
            transport,
            forwarder,
        }
    }

    /// Run the forwarder over `source` to completion.
    pub async fn forward<S: JournalSource>(&self, source: &mut S) -> RunStats {
        self.forwarder
            .run(source)
            .await
            .expect("forwarder run failed")
    }
}

/// Parse one reassembled payload, gunzipping it when it carries the gzip magic.
pub fn decode_payload(payload: &[u8]) -> Value {
    if payload.starts_with(&[0x1f, 0x8b]) {
        let mut json = Vec::new();
        GzDecoder::new(payload)
            .read_to_end(&mut json)
            .expect("invalid gzip payload");
        serde_json::from_slice(&json).unwrap()
    } else {
        serde_json::from_slice(payload).unwrap()
    }
}

/// Receive `count` GELF payloads, reassembling chunked ones.
pub async fn receive_payloads(socket: &UdpSocket, count: usize) -> Vec<Value> {
    let mut payloads = Vec::new();
    let mut partial: BTreeMap<[u8; 8], BTreeMap<u8, Vec<u8>>> = BTreeMap::new();
    let mut buf = vec![0u8; 65_536];

    while payloads.len() < count {
        let (len, _) = tokio::time::timeout(Duration::from_secs(5), socket.recv_from(&mut buf))
            .await
            .expect("timed out waiting for GELF datagram")
            .expect("recv failed");
        let datagram = &buf[..len];

        if datagram.starts_with(&jg_gelf_channel::chunk::CHUNK_MAGIC) {
            let mut id = [0u8; 8];
            id.copy_from_slice(&datagram[2..10]);
            let (seq, total) = (datagram[10], datagram[11]);
            let parts = partial.entry(id).or_default();
            parts.insert(seq, datagram[12..].to_vec());
            if parts.len() == usize::from(total) {
                let whole: Vec<u8> = partial.remove(&id).unwrap().into_values().flatten().collect();
                payloads.push(decode_payload(&whole));
            }
        } else {
            payloads.push(decode_payload(datagram));
        }
    }
    payloads
}
