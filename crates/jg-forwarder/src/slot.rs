//! The single pending-entry slot shared by ingest and the idle flusher.
//!
//! At most one parsed entry waits here. Ingest replaces it on every new
//! entry and delivers whatever it evicted; the flusher drains it once the
//! entry has gone stale. Both paths take the entry out under the same
//! lock, so every entry is taken exactly once.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jg_journal::LogEntry;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct PendingSlot {
    inner: Mutex<Option<LogEntry>>,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entry` and hand back the previous occupant, if any.
    pub async fn evict_and_replace(&self, entry: LogEntry) -> Option<LogEntry> {
        self.inner.lock().await.replace(entry)
    }

    /// Take the occupant if its real timestamp is more than `threshold`
    /// older than `now`. Entries stamped in the future never qualify.
    pub async fn drain_if_stale(
        &self,
        now: DateTime<Utc>,
        threshold: Duration,
    ) -> Option<LogEntry> {
        let threshold_micros = i64::try_from(threshold.as_micros()).unwrap_or(i64::MAX);
        let mut slot = self.inner.lock().await;
        match slot.as_ref() {
            Some(entry) if entry.age_micros(now) > threshold_micros => slot.take(),
            _ => None,
        }
    }

    /// Take the occupant unconditionally.
    pub async fn take(&self) -> Option<LogEntry> {
        self.inner.lock().await.take()
    }

    pub async fn is_occupied(&self) -> bool {
        self.inner.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW_MICROS: i64 = 1_704_164_645_000_000;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_micros(NOW_MICROS).unwrap()
    }

    fn entry(message: &str, age_ms: i64) -> LogEntry {
        LogEntry {
            realtime_timestamp: NOW_MICROS - age_ms * 1000,
            message: message.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn replace_evicts_previous() {
        let slot = PendingSlot::new();
        assert!(slot.evict_and_replace(entry("a", 0)).await.is_none());

        let evicted = slot.evict_and_replace(entry("b", 0)).await.unwrap();
        assert_eq!(evicted.message, "a");
        assert_eq!(slot.take().await.unwrap().message, "b");
        assert!(!slot.is_occupied().await);
    }

    #[tokio::test]
    async fn fresh_entry_stays() {
        let slot = PendingSlot::new();
        slot.evict_and_replace(entry("fresh", 40)).await;

        assert!(slot.drain_if_stale(now(), Duration::from_millis(100)).await.is_none());
        assert!(slot.is_occupied().await);
    }

    #[tokio::test]
    async fn stale_entry_is_drained() {
        let slot = PendingSlot::new();
        slot.evict_and_replace(entry("stale", 5_000)).await;

        let drained = slot.drain_if_stale(now(), Duration::from_millis(100)).await;
        assert_eq!(drained.unwrap().message, "stale");
        assert!(!slot.is_occupied().await);
    }

    #[tokio::test]
    async fn exact_threshold_is_not_stale() {
        let slot = PendingSlot::new();
        slot.evict_and_replace(entry("edge", 100)).await;
        assert!(slot.drain_if_stale(now(), Duration::from_millis(100)).await.is_none());
    }

    #[tokio::test]
    async fn future_entry_is_never_stale() {
        let slot = PendingSlot::new();
        slot.evict_and_replace(entry("future", -60_000)).await;
        assert!(slot.drain_if_stale(now(), Duration::from_millis(100)).await.is_none());
    }

    #[tokio::test]
    async fn empty_slot_drains_nothing() {
        let slot = PendingSlot::new();
        assert!(slot.drain_if_stale(now(), Duration::ZERO).await.is_none());
        assert!(slot.take().await.is_none());
    }
}
