//! Idle flusher.
//!
//! Wakes every poll interval and delivers the pending entry once its real
//! timestamp is older than the quiescence threshold, so the last entry of a
//! burst does not wait for a successor that may never come.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jg_gelf_channel::Transport;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::delivery::Deliverer;
use crate::slot::PendingSlot;

/// Wall-clock source the staleness check compares entry timestamps against.
pub type Clock = dyn Fn() -> DateTime<Utc> + Send + Sync;

/// Run until `shutdown` changes or its sender goes away.
///
/// A delivery in progress is always completed before the shutdown signal
/// is looked at. Returns the number of entries flushed.
pub async fn run<T: Transport>(
    slot: &PendingSlot,
    deliverer: &Deliverer<T>,
    interval: Duration,
    threshold: Duration,
    clock: &Clock,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the first tick (fires immediately).
    ticker.tick().await;

    let mut flushed = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }

        if let Some(entry) = slot.drain_if_stale(clock(), threshold).await {
            tracing::debug!(facility = %entry.facility(), "flushing idle entry");
            deliverer.deliver(entry).await;
            flushed += 1;
        }
    }

    tracing::debug!(flushed, "idle flusher stopped");
    flushed
}

#[cfg(test)]
mod tests {
    use super::*;
    use jg_gelf_channel::MockTransport;
    use jg_journal::LogEntry;

    fn entry(message: &str, realtime_timestamp: i64) -> LogEntry {
        LogEntry {
            realtime_timestamp,
            message: message.into(),
            ..Default::default()
        }
    }

    fn micros_from_now(offset_secs: i64) -> i64 {
        Utc::now().timestamp_micros() + offset_secs * 1_000_000
    }

    #[tokio::test(start_paused = true)]
    async fn flushes_stale_entry_within_one_poll() {
        let slot = PendingSlot::new();
        let deliverer = Deliverer::new(MockTransport::new(), Duration::from_secs(15));
        slot.evict_and_replace(entry("idle", micros_from_now(-60))).await;

        let (tx, rx) = watch::channel(false);
        let flusher = run(
            &slot,
            &deliverer,
            Duration::from_millis(50),
            Duration::from_millis(100),
            &Utc::now,
            rx,
        );
        let stopper = async {
            time::sleep(Duration::from_millis(60)).await;
            assert_eq!(deliverer.transport().sent_messages(), vec!["idle"]);
            tx.send(true).unwrap();
        };

        let (flushed, ()) = tokio::join!(flusher, stopper);
        assert_eq!(flushed, 1);
        assert!(!slot.is_occupied().await);
    }

    /// Wall clock that advances with tokio's paused time.
    fn paused_clock(origin: DateTime<Utc>) -> impl Fn() -> DateTime<Utc> + Send + Sync {
        let start = time::Instant::now();
        move || origin + chrono::Duration::from_std(start.elapsed()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_entry_is_flushed_one_poll_after_quiescence() {
        let origin = Utc::now();
        let clock = paused_clock(origin);
        let slot = PendingSlot::new();
        let deliverer = Deliverer::new(MockTransport::new(), Duration::from_secs(15));
        slot.evict_and_replace(entry("fresh", origin.timestamp_micros()))
            .await;

        let (tx, rx) = watch::channel(false);
        let flusher = run(
            &slot,
            &deliverer,
            Duration::from_millis(50),
            Duration::from_millis(100),
            &clock,
            rx,
        );
        let stopper = async {
            time::sleep(Duration::from_millis(99)).await;
            assert!(deliverer.transport().sent().is_empty());
            time::sleep(Duration::from_millis(52)).await;
            assert_eq!(deliverer.transport().sent_messages(), vec!["fresh"]);
            tx.send(true).unwrap();
        };

        let (flushed, ()) = tokio::join!(flusher, stopper);
        assert_eq!(flushed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn leaves_future_entry_in_place() {
        let slot = PendingSlot::new();
        let deliverer = Deliverer::new(MockTransport::new(), Duration::from_secs(15));
        slot.evict_and_replace(entry("later", micros_from_now(3600))).await;

        let (tx, rx) = watch::channel(false);
        let flusher = run(
            &slot,
            &deliverer,
            Duration::from_millis(50),
            Duration::from_millis(100),
            &Utc::now,
            rx,
        );
        let stopper = async {
            time::sleep(Duration::from_secs(1)).await;
            tx.send(true).unwrap();
        };

        let (flushed, ()) = tokio::join!(flusher, stopper);
        assert_eq!(flushed, 0);
        assert!(slot.is_occupied().await);
        assert!(deliverer.transport().sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_sender_dropped() {
        let slot = PendingSlot::new();
        let deliverer = Deliverer::new(MockTransport::new(), Duration::from_secs(15));
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let flushed = run(
            &slot,
            &deliverer,
            Duration::from_millis(50),
            Duration::from_millis(100),
            &Utc::now,
            rx,
        )
        .await;
        assert_eq!(flushed, 0);
    }
}
