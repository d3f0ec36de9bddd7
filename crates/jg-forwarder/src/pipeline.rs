//! The forwarding pipeline: ingest and idle flusher around one pending slot.

use chrono::{DateTime, Utc};
use jg_gelf_channel::Transport;
use jg_journal::{JournalSource, LogResult, RuleSet};
use tokio::sync::watch;

use crate::config::PipelineSettings;
use crate::delivery::Deliverer;
use crate::flusher::{self, Clock};
use crate::ingest::{self, IngestStats};
use crate::slot::PendingSlot;

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ingest: IngestStats,
    /// Entries the idle flusher delivered.
    pub idle_flushes: u64,
    /// Whether an entry was still pending when the source ended.
    pub final_flush: bool,
}

pub struct Forwarder<T> {
    slot: PendingSlot,
    deliverer: Deliverer<T>,
    rules: RuleSet,
    settings: PipelineSettings,
    clock: Box<Clock>,
}

impl<T: Transport> Forwarder<T> {
    pub fn new(transport: T, rules: RuleSet, settings: PipelineSettings) -> Self {
        Self {
            slot: PendingSlot::new(),
            deliverer: Deliverer::new(transport, settings.retry_backoff),
            rules,
            settings,
            clock: Box::new(Utc::now),
        }
    }

    /// Replace the wall clock the idle flusher ages entries by.
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn transport(&self) -> &T {
        self.deliverer.transport()
    }

    /// Forward everything `source` produces, then deliver the last pending
    /// entry.
    ///
    /// Once ingest has finished, the flusher is stopped after its delivery
    /// in progress has completed. On a read error the source is aborted, the
    /// flusher is dropped even if it is mid-retry, and the error returned;
    /// the pending entry is not delivered.
    pub async fn run<S>(&self, source: &mut S) -> LogResult<RunStats>
    where
        S: JournalSource + ?Sized,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let ingest = ingest::run(
            source,
            &self.rules,
            &self.slot,
            &self.deliverer,
            self.settings.ingest_pause,
        );
        let flush = flusher::run(
            &self.slot,
            &self.deliverer,
            self.settings.poll_interval,
            self.settings.quiescence,
            &*self.clock,
            shutdown_rx,
        );
        tokio::pin!(ingest, flush);

        let (ingest_result, flushed_early) = tokio::select! {
            result = &mut ingest => (result, None),
            // Only reachable if the shutdown channel closes under us.
            flushed = &mut flush => ((&mut ingest).await, Some(flushed)),
        };
        let ingest = match ingest_result {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "journal source failed, stopping idle flusher");
                return Err(e);
            }
        };

        let _ = shutdown_tx.send(true);
        let idle_flushes = match flushed_early {
            Some(flushed) => flushed,
            None => flush.await,
        };

        let final_flush = match self.slot.take().await {
            Some(entry) => {
                tracing::debug!(facility = %entry.facility(), "flushing final entry");
                self.deliverer.deliver(entry).await;
                true
            }
            None => false,
        };

        Ok(RunStats {
            ingest,
            idle_flushes,
            final_flush,
        })
    }
}
