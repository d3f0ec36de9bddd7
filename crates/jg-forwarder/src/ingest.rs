//! Ingest loop: read journal lines, parse, normalize, coalesce.

use std::time::Duration;

use jg_gelf_channel::Transport;
use jg_journal::{JournalSource, LogResult, RuleSet, parse_line};
use tokio::time;

use crate::delivery::Deliverer;
use crate::slot::PendingSlot;

/// Counters for one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Lines read from the source.
    pub lines: u64,
    /// Lines that parsed into an entry.
    pub entries: u64,
    /// Lines discarded as unparseable.
    pub dropped: u64,
    /// Entries delivered because a successor displaced them.
    pub evicted: u64,
}

/// Consume `source` until it ends.
///
/// Each parsed entry replaces the pending one; the displaced entry is
/// delivered before the next line is read. A read error aborts the source
/// and is returned without delivering the pending entry.
pub async fn run<S, T>(
    source: &mut S,
    rules: &RuleSet,
    slot: &PendingSlot,
    deliverer: &Deliverer<T>,
    pause: Duration,
) -> LogResult<IngestStats>
where
    S: JournalSource + ?Sized,
    T: Transport,
{
    let mut stats = IngestStats::default();

    loop {
        let line = match source.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, lines = stats.lines, "journal read failed");
                source.abort().await;
                return Err(e);
            }
        };
        stats.lines += 1;

        match parse_line(&line) {
            Some(mut entry) => {
                rules.normalize(&mut entry);
                stats.entries += 1;
                if let Some(previous) = slot.evict_and_replace(entry).await {
                    stats.evicted += 1;
                    deliverer.deliver(previous).await;
                }
            }
            None => {
                stats.dropped += 1;
                tracing::debug!(line = stats.lines, "skipping unparseable journal line");
            }
        }

        if !pause.is_zero() {
            time::sleep(pause).await;
        }
    }

    source.finish().await?;
    tracing::info!(
        lines = stats.lines,
        entries = stats.entries,
        dropped = stats.dropped,
        "journal source drained"
    );
    Ok(stats)
}
