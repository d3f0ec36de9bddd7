//! journal-gelf: follow the systemd journal and forward it to Graylog.
//!
//! Usage: `journal-gelf <host:port> [journalctl args...]`

use tracing_subscriber::EnvFilter;

use jg_forwarder::Forwarder;
use jg_forwarder::config::{CONFIG_ENV, ForwarderConfig};
use jg_gelf_channel::UdpTransport;
use jg_journal::{JournalctlSource, RuleSet};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "journal-gelf starting");

    // ── Load config ─────────────────────────────────────────────
    let config_path = std::env::var(CONFIG_ENV).ok();
    let config = ForwarderConfig::load(std::env::args().skip(1), config_path.as_deref())?;
    tracing::info!(
        endpoint = %config.gelf.endpoint,
        filters = ?config.journal_args,
        "config loaded"
    );

    // ── GELF transport ──────────────────────────────────────────
    let transport = UdpTransport::connect(&config.gelf).await?;

    // ── Journal source ──────────────────────────────────────────
    let mut source =
        JournalctlSource::spawn(&config.tuning.journalctl_path, &config.journal_args)?;

    // ── Forward until the journal ends ──────────────────────────
    let forwarder = Forwarder::new(
        transport,
        RuleSet::builtin().clone(),
        config.pipeline_settings(),
    );
    let stats = forwarder.run(&mut source).await?;

    tracing::info!(
        lines = stats.ingest.lines,
        entries = stats.ingest.entries,
        dropped = stats.ingest.dropped,
        idle_flushes = stats.idle_flushes,
        "journal-gelf stopped"
    );
    Ok(())
}
