//! Journal source abstraction: a stream of raw JSON lines.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};

use crate::error::{LogError, LogResult};

/// Arguments always passed to `journalctl`, ahead of the caller's filters.
pub const JOURNALCTL_BASE_ARGS: &[&str] = &["--all", "--output=json"];

/// A line-oriented source of journal records.
///
/// Enables mocking in tests without spawning `journalctl`.
#[async_trait]
pub trait JournalSource: Send {
    /// Read the next raw line. `Ok(None)` means the source is exhausted.
    async fn next_line(&mut self) -> LogResult<Option<String>>;

    /// Called once after the last line; reaps the producer.
    async fn finish(&mut self) -> LogResult<()>;

    /// Called on a fatal read error; terminates the producer.
    async fn abort(&mut self);
}

/// Reads `journalctl --all --output=json` output from a child process.
///
/// The child's stderr is inherited, so its diagnostics reach the operator
/// unmodified.
pub struct JournalctlSource {
    child: Child,
    stdout: BufReader<ChildStdout>,
    buf: Vec<u8>,
}

impl JournalctlSource {
    /// Spawn `program` with the base arguments followed by `args`.
    pub fn spawn(program: &str, args: &[String]) -> LogResult<Self> {
        let mut child = Command::new(program)
            .args(JOURNALCTL_BASE_ARGS)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LogError::Spawn {
                program: program.to_string(),
                message: e.to_string(),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LogError::Other(format!("{program}: stdout was not captured")))?;

        tracing::info!(program, pid = ?child.id(), "journal source started");

        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
            buf: Vec::with_capacity(4096),
        })
    }
}

#[async_trait]
impl JournalSource for JournalctlSource {
    async fn next_line(&mut self) -> LogResult<Option<String>> {
        self.buf.clear();
        let read = self
            .stdout
            .read_until(b'\n', &mut self.buf)
            .await
            .map_err(|e| LogError::Io(e.to_string()))?;
        if read == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&self.buf);
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    async fn finish(&mut self) -> LogResult<()> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| LogError::Io(e.to_string()))?;
        if status.success() {
            tracing::info!("journal source exited");
        } else {
            tracing::warn!(status = %status, "journal source exited with failure");
        }
        Ok(())
    }

    async fn abort(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!(error = %e, "failed to kill journal source");
        }
    }
}
