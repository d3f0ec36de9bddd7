//! Forwarder configuration: endpoint and journal filters from the command
//! line, tuning knobs from an optional TOML file.

use std::time::Duration;

use jg_gelf_channel::{Compression, GelfConfig};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an optional TOML tuning file.
pub const CONFIG_ENV: &str = "JOURNAL_GELF_CONFIG";

/// Errors that make the configuration unusable. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "missing GELF endpoint: pass host:port as the first argument, followed by journalctl parameters"
    )]
    MissingEndpoint,

    #[error("invalid GELF endpoint {0:?}: expected host:port")]
    InvalidEndpoint(String),

    #[error("invalid setting: {0}")]
    Invalid(String),

    #[error("cannot read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("cannot parse config {path}: {message}")]
    Parse { path: String, message: String },
}

/// Tuning knobs, all optional in the TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tuning {
    /// Program spawned as the journal source.
    #[serde(default = "default_journalctl_path")]
    pub journalctl_path: String,
    /// How often the idle flusher checks the pending slot.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Age after which a pending entry is flushed without waiting for a successor.
    #[serde(default = "default_quiescence")]
    pub quiescence_ms: u64,
    /// Pause between delivery attempts of a failing entry.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: u64,
    /// Pause after each ingested line. Zero disables it.
    #[serde(default = "default_ingest_pause")]
    pub ingest_pause_ms: u64,
    /// Largest GELF datagram, chunk header included.
    #[serde(default = "jg_gelf_channel::config::default_chunk_size")]
    pub chunk_size: usize,
    /// `gzip` or `none`.
    #[serde(default)]
    pub compression: Compression,
}

fn default_journalctl_path() -> String {
    "journalctl".to_string()
}

fn default_poll_interval() -> u64 {
    50
}

fn default_quiescence() -> u64 {
    100
}

fn default_retry_backoff() -> u64 {
    15
}

fn default_ingest_pause() -> u64 {
    1
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            journalctl_path: default_journalctl_path(),
            poll_interval_ms: default_poll_interval(),
            quiescence_ms: default_quiescence(),
            retry_backoff_secs: default_retry_backoff(),
            ingest_pause_ms: default_ingest_pause(),
            chunk_size: jg_gelf_channel::config::default_chunk_size(),
            compression: Compression::default(),
        }
    }
}

impl Tuning {
    /// Load tuning from a TOML file path.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Timings the pipeline runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub poll_interval: Duration,
    pub quiescence: Duration,
    pub retry_backoff: Duration,
    pub ingest_pause: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&Tuning::default())
    }
}

impl From<&Tuning> for PipelineSettings {
    fn from(tuning: &Tuning) -> Self {
        Self {
            poll_interval: Duration::from_millis(tuning.poll_interval_ms),
            quiescence: Duration::from_millis(tuning.quiescence_ms),
            retry_backoff: Duration::from_secs(tuning.retry_backoff_secs),
            ingest_pause: Duration::from_millis(tuning.ingest_pause_ms),
        }
    }
}

/// Top-level configuration for the forwarder.
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Where envelopes go.
    pub gelf: GelfConfig,
    /// Passed to journalctl verbatim, after `--all --output=json`.
    pub journal_args: Vec<String>,
    pub tuning: Tuning,
}

impl ForwarderConfig {
    /// Build from command-line arguments (program name excluded) and an
    /// optional tuning file.
    pub fn load<I>(args: I, config_path: Option<&str>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let tuning = match config_path {
            Some(path) => Tuning::from_file(path)?,
            None => Tuning::default(),
        };
        Self::from_args(args, tuning)
    }

    /// First argument is the endpoint, the rest are journal filters.
    pub fn from_args<I>(args: I, tuning: Tuning) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let endpoint = args
            .next()
            .filter(|e| !e.is_empty())
            .ok_or(ConfigError::MissingEndpoint)?;

        let config = Self {
            gelf: GelfConfig {
                endpoint,
                chunk_size: tuning.chunk_size,
                compression: tuning.compression,
            },
            journal_args: args.collect(),
            tuning,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings::from(&self.tuning)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let port = self
            .gelf
            .endpoint
            .rsplit_once(':')
            .filter(|(host, _)| !host.is_empty())
            .and_then(|(_, port)| port.parse::<u16>().ok());
        if !matches!(port, Some(p) if p != 0) {
            return Err(ConfigError::InvalidEndpoint(self.gelf.endpoint.clone()));
        }
        if self.tuning.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.gelf.chunk_size <= jg_gelf_channel::chunk::CHUNK_HEADER_LEN {
            return Err(ConfigError::Invalid(format!(
                "chunk_size must exceed the {}-byte chunk header",
                jg_gelf_channel::chunk::CHUNK_HEADER_LEN
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn endpoint_and_pass_through_args() {
        let config = ForwarderConfig::from_args(
            args(&["graylog:12201", "-u", "nginx.service", "--since=-1h"]),
            Tuning::default(),
        )
        .unwrap();
        assert_eq!(config.gelf.endpoint, "graylog:12201");
        assert_eq!(config.journal_args, vec!["-u", "nginx.service", "--since=-1h"]);
        assert_eq!(config.gelf.chunk_size, 1420);
    }

    #[test]
    fn filters_are_optional() {
        let config =
            ForwarderConfig::from_args(args(&["10.0.0.5:12201"]), Tuning::default()).unwrap();
        assert!(config.journal_args.is_empty());
    }

    #[test]
    fn missing_endpoint_is_an_error() {
        let err = ForwarderConfig::from_args(Vec::new(), Tuning::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEndpoint));

        let err = ForwarderConfig::from_args(args(&[""]), Tuning::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEndpoint));
    }

    #[test]
    fn endpoint_needs_a_port() {
        for bad in ["graylog", "graylog:", ":12201", "graylog:http", "graylog:0"] {
            let err = ForwarderConfig::from_args(args(&[bad]), Tuning::default()).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidEndpoint(_)),
                "accepted {bad:?}"
            );
        }
        assert!(ForwarderConfig::from_args(args(&["[::1]:12201"]), Tuning::default()).is_ok());
    }

    #[test]
    fn default_settings() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.poll_interval, Duration::from_millis(50));
        assert_eq!(settings.quiescence, Duration::from_millis(100));
        assert_eq!(settings.retry_backoff, Duration::from_secs(15));
        assert_eq!(settings.ingest_pause, Duration::from_millis(1));
    }

    #[test]
    fn deserialize_partial_tuning() {
        let toml = r#"
quiescence_ms = 250
retry_backoff_secs = 5
"#;
        let tuning: Tuning = toml::from_str(toml).unwrap();
        assert_eq!(tuning.quiescence_ms, 250);
        assert_eq!(tuning.retry_backoff_secs, 5);
        assert_eq!(tuning.poll_interval_ms, 50); // default
        assert_eq!(tuning.journalctl_path, "journalctl"); // default
        assert_eq!(tuning.compression, Compression::Gzip); // default
    }

    #[test]
    fn deserialize_full_tuning() {
        let toml = r#"
journalctl_path = "/usr/bin/journalctl"
poll_interval_ms = 20
quiescence_ms = 80
retry_backoff_secs = 30
ingest_pause_ms = 0
chunk_size = 8154
compression = "none"
"#;
        let tuning: Tuning = toml::from_str(toml).unwrap();
        let config =
            ForwarderConfig::from_args(args(&["graylog:12201"]), tuning.clone()).unwrap();
        assert_eq!(config.gelf.chunk_size, 8154);
        assert_eq!(config.gelf.compression, Compression::None);
        assert_eq!(config.tuning.journalctl_path, "/usr/bin/journalctl");
        assert!(config.pipeline_settings().ingest_pause.is_zero());
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let tuning = Tuning {
            poll_interval_ms: 0,
            ..Tuning::default()
        };
        let err = ForwarderConfig::from_args(args(&["graylog:12201"]), tuning).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn tiny_chunk_size_rejected() {
        let tuning = Tuning {
            chunk_size: 12,
            ..Tuning::default()
        };
        let err = ForwarderConfig::from_args(args(&["graylog:12201"]), tuning).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_config_file_is_reported() {
        let err = ForwarderConfig::load(args(&["graylog:12201"]), Some("/nonexistent/jg.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
