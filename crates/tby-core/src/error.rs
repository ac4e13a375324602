// ── Core error types ──
//
// Everything the tunnel core can fail with. Configuration problems are
// reported with the 0-based index of the offending record; process errors
// carry the signature or program involved so the CLI can explain them.

use std::process::ExitStatus;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration errors ─────────────────────────────────────────
    #[error("invalid tunnel configuration: {0}")]
    InvalidDocument(#[from] serde_yaml::Error),

    #[error("tunnel #{index}: record is not a mapping")]
    NotAMapping { index: usize },

    #[error("tunnel #{index}: invalid tunnel type '{found}'")]
    InvalidTunnelType { index: usize, found: String },

    #[error("tunnel #{index}: {source}")]
    InvalidRecord {
        index: usize,
        source: serde_yaml::Error,
    },

    #[error("tunnel #{index}: {field} is missing or zero")]
    MissingPort { index: usize, field: &'static str },

    #[error("no tunnel with id {index} ({count} configured)")]
    UnknownTunnel { index: usize, count: usize },

    // ── Process matching errors ──────────────────────────────────────
    #[error("no running process matches '{signature}'")]
    NotRunning { signature: String },

    #[error("failed to run {tool}: {source}")]
    ProcessLookup {
        tool: &'static str,
        source: std::io::Error,
    },

    #[error("{tool} failed with {status}: {stderr}")]
    LookupFailed {
        tool: &'static str,
        status: ExitStatus,
        stderr: String,
    },

    // ── Launch errors ────────────────────────────────────────────────
    #[error("launch command is empty")]
    EmptyCommand,

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("failed to wait on {program}: {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited during startup with {status}")]
    ExitedEarly { program: String, status: ExitStatus },
}

impl CoreError {
    /// Record-level problems that the `skip` policy may drop instead of failing.
    pub fn is_skippable_record(&self) -> bool {
        matches!(
            self,
            Self::NotAMapping { .. } | Self::InvalidTunnelType { .. }
        )
    }
}
