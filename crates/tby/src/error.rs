//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with help text and
//! a stable process exit code.

use miette::Diagnostic;
use thiserror::Error;

use tby_config::ConfigError;
use tby_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const LAUNCH: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Arguments ────────────────────────────────────────────────────
    #[error("Failed to parse ID '{input}'")]
    #[diagnostic(
        code(tby::invalid_id),
        help("IDs are the 0-based indexes shown by: tby list")
    )]
    InvalidId { input: String },

    #[error("Tunnel {id} not found ({count} configured)")]
    #[diagnostic(
        code(tby::tunnel_not_found),
        help("Run: tby list to see configured tunnels")
    )]
    TunnelNotFound { id: usize, count: usize },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Failed to connect to tunnel {id} on port {port}")]
    #[diagnostic(
        code(tby::launch_failed),
        help("The forwarding process exited within the startup grace window.\nRun the command from `tby config show` by hand to see its output.")
    )]
    LaunchFailed {
        id: usize,
        port: u16,
        #[source]
        source: CoreError,
    },

    #[error("Tunnel {id} ({name}) is not running")]
    #[diagnostic(
        code(tby::not_running),
        help("There is nothing to deactivate. Check with: tby list")
    )]
    NotRunning { id: usize, name: String },

    #[error("Failed to deactivate tunnel {id}")]
    #[diagnostic(code(tby::stop_failed))]
    StopFailed {
        id: usize,
        #[source]
        source: CoreError,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Can't find user config directory")]
    #[diagnostic(
        code(tby::no_config_dir),
        help("Pass --config <PATH> or set TBY_CONFIG.")
    )]
    NoConfigDir,

    #[error("Can't load tby config file {path}")]
    #[diagnostic(
        code(tby::config_unreadable),
        help("Create the file with a `tunnels:` list, or point --config at one.")
    )]
    ConfigUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't parse tby config file")]
    #[diagnostic(
        code(tby::invalid_config),
        help("Each tunnel needs `type: ssh` or `type: k8s` plus its fields and non-zero ports.")
    )]
    InvalidConfig {
        #[source]
        source: CoreError,
    },

    #[error("Invalid config settings")]
    #[diagnostic(code(tby::settings))]
    Settings(#[source] Box<figment::Error>),

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Command failed unexpectedly: {message}")]
    #[diagnostic(code(tby::internal))]
    Internal { message: String },

    // ── Serialization ────────────────────────────────────────────────
    #[error("Failed to render JSON output: {0}")]
    #[diagnostic(code(tby::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML output: {0}")]
    #[diagnostic(code(tby::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidId { .. } => exit_code::USAGE,
            Self::TunnelNotFound { .. } | Self::NotRunning { .. } => exit_code::NOT_FOUND,
            Self::LaunchFailed { .. } => exit_code::LAUNCH,
            Self::NoConfigDir
            | Self::ConfigUnreadable { .. }
            | Self::InvalidConfig { .. }
            | Self::Settings(_) => exit_code::CONFIG,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoConfigDir => CliError::NoConfigDir,
            ConfigError::Read { path, source } => CliError::ConfigUnreadable {
                path: path.display().to_string(),
                source,
            },
            ConfigError::Settings(source) => CliError::Settings(source),
            ConfigError::Decode(source) => CliError::InvalidConfig { source },
        }
    }
}
