//! Clap derive structures for the `tby` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tby -- bring port-forward tunnels up and down by index
#[derive(Debug, Parser)]
#[command(
    name = "tby",
    version,
    about = "Bring SSH and Kubernetes port-forward tunnels up and down",
    long_about = "tby manages the tunnels listed in tby.yml.\n\n\
        Each tunnel is a long-lived `tsh ssh -NL` or `kubectl port-forward`\n\
        process. tby keeps no state of its own: it finds running tunnels\n\
        by their command line on every invocation.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to <config dir>/tby/tby.yml)
    #[arg(long, env = "TBY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect tunnel ID
    Up(TunnelArgs),

    /// Deactivate an active tunnel
    Down(TunnelArgs),

    /// Show whether tunnel ID is up
    Status(TunnelArgs),

    /// Print the tunnel's local port (for other scripts)
    Port(TunnelArgs),

    /// Print the tunnel's local host:port (for other scripts)
    Host(TunnelArgs),

    /// List configured tunnels
    #[command(alias = "ls")]
    List,

    /// Inspect the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Tunnel Arguments ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TunnelArgs {
    /// Tunnel index as shown by `tby list` (0-based)
    #[arg(value_name = "ID")]
    pub id: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved config file path
    Path,

    /// Print the decoded tunnels with their process signatures
    Show,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
