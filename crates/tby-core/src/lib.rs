//! Tunnel lifecycle core for `tby`.
//!
//! `tby` keeps no daemon and no registry of the processes it starts. Every
//! invocation rebuilds its view of the world from configuration and the OS
//! process table:
//!
//! - **Descriptors** ([`model`]): immutable, per-kind tunnel data
//!   ([`SshForward`], [`K8sPortForward`]) behind the [`Forward`] capability
//!   trait and the closed [`Tunnel`] enum.
//! - **Decoder** ([`decode`]): turns the `tunnels` list of a YAML document
//!   into an ordered [`Tunnels`] collection, choosing the concrete kind by the
//!   `type` discriminator and accepting legacy camelCase field names.
//! - **Process matching** ([`process`]): the launch argument vector joined by
//!   spaces is the tunnel's *signature*; a [`ProcessTable`] finds and signals
//!   live processes by it.
//! - **[`Controller`]**: liveness, start (with a one second grace window) and
//!   stop, built on top of a [`ProcessTable`].

pub mod controller;
pub mod decode;
pub mod error;
pub mod model;
pub mod process;

// ── Primary re-exports ──────────────────────────────────────────────
pub use controller::{Controller, UpOutcome};
pub use decode::{Document, RecordPolicy};
pub use error::CoreError;
pub use model::{Forward, K8sPortForward, SshForward, Tunnel, TunnelKind, Tunnels};
pub use process::{GRACE_WINDOW, LaunchOutcome, Pgrep, ProcessMatch, ProcessTable};
