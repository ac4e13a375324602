//! Process identity matching.
//!
//! No handle to a forwarding process survives the CLI invocation that
//! started it. The only join key between a configured tunnel and a live
//! process is the tunnel's signature: the launch argument vector joined by
//! spaces. [`ProcessTable`] is the seam over the OS process table;
//! [`Pgrep`] implements it with `pgrep -f` / `pkill -f`.
//!
//! Matching is a substring search, so two tunnels whose signatures overlap
//! (e.g. `root@db` and `root@db2` on the same ports) can alias each other.

mod launch;

use std::process::{Command, Output, Stdio};

use tracing::debug;

use crate::error::CoreError;

pub use launch::{GRACE_WINDOW, LaunchOutcome, launch};

/// Processes whose command line contains a signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessMatch {
    pub pids: Vec<u32>,
}

/// Search and signal processes by command-line signature.
pub trait ProcessTable {
    /// Find running processes whose command line contains `signature`.
    ///
    /// Returns [`CoreError::NotRunning`] when nothing matches.
    fn find(&self, signature: &str) -> Result<ProcessMatch, CoreError>;

    /// Send a termination request to every process matching `signature`.
    ///
    /// Returns [`CoreError::NotRunning`] when nothing matches.
    fn terminate(&self, signature: &str) -> Result<(), CoreError>;
}

impl<T: ProcessTable + ?Sized> ProcessTable for &T {
    fn find(&self, signature: &str) -> Result<ProcessMatch, CoreError> {
        (**self).find(signature)
    }

    fn terminate(&self, signature: &str) -> Result<(), CoreError> {
        (**self).terminate(signature)
    }
}

// ── pgrep / pkill ───────────────────────────────────────────────────

/// The host process table, queried through procps' `pgrep` and `pkill`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pgrep;

impl Pgrep {
    fn run(tool: &'static str, signature: &str) -> Result<Output, CoreError> {
        let pattern = exact_pattern(signature);
        debug!("running: {tool} -f '{pattern}'");

        let output = Command::new(tool)
            .arg("-f")
            .arg(&pattern)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CoreError::ProcessLookup { tool, source })?;

        // 0: matched, 1: nothing matched, anything else: the tool itself failed.
        match output.status.code() {
            Some(0) => Ok(output),
            Some(1) => Err(CoreError::NotRunning {
                signature: signature.to_owned(),
            }),
            _ => Err(CoreError::LookupFailed {
                tool,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            }),
        }
    }
}

impl ProcessTable for Pgrep {
    fn find(&self, signature: &str) -> Result<ProcessMatch, CoreError> {
        let output = Self::run("pgrep", signature)?;
        Ok(ProcessMatch {
            pids: parse_pids(&String::from_utf8_lossy(&output.stdout)),
        })
    }

    fn terminate(&self, signature: &str) -> Result<(), CoreError> {
        Self::run("pkill", signature).map(|_| ())
    }
}

/// Escape regex metacharacters so `pgrep -f` matches the signature literally.
pub fn exact_pattern(signature: &str) -> String {
    let mut out = String::with_capacity(signature.len());
    for c in signature.chars() {
        if matches!(
            c,
            '\\' | '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn parse_pids(stdout: &str) -> Vec<u32> {
    stdout
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect()
}
