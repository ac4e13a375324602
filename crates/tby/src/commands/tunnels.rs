//! Tunnel command handlers.

use serde::Serialize;
use tabled::Tabled;
use tracing::{info, warn};

use tby_core::{
    Controller, CoreError, Forward, LaunchOutcome, ProcessTable, Tunnel, TunnelKind, Tunnels,
    UpOutcome,
};

use crate::cli::{GlobalOpts, TunnelArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── List entries ────────────────────────────────────────────────────

/// One `list` line as emitted by the structured output formats.
#[derive(Debug, Serialize)]
struct TunnelEntry {
    id: usize,
    #[serde(rename = "type")]
    kind: TunnelKind,
    name: String,
    local_port: u16,
    remote_port: u16,
    status: &'static str,
}

impl TunnelEntry {
    fn probe<P: ProcessTable>(controller: &Controller<P>, id: usize, tunnel: &Tunnel) -> Self {
        Self {
            id,
            kind: tunnel.kind(),
            name: tunnel.name(),
            local_port: tunnel.local_port(),
            remote_port: tunnel.remote_port(),
            status: controller.status(tunnel),
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TunnelRow {
    #[tabled(rename = "Id")]
    id: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl TunnelRow {
    fn from_entry(entry: &TunnelEntry, color: bool) -> Self {
        Self {
            id: entry.id,
            name: entry.name.clone(),
            port: format!("{}:{}", entry.local_port, entry.remote_port),
            status: output::paint_status(entry.status, color),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

fn started_message(id: usize, tunnel: &Tunnel, outcome: LaunchOutcome) -> String {
    let port = tunnel.local_port();
    match outcome {
        LaunchOutcome::Detached { .. } => {
            format!("Tunnel {id} ({}) is up on port {port}", tunnel.name())
        }
        LaunchOutcome::ExitedCleanly => format!(
            "Tunnel {id} ({}) exited right after starting; nothing is listening on port {port}",
            tunnel.name()
        ),
    }
}

pub async fn up<P: ProcessTable>(
    controller: &Controller<P>,
    tunnels: &Tunnels,
    args: &TunnelArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (id, tunnel) = util::lookup(tunnels, &args.id)?;
    let port = tunnel.local_port();

    match controller.ensure_up(tunnel).await {
        Ok(UpOutcome::AlreadyUp) => {
            warn!("Tunnel {id} on port {port} is already up");
        }
        Ok(UpOutcome::Started(outcome)) => {
            if let LaunchOutcome::Detached { pid } = outcome {
                info!(?pid, "Connected to tunnel {id} on port {port}");
            }
            if !global.quiet {
                eprintln!("{}", started_message(id, tunnel, outcome));
            }
        }
        Err(source) => return Err(CliError::LaunchFailed { id, port, source }),
    }
    Ok(())
}

pub fn down<P: ProcessTable>(
    controller: &Controller<P>,
    tunnels: &Tunnels,
    args: &TunnelArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (id, tunnel) = util::lookup(tunnels, &args.id)?;

    match controller.down(tunnel) {
        Ok(()) => {
            if !global.quiet {
                eprintln!("Tunnel {id} ({}) is down", tunnel.name());
            }
            Ok(())
        }
        Err(CoreError::NotRunning { .. }) => Err(CliError::NotRunning {
            id,
            name: tunnel.name(),
        }),
        Err(source) => Err(CliError::StopFailed { id, source }),
    }
}

pub fn status<P: ProcessTable>(
    controller: &Controller<P>,
    tunnels: &Tunnels,
    args: &TunnelArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (_, tunnel) = util::lookup(tunnels, &args.id)?;
    let state = if controller.is_up(tunnel) { "up" } else { "down" };
    output::print_output(state, global.quiet);
    Ok(())
}

pub fn port(tunnels: &Tunnels, args: &TunnelArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (_, tunnel) = util::lookup(tunnels, &args.id)?;
    output::print_output(&tunnel.local_port().to_string(), global.quiet);
    Ok(())
}

pub fn host(tunnels: &Tunnels, args: &TunnelArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (_, tunnel) = util::lookup(tunnels, &args.id)?;
    output::print_output(&format!("localhost:{}", tunnel.local_port()), global.quiet);
    Ok(())
}

pub fn list<P: ProcessTable>(
    controller: &Controller<P>,
    tunnels: &Tunnels,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let entries: Vec<TunnelEntry> = tunnels
        .iter()
        .enumerate()
        .map(|(id, tunnel)| TunnelEntry::probe(controller, id, tunnel))
        .collect();

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &entries,
        |e| TunnelRow::from_entry(e, color),
        |e| e.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
