//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use tby_core::{Forward, Tunnel, TunnelKind};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{load, resolve_path};

/// A decoded tunnel together with the command line that identifies it.
#[derive(Debug, Serialize)]
struct ResolvedTunnel {
    id: usize,
    #[serde(rename = "type")]
    kind: TunnelKind,
    name: String,
    port: String,
    signature: String,
}

impl ResolvedTunnel {
    fn new(id: usize, tunnel: &Tunnel) -> Self {
        Self {
            id,
            kind: tunnel.kind(),
            name: tunnel.name(),
            port: tunnel.port_mapping(),
            signature: tunnel.signature(),
        }
    }
}

#[derive(Tabled)]
struct ResolvedRow {
    #[tabled(rename = "Id")]
    id: usize,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Command")]
    signature: String,
}

impl ResolvedRow {
    fn new(t: &ResolvedTunnel) -> Self {
        Self {
            id: t.id,
            kind: t.kind.to_string(),
            name: t.name.clone(),
            port: t.port.clone(),
            signature: t.signature.clone(),
        }
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = resolve_path(global)?;
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let config = load(global)?;
            let resolved: Vec<ResolvedTunnel> = config
                .tunnels
                .iter()
                .enumerate()
                .map(|(id, t)| ResolvedTunnel::new(id, t))
                .collect();
            let out = output::render_list(
                &global.output,
                &resolved,
                ResolvedRow::new,
                |t| t.signature.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
