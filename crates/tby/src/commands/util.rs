//! Shared helpers for command handlers.

use tby_core::{CoreError, Tunnel, Tunnels};

use crate::error::CliError;

/// Parse a tunnel ID argument as a 0-based index.
pub fn parse_id(input: &str) -> Result<usize, CliError> {
    input.trim().parse().map_err(|_| CliError::InvalidId {
        input: input.to_owned(),
    })
}

/// Parse `input` and fetch the tunnel at that index.
pub fn lookup<'a>(tunnels: &'a Tunnels, input: &str) -> Result<(usize, &'a Tunnel), CliError> {
    let id = parse_id(input)?;
    match tunnels.get(id) {
        Ok(tunnel) => Ok((id, tunnel)),
        Err(CoreError::UnknownTunnel { index, count }) => {
            Err(CliError::TunnelNotFound { id: index, count })
        }
        Err(other) => Err(CliError::InvalidConfig { source: other }),
    }
}
