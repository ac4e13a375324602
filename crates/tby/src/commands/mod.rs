//! Command dispatch: bridges CLI args -> tunnel controller -> output formatting.

pub mod config_cmd;
pub mod tunnels;
pub mod util;

use std::path::PathBuf;

use tby_config::Config;
use tby_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Config file chosen by `--config` / `TBY_CONFIG`, else the default location.
pub fn resolve_path(global: &GlobalOpts) -> Result<PathBuf, CliError> {
    match &global.config {
        Some(path) => Ok(path.clone()),
        None => Ok(tby_config::config_path()?),
    }
}

/// Load and decode the active config file.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = resolve_path(global)?;
    Ok(tby_config::load_config(&path)?)
}

/// Dispatch a tunnel command to the appropriate handler.
pub async fn dispatch(cmd: Command, config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let controller = Controller::new();
    let tunnels = &config.tunnels;

    match cmd {
        Command::Up(args) => tunnels::up(&controller, tunnels, &args, global).await,
        Command::Down(args) => tunnels::down(&controller, tunnels, &args, global),
        Command::Status(args) => tunnels::status(&controller, tunnels, &args, global),
        Command::Port(args) => tunnels::port(tunnels, &args, global),
        Command::Host(args) => tunnels::host(tunnels, &args, global),
        Command::List => tunnels::list(&controller, tunnels, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
