mod cli;
mod commands;
mod error;
mod output;

use std::any::Any;

use clap::Parser;
use tokio::task::JoinError;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);
    install_panic_hook();

    if let Err(err) = supervise(run(cli)).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Panics are reported once, as `CliError::Internal`; the location only shows at `-vv`.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::debug!(%info, "command panicked");
    }));
}

/// Run a command on its own task so a panic surfaces as an internal error.
async fn supervise<F>(command: F) -> Result<(), CliError>
where
    F: Future<Output = Result<(), CliError>> + Send + 'static,
{
    match tokio::spawn(command).await {
        Ok(result) => result,
        Err(join) => Err(CliError::Internal {
            message: join_message(join),
        }),
    }
}

fn join_message(err: JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => panic_message(payload.as_ref()),
        Err(err) => err.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic with a non-string payload".to_owned()
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands report on the file itself
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "tby", &mut std::io::stdout());
            Ok(())
        }

        // All other commands act on the decoded tunnel list
        cmd => {
            let config = commands::load(&cli.global)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &config, &cli.global).await
        }
    }
}
