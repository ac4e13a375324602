use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::signature;

/// How long a freshly started forward must survive to count as up.
pub const GRACE_WINDOW: Duration = Duration::from_secs(1);

/// Result of a launch that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Still running after the grace window; left to run on its own.
    Detached { pid: Option<u32> },
    /// Exited with a success status inside the grace window.
    ExitedCleanly,
}

/// Start `args` and race its exit against `grace`.
///
/// An exit inside the window is the launch result: a failure status becomes
/// [`CoreError::ExitedEarly`]. A child still running when the timer fires is
/// detached: stdio goes to null, and on Unix it gets its own process group
/// so signals aimed at the CLI's terminal do not reach it.
pub async fn launch(args: &[String], grace: Duration) -> Result<LaunchOutcome, CoreError> {
    let (program, rest) = args.split_first().ok_or(CoreError::EmptyCommand)?;
    debug!("starting: {}", signature(args));

    let mut command = Command::new(program);
    command
        .args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(|source| CoreError::Spawn {
        program: program.clone(),
        source,
    })?;
    let pid = child.id();

    // Whichever finishes first decides; the other future is dropped. A
    // dropped wait leaves the child running and tokio reaps it if it exits
    // while the runtime is still alive.
    tokio::select! {
        status = child.wait() => {
            let status = status.map_err(|source| CoreError::Wait {
                program: program.clone(),
                source,
            })?;
            if status.success() {
                warn!(program = %program, "forwarding process exited immediately with success");
                Ok(LaunchOutcome::ExitedCleanly)
            } else {
                Err(CoreError::ExitedEarly {
                    program: program.clone(),
                    status,
                })
            }
        }
        () = tokio::time::sleep(grace) => {
            debug!(?pid, "forwarding process survived grace window");
            Ok(LaunchOutcome::Detached { pid })
        }
    }
}
