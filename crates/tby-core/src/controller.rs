// ── Tunnel lifecycle controller ──
//
// A tunnel is `up` iff some process's command line contains its signature
// at the moment of the query. Nothing is remembered between invocations:
// `up` launches and forgets, `down` finds by signature and signals.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::Forward;
use crate::process::{self, GRACE_WINDOW, LaunchOutcome, Pgrep, ProcessMatch, ProcessTable};

/// Result of [`Controller::ensure_up`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpOutcome {
    /// A matching process was already running; nothing was launched.
    AlreadyUp,
    /// A new forwarding process was launched.
    Started(LaunchOutcome),
}

/// Liveness queries, start and stop for any [`Forward`].
#[derive(Debug, Clone)]
pub struct Controller<P = Pgrep> {
    table: P,
    grace: Duration,
}

impl Controller<Pgrep> {
    /// Controller over the host process table with the standard grace window.
    pub fn new() -> Self {
        Self::with_table(Pgrep)
    }
}

impl Default for Controller<Pgrep> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ProcessTable> Controller<P> {
    pub fn with_table(table: P) -> Self {
        Self {
            table,
            grace: GRACE_WINDOW,
        }
    }

    /// Override the launch grace window.
    pub fn grace_window(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn table(&self) -> &P {
        &self.table
    }

    /// Look up the processes serving `tunnel`.
    pub fn find<T: Forward + ?Sized>(&self, tunnel: &T) -> Result<ProcessMatch, CoreError> {
        self.table.find(&tunnel.signature())
    }

    /// Whether a process matching `tunnel`'s signature is running.
    ///
    /// Never fails: a lookup error counts as "not up".
    pub fn is_up<T: Forward + ?Sized>(&self, tunnel: &T) -> bool {
        match self.find(tunnel) {
            Ok(found) => {
                debug!(name = %tunnel.name(), pids = ?found.pids, "tunnel is up");
                true
            }
            Err(CoreError::NotRunning { .. }) => false,
            Err(err) => {
                warn!(name = %tunnel.name(), error = %err, "process lookup failed, treating tunnel as down");
                false
            }
        }
    }

    /// `"up"` when [`is_up`](Self::is_up), empty otherwise.
    pub fn status<T: Forward + ?Sized>(&self, tunnel: &T) -> &'static str {
        if self.is_up(tunnel) { "up" } else { "" }
    }

    /// Launch the forwarding process unconditionally.
    ///
    /// Callers wanting idempotency should use [`ensure_up`](Self::ensure_up).
    pub async fn up<T: Forward + ?Sized>(&self, tunnel: &T) -> Result<LaunchOutcome, CoreError> {
        info!(name = %tunnel.name(), port = tunnel.local_port(), "connecting tunnel");
        process::launch(&tunnel.launch_args(), self.grace).await
    }

    /// Launch unless a matching process is already running.
    pub async fn ensure_up<T: Forward + ?Sized>(&self, tunnel: &T) -> Result<UpOutcome, CoreError> {
        if self.is_up(tunnel) {
            debug!(name = %tunnel.name(), port = tunnel.local_port(), "already up, not launching");
            return Ok(UpOutcome::AlreadyUp);
        }
        self.up(tunnel).await.map(UpOutcome::Started)
    }

    /// Terminate every process matching `tunnel`'s signature.
    ///
    /// Fails with [`CoreError::NotRunning`] when there is nothing to stop.
    pub fn down<T: Forward + ?Sized>(&self, tunnel: &T) -> Result<(), CoreError> {
        info!(name = %tunnel.name(), port = tunnel.local_port(), "disconnecting tunnel");
        self.table.terminate(&tunnel.signature())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::{SshForward, TunnelKind};

    /// In-memory process table: a list of command lines.
    #[derive(Default)]
    struct FakeTable {
        procs: Mutex<Vec<String>>,
        broken: bool,
    }

    impl FakeTable {
        fn running(cmdlines: &[&str]) -> Self {
            Self {
                procs: Mutex::new(cmdlines.iter().map(|&c| c.to_owned()).collect()),
                broken: false,
            }
        }

        fn broken() -> Self {
            Self {
                broken: true,
                ..Self::default()
            }
        }

        fn count(&self) -> usize {
            self.procs.lock().unwrap().len()
        }

        fn check(&self) -> Result<(), CoreError> {
            if self.broken {
                return Err(CoreError::ProcessLookup {
                    tool: "pgrep",
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            Ok(())
        }
    }

    impl ProcessTable for FakeTable {
        fn find(&self, signature: &str) -> Result<ProcessMatch, CoreError> {
            self.check()?;
            let procs = self.procs.lock().unwrap();
            let pids: Vec<u32> = (1..)
                .zip(procs.iter())
                .filter(|(_, cmd)| cmd.contains(signature))
                .map(|(pid, _)| pid)
                .collect();
            if pids.is_empty() {
                return Err(CoreError::NotRunning {
                    signature: signature.to_owned(),
                });
            }
            Ok(ProcessMatch { pids })
        }

        fn terminate(&self, signature: &str) -> Result<(), CoreError> {
            self.check()?;
            let mut procs = self.procs.lock().unwrap();
            let before = procs.len();
            procs.retain(|cmd| !cmd.contains(signature));
            if procs.len() == before {
                return Err(CoreError::NotRunning {
                    signature: signature.to_owned(),
                });
            }
            Ok(())
        }
    }

    /// A forward whose launch command is an arbitrary local program.
    struct Scripted(Vec<&'static str>);

    impl Forward for Scripted {
        fn kind(&self) -> TunnelKind {
            TunnelKind::Ssh
        }

        fn name(&self) -> String {
            "scripted".into()
        }

        fn local_port(&self) -> u16 {
            1
        }

        fn remote_port(&self) -> u16 {
            2
        }

        fn launch_args(&self) -> Vec<String> {
            self.0.iter().map(|&a| a.to_owned()).collect()
        }
    }

    fn db() -> SshForward {
        SshForward {
            user: "root".into(),
            node_name: "db".into(),
            remote_port: 5432,
            local_port: 5432,
        }
    }

    const DB_CMDLINE: &str = "tsh ssh -NL 5432:localhost:5432 root@db";

    #[test]
    fn running_signature_is_up() {
        let ctl = Controller::with_table(FakeTable::running(&["bash", DB_CMDLINE]));
        assert!(ctl.is_up(&db()));
        assert_eq!(ctl.status(&db()), "up");
        assert_eq!(ctl.find(&db()).unwrap().pids, vec![2]);
    }

    #[test]
    fn absent_signature_is_down() {
        let ctl = Controller::with_table(FakeTable::running(&["bash"]));
        assert!(!ctl.is_up(&db()));
        assert_eq!(ctl.status(&db()), "");
    }

    #[test]
    fn lookup_failure_is_down_not_error() {
        let ctl = Controller::with_table(FakeTable::broken());
        assert!(!ctl.is_up(&db()));
        assert_eq!(ctl.status(&db()), "");
    }

    #[tokio::test]
    async fn ensure_up_on_running_tunnel_is_a_no_op() {
        let ctl = Controller::with_table(FakeTable::running(&[DB_CMDLINE]));
        let outcome = ctl.ensure_up(&db()).await.unwrap();
        assert_eq!(outcome, UpOutcome::AlreadyUp);
        assert_eq!(ctl.table().count(), 1);
    }

    #[tokio::test]
    async fn ensure_up_launches_when_down() {
        let ctl = Controller::with_table(FakeTable::default())
            .grace_window(Duration::from_millis(100));
        let outcome = ctl.ensure_up(&Scripted(vec!["sleep", "2"])).await.unwrap();
        assert!(matches!(
            outcome,
            UpOutcome::Started(LaunchOutcome::Detached { .. })
        ));
    }

    #[tokio::test]
    async fn up_surfaces_immediate_failure() {
        let ctl = Controller::with_table(FakeTable::default());
        let err = ctl
            .up(&Scripted(vec!["sh", "-c", "exit 255"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ExitedEarly { .. }));
    }

    #[test]
    fn down_without_process_fails() {
        let ctl = Controller::with_table(FakeTable::running(&["bash"]));
        assert!(matches!(
            ctl.down(&db()),
            Err(CoreError::NotRunning { .. })
        ));
    }

    #[test]
    fn down_removes_process_and_tunnel_reads_down() {
        let ctl = Controller::with_table(FakeTable::running(&["bash", DB_CMDLINE]));
        ctl.down(&db()).unwrap();
        assert!(!ctl.is_up(&db()));
        assert_eq!(ctl.table().count(), 1);
    }

    /// Runs against the host process table: `pgrep`/`pkill` must be installed.
    #[cfg(unix)]
    #[tokio::test]
    async fn host_process_table_lifecycle() {
        let sleeper = Scripted(vec!["sleep", "4242.5"]);
        let ctl = Controller::new().grace_window(Duration::from_millis(300));

        assert!(!ctl.is_up(&sleeper));
        assert!(matches!(
            ctl.down(&sleeper),
            Err(CoreError::NotRunning { .. })
        ));

        let outcome = ctl.ensure_up(&sleeper).await.unwrap();
        let UpOutcome::Started(LaunchOutcome::Detached { pid: Some(pid) }) = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert!(ctl.is_up(&sleeper));
        assert!(ctl.find(&sleeper).unwrap().pids.contains(&pid));
        assert_eq!(ctl.ensure_up(&sleeper).await.unwrap(), UpOutcome::AlreadyUp);

        ctl.down(&sleeper).unwrap();
        for _ in 0..50 {
            if !ctl.is_up(&sleeper) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!ctl.is_up(&sleeper));
        assert!(matches!(
            ctl.down(&sleeper),
            Err(CoreError::NotRunning { .. })
        ));
    }

    #[test]
    fn duplicate_processes_are_all_terminated() {
        let ctl = Controller::with_table(FakeTable::running(&[DB_CMDLINE, DB_CMDLINE]));
        assert_eq!(ctl.find(&db()).unwrap().pids.len(), 2);
        ctl.down(&db()).unwrap();
        assert_eq!(ctl.table().count(), 0);
    }
}
