use std::fmt;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

use super::{K8sPortForward, SshForward};
use crate::error::CoreError;

// ── Discriminator ───────────────────────────────────────────────────

/// Value of the `type` field selecting a tunnel kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TunnelKind {
    Ssh,
    K8s,
}

impl TunnelKind {
    /// Decode a raw record into the concrete descriptor for this kind.
    pub(crate) fn decode(self, record: serde_yaml::Value) -> Result<Tunnel, serde_yaml::Error> {
        match self {
            Self::Ssh => serde_yaml::from_value(record).map(Tunnel::Ssh),
            Self::K8s => serde_yaml::from_value(record).map(Tunnel::K8s),
        }
    }
}

// ── Capability trait ────────────────────────────────────────────────

/// What every tunnel kind must provide.
///
/// Only the launch argument vector is kind-specific in a way that matters
/// to the lifecycle: it is both how the forward is started and, joined by
/// spaces, how its process is found again later.
pub trait Forward {
    fn kind(&self) -> TunnelKind;

    /// Human-readable identity. Not unique.
    fn name(&self) -> String;

    fn local_port(&self) -> u16;

    fn remote_port(&self) -> u16;

    /// Program and arguments that start this forward.
    fn launch_args(&self) -> Vec<String>;

    /// `"{local}:{remote}"`.
    fn port_mapping(&self) -> String {
        format!("{}:{}", self.local_port(), self.remote_port())
    }

    /// The process-matching key: [`launch_args`](Self::launch_args) joined by single spaces.
    fn signature(&self) -> String {
        signature(&self.launch_args())
    }
}

/// Join a launch argument vector into its process signature.
pub fn signature(args: &[String]) -> String {
    args.join(" ")
}

// ── Tunnel ──────────────────────────────────────────────────────────

/// A configured tunnel of any known kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Tunnel {
    Ssh(SshForward),
    K8s(K8sPortForward),
}

impl Tunnel {
    fn as_forward(&self) -> &dyn Forward {
        match self {
            Self::Ssh(t) => t,
            Self::K8s(t) => t,
        }
    }
}

impl Forward for Tunnel {
    fn kind(&self) -> TunnelKind {
        self.as_forward().kind()
    }

    fn name(&self) -> String {
        self.as_forward().name()
    }

    fn local_port(&self) -> u16 {
        self.as_forward().local_port()
    }

    fn remote_port(&self) -> u16 {
        self.as_forward().remote_port()
    }

    fn launch_args(&self) -> Vec<String> {
        self.as_forward().launch_args()
    }
}

impl fmt::Display for Tunnel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.port_mapping())
    }
}

impl From<SshForward> for Tunnel {
    fn from(t: SshForward) -> Self {
        Self::Ssh(t)
    }
}

impl From<K8sPortForward> for Tunnel {
    fn from(t: K8sPortForward) -> Self {
        Self::K8s(t)
    }
}

// ── Tunnels ─────────────────────────────────────────────────────────

/// Ordered tunnel collection, addressed by 0-based declaration index.
///
/// Duplicates are allowed; each entry matches processes by its own signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tunnels(Vec<Tunnel>);

impl Tunnels {
    pub fn new(tunnels: Vec<Tunnel>) -> Self {
        Self(tunnels)
    }

    pub fn get(&self, index: usize) -> Result<&Tunnel, CoreError> {
        self.0.get(index).ok_or(CoreError::UnknownTunnel {
            index,
            count: self.0.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tunnel> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Tunnels {
    type Item = &'a Tunnel;
    type IntoIter = std::slice::Iter<'a, Tunnel>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Tunnel> for Tunnels {
    fn from_iter<I: IntoIterator<Item = Tunnel>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
