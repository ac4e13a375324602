use serde::{Deserialize, Serialize};

use super::legacy::prefer_canonical;
use super::tunnel::{Forward, TunnelKind};

/// Local forward through Teleport's `tsh ssh -NL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSshForward")]
pub struct SshForward {
    pub user: String,
    pub node_name: String,
    pub remote_port: u16,
    pub local_port: u16,
}

/// Wire shape: canonical snake_case fields plus their camelCase predecessors.
#[derive(Deserialize)]
struct RawSshForward {
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    node_name: Option<String>,
    #[serde(default)]
    remote_port: Option<u16>,
    #[serde(default)]
    local_port: Option<u16>,

    #[serde(default, rename = "nodeName")]
    legacy_node_name: Option<String>,
    #[serde(default, rename = "remotePort")]
    legacy_remote_port: Option<u16>,
    #[serde(default, rename = "localPort")]
    legacy_local_port: Option<u16>,
}

impl From<RawSshForward> for SshForward {
    fn from(raw: RawSshForward) -> Self {
        Self {
            user: raw.user.unwrap_or_default(),
            node_name: prefer_canonical(
                raw.node_name.unwrap_or_default(),
                raw.legacy_node_name.unwrap_or_default(),
            ),
            remote_port: prefer_canonical(
                raw.remote_port.unwrap_or_default(),
                raw.legacy_remote_port.unwrap_or_default(),
            ),
            local_port: prefer_canonical(
                raw.local_port.unwrap_or_default(),
                raw.legacy_local_port.unwrap_or_default(),
            ),
        }
    }
}

impl Forward for SshForward {
    fn kind(&self) -> TunnelKind {
        TunnelKind::Ssh
    }

    fn name(&self) -> String {
        format!("{}@{}", self.user, self.node_name)
    }

    fn local_port(&self) -> u16 {
        self.local_port
    }

    fn remote_port(&self) -> u16 {
        self.remote_port
    }

    fn launch_args(&self) -> Vec<String> {
        vec![
            "tsh".into(),
            "ssh".into(),
            "-NL".into(),
            format!("{}:localhost:{}", self.local_port, self.remote_port),
            self.name(),
        ]
    }
}
