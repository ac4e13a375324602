use serde::{Deserialize, Serialize};

use super::legacy::prefer_canonical;
use super::tunnel::{Forward, TunnelKind};

/// `kubectl port-forward` to a pod, service, or deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawK8sPortForward")]
pub struct K8sPortForward {
    pub context: String,
    pub resource_kind: String,
    pub resource_namespace: String,
    pub resource_name: String,
    pub remote_port: u16,
    pub local_port: u16,
}

#[derive(Deserialize)]
struct RawK8sPortForward {
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    resource_kind: Option<String>,
    #[serde(default)]
    resource_namespace: Option<String>,
    #[serde(default)]
    resource_name: Option<String>,
    #[serde(default)]
    remote_port: Option<u16>,
    #[serde(default)]
    local_port: Option<u16>,

    #[serde(default, rename = "remotePort")]
    legacy_remote_port: Option<u16>,
    #[serde(default, rename = "localPort")]
    legacy_local_port: Option<u16>,
}

impl From<RawK8sPortForward> for K8sPortForward {
    fn from(raw: RawK8sPortForward) -> Self {
        Self {
            context: raw.context.unwrap_or_default(),
            resource_kind: raw.resource_kind.unwrap_or_default(),
            resource_namespace: raw.resource_namespace.unwrap_or_default(),
            resource_name: raw.resource_name.unwrap_or_default(),
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

impl Forward for K8sPortForward {
    fn kind(&self) -> TunnelKind {
        TunnelKind::K8s
    }

    fn name(&self) -> String {
        format!("{}/{}", self.resource_kind, self.resource_name)
    }

    fn local_port(&self) -> u16 {
        self.local_port
    }

    fn remote_port(&self) -> u16 {
        self.remote_port
    }

    fn launch_args(&self) -> Vec<String> {
        vec![
            "kubectl".into(),
            "port-forward".into(),
            "--context".into(),
            self.context.clone(),
            "-n".into(),
            self.resource_namespace.clone(),
            self.name(),
            self.port_mapping(),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const WEB: &str = "\
context: gke-cluster
resource_namespace: default
resource_kind: svc
resource_name: web-server
remote_port: 8080
local_port: 80
";

    #[test]
    fn identity_and_mapping() {
        let t: K8sPortForward = serde_yaml::from_str(WEB).unwrap();
        assert_eq!(t.name(), "svc/web-server");
        assert_eq!(t.port_mapping(), "80:8080");
        assert_eq!(t.local_port(), 80);
    }

    #[test]
    fn signature_matches_kubectl_invocation() {
        let t: K8sPortForward = serde_yaml::from_str(WEB).unwrap();
        insta::assert_snapshot!(
            t.signature(),
            @"kubectl port-forward --context gke-cluster -n default svc/web-server 80:8080"
        );
    }

    #[test]
    fn legacy_ports_fill_in() {
        let t: K8sPortForward = serde_yaml::from_str(
            "context: c\nresource_namespace: ns\nresource_kind: pod\nresource_name: api\nremotePort: 9000\nlocalPort: 9001\n",
        )
        .unwrap();
        assert_eq!(t.port_mapping(), "9001:9000");
    }
}
