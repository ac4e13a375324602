// ── Tunnel descriptor model ──
//
// One concrete type per tunnel kind, all exposing the same `Forward`
// capability set. `Tunnel` is the closed sum of the kinds the decoder knows
// about; `Tunnels` is the ordered, index-addressed collection.

mod k8s;
mod legacy;
mod ssh;
mod tunnel;

pub use k8s::K8sPortForward;
pub use legacy::{merge_legacy, prefer_canonical};
pub use ssh::SshForward;
pub use tunnel::{Forward, Tunnel, TunnelKind, Tunnels, signature};
