//! Read-only diagnostic snapshots.

use serde::Serialize;

/// Message counters kept by a running service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageStats {
    pub received: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub sent: u64,
    pub send_failures: u64,
}

/// Result of `get_network_info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInfo {
    pub agent_id: String,
    /// IP advertised in outgoing payloads.
    pub ip: String,
    /// Port advertised in outgoing payloads.
    pub port: u16,
    /// Configured fleet port; broadcasts always target it.
    pub fleet_port: u16,
    pub bound_addr: Option<String>,
    pub broadcast_addr: Option<String>,
    pub listening: bool,
    pub running: bool,
    pub signed: bool,
    pub peer_count: usize,
    pub active_peer_count: usize,
    pub seed_peers: Vec<String>,
    pub messages: MessageStats,
}

/// Result of `test_network_connectivity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectivityReport {
    pub listening: bool,
    pub can_broadcast: bool,
    /// False when the advertised IP is loopback or unspecified.
    pub routable_ip: bool,
    pub has_seed_peers: bool,
    pub active_peers: usize,
    pub issues: Vec<String>,
}

impl ConnectivityReport {
    /// True when nothing prevents this node from being discovered.
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}
