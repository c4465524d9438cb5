//! # Driving Ports (Inbound API)
//!
//! What the fleet orchestration layer reads for routing decisions.

use crate::domain::{ConnectivityReport, NetworkInfo, PeerInfo};
use std::time::Duration;

/// Read-mostly view of the discovered fleet.
///
/// # Example
///
/// ```rust,ignore
/// use fleet_01_peer_discovery::ports::PeerDiscoveryApi;
///
/// fn pick_worker<T: PeerDiscoveryApi>(api: &T) -> Option<String> {
///     api.get_fastest_peers(1).into_iter().next().map(|p| p.agent_id)
/// }
/// ```
pub trait PeerDiscoveryApi {
    /// Peers seen within `max_age` (the configured active window when `None`).
    fn get_active_peers(&self, max_age: Option<Duration>) -> Vec<PeerInfo>;

    /// `http://ip:port` for every active peer, preferring an advertised
    /// `api_port` metadata entry over the discovery port.
    fn get_peer_urls(&self) -> Vec<String>;

    /// Active peers with measured latency first (ascending), then the
    /// unmeasured ones by recency. At most `limit` entries.
    fn get_fastest_peers(&self, limit: usize) -> Vec<PeerInfo>;

    /// Drop peers older than `max_age` (the configured stale age when
    /// `None`). Returns how many were removed.
    fn evict_stale_peers(&self, max_age: Option<Duration>) -> usize;

    fn get_network_info(&self) -> NetworkInfo;

    /// Local diagnostics only; sends no datagrams.
    fn test_network_connectivity(&self) -> ConnectivityReport;
}
