use super::core::DiscoveryService;
use crate::domain::{ConnectivityReport, NetworkInfo, PeerInfo};
use crate::ports::PeerDiscoveryApi;
use std::cmp::Ordering;
use std::time::Duration;

/// Metadata key a peer uses to advertise its HTTP API port.
pub const API_PORT_METADATA_KEY: &str = "api_port";

fn peer_url(peer: &PeerInfo) -> String {
    let port = peer
        .metadata
        .get(API_PORT_METADATA_KEY)
        .and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_str().and_then(|s| s.parse::<u64>().ok()))
        })
        .and_then(|p| u16::try_from(p).ok())
        .filter(|p| *p != 0)
        .unwrap_or(peer.port);
    format!("http://{}:{}", peer.ip, port)
}

fn by_recency(a: &PeerInfo, b: &PeerInfo) -> Ordering {
    b.last_seen
        .partial_cmp(&a.last_seen)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.agent_id.cmp(&b.agent_id))
}

impl PeerDiscoveryApi for DiscoveryService {
    fn get_active_peers(&self, max_age: Option<Duration>) -> Vec<PeerInfo> {
        let max_age = max_age.unwrap_or_else(|| self.inner.config.active_peer_max_age());
        let mut peers = self.inner.registry.active_peers(max_age, self.inner.now());
        peers.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
        peers
    }

    fn get_peer_urls(&self) -> Vec<String> {
        self.get_active_peers(None).iter().map(peer_url).collect()
    }

    fn get_fastest_peers(&self, limit: usize) -> Vec<PeerInfo> {
        let (mut measured, mut unmeasured): (Vec<_>, Vec<_>) = self
            .get_active_peers(None)
            .into_iter()
            .partition(PeerInfo::has_latency);

        measured.sort_by(|a, b| {
            a.latency_ms
                .partial_cmp(&b.latency_ms)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.agent_id.cmp(&b.agent_id))
        });
        unmeasured.sort_by(by_recency);

        measured.extend(unmeasured);
        measured.truncate(limit);
        measured
    }

    fn evict_stale_peers(&self, max_age: Option<Duration>) -> usize {
        let max_age = max_age.unwrap_or_else(|| self.inner.config.stale_peer_max_age());
        self.inner.registry.evict_stale(max_age, self.inner.now())
    }

    fn get_network_info(&self) -> NetworkInfo {
        let inner = &self.inner;
        NetworkInfo {
            agent_id: inner.local.agent_id.clone(),
            ip: inner.local.ip.clone(),
            port: inner.local.port,
            fleet_port: inner.config.port,
            bound_addr: inner.transport.local_addr().map(|a| a.to_string()),
            broadcast_addr: inner.broadcast_addr().map(|a| a.to_string()),
            listening: inner.transport.is_listening(),
            running: self.is_running(),
            signed: inner.codec.is_signed(),
            peer_count: inner.registry.len(),
            active_peer_count: self.get_active_peers(None).len(),
            seed_peers: inner.seeds.iter().map(ToString::to_string).collect(),
            messages: inner.counters.snapshot(),
        }
    }

    fn test_network_connectivity(&self) -> ConnectivityReport {
        let inner = &self.inner;
        let listening = inner.transport.is_listening();
        let can_broadcast = inner.broadcast_addr().is_some();
        let local_ip = inner.transport.local_ip();
        let routable_ip = !local_ip.is_loopback() && !local_ip.is_unspecified();
        let has_seed_peers = !inner.seeds.is_empty();

        let mut issues = Vec::new();
        if !listening {
            issues.push("transport is send-only; inbound discovery disabled".to_string());
        }
        if !can_broadcast && !has_seed_peers {
            issues.push("broadcast disabled and no seed peers configured".to_string());
        }
        if !routable_ip {
            issues.push(format!(
                "advertised address {local_ip} is not reachable by other hosts"
            ));
        }

        ConnectivityReport {
            listening,
            can_broadcast,
            routable_ip,
            has_seed_peers,
            active_peers: self.get_active_peers(None).len(),
            issues,
        }
    }
}
