//! Discovery configuration.

use super::{DiscoveryError, DiscoveryResult, Metadata};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

/// Default fleet discovery port.
pub const DEFAULT_DISCOVERY_PORT: u16 = 31415;

/// Largest datagram the listen loop will read.
pub const MAX_DATAGRAM_SIZE: usize = 65535;

/// Maximum number of peers carried by one SYNC message.
pub const DEFAULT_GOSSIP_FANOUT: usize = 10;

/// Configuration for a `DiscoveryService`.
///
/// # Fields
///
/// - `port`: fleet port. Broadcasts always target this port even when the
///   local socket had to move to another one.
/// - `auto_port`: on bind failure, probe the next `port_search_window`
///   ports before degrading to send-only mode.
/// - `subnet_broadcast`: derive an `a.b.c.255` address from the local IP;
///   when false (or detection fails) use `255.255.255.255`.
/// - `seed_peers`: `ip:port` unicast targets that receive every
///   announce, heartbeat and sync in addition to the broadcast.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub agent_id: String,
    pub port: u16,
    pub auto_port: bool,
    pub port_search_window: u16,
    pub broadcast: bool,
    pub subnet_broadcast: bool,
    pub announce_interval_secs: u64,
    pub max_clock_skew_secs: u64,
    pub stale_peer_max_age_secs: u64,
    pub active_peer_max_age_secs: u64,
    pub pending_ping_ttl_secs: u64,
    pub gossip_fanout: usize,
    pub receive_buffer_size: usize,
    pub seed_peers: Vec<String>,
    pub metadata: Metadata,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            agent_id: format!("agent-{}", uuid::Uuid::new_v4()),
            port: DEFAULT_DISCOVERY_PORT,
            auto_port: true,
            port_search_window: 100,
            broadcast: true,
            subnet_broadcast: true,
            announce_interval_secs: 30,
            max_clock_skew_secs: 300,
            stale_peer_max_age_secs: 3600,
            active_peer_max_age_secs: 300,
            pending_ping_ttl_secs: 60,
            gossip_fanout: DEFAULT_GOSSIP_FANOUT,
            receive_buffer_size: MAX_DATAGRAM_SIZE,
            seed_peers: Vec::new(),
            metadata: Metadata::new(),
        }
    }
}

impl DiscoveryConfig {
    /// Create a config suitable for testing: ephemeral port, no broadcast.
    pub fn for_testing(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            port: 0,
            auto_port: false,
            broadcast: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_seed_peers(mut self, seeds: Vec<String>) -> Self {
        self.seed_peers = seeds;
        self
    }

    pub fn announce_interval(&self) -> Duration {
        Duration::from_secs(self.announce_interval_secs)
    }

    pub fn max_clock_skew(&self) -> Duration {
        Duration::from_secs(self.max_clock_skew_secs)
    }

    pub fn stale_peer_max_age(&self) -> Duration {
        Duration::from_secs(self.stale_peer_max_age_secs)
    }

    pub fn active_peer_max_age(&self) -> Duration {
        Duration::from_secs(self.active_peer_max_age_secs)
    }

    pub fn pending_ping_ttl(&self) -> Duration {
        Duration::from_secs(self.pending_ping_ttl_secs)
    }

    /// Parse `seed_peers` into socket addresses.
    pub fn seed_addrs(&self) -> DiscoveryResult<Vec<SocketAddr>> {
        self.seed_peers
            .iter()
            .map(|s| {
                s.parse::<SocketAddr>()
                    .map_err(|e| DiscoveryError::Config(format!("invalid seed peer '{s}': {e}")))
            })
            .collect()
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> DiscoveryResult<()> {
        if self.agent_id.trim().is_empty() {
            return Err(DiscoveryError::Config("agent_id must not be empty".into()));
        }
        if self.announce_interval_secs == 0 {
            return Err(DiscoveryError::Config(
                "announce_interval_secs must be positive".into(),
            ));
        }
        if self.pending_ping_ttl_secs == 0 {
            return Err(DiscoveryError::Config(
                "pending_ping_ttl_secs must be positive".into(),
            ));
        }
        if self.max_clock_skew_secs == 0 {
            return Err(DiscoveryError::Config(
                "max_clock_skew_secs must be positive".into(),
            ));
        }
        if self.gossip_fanout == 0 {
            return Err(DiscoveryError::Config("gossip_fanout must be positive".into()));
        }
        if self.receive_buffer_size < 512 || self.receive_buffer_size > MAX_DATAGRAM_SIZE {
            return Err(DiscoveryError::Config(format!(
                "receive_buffer_size must be within 512..={MAX_DATAGRAM_SIZE}"
            )));
        }
        self.seed_addrs()?;
        Ok(())
    }
}
