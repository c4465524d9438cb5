//! Shared builders for tests and benchmarks.

use fleet_01_peer_discovery::codec::{LocalAgent, MessageCodec, MessageType};
use fleet_01_peer_discovery::{Metadata, Timestamp, DEFAULT_DISCOVERY_PORT};
use fleet_02_consensus::{content_hash, Vote};
use rand::Rng;
use std::net::SocketAddr;

pub const FLEET_SECRET: &[u8] = b"fleet-integration-secret";
pub const T0: f64 = 1_700_000_000.0;

/// `count` votes spread over `distinct` contents with random reliability.
pub fn random_votes(count: usize, distinct: usize) -> Vec<Vote> {
    let mut rng = rand::thread_rng();
    let hashes: Vec<String> = (0..distinct.max(1))
        .map(|i| content_hash(&format!("def proposal_{i}(): return {i}")))
        .collect();
    (0..count)
        .map(|i| {
            let hash = &hashes[rng.gen_range(0..hashes.len())];
            Vote::new(format!("agent-{i}"), rng.gen_range(0.0..1.0), hash.as_str())
        })
        .collect()
}

/// A hand-driven peer that signs its own datagrams.
pub struct ScriptedPeer {
    pub codec: MessageCodec,
    pub agent: LocalAgent,
    pub addr: SocketAddr,
}

impl ScriptedPeer {
    pub fn new(agent_id: &str, addr: SocketAddr, secret: Option<&[u8]>) -> Self {
        Self {
            codec: MessageCodec::new(secret),
            agent: LocalAgent {
                agent_id: agent_id.to_string(),
                ip: addr.ip().to_string(),
                port: DEFAULT_DISCOVERY_PORT,
                metadata: Metadata::new(),
            },
            addr,
        }
    }

    pub fn datagram(&self, kind: MessageType, timestamp: f64) -> Vec<u8> {
        self.datagram_with(kind, timestamp, serde_json::Map::new())
    }

    pub fn datagram_with(
        &self,
        kind: MessageType,
        timestamp: f64,
        extra: serde_json::Map<String, serde_json::Value>,
    ) -> Vec<u8> {
        self.codec
            .encode(kind, &self.agent, Timestamp::new(timestamp), extra)
            .expect("scripted payload encodes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_votes_shape() {
        let votes = random_votes(50, 3);
        assert_eq!(votes.len(), 50);
        assert!(votes.iter().all(|v| (0.0..1.0).contains(&v.weight)));
        let distinct: std::collections::HashSet<_> = votes.iter().map(|v| &v.hash).collect();
        assert!(distinct.len() <= 3);
    }
}
