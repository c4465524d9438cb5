//! # Peer Registry
//!
//! In-memory table of known peers, keyed by `agent_id`.
//!
//! ## Invariants
//!
//! - At most one entry per `agent_id`; the local agent is never inserted.
//! - `last_seen` only moves forward.
//! - `trust_score` / `latency_ms` survive updates that do not carry them.
//! - Entries leave only through `evict_stale`; nothing expires implicitly.
//!
//! All operations take a single internal lock and never perform I/O.

use super::{PeerInfo, PeerUpdate, Timestamp, UpdateOrigin, UpsertOutcome};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

#[derive(Debug)]
pub struct PeerRegistry {
    local_agent_id: String,
    peers: Mutex<HashMap<String, PeerInfo>>,
}

impl PeerRegistry {
    pub fn new(local_agent_id: impl Into<String>) -> Self {
        Self {
            local_agent_id: local_agent_id.into(),
            peers: Mutex::new(HashMap::new()),
        }
    }

    pub fn local_agent_id(&self) -> &str {
        &self.local_agent_id
    }

    /// Insert or update the entry for `update.agent_id`.
    ///
    /// Address and metadata are replaced only when the update is at least
    /// as fresh as the stored entry. Gossiped trust/latency values seed new
    /// entries but never overwrite local measurements.
    pub fn upsert(&self, update: PeerUpdate) -> UpsertOutcome {
        if update.agent_id == self.local_agent_id {
            return UpsertOutcome::IgnoredSelf;
        }

        let mut peers = self.peers.lock();
        match peers.get_mut(&update.agent_id) {
            Some(existing) => {
                if update.seen_at >= existing.last_seen {
                    existing.ip = update.ip;
                    existing.port = update.port;
                    existing.metadata = update.metadata;
                    existing.last_seen = update.seen_at;
                }
                if update.origin == UpdateOrigin::Direct {
                    if let Some(trust) = update.trust_score {
                        existing.trust_score = trust;
                    }
                    if let Some(latency) = update.latency_ms {
                        existing.latency_ms = latency;
                    }
                }
                UpsertOutcome::Updated
            }
            None => {
                info!(
                    agent_id = %update.agent_id,
                    addr = %format!("{}:{}", update.ip, update.port),
                    "Discovered new peer"
                );
                let mut peer = PeerInfo::new(
                    update.agent_id.clone(),
                    update.ip,
                    update.port,
                    update.seen_at,
                );
                peer.metadata = update.metadata;
                if let Some(trust) = update.trust_score {
                    peer.trust_score = trust;
                }
                if let Some(latency) = update.latency_ms {
                    peer.latency_ms = latency.max(0.0);
                }
                peers.insert(update.agent_id, peer);
                UpsertOutcome::Inserted
            }
        }
    }

    pub fn get(&self, agent_id: &str) -> Option<PeerInfo> {
        self.peers.lock().get(agent_id).cloned()
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.peers.lock().contains_key(agent_id)
    }

    /// Store a measured round-trip latency. Returns false for unknown peers.
    pub fn set_latency(&self, agent_id: &str, latency_ms: f64) -> bool {
        match self.peers.lock().get_mut(agent_id) {
            Some(peer) => {
                peer.latency_ms = latency_ms.max(0.0);
                true
            }
            None => false,
        }
    }

    /// Replace a peer's trust score. Returns false for unknown peers.
    pub fn set_trust(&self, agent_id: &str, trust_score: f64) -> bool {
        match self.peers.lock().get_mut(agent_id) {
            Some(peer) => {
                peer.trust_score = trust_score;
                true
            }
            None => false,
        }
    }

    /// All entries with `now - last_seen < max_age`.
    pub fn active_peers(&self, max_age: Duration, now: Timestamp) -> Vec<PeerInfo> {
        self.peers
            .lock()
            .values()
            .filter(|p| p.is_active(now, max_age))
            .cloned()
            .collect()
    }

    /// Remove entries older than `max_age`, returning how many were removed.
    pub fn evict_stale(&self, max_age: Duration, now: Timestamp) -> usize {
        let limit = max_age.as_secs_f64();
        let mut peers = self.peers.lock();
        let before = peers.len();
        peers.retain(|id, peer| {
            let keep = peer.age_secs(now) <= limit;
            if !keep {
                info!(agent_id = %id, "Evicting stale peer");
            }
            keep
        });
        before - peers.len()
    }

    /// Up to `limit` entries, most recently seen first.
    pub fn most_recent(&self, limit: usize) -> Vec<PeerInfo> {
        let mut peers = self.snapshot();
        peers.sort_by(|a, b| {
            b.last_seen
                .partial_cmp(&a.last_seen)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.agent_id.cmp(&b.agent_id))
        });
        peers.truncate(limit);
        peers
    }

    pub fn snapshot(&self) -> Vec<PeerInfo> {
        self.peers.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.lock().is_empty()
    }
}
