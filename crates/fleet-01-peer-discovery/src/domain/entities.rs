//! Core entities for peer discovery.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Opaque, string-keyed metadata advertised by an agent.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Default trust assigned to a newly discovered peer.
pub const DEFAULT_TRUST_SCORE: f64 = 1.0;

/// Unix timestamp in (fractional) seconds.
///
/// # Security
///
/// Non-finite and negative values collapse to zero and values beyond
/// `MAX_REASONABLE` are clamped, so a hostile payload cannot poison
/// ordering or age arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(f64);

impl Timestamp {
    /// Maximum reasonable timestamp (year 9999).
    pub const MAX_REASONABLE: f64 = 253_402_300_799.0;

    /// Create a new timestamp, clamping into `[0, MAX_REASONABLE]`.
    pub fn new(secs: f64) -> Self {
        if secs.is_finite() {
            Self(secs.clamp(0.0, Self::MAX_REASONABLE))
        } else {
            Self(0.0)
        }
    }

    /// Get the underlying seconds value.
    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    /// Seconds elapsed from `earlier` to `self`, never negative.
    pub fn secs_since(&self, earlier: Timestamp) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    /// Add a duration (clamped at `MAX_REASONABLE`).
    pub fn add(&self, duration: Duration) -> Self {
        Self::new(self.0 + duration.as_secs_f64())
    }

    /// The later of two timestamps.
    pub fn later(self, other: Timestamp) -> Self {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }

    /// The earlier of two timestamps.
    pub fn earlier(self, other: Timestamp) -> Self {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }
}

fn default_trust_score() -> f64 {
    DEFAULT_TRUST_SCORE
}

/// One entry per known remote agent.
///
/// Also the record shape carried inside SYNC gossip messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub agent_id: String,
    pub ip: String,
    pub port: u16,
    pub last_seen: Timestamp,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default = "default_trust_score")]
    pub trust_score: f64,
    /// Round-trip latency in milliseconds; 0 until measured.
    #[serde(default)]
    pub latency_ms: f64,
}

impl PeerInfo {
    pub fn new(agent_id: impl Into<String>, ip: impl Into<String>, port: u16, last_seen: Timestamp) -> Self {
        Self {
            agent_id: agent_id.into(),
            ip: ip.into(),
            port,
            last_seen,
            metadata: Metadata::new(),
            trust_score: DEFAULT_TRUST_SCORE,
            latency_ms: 0.0,
        }
    }

    /// `ip:port` as advertised by the peer.
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    /// Parsed socket address, if the advertised IP is valid.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.ip
            .parse::<std::net::IpAddr>()
            .ok()
            .map(|ip| SocketAddr::new(ip, self.port))
    }

    /// Seconds since this peer was last seen.
    pub fn age_secs(&self, now: Timestamp) -> f64 {
        now.secs_since(self.last_seen)
    }

    pub fn is_active(&self, now: Timestamp, max_age: Duration) -> bool {
        self.age_secs(now) < max_age.as_secs_f64()
    }

    pub fn has_latency(&self) -> bool {
        self.latency_ms > 0.0
    }
}

/// Where a registry update came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOrigin {
    /// A validated message received directly from the peer.
    Direct,
    /// A peer record relayed inside someone else's SYNC message.
    Gossip,
}

/// Insert-or-update request for the `PeerRegistry`.
///
/// `trust_score` and `latency_ms` are only applied when present; an
/// existing entry keeps its values otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerUpdate {
    pub agent_id: String,
    pub ip: String,
    pub port: u16,
    pub metadata: Metadata,
    pub seen_at: Timestamp,
    pub trust_score: Option<f64>,
    pub latency_ms: Option<f64>,
    pub origin: UpdateOrigin,
}

impl PeerUpdate {
    /// Update from a message received directly from the peer.
    pub fn direct(agent_id: impl Into<String>, ip: impl Into<String>, port: u16, seen_at: Timestamp) -> Self {
        Self {
            agent_id: agent_id.into(),
            ip: ip.into(),
            port,
            metadata: Metadata::new(),
            seen_at,
            trust_score: None,
            latency_ms: None,
            origin: UpdateOrigin::Direct,
        }
    }

    /// Update from a gossiped record.
    ///
    /// The gossiped `last_seen` is capped at `now` so a relayed record can
    /// never look fresher than local time.
    pub fn from_gossip(peer: &PeerInfo, now: Timestamp) -> Self {
        Self {
            agent_id: peer.agent_id.clone(),
            ip: peer.ip.clone(),
            port: peer.port,
            metadata: peer.metadata.clone(),
            seen_at: peer.last_seen.earlier(now),
            trust_score: Some(peer.trust_score),
            latency_ms: Some(peer.latency_ms),
            origin: UpdateOrigin::Gossip,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_trust_score(mut self, trust_score: f64) -> Self {
        self.trust_score = Some(trust_score);
        self
    }

    #[must_use]
    pub fn with_latency_ms(mut self, latency_ms: f64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

/// Result of `PeerRegistry::upsert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The update described the local agent.
    IgnoredSelf,
}
