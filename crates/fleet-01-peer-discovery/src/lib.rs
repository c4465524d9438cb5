//! # Fleet Peer Discovery
//!
//! Zero-configuration discovery of fleet workers on a local network.
//! Each node broadcasts signed JSON datagrams over UDP and maintains an
//! eventually consistent registry of the peers it has heard from.
//!
//! ## Protocol
//!
//! - `ANNOUNCE` once on start, answered by a unicast `ACK`
//! - `HEARTBEAT` every announce interval (30 s by default)
//! - `SYNC` gossip of the 10 most recently seen peers
//!
//! Every envelope is `{"data": payload, "sig": hex-hmac}`. A datagram is
//! accepted only if its HMAC verifies, its timestamp is within the skew
//! window of local time, and the timestamp is strictly newer than the last
//! one accepted from the same sender.
//!
//! ## Architecture
//!
//! - **Domain Layer:** `PeerRegistry`, `ReplayGuard`, config and errors
//! - **Codec:** envelope signing and parsing
//! - **Ports Layer:** `PeerDiscoveryApi` in, transport/time/clock/config out
//! - **Adapters Layer:** UDP and in-memory transports, system time, TOML config
//! - **Service Layer:** listen and announce loops
//!
//! ## Example
//!
//! ```rust
//! use fleet_01_peer_discovery::{PeerRegistry, PeerUpdate, Timestamp};
//! use std::time::Duration;
//!
//! let registry = PeerRegistry::new("local");
//! registry.upsert(PeerUpdate::direct("builder-1", "10.0.0.7", 31415, Timestamp::new(1000.0)));
//!
//! let active = registry.active_peers(Duration::from_secs(300), Timestamp::new(1100.0));
//! assert_eq!(active.len(), 1);
//! ```

pub mod adapters;
pub mod codec;
pub mod domain;
pub mod ports;
pub mod service;

/// Test utilities (FixedTimeSource, ManualClock, etc.)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Domain
pub use domain::{
    ConnectivityReport, DiscoveryConfig, DiscoveryError, DiscoveryResult, Metadata,
    MessageStats, NetworkInfo, PeerInfo, PeerRegistry, PeerUpdate, ReplayGuard, Severity,
    Timestamp, UpdateOrigin, UpsertOutcome, DEFAULT_DISCOVERY_PORT, DEFAULT_GOSSIP_FANOUT,
    DEFAULT_TRUST_SCORE, MAX_DATAGRAM_SIZE,
};

// Codec
pub use codec::{canonical_json, sign, verify, LocalAgent, MessageCodec, MessageType, Payload};

// Ports
pub use ports::{Clock, ConfigProvider, DatagramTransport, PeerDiscoveryApi, TimeSource};

// Adapters
pub use adapters::{
    InMemoryNetwork, MemoryTransport, StaticConfigProvider, SystemTimeSource, TokioClock,
    TomlConfigProvider, UdpTransport,
};

// Service
pub use service::{DiscoveryDependencies, DiscoveryService};
