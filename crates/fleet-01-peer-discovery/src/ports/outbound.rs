//! # Driven Ports (Outbound SPI)
//!
//! Interfaces the discovery service requires from its host: a datagram
//! transport, a wall-clock time source, a sleeping clock for the announce
//! loop, and configuration.

use crate::domain::{DiscoveryConfig, DiscoveryResult, Timestamp};
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Connectionless datagram I/O.
///
/// # Thread Safety
///
/// `send` and `receive` are called concurrently from the announce and
/// listen tasks. `receive` must be cancellation safe: the listen loop
/// races it against the shutdown signal.
#[async_trait]
pub trait DatagramTransport: Send + Sync {
    /// Send one datagram. Broadcast addresses are allowed.
    async fn send(&self, bytes: &[u8], target: SocketAddr) -> DiscoveryResult<()>;

    /// Wait for the next datagram.
    ///
    /// Returns `DiscoveryError::NotListening` in send-only mode.
    async fn receive(&self) -> DiscoveryResult<(Vec<u8>, SocketAddr)>;

    /// Address datagrams are received on; `None` in send-only mode.
    fn local_addr(&self) -> Option<SocketAddr>;

    /// IP advertised to peers in every payload.
    fn local_ip(&self) -> IpAddr;

    /// Broadcast IP for fleet-wide messages, if broadcasting is enabled.
    fn broadcast_ip(&self) -> Option<IpAddr>;

    fn is_listening(&self) -> bool {
        self.local_addr().is_some()
    }
}

/// Wall-clock time in unix seconds.
///
/// Tests inject `FixedTimeSource` or `ControllableTimeSource`.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Sleeping primitive for the announce loop.
///
/// Production uses tokio timers; tests step a `ManualClock` so heartbeat
/// rounds run without real waiting. The future must be cancellation safe.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Source of discovery configuration.
pub trait ConfigProvider: Send + Sync {
    fn discovery_config(&self) -> DiscoveryConfig;
}
