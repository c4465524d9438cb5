//! # Adapters
//!
//! - `UdpTransport` - tokio UDP socket with port probing and broadcast
//! - `InMemoryNetwork` / `MemoryTransport` - in-process datagram network
//! - `SystemTimeSource` / `TokioClock` - production time
//! - `StaticConfigProvider` / `TomlConfigProvider` - configuration

/// Configuration providers
pub mod config;
/// In-process transport
pub mod memory;
/// Time source adapters
pub mod time;
/// UDP transport
pub mod transport;

pub use config::{StaticConfigProvider, TomlConfigProvider};
pub use memory::{Datagram, InMemoryNetwork, MemoryTransport};
pub use time::{SystemTimeSource, TokioClock};
pub use transport::{
    broadcast_address, detect_local_ip, find_available_port, is_port_available, UdpTransport,
};
