//! # Ports Layer
//!
//! - **Driving Ports (Inbound):** APIs this crate exposes to the fleet
//! - **Driven Ports (Outbound):** SPIs the service requires from adapters

pub mod inbound;
pub mod outbound;

pub use inbound::PeerDiscoveryApi;
pub use outbound::{Clock, ConfigProvider, DatagramTransport, TimeSource};
