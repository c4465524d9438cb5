//! # Discovery Service
//!
//! Protocol state machine over a `DatagramTransport`: a listen loop that
//! validates and dispatches inbound datagrams, and an announce loop that
//! broadcasts ANNOUNCE once, then HEARTBEAT and SYNC every interval.

mod announce;
mod api;
mod core;
mod listen;

pub use api::API_PORT_METADATA_KEY;
pub use core::{DiscoveryDependencies, DiscoveryService};
