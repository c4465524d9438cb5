//! Domain Layer - Pure discovery logic with no I/O
//!
//! This module contains:
//! - Peer entities and the unix-seconds `Timestamp`
//! - The mutex-guarded `PeerRegistry`
//! - Per-sender anti-replay and clock-skew enforcement (`ReplayGuard`)
//! - Discovery configuration and error taxonomy
//! - Diagnostic snapshots returned by the service

pub mod config;
pub mod diagnostics;
pub mod entities;
pub mod errors;
pub mod registry;
pub mod replay;

pub use config::*;
pub use diagnostics::*;
pub use entities::*;
pub use errors::*;
pub use registry::*;
pub use replay::*;
