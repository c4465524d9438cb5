//! # Fleet Mesh Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Shared builders for votes and signed datagrams
//! ├── support.rs        # Tracing setup for test runs
//! ├── integration/      # Cross-subsystem flows
//! │   ├── discovery_flows.rs
//! │   ├── udp_loopback.rs
//! │   └── committee_flows.rs
//! └── exploits/         # Attack simulations
//!     ├── forgery.rs
//!     ├── replay.rs
//!     └── sybil.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p fleet-tests
//!
//! # By category
//! cargo test -p fleet-tests integration::
//! cargo test -p fleet-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p fleet-tests
//! ```

pub mod fixtures;
pub mod integration;
pub mod support;
