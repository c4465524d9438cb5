//! # Integration Flows
//!
//! Multi-node discovery over the in-memory network and real loopback UDP,
//! and end-to-end committee votes.

pub mod committee_flows;
pub mod discovery_flows;
