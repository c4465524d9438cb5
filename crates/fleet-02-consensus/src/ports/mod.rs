//! # Ports Layer
//!
//! - **Driving Ports (Inbound):** `CommitteeVoteApi`
//! - **Driven Ports (Outbound):** proposal scorer and agreement backend

pub mod inbound;
pub mod outbound;

pub use inbound::{CommitteeVoteApi, VoteRequest};
pub use outbound::{AgreementBackend, ProposalQualityScorer};
