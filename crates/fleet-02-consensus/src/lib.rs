//! # Fleet Committee Consensus
//!
//! Decides which of several competing agent proposals the fleet accepts.
//!
//! Each proposal is hashed and weighted by its author's reliability
//! (optionally scaled by a content audit). If the heaviest group's share
//! of the total weight meets the quorum for the change's risk tier, that
//! content is accepted outright. Otherwise every proposal is scored by an
//! external evaluator under a deadline and the best one is accepted if it
//! clears the integrity floor.
//!
//! Weighting by reliability means a few trusted agents outvote many
//! untrusted ones, which is what makes the vote Sybil resistant.
//!
//! ## Architecture
//!
//! - **Domain Layer:** tallies, quorum tiers, committee selection, audits
//! - **Ports Layer:** `CommitteeVoteApi` in, scorer and agreement backend out
//! - **Adapters Layer:** `PureAgreementBackend`, `UnavailableScorer`
//! - **Service Layer:** `CommitteeVoteCoordinator`
//!
//! ## Example
//!
//! ```rust
//! use fleet_02_consensus::{calculate_agreement_score, get_required_quorum, Vote};
//!
//! let votes = [
//!     Vote::new("trusted-1", 1.0, "valid"),
//!     Vote::new("trusted-2", 1.0, "valid"),
//!     Vote::new("sybil-1", 0.1, "malicious"),
//!     Vote::new("sybil-2", 0.1, "malicious"),
//! ];
//! let score = calculate_agreement_score(&votes);
//! assert!(score >= get_required_quorum("default"));
//! ```

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

/// Test scorers (FixedScorer, DelayedScorer, FailingScorer)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Domain
pub use domain::{
    audit_content, calculate_agreement_score, content_hash, detect_deviating_hashes,
    get_required_quorum, run_multi_surgeon_audit, select_committee, tally, ConsensusConfig,
    ConsensusError, ConsensusResult, DecisionPath, QuorumPolicy, ReliabilityStore, Tally, Vote,
    VoteDecision, VoteStats, VoteStatus,
};

// Ports
pub use ports::{AgreementBackend, CommitteeVoteApi, ProposalQualityScorer, VoteRequest};

// Adapters
pub use adapters::{PureAgreementBackend, UnavailableScorer};

// Service
pub use service::{CommitteeVoteCoordinator, CoordinatorDependencies};
