//! # Domain Layer
//!
//! Pure agreement logic: vote tallies, quorum tiers, committee selection,
//! content audits and the decision model. Nothing here performs I/O.

pub mod agreement;
pub mod audit;
pub mod committee;
pub mod config;
pub mod decision;
pub mod error;
pub mod penalty;
pub mod quorum;
pub mod reliability;
pub mod vote;

pub use agreement::{calculate_agreement_score, detect_deviating_hashes, tally, Tally};
pub use audit::{audit_content, run_multi_surgeon_audit, UNFINISHED_MARKERS};
pub use committee::{select_committee, COMMITTEE_THRESHOLD, MIN_COMMITTEE_SIZE};
pub use config::{ConsensusConfig, DEFAULT_TIMEOUT_SECS, MIN_INTEGRITY};
pub use decision::{
    DecisionPath, VoteDecision, VoteStats, VoteStatus, REASON_BELOW_INTEGRITY, REASON_EMPTY,
    REASON_EVALUATION, REASON_QUORUM, REASON_TIMEOUT,
};
pub use error::{ConsensusError, ConsensusResult};
pub use penalty::apply_integrity_penalties;
pub use quorum::{
    get_required_quorum, QuorumPolicy, DEFAULT_QUORUM, HIGH_RISK_QUORUM, LOW_RISK_QUORUM,
};
pub use reliability::{ReliabilityStore, DEFAULT_RELIABILITY};
pub use vote::{content_hash, Vote};
