//! Error types for the consensus subsystem.
//!
//! Vote orchestration never surfaces these to callers: scorer failures are
//! folded into a zero score and configuration problems are reported by
//! [`ConsensusConfig::validate`](super::ConsensusConfig::validate).

/// Consensus error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsensusError {
    #[error("Proposal scorer failed: {0}")]
    Scorer(String),

    #[error("Invalid consensus configuration: {0}")]
    InvalidConfig(String),
}

pub type ConsensusResult<T> = Result<T, ConsensusError>;
