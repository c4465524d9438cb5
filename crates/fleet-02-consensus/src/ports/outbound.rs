//! # Driven Ports (Outbound SPI)
//!
//! Collaborators the vote coordinator depends on.

use crate::domain::{ConsensusResult, Vote};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Independent quality judgement of one proposal, in `[0, 1]`.
///
/// Usually backed by an LLM evaluator elsewhere in the fleet. Errors and
/// out-of-range values are tolerated by the caller.
#[async_trait]
pub trait ProposalQualityScorer: Send + Sync {
    async fn score(&self, task: &str, agent: &str, content: &str) -> ConsensusResult<f64>;
}

/// Agreement math used by the coordinator.
///
/// Alternative backends must produce the same results as
/// [`PureAgreementBackend`](crate::adapters::PureAgreementBackend).
pub trait AgreementBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn agreement_score(&self, votes: &[Vote]) -> f64;

    /// Health multiplier per content hash.
    fn audit(&self, proposals: &BTreeMap<String, String>) -> BTreeMap<String, f64>;
}
