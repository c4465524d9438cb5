use crate::domain::{ConsensusError, ConsensusResult};
use crate::ports::ProposalQualityScorer;
use async_trait::async_trait;

/// Scorer for deployments without an evaluator.
///
/// Every call fails, so a vote that misses quorum ends in rejection
/// instead of trusting unscored content.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableScorer;

#[async_trait]
impl ProposalQualityScorer for UnavailableScorer {
    async fn score(&self, _task: &str, agent: &str, _content: &str) -> ConsensusResult<f64> {
        Err(ConsensusError::Scorer(format!(
            "no evaluator configured for proposal from {agent}"
        )))
    }
}
