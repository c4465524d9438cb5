//! Test scorers for driving the fallback evaluation path.

use crate::domain::{ConsensusError, ConsensusResult};
use crate::ports::ProposalQualityScorer;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// Returns a fixed score per agent, `default` for anyone else.
#[derive(Debug, Default)]
pub struct FixedScorer {
    scores: HashMap<String, f64>,
    default: f64,
    calls: Mutex<Vec<String>>,
}

impl FixedScorer {
    pub fn new(default: f64) -> Self {
        Self {
            default,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_score(mut self, agent: &str, score: f64) -> Self {
        self.scores.insert(agent.to_string(), score);
        self
    }

    /// Agents scored so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ProposalQualityScorer for FixedScorer {
    async fn score(&self, _task: &str, agent: &str, _content: &str) -> ConsensusResult<f64> {
        self.calls.lock().push(agent.to_string());
        Ok(self.scores.get(agent).copied().unwrap_or(self.default))
    }
}

/// Sleeps before answering with `score`.
#[derive(Debug, Clone)]
pub struct DelayedScorer {
    pub delay: Duration,
    pub score: f64,
}

impl DelayedScorer {
    pub fn new(delay: Duration, score: f64) -> Self {
        Self { delay, score }
    }
}

#[async_trait]
impl ProposalQualityScorer for DelayedScorer {
    async fn score(&self, _task: &str, _agent: &str, _content: &str) -> ConsensusResult<f64> {
        tokio::time::sleep(self.delay).await;
        Ok(self.score)
    }
}

/// Fails for every agent in `failing`, scores `score` otherwise.
#[derive(Debug, Clone, Default)]
pub struct FailingScorer {
    failing: Vec<String>,
    score: f64,
}

impl FailingScorer {
    /// Fails for everyone.
    pub fn always() -> Self {
        Self::default()
    }

    pub fn for_agents(agents: &[&str], score: f64) -> Self {
        Self {
            failing: agents.iter().map(|a| a.to_string()).collect(),
            score,
        }
    }

    fn fails_for(&self, agent: &str) -> bool {
        self.failing.is_empty() || self.failing.iter().any(|a| a == agent)
    }
}

#[async_trait]
impl ProposalQualityScorer for FailingScorer {
    async fn score(&self, _task: &str, agent: &str, _content: &str) -> ConsensusResult<f64> {
        if self.fails_for(agent) {
            Err(ConsensusError::Scorer(format!("evaluator rejected {agent}")))
        } else {
            Ok(self.score)
        }
    }
}
