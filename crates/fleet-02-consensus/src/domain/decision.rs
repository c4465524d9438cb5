//! Vote outcomes.
//!
//! A [`VoteDecision`] is the only thing a committee vote ever returns:
//! timeouts, empty proposal sets and low-quality proposals are all
//! represented as statuses rather than errors.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const REASON_QUORUM: &str = "Byzantine Quorum Reached";
pub const REASON_TIMEOUT: &str = "Committee vote timed out waiting for AI evaluation.";
pub const REASON_BELOW_INTEGRITY: &str = "No proposals met the minimum integrity threshold.";
pub const REASON_EMPTY: &str = "No proposals submitted.";
pub const REASON_EVALUATION: &str = "Best proposal selected by integrity evaluation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteStatus {
    Accepted,
    Rejected,
    Timeout,
    Failed,
}

impl VoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteStatus::Accepted => "ACCEPTED",
            VoteStatus::Rejected => "REJECTED",
            VoteStatus::Timeout => "TIMEOUT",
            VoteStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for VoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which branch of the vote produced the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPath {
    /// Weighted agreement met the required quorum
    Quorum,
    /// Agreement fell short and proposals were scored individually
    Evaluation,
    /// Nothing was evaluated
    None,
}

/// Summary of a fallback evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteStats {
    pub voters: usize,
    pub avg_integrity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteDecision {
    pub status: VoteStatus,
    pub reason: String,
    pub path: DecisionPath,
    pub content: Option<String>,
    pub winning_hash: Option<String>,
    /// Agent whose proposal won the fallback evaluation
    pub winner: Option<String>,
    pub agreement_score: f64,
    pub required_quorum: f64,
    pub confidence: f64,
    /// Vote weight per agent on the quorum path, penalized integrity on the evaluation path
    pub scores: BTreeMap<String, f64>,
    pub stats: Option<VoteStats>,
    pub deviating_agents: Vec<String>,
}

impl VoteDecision {
    fn bare(status: VoteStatus, reason: &str, path: DecisionPath) -> Self {
        Self {
            status,
            reason: reason.to_string(),
            path,
            content: None,
            winning_hash: None,
            winner: None,
            agreement_score: 0.0,
            required_quorum: 0.0,
            confidence: 0.0,
            scores: BTreeMap::new(),
            stats: None,
            deviating_agents: Vec::new(),
        }
    }

    pub fn empty_proposals() -> Self {
        Self::bare(VoteStatus::Failed, REASON_EMPTY, DecisionPath::None)
    }

    /// Evaluation deadline passed. Partial scores are not carried.
    pub fn timed_out(agreement_score: f64, required_quorum: f64) -> Self {
        Self {
            agreement_score,
            required_quorum,
            ..Self::bare(VoteStatus::Timeout, REASON_TIMEOUT, DecisionPath::Evaluation)
        }
    }

    pub fn below_integrity(
        agreement_score: f64,
        required_quorum: f64,
        scores: BTreeMap<String, f64>,
        stats: VoteStats,
    ) -> Self {
        Self {
            agreement_score,
            required_quorum,
            scores,
            stats: Some(stats),
            ..Self::bare(
                VoteStatus::Rejected,
                REASON_BELOW_INTEGRITY,
                DecisionPath::Evaluation,
            )
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == VoteStatus::Accepted
    }
}
