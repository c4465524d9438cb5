//! # Driving Ports (Inbound API)
//!
//! What the fleet orchestration layer calls to settle a task's outcome.

use crate::domain::VoteDecision;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// One committee vote: every agent's proposal for `task`.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteRequest {
    pub task: String,
    /// Agent id to proposal content
    pub proposals: BTreeMap<String, String>,
    pub change_type: String,
    /// Fallback evaluation deadline; the configured default when `None`
    pub timeout: Option<Duration>,
    /// Health multiplier per content hash, usually from
    /// [`run_multi_surgeon_audit`](crate::domain::run_multi_surgeon_audit)
    pub audit_results: Option<HashMap<String, f64>>,
}

impl VoteRequest {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            proposals: BTreeMap::new(),
            change_type: "default".to_string(),
            timeout: None,
            audit_results: None,
        }
    }

    #[must_use]
    pub fn proposal(mut self, agent: impl Into<String>, content: impl Into<String>) -> Self {
        self.proposals.insert(agent.into(), content.into());
        self
    }

    #[must_use]
    pub fn with_proposals<I, A, C>(mut self, proposals: I) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: Into<String>,
        C: Into<String>,
    {
        self.proposals
            .extend(proposals.into_iter().map(|(a, c)| (a.into(), c.into())));
        self
    }

    #[must_use]
    pub fn change_type(mut self, change_type: impl Into<String>) -> Self {
        self.change_type = change_type.into();
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn audit_results(mut self, audit: HashMap<String, f64>) -> Self {
        self.audit_results = Some(audit);
        self
    }
}

/// Committee vote API.
///
/// `run_committee_vote` never fails: every outcome, including timeouts and
/// empty proposal sets, is a [`VoteDecision`].
#[async_trait]
pub trait CommitteeVoteApi: Send + Sync {
    async fn run_committee_vote(&self, request: VoteRequest) -> VoteDecision;

    /// Which of `available_agents` should be asked for proposals on `task`.
    fn select_committee(&self, task: &str, available_agents: &[String]) -> Vec<String>;
}
