//! Vote orchestration.
//!
//! ```text
//! COLLECTING -> SCORED -> ACCEPTED
//!                      -> FALLBACK_EVAL -> ACCEPTED | REJECTED | TIMEOUT
//! ```

use crate::adapters::PureAgreementBackend;
use crate::domain::{
    content_hash, detect_deviating_hashes, select_committee, tally, ConsensusConfig,
    ConsensusResult, DecisionPath, ReliabilityStore, Vote, VoteDecision, VoteStatus,
    REASON_QUORUM,
};
use crate::metrics;
use crate::ports::{AgreementBackend, CommitteeVoteApi, ProposalQualityScorer, VoteRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Collaborators for [`CommitteeVoteCoordinator`].
#[derive(Clone)]
pub struct CoordinatorDependencies {
    pub scorer: Arc<dyn ProposalQualityScorer>,
    pub backend: Arc<dyn AgreementBackend>,
}

impl CoordinatorDependencies {
    /// `scorer` with the in-process agreement backend.
    pub fn with_scorer(scorer: Arc<dyn ProposalQualityScorer>) -> Self {
        Self {
            scorer,
            backend: Arc::new(PureAgreementBackend),
        }
    }
}

/// Votes collected for one request, before any decision is taken.
pub(crate) struct Ballot {
    pub votes: Vec<Vote>,
    /// Content per hash; the first agent (by id) to submit a content owns it
    pub contents: BTreeMap<String, String>,
}

/// Runs reliability-weighted committee votes.
///
/// Reliability is kept in memory per coordinator. Agents are initialized
/// to the configured default the first time they vote.
pub struct CommitteeVoteCoordinator {
    pub(crate) config: ConsensusConfig,
    pub(crate) reliability: Mutex<ReliabilityStore>,
    pub(crate) scorer: Arc<dyn ProposalQualityScorer>,
    pub(crate) backend: Arc<dyn AgreementBackend>,
}

impl CommitteeVoteCoordinator {
    pub fn new(config: ConsensusConfig, deps: CoordinatorDependencies) -> ConsensusResult<Self> {
        config.validate()?;
        Ok(Self::build(config, deps))
    }

    /// Default configuration with the given scorer.
    pub fn with_scorer(scorer: Arc<dyn ProposalQualityScorer>) -> Self {
        Self::build(
            ConsensusConfig::default(),
            CoordinatorDependencies::with_scorer(scorer),
        )
    }

    fn build(config: ConsensusConfig, deps: CoordinatorDependencies) -> Self {
        let store = ReliabilityStore::new(config.default_reliability);
        Self {
            config,
            reliability: Mutex::new(store),
            scorer: deps.scorer,
            backend: deps.backend,
        }
    }

    /// Replace the reliability snapshot, e.g. from an external ledger.
    #[must_use]
    pub fn with_reliability(self, scores: HashMap<String, f64>) -> Self {
        let store = ReliabilityStore::with_scores(self.config.default_reliability, scores);
        *self.reliability.lock() = store;
        self
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn set_reliability(&self, agent: impl Into<String>, score: f64) {
        self.reliability.lock().set(agent, score);
    }

    pub fn reliability(&self, agent: &str) -> Option<f64> {
        self.reliability.lock().get(agent)
    }

    pub fn reliability_snapshot(&self) -> HashMap<String, f64> {
        self.reliability.lock().snapshot()
    }

    /// Audit multipliers keyed by content hash, ready for
    /// [`VoteRequest::audit_results`].
    pub fn audit_proposals(&self, proposals: &BTreeMap<String, String>) -> HashMap<String, f64> {
        let by_hash: BTreeMap<String, String> = proposals
            .values()
            .map(|content| (content_hash(content), content.clone()))
            .collect();
        self.backend.audit(&by_hash).into_iter().collect()
    }

    pub(crate) fn collect_votes(&self, request: &VoteRequest) -> Ballot {
        let mut votes = Vec::with_capacity(request.proposals.len());
        let mut contents = BTreeMap::new();
        let mut store = self.reliability.lock();

        for (agent, content) in &request.proposals {
            let hash = content_hash(content);
            let reliability = store.get_or_default(agent);
            let audit = request
                .audit_results
                .as_ref()
                .and_then(|audit| audit.get(&hash).copied())
                .unwrap_or(1.0);
            votes.push(Vote::new(agent.as_str(), reliability * audit, hash.as_str()));
            contents.entry(hash).or_insert_with(|| content.clone());
        }
        Ballot { votes, contents }
    }

    /// Quorum-path decision, or `None` when the winner cannot be named.
    fn quorum_decision(
        &self,
        ballot: &Ballot,
        agreement_score: f64,
        required_quorum: f64,
    ) -> Option<VoteDecision> {
        let votes = tally(&ballot.votes);
        let (hash, _) = votes.winner()?;
        let content = ballot.contents.get(hash)?.clone();
        let scores = ballot
            .votes
            .iter()
            .map(|v| (v.agent.clone(), v.effective_weight()))
            .collect();

        Some(VoteDecision {
            status: VoteStatus::Accepted,
            reason: REASON_QUORUM.to_string(),
            path: DecisionPath::Quorum,
            content: Some(content),
            winning_hash: Some(hash.to_string()),
            winner: None,
            agreement_score,
            required_quorum,
            confidence: votes.agreement(),
            scores,
            stats: None,
            deviating_agents: detect_deviating_hashes(&ballot.votes, hash),
        })
    }

    pub async fn run_committee_vote(&self, request: VoteRequest) -> VoteDecision {
        let decision = self.decide(&request).await;
        metrics::record_decision(decision.status, decision.path);
        info!(
            task = %request.task,
            status = %decision.status,
            agreement = decision.agreement_score,
            required = decision.required_quorum,
            confidence = decision.confidence,
            "Committee vote decided"
        );
        decision
    }

    async fn decide(&self, request: &VoteRequest) -> VoteDecision {
        if request.proposals.is_empty() {
            return VoteDecision::empty_proposals();
        }

        let ballot = self.collect_votes(request);
        let agreement_score = self.backend.agreement_score(&ballot.votes);
        let required_quorum = self.config.quorum.required_quorum(&request.change_type);
        debug!(
            task = %request.task,
            voters = ballot.votes.len(),
            distinct = ballot.contents.len(),
            agreement_score,
            required_quorum,
            backend = self.backend.name(),
            "Votes collected"
        );

        if agreement_score >= required_quorum {
            if let Some(decision) = self.quorum_decision(&ballot, agreement_score, required_quorum)
            {
                return decision;
            }
        }

        let timeout = request
            .timeout
            .unwrap_or_else(|| self.config.default_timeout());
        self.evaluate(request, agreement_score, required_quorum, timeout)
            .await
    }

    /// Members for `task` drawn from `available_agents`.
    ///
    /// Agents without history count at the default reliability; lookups
    /// here do not record them.
    pub fn select_committee(&self, task: &str, available_agents: &[String]) -> Vec<String> {
        let scores: HashMap<String, f64> = {
            let store = self.reliability.lock();
            available_agents
                .iter()
                .map(|agent| {
                    let score = store.get(agent).unwrap_or(store.default_score());
                    (agent.clone(), score)
                })
                .collect()
        };
        let committee = select_committee(
            &scores,
            self.config.committee_threshold,
            self.config.min_committee_size,
        );
        debug!(
            task,
            available = available_agents.len(),
            selected = committee.len(),
            "Committee selected"
        );
        committee
    }
}

#[async_trait]
impl CommitteeVoteApi for CommitteeVoteCoordinator {
    async fn run_committee_vote(&self, request: VoteRequest) -> VoteDecision {
        CommitteeVoteCoordinator::run_committee_vote(self, request).await
    }

    fn select_committee(&self, task: &str, available_agents: &[String]) -> Vec<String> {
        CommitteeVoteCoordinator::select_committee(self, task, available_agents)
    }
}
