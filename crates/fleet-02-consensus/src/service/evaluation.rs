//! Fallback evaluation when weighted agreement misses the quorum.
//!
//! Every proposal is scored concurrently by the injected scorer. The whole
//! batch shares one deadline; when it passes, in-flight scorers are aborted
//! and nothing they produced is used.

use super::CommitteeVoteCoordinator;
use crate::domain::{
    apply_integrity_penalties, content_hash, DecisionPath, VoteDecision, VoteStats, VoteStatus,
    REASON_EVALUATION,
};
use crate::metrics;
use crate::ports::VoteRequest;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Raw scorer output as used for ranking: failures and non-finite values
/// are 0, everything else is clamped to `[0, 1]`.
pub(crate) fn sanitize_score(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Highest score; equal scores go to the smallest agent id.
pub(crate) fn best_agent(scores: &BTreeMap<String, f64>) -> Option<(&str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for (agent, score) in scores {
        match best {
            Some((_, top)) if *score <= top => {}
            _ => best = Some((agent.as_str(), *score)),
        }
    }
    best
}

impl CommitteeVoteCoordinator {
    /// Raw scores per agent, or `None` if the deadline passed first.
    ///
    /// Scorers run in a `JoinSet`, so dropping the vote future aborts them.
    async fn score_proposals(
        &self,
        request: &VoteRequest,
        timeout: Duration,
    ) -> Option<BTreeMap<String, f64>> {
        let mut jobs = JoinSet::new();
        for (agent, content) in &request.proposals {
            let scorer = self.scorer.clone();
            let task = request.task.clone();
            let agent = agent.clone();
            let content = content.clone();
            jobs.spawn(async move {
                let score = match scorer.score(&task, &agent, &content).await {
                    Ok(score) => score,
                    Err(e) => {
                        metrics::record_scorer_failure();
                        warn!(agent = %agent, error = %e, "Proposal scorer failed");
                        0.0
                    }
                };
                (agent, score)
            });
        }

        // Agents whose job never reports back keep 0.
        let mut scores: BTreeMap<String, f64> = request
            .proposals
            .keys()
            .map(|agent| (agent.clone(), 0.0))
            .collect();
        let collected = tokio::time::timeout(timeout, async {
            while let Some(joined) = jobs.join_next().await {
                match joined {
                    Ok((agent, raw)) => {
                        scores.insert(agent, sanitize_score(raw));
                    }
                    Err(e) => {
                        metrics::record_scorer_failure();
                        warn!(error = %e, "Proposal scorer task did not complete");
                    }
                }
            }
        })
        .await;

        if collected.is_err() {
            jobs.abort_all();
            return None;
        }
        Some(scores)
    }

    pub(crate) async fn evaluate(
        &self,
        request: &VoteRequest,
        agreement_score: f64,
        required_quorum: f64,
        timeout: Duration,
    ) -> VoteDecision {
        debug!(
            task = %request.task,
            proposals = request.proposals.len(),
            timeout_ms = timeout.as_millis() as u64,
            "Quorum not reached, evaluating proposals"
        );

        let started = Instant::now();
        let raw = self.score_proposals(request, timeout).await;
        metrics::record_evaluation_latency(started.elapsed().as_secs_f64());

        let Some(raw) = raw else {
            warn!(
                task = %request.task,
                timeout_ms = timeout.as_millis() as u64,
                "Proposal evaluation timed out"
            );
            return VoteDecision::timed_out(agreement_score, required_quorum);
        };

        let scores: BTreeMap<String, f64> = raw
            .into_iter()
            .map(|(agent, score)| {
                let content = request
                    .proposals
                    .get(&agent)
                    .map(String::as_str)
                    .unwrap_or_default();
                let penalized = apply_integrity_penalties(score, content);
                (agent, penalized)
            })
            .collect();

        let stats = VoteStats {
            voters: scores.len(),
            avg_integrity: if scores.is_empty() {
                0.0
            } else {
                scores.values().sum::<f64>() / scores.len() as f64
            },
        };

        let best = best_agent(&scores).map(|(agent, score)| (agent.to_string(), score));
        let Some((winner, confidence)) = best else {
            return VoteDecision::below_integrity(agreement_score, required_quorum, scores, stats);
        };
        if confidence < self.config.min_integrity {
            return VoteDecision::below_integrity(agreement_score, required_quorum, scores, stats);
        }

        let content = request.proposals.get(&winner).cloned();
        let winning_hash = content.as_deref().map(content_hash);
        VoteDecision {
            status: VoteStatus::Accepted,
            reason: REASON_EVALUATION.to_string(),
            path: DecisionPath::Evaluation,
            content,
            winning_hash,
            winner: Some(winner),
            agreement_score,
            required_quorum,
            confidence,
            scores,
            stats: Some(stats),
            deviating_agents: Vec::new(),
        }
    }
}
