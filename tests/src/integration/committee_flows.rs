//! Committee votes end to end: selection, audit, vote, decision.

#[cfg(test)]
mod tests {
    use crate::support::init_tracing;
    use fleet_02_consensus::test_utils::{DelayedScorer, FixedScorer};
    use fleet_02_consensus::{
        content_hash, CommitteeVoteApi, CommitteeVoteCoordinator, ConsensusConfig,
        CoordinatorDependencies, DecisionPath, PureAgreementBackend, UnavailableScorer,
        VoteRequest, VoteStatus,
    };
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;

    const FOO: &str = "def foo(): return 1";

    fn coordinator() -> CommitteeVoteCoordinator {
        init_tracing();
        CommitteeVoteCoordinator::with_scorer(Arc::new(UnavailableScorer))
    }

    #[tokio::test]
    async fn test_identical_proposals_accepted_by_quorum() {
        let decision = coordinator()
            .run_committee_vote(
                VoteRequest::new("implement foo")
                    .proposal("agent-1", FOO)
                    .proposal("agent-2", FOO)
                    .proposal("agent-3", FOO),
            )
            .await;

        assert_eq!(decision.status, VoteStatus::Accepted);
        assert_eq!(decision.reason, "Byzantine Quorum Reached");
        assert_eq!(decision.agreement_score, 1.0);
        assert_eq!(decision.winning_hash, Some(content_hash(FOO)));
    }

    #[tokio::test]
    async fn test_single_dissenter_does_not_block_majority() {
        let decision = coordinator()
            .run_committee_vote(
                VoteRequest::new("implement foo")
                    .proposal("agent-1", FOO)
                    .proposal("agent-2", FOO)
                    .proposal("agent-3", FOO)
                    .proposal("agent-4", "def foo(): return 42"),
            )
            .await;

        assert_eq!(decision.status, VoteStatus::Accepted);
        assert!((decision.agreement_score - 0.75).abs() < 1e-9);
        assert_eq!(decision.content.as_deref(), Some(FOO));
        assert_eq!(decision.deviating_agents, vec!["agent-4"]);
    }

    #[tokio::test]
    async fn test_even_split_never_claims_quorum() {
        let decision = coordinator()
            .run_committee_vote(
                VoteRequest::new("implement foo")
                    .proposal("agent-1", FOO)
                    .proposal("agent-2", FOO)
                    .proposal("agent-3", "def foo(): return 2")
                    .proposal("agent-4", "def foo(): return 2"),
            )
            .await;

        assert_eq!(decision.agreement_score, 0.5);
        assert_ne!(decision.reason, "Byzantine Quorum Reached");
        assert_eq!(decision.path, DecisionPath::Evaluation);
        assert!(!decision.is_accepted());
    }

    #[tokio::test]
    async fn test_committee_selection_feeds_the_vote() {
        let coordinator = coordinator();
        coordinator.set_reliability("veteran-1", 0.95);
        coordinator.set_reliability("veteran-2", 0.9);
        coordinator.set_reliability("veteran-3", 0.85);
        coordinator.set_reliability("flaky", 0.2);
        let available: Vec<String> = ["veteran-1", "veteran-2", "veteran-3", "flaky"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let committee = coordinator.select_committee("refactor", &available);
        assert_eq!(committee, vec!["veteran-1", "veteran-2", "veteran-3"]);

        let request = VoteRequest::new("refactor")
            .change_type("infrastructure")
            .with_proposals(committee.iter().map(|agent| (agent.as_str(), FOO)));
        let decision = coordinator.run_committee_vote(request).await;

        assert!(decision.is_accepted());
        assert_eq!(decision.required_quorum, 0.8);
        assert_eq!(decision.scores.len(), 3);
    }

    #[tokio::test]
    async fn test_audit_turns_split_into_quorum() {
        let coordinator = coordinator();
        let sloppy = "def foo(: pass  # TODO HACK";
        let proposals: BTreeMap<String, String> = [
            ("agent-1", FOO),
            ("agent-2", FOO),
            ("agent-3", sloppy),
            ("agent-4", sloppy),
        ]
        .into_iter()
        .map(|(a, c)| (a.to_string(), c.to_string()))
        .collect();

        let audit = coordinator.audit_proposals(&proposals);
        let decision = coordinator
            .run_committee_vote(
                VoteRequest::new("implement foo")
                    .with_proposals(proposals)
                    .audit_results(audit),
            )
            .await;

        assert_eq!(decision.status, VoteStatus::Accepted);
        assert_eq!(decision.path, DecisionPath::Quorum);
        assert_eq!(decision.content.as_deref(), Some(FOO));
    }

    #[tokio::test]
    async fn test_evaluator_breaks_deadlock() {
        init_tracing();
        let scorer = FixedScorer::new(0.5).with_score("agent-2", 0.95);
        let coordinator = CommitteeVoteCoordinator::new(
            ConsensusConfig::default(),
            CoordinatorDependencies {
                scorer: Arc::new(scorer),
                backend: Arc::new(PureAgreementBackend),
            },
        )
        .unwrap();
        let api: &dyn CommitteeVoteApi = &coordinator;

        let decision = api
            .run_committee_vote(
                VoteRequest::new("implement foo")
                    .proposal("agent-1", FOO)
                    .proposal("agent-2", "def foo():\n    return sum([1])"),
            )
            .await;

        assert_eq!(decision.status, VoteStatus::Accepted);
        assert_eq!(decision.path, DecisionPath::Evaluation);
        assert_eq!(decision.winner.as_deref(), Some("agent-2"));
        assert_eq!(decision.confidence, 0.95);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_evaluator_times_out_with_structured_decision() {
        init_tracing();
        let coordinator = CommitteeVoteCoordinator::with_scorer(Arc::new(DelayedScorer::new(
            Duration::from_secs(3600),
            1.0,
        )));

        let decision = coordinator
            .run_committee_vote(
                VoteRequest::new("implement foo")
                    .proposal("agent-1", FOO)
                    .proposal("agent-2", "def foo(): return 2")
                    .timeout(Duration::from_secs(2)),
            )
            .await;

        assert_eq!(decision.status, VoteStatus::Timeout);
        assert_eq!(
            decision.reason,
            "Committee vote timed out waiting for AI evaluation."
        );
        assert!(decision.scores.is_empty());
    }
}
