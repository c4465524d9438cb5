//! Sybil attacks: many cheap identities against a trusted minority.

#[cfg(test)]
mod tests {
    use crate::fixtures::{ScriptedPeer, FLEET_SECRET, T0};
    use fleet_01_peer_discovery::adapters::InMemoryNetwork;
    use fleet_01_peer_discovery::codec::MessageType;
    use fleet_01_peer_discovery::test_utils::{FixedTimeSource, ManualClock};
    use fleet_01_peer_discovery::{DiscoveryConfig, DiscoveryDependencies, DiscoveryService};
    use fleet_02_consensus::test_utils::FixedScorer;
    use fleet_02_consensus::{
        calculate_agreement_score, CommitteeVoteCoordinator, UnavailableScorer, Vote,
        VoteRequest, VoteStatus,
    };
    use std::sync::Arc;

    const VALID: &str = "valid";
    const MALICIOUS: &str = "malicious";

    fn coordinator_with_sybils(sybils: usize) -> (CommitteeVoteCoordinator, VoteRequest) {
        let coordinator = CommitteeVoteCoordinator::with_scorer(Arc::new(UnavailableScorer));
        coordinator.set_reliability("trusted-1", 1.0);
        coordinator.set_reliability("trusted-2", 1.0);
        let mut request = VoteRequest::new("deploy")
            .proposal("trusted-1", VALID)
            .proposal("trusted-2", VALID);
        for i in 0..sybils {
            let id = format!("sybil-{i:02}");
            coordinator.set_reliability(id.as_str(), 0.1);
            request = request.proposal(id, MALICIOUS);
        }
        (coordinator, request)
    }

    #[test]
    fn test_weighted_share_resists_four_sybils() {
        let votes = [
            Vote::new("t1", 1.0, "valid"),
            Vote::new("t2", 1.0, "valid"),
            Vote::new("s1", 0.1, "malicious"),
            Vote::new("s2", 0.1, "malicious"),
            Vote::new("s3", 0.1, "malicious"),
            Vote::new("s4", 0.1, "malicious"),
        ];
        let score = calculate_agreement_score(&votes);
        assert!((score - 2.0 / 2.4).abs() < 1e-9);
        assert!(score >= 0.67);
    }

    #[tokio::test]
    async fn test_trusted_minority_wins_quorum() {
        let (coordinator, request) = coordinator_with_sybils(4);
        let decision = coordinator.run_committee_vote(request).await;

        assert_eq!(decision.status, VoteStatus::Accepted);
        assert_eq!(decision.content.as_deref(), Some(VALID));
        assert_eq!(decision.deviating_agents.len(), 4);
    }

    #[tokio::test]
    async fn test_sybil_flood_never_gets_malicious_content_accepted() {
        // Up to 30 identities at 0.1 still carry less weight than needed to
        // reach quorum against two trusted agents
        for sybils in [1, 4, 10, 20, 30] {
            let (coordinator, request) = coordinator_with_sybils(sybils);
            let decision = coordinator.run_committee_vote(request).await;
            assert_ne!(
                decision.content.as_deref(),
                Some(MALICIOUS),
                "{sybils} sybils got malicious content accepted"
            );
        }
    }

    #[tokio::test]
    async fn test_sybils_with_captured_evaluator_still_penalized() {
        // An evaluator that rates everything highly cannot rescue a stub
        let coordinator = CommitteeVoteCoordinator::with_scorer(Arc::new(FixedScorer::new(1.0)));
        let request = VoteRequest::new("deploy")
            .proposal("a", "def run(): return deploy()")
            .proposal("b", "pass  # TODO")
            .proposal("c", "x");
        let decision = coordinator.run_committee_vote(request).await;

        assert_eq!(decision.status, VoteStatus::Accepted);
        assert_eq!(decision.winner.as_deref(), Some("a"));
        assert!(decision.scores["b"] < 0.5);
        assert!(decision.scores["c"] < 0.5);
    }

    #[tokio::test]
    async fn test_unsigned_identity_flood_leaves_registry_empty() {
        let net = InMemoryNetwork::new();
        let mut config = DiscoveryConfig::for_testing("victim");
        config.port = 31415;
        let service = DiscoveryService::new(
            config,
            DiscoveryDependencies {
                transport: Arc::new(net.endpoint(31415)),
                time_source: Arc::new(FixedTimeSource::new(T0)),
                clock: Arc::new(ManualClock::new()),
                secret: Some(FLEET_SECRET.to_vec()),
            },
        )
        .unwrap();

        for i in 0..100u8 {
            let addr = format!("10.0.1.{i}:31415").parse().unwrap();
            let sybil = ScriptedPeer::new(&format!("sybil-{i}"), addr, Some(b"self-issued".as_slice()));
            let _ = service
                .process_datagram(&sybil.datagram(MessageType::Announce, T0), addr)
                .await;
        }

        assert!(service.registry().is_empty());
        assert!(net.captured().is_empty());
    }
}
