//! Several discovery services sharing one in-memory network.

#[cfg(test)]
mod tests {
    use crate::fixtures::{FLEET_SECRET, T0};
    use crate::support::init_tracing;
    use fleet_01_peer_discovery::adapters::{InMemoryNetwork, MemoryTransport};
    use fleet_01_peer_discovery::codec::{MessageCodec, MessageType};
    use fleet_01_peer_discovery::test_utils::{wait_until, ControllableTimeSource, ManualClock};
    use fleet_01_peer_discovery::{
        DiscoveryConfig, DiscoveryDependencies, DiscoveryService, PeerDiscoveryApi,
        DEFAULT_DISCOVERY_PORT,
    };
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    struct Node {
        service: DiscoveryService,
        clock: Arc<ManualClock>,
        addr: SocketAddr,
    }

    struct Fleet {
        net: InMemoryNetwork,
        time: Arc<ControllableTimeSource>,
    }

    impl Fleet {
        fn new() -> Self {
            init_tracing();
            Self {
                net: InMemoryNetwork::new(),
                time: ControllableTimeSource::shared(T0),
            }
        }

        fn node(&self, id: &str) -> Node {
            let mut config = DiscoveryConfig::for_testing(id);
            config.port = DEFAULT_DISCOVERY_PORT;
            self.node_on(config, self.net.endpoint(DEFAULT_DISCOVERY_PORT))
        }

        fn node_on(&self, config: DiscoveryConfig, transport: MemoryTransport) -> Node {
            let addr = transport.addr();
            let clock = Arc::new(ManualClock::new());
            let service = DiscoveryService::new(
                config,
                DiscoveryDependencies {
                    transport: Arc::new(transport),
                    time_source: self.time.clone(),
                    clock: clock.clone(),
                    secret: Some(FLEET_SECRET.to_vec()),
                },
            )
            .unwrap();
            Node {
                service,
                clock,
                addr,
            }
        }
    }

    #[tokio::test]
    async fn test_three_nodes_form_full_mesh() {
        let fleet = Fleet::new();
        let nodes: Vec<Node> = ["alpha", "beta", "gamma"]
            .iter()
            .map(|id| fleet.node(id))
            .collect();
        for node in &nodes {
            node.service.start().unwrap();
        }

        let meshed = wait_until(WAIT, || {
            nodes
                .iter()
                .all(|n| n.service.registry().len() == nodes.len() - 1)
        })
        .await;
        assert!(meshed);

        let alpha = &nodes[0].service;
        let urls = alpha.get_peer_urls();
        assert_eq!(urls.len(), 2);
        assert!(urls.iter().all(|u| u.starts_with("http://10.0.0.")));

        for node in &nodes {
            node.service.stop().await;
        }
    }

    #[tokio::test]
    async fn test_late_joiner_learns_unreachable_peer_through_gossip() {
        let fleet = Fleet::new();
        let alpha = fleet.node("alpha");
        let beta = fleet.node("beta");
        let gamma = fleet.node("gamma");

        // gamma misses the initial announces
        fleet.net.partition(gamma.addr);
        alpha.service.start().unwrap();
        beta.service.start().unwrap();
        gamma.service.start().unwrap();
        assert!(
            wait_until(WAIT, || {
                alpha.service.registry().contains("beta")
                    && beta.service.registry().contains("alpha")
            })
            .await
        );
        beta.clock.wait_for_sleepers(1).await;
        assert!(gamma.service.registry().is_empty());

        // One heartbeat round from beta carries alpha to gamma
        fleet.net.heal(gamma.addr);
        beta.clock.tick();
        assert!(wait_until(WAIT, || gamma.service.registry().len() == 2).await);

        let alpha_seen_by_gamma = gamma.service.registry().get("alpha").unwrap();
        assert_eq!(alpha_seen_by_gamma.ip, alpha.addr.ip().to_string());
        assert!(gamma.service.registry().contains("beta"));

        for node in [&alpha, &beta, &gamma] {
            node.service.stop().await;
        }
    }

    #[tokio::test]
    async fn test_ack_echo_measures_latency_between_services() {
        let fleet = Fleet::new();
        let alpha = fleet.node("alpha");
        let beta = fleet.node("beta");
        let codec = MessageCodec::new(Some(FLEET_SECRET));

        alpha.service.announce().await.unwrap();
        beta.service.start().unwrap();

        let ack_from_beta = || {
            fleet
                .net
                .captured_from(beta.addr)
                .into_iter()
                .find(|d| {
                    codec
                        .decode(&d.bytes)
                        .map(|e| e.payload.kind == MessageType::Ack)
                        .unwrap_or(false)
                })
        };
        assert!(wait_until(WAIT, || ack_from_beta().is_some()).await);
        let ack = ack_from_beta().unwrap();
        assert_eq!(ack.to, alpha.addr);

        // The ACK echoes alpha's announce timestamp; 40 ms pass in flight
        fleet.time.advance(Duration::from_millis(40));
        let accepted = alpha
            .service
            .process_datagram(&ack.bytes, ack.from)
            .await
            .unwrap();
        assert_eq!(accepted, Some(MessageType::Ack));

        let latency = alpha.service.registry().get("beta").unwrap().latency_ms;
        assert!((latency - 40.0).abs() < 1e-3, "latency was {latency}");
        assert_eq!(alpha.service.get_fastest_peers(1)[0].agent_id, "beta");

        beta.service.stop().await;
    }

    #[tokio::test]
    async fn test_stale_peers_age_out_of_active_set() {
        let fleet = Fleet::new();
        let alpha = fleet.node("alpha");
        let beta = fleet.node("beta");
        alpha.service.start().unwrap();
        beta.service.start().unwrap();
        assert!(wait_until(WAIT, || alpha.service.registry().contains("beta")).await);
        beta.service.stop().await;

        fleet.time.advance(Duration::from_secs(301));
        assert!(alpha.service.get_active_peers(None).is_empty());
        assert_eq!(alpha.service.registry().len(), 1);

        fleet.time.advance(Duration::from_secs(3600));
        assert_eq!(alpha.service.evict_stale_peers(None), 1);
        assert!(alpha.service.registry().is_empty());

        alpha.service.stop().await;
    }

    #[tokio::test]
    async fn test_nodes_with_different_secrets_stay_isolated() {
        let fleet = Fleet::new();
        let alpha = fleet.node("alpha");

        let mut config = DiscoveryConfig::for_testing("intruder");
        config.port = DEFAULT_DISCOVERY_PORT;
        let transport = fleet.net.endpoint(DEFAULT_DISCOVERY_PORT);
        let intruder = DiscoveryService::new(
            config,
            DiscoveryDependencies {
                transport: Arc::new(transport),
                time_source: fleet.time.clone(),
                clock: Arc::new(ManualClock::new()),
                secret: Some(b"other-fleet".to_vec()),
            },
        )
        .unwrap();

        alpha.service.start().unwrap();
        intruder.start().unwrap();
        intruder.announce().await.unwrap();

        assert!(
            wait_until(WAIT, || alpha.service.get_network_info().messages.rejected >= 2).await
        );
        assert!(alpha.service.registry().is_empty());
        assert!(intruder.registry().is_empty());

        alpha.service.stop().await;
        intruder.stop().await;
    }
}
