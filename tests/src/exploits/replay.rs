//! Replay and clock-skew attacks against the acceptance path.

#[cfg(test)]
mod tests {
    use crate::fixtures::{ScriptedPeer, FLEET_SECRET, T0};
    use fleet_01_peer_discovery::adapters::InMemoryNetwork;
    use fleet_01_peer_discovery::codec::{MessageCodec, MessageType};
    use fleet_01_peer_discovery::test_utils::{ControllableTimeSource, ManualClock};
    use fleet_01_peer_discovery::{
        DiscoveryConfig, DiscoveryDependencies, DiscoveryError, DiscoveryService,
    };
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    fn service_on(
        net: &InMemoryNetwork,
        id: &str,
        time: Arc<ControllableTimeSource>,
    ) -> (DiscoveryService, SocketAddr) {
        let mut config = DiscoveryConfig::for_testing(id);
        config.port = 31415;
        let transport = net.endpoint(31415);
        let addr = transport.addr();
        let service = DiscoveryService::new(
            config,
            DiscoveryDependencies {
                transport: Arc::new(transport),
                time_source: time,
                clock: Arc::new(ManualClock::new()),
                secret: Some(FLEET_SECRET.to_vec()),
            },
        )
        .unwrap();
        (service, addr)
    }

    #[tokio::test]
    async fn test_sniffed_announce_cannot_be_replayed() {
        let net = InMemoryNetwork::new();
        let time = ControllableTimeSource::shared(T0);
        let (honest, honest_addr) = service_on(&net, "honest", time.clone());
        let (victim, _) = service_on(&net, "victim", time.clone());

        honest.announce().await.unwrap();
        let sniffed = net.captured_from(honest_addr)[0].clone();

        assert!(victim.process_datagram(&sniffed.bytes, honest_addr).await.is_ok());

        // Same bytes again, from the original source and from a spoofed one
        for from in [honest_addr, "10.0.0.66:40000".parse().unwrap()] {
            let err = victim
                .process_datagram(&sniffed.bytes, from)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                DiscoveryError::Replay { ref agent_id, .. } if agent_id == "honest"
            ));
        }
    }

    #[tokio::test]
    async fn test_replay_after_window_fails_skew_check() {
        let net = InMemoryNetwork::new();
        let time = ControllableTimeSource::shared(T0);
        let (victim, _) = service_on(&net, "victim", time.clone());
        let peer = ScriptedPeer::new(
            "worker",
            "10.0.0.7:31415".parse().unwrap(),
            Some(FLEET_SECRET),
        );
        let captured = peer.datagram(MessageType::Heartbeat, T0);

        // The guard forgets senders once their last timestamp leaves the
        // window, so an old capture must be caught by the skew check
        time.advance(Duration::from_secs(600));
        let err = victim
            .process_datagram(&captured, peer.addr)
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::ClockSkew { .. }));
    }

    #[tokio::test]
    async fn test_future_dated_message_cannot_lock_out_sender() {
        let net = InMemoryNetwork::new();
        let time = ControllableTimeSource::shared(T0);
        let (victim, _) = service_on(&net, "victim", time.clone());
        let peer = ScriptedPeer::new(
            "worker",
            "10.0.0.7:31415".parse().unwrap(),
            Some(FLEET_SECRET),
        );

        // Far-future timestamp is rejected instead of raising the high-water mark
        let err = victim
            .process_datagram(&peer.datagram(MessageType::Heartbeat, T0 + 86_400.0), peer.addr)
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::ClockSkew { .. }));

        assert!(victim
            .process_datagram(&peer.datagram(MessageType::Heartbeat, T0), peer.addr)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_reordered_messages_keep_only_newest() {
        let net = InMemoryNetwork::new();
        let time = ControllableTimeSource::shared(T0);
        let (victim, _) = service_on(&net, "victim", time.clone());
        let peer = ScriptedPeer::new(
            "worker",
            "10.0.0.7:31415".parse().unwrap(),
            Some(FLEET_SECRET),
        );

        let newer = peer.datagram(MessageType::Heartbeat, T0 + 1.0);
        let older = peer.datagram(MessageType::Heartbeat, T0);
        victim.process_datagram(&newer, peer.addr).await.unwrap();
        assert!(victim.process_datagram(&older, peer.addr).await.is_err());

        let codec = MessageCodec::new(Some(FLEET_SECRET));
        assert_eq!(codec.decode(&newer).unwrap().payload.timestamp, T0 + 1.0);
    }
}
