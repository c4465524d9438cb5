//! Forged and tampered envelopes.

#[cfg(test)]
mod tests {
    use crate::fixtures::{ScriptedPeer, FLEET_SECRET, T0};
    use fleet_01_peer_discovery::adapters::InMemoryNetwork;
    use fleet_01_peer_discovery::codec::MessageType;
    use fleet_01_peer_discovery::test_utils::{FixedTimeSource, ManualClock};
    use fleet_01_peer_discovery::{
        DiscoveryConfig, DiscoveryDependencies, DiscoveryError, DiscoveryService,
        PeerDiscoveryApi,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn victim(net: &InMemoryNetwork) -> DiscoveryService {
        let mut config = DiscoveryConfig::for_testing("victim");
        config.port = 31415;
        DiscoveryService::new(
            config,
            DiscoveryDependencies {
                transport: Arc::new(net.endpoint(31415)),
                time_source: Arc::new(FixedTimeSource::new(T0)),
                clock: Arc::new(ManualClock::new()),
                secret: Some(FLEET_SECRET.to_vec()),
            },
        )
        .unwrap()
    }

    fn rewrite(bytes: &[u8], edit: impl FnOnce(&mut Value)) -> Vec<u8> {
        let mut envelope: Value = serde_json::from_slice(bytes).unwrap();
        edit(&mut envelope);
        serde_json::to_vec(&envelope).unwrap()
    }

    #[tokio::test]
    async fn test_wrong_key_cannot_join() {
        let net = InMemoryNetwork::new();
        let service = victim(&net);
        let attacker = ScriptedPeer::new(
            "mallory",
            "10.0.0.66:31415".parse().unwrap(),
            Some(b"guess".as_slice()),
        );

        let err = service
            .process_datagram(&attacker.datagram(MessageType::Announce, T0), attacker.addr)
            .await
            .unwrap_err();

        assert_eq!(err, DiscoveryError::Signature);
        assert!(service.registry().is_empty());
        // No ACK is sent to an unauthenticated sender
        assert!(net.captured().is_empty());
    }

    #[tokio::test]
    async fn test_unsigned_envelope_rejected_by_signed_fleet() {
        let net = InMemoryNetwork::new();
        let service = victim(&net);
        let attacker = ScriptedPeer::new("mallory", "10.0.0.66:31415".parse().unwrap(), None);

        let result = service
            .process_datagram(&attacker.datagram(MessageType::Heartbeat, T0), attacker.addr)
            .await;

        assert_eq!(result, Err(DiscoveryError::Signature));
    }

    #[tokio::test]
    async fn test_tampered_fields_break_signature() {
        let net = InMemoryNetwork::new();
        let service = victim(&net);
        let peer = ScriptedPeer::new(
            "worker",
            "10.0.0.7:31415".parse().unwrap(),
            Some(FLEET_SECRET),
        );
        let genuine = peer.datagram(MessageType::Announce, T0);

        let redirected = rewrite(&genuine, |e| e["data"]["ip"] = json!("10.0.0.66"));
        let impersonated = rewrite(&genuine, |e| e["data"]["agent_id"] = json!("admin"));
        let injected = rewrite(&genuine, |e| e["data"]["metadata"]["role"] = json!("leader"));
        let stripped = rewrite(&genuine, |e| e["sig"] = json!(""));

        for forged in [redirected, impersonated, injected, stripped] {
            let result = service.process_datagram(&forged, peer.addr).await;
            assert_eq!(result, Err(DiscoveryError::Signature));
        }
        assert!(service.registry().is_empty());
        assert_eq!(service.get_network_info().messages.rejected, 4);

        // The untouched original still verifies
        assert!(service.process_datagram(&genuine, peer.addr).await.is_ok());
    }

    #[tokio::test]
    async fn test_forged_gossip_cannot_plant_peers() {
        let net = InMemoryNetwork::new();
        let service = victim(&net);
        let peer = ScriptedPeer::new(
            "worker",
            "10.0.0.7:31415".parse().unwrap(),
            Some(FLEET_SECRET),
        );

        let mut extra = serde_json::Map::new();
        extra.insert("peers".into(), json!([]));
        let sync = peer.datagram_with(MessageType::Sync, T0, extra);
        let planted = rewrite(&sync, |e| {
            e["data"]["peers"] = json!([{
                "agent_id": "phantom",
                "ip": "203.0.113.9",
                "port": 31415,
                "last_seen": T0,
            }])
        });

        assert!(service.process_datagram(&planted, peer.addr).await.is_err());
        assert!(!service.registry().contains("phantom"));
    }
}
