//! Listen loop and the per-datagram acceptance path.
//!
//! decode -> verify signature -> skew window -> per-sender replay check ->
//! registry upsert -> dispatch by message type.

use super::core::{Counters, ServiceInner};
use crate::codec::{DecodedEnvelope, MessageType, FIELD_REPLY_TO};
use crate::domain::{DiscoveryError, DiscoveryResult, PeerUpdate, Severity, Timestamp};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Pause after a transport error so a broken socket cannot spin the loop.
const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_millis(100);

pub(crate) async fn run(inner: Arc<ServiceInner>, mut shutdown: watch::Receiver<bool>) {
    debug!(agent_id = %inner.local.agent_id, "Listen loop started");
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            received = inner.transport.receive() => match received {
                Ok((bytes, from)) => {
                    if let Err(e) = inner.process_datagram(&bytes, from).await {
                        log_rejection(&e, from);
                    }
                }
                Err(DiscoveryError::NotListening) => {
                    warn!("Transport stopped listening, listen loop exiting");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Receive failed");
                    tokio::time::sleep(RECEIVE_ERROR_BACKOFF).await;
                }
            }
        }
    }
    debug!(agent_id = %inner.local.agent_id, "Listen loop stopped");
}

fn log_rejection(err: &DiscoveryError, from: SocketAddr) {
    match err.severity() {
        Severity::Debug => debug!(%from, error = %err, "Dropped datagram"),
        Severity::Warn => warn!(%from, error = %err, "Dropped datagram"),
        Severity::Error => error!(%from, error = %err, "Failed to process datagram"),
    }
}

impl ServiceInner {
    pub(crate) async fn process_datagram(
        &self,
        bytes: &[u8],
        from: SocketAddr,
    ) -> DiscoveryResult<Option<MessageType>> {
        Counters::bump(&self.counters.received);
        match self.accept(bytes) {
            Ok(Some(envelope)) => {
                Counters::bump(&self.counters.accepted);
                let kind = envelope.payload.kind;
                self.dispatch(envelope, from).await?;
                Ok(Some(kind))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                if e.is_rejection() {
                    Counters::bump(&self.counters.rejected);
                }
                Err(e)
            }
        }
    }

    /// Integrity and freshness checks. `None` for our own echoed broadcasts.
    fn accept(&self, bytes: &[u8]) -> DiscoveryResult<Option<DecodedEnvelope>> {
        let envelope = self.codec.decode(bytes)?;
        if !self.codec.verify_envelope(&envelope) {
            return Err(DiscoveryError::Signature);
        }
        if envelope.payload.agent_id == self.local.agent_id {
            return Ok(None);
        }

        let now = self.now();
        self.replay
            .check_and_record(&envelope.payload.agent_id, envelope.payload.timestamp, now)?;

        let payload = &envelope.payload;
        let update = PeerUpdate::direct(
            payload.agent_id.clone(),
            payload.ip.clone(),
            payload.port,
            now,
        )
        .with_metadata(payload.metadata.clone());
        self.registry.upsert(update);
        Ok(Some(envelope))
    }

    async fn dispatch(&self, envelope: DecodedEnvelope, from: SocketAddr) -> DiscoveryResult<()> {
        let payload = envelope.payload;
        match payload.kind {
            MessageType::Announce => {
                let target = SocketAddr::new(from.ip(), payload.port);
                let mut extra = serde_json::Map::new();
                extra.insert(FIELD_REPLY_TO.into(), json!(payload.timestamp));
                self.pending_pings
                    .lock()
                    .insert(payload.agent_id.clone(), self.now());
                self.unicast(MessageType::Ack, extra, target).await?;
            }
            MessageType::Ack => self.record_latency(&payload.agent_id, payload.reply_to()),
            MessageType::Sync => {
                let now = self.now();
                let peers = payload.peers();
                debug!(from_agent = %payload.agent_id, count = peers.len(), "Merging gossip");
                for peer in &peers {
                    self.registry.upsert(PeerUpdate::from_gossip(peer, now));
                }
            }
            MessageType::Heartbeat => {}
        }
        Ok(())
    }

    /// Latency from a pending ping, falling back to the echoed announce timestamp.
    fn record_latency(&self, agent_id: &str, reply_to: Option<f64>) {
        let now = self.now();
        let sent_at = self.pending_pings.lock().remove(agent_id).or_else(|| {
            let reply_to = reply_to?;
            self.recent_announces
                .lock()
                .iter()
                .any(|ts| *ts == reply_to)
                .then(|| Timestamp::new(reply_to))
        });

        if let Some(sent_at) = sent_at {
            let latency_ms = now.secs_since(sent_at) * 1000.0;
            if self.registry.set_latency(agent_id, latency_ms) {
                info!(agent_id = %agent_id, latency_ms, "Measured peer latency");
            }
        }
    }

    /// Drop pending pings older than the configured TTL.
    pub(crate) fn prune_pending_pings(&self) -> usize {
        let now = self.now();
        let ttl = self.config.pending_ping_ttl().as_secs_f64();
        let mut pending = self.pending_pings.lock();
        let before = pending.len();
        pending.retain(|_, sent_at| now.secs_since(*sent_at) <= ttl);
        before - pending.len()
    }
}
