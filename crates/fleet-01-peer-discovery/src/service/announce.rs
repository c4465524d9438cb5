//! Announce loop: one ANNOUNCE at start, then a heartbeat round every interval.

use super::core::ServiceInner;
use crate::codec::{MessageType, FIELD_PEERS};
use crate::domain::DiscoveryResult;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error};

pub(crate) async fn run(inner: Arc<ServiceInner>, mut shutdown: watch::Receiver<bool>) {
    if let Err(e) = inner
        .broadcast(MessageType::Announce, serde_json::Map::new())
        .await
    {
        error!(error = %e, "Failed to build ANNOUNCE");
    }

    let interval = inner.config.announce_interval();
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = inner.clock.sleep(interval) => {}
        }
        if let Err(e) = heartbeat_round(&inner).await {
            error!(error = %e, "Heartbeat round failed");
        }
    }
    debug!(agent_id = %inner.local.agent_id, "Announce loop stopped");
}

/// HEARTBEAT, then SYNC with the most recently seen peers when any are known.
///
/// Also expires pending pings and replay-guard entries that left the
/// skew window.
pub(crate) async fn heartbeat_round(inner: &ServiceInner) -> DiscoveryResult<usize> {
    let mut sent = inner
        .broadcast(MessageType::Heartbeat, serde_json::Map::new())
        .await?;

    let peers = inner.registry.most_recent(inner.config.gossip_fanout);
    if !peers.is_empty() {
        let records = peers
            .iter()
            .filter_map(|peer| serde_json::to_value(peer).ok())
            .collect::<Vec<_>>();
        let mut extra = serde_json::Map::new();
        extra.insert(FIELD_PEERS.into(), Value::Array(records));
        sent += inner.broadcast(MessageType::Sync, extra).await?;
    }

    let now = inner.now();
    let expired_pings = inner.prune_pending_pings();
    let expired_senders = inner.replay.prune(now);
    if expired_pings + expired_senders > 0 {
        debug!(expired_pings, expired_senders, "Pruned discovery state");
    }
    Ok(sent)
}
