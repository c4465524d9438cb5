//! Wire types for the discovery protocol.

use crate::domain::{DiscoveryError, DiscoveryResult, Metadata, PeerInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Extra field carrying gossiped peers in a SYNC payload.
pub const FIELD_PEERS: &str = "peers";

/// Extra field on ACK payloads echoing the acknowledged ANNOUNCE timestamp.
pub const FIELD_REPLY_TO: &str = "reply_to";

/// Discovery message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    /// New node joining.
    Announce,
    /// Periodic liveness.
    Heartbeat,
    /// Direct reply to an ANNOUNCE, used for latency measurement.
    Ack,
    /// Gossip of recently seen peers.
    Sync,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Announce => "ANNOUNCE",
            Self::Heartbeat => "HEARTBEAT",
            Self::Ack => "ACK",
            Self::Sync => "SYNC",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed body of an envelope.
///
/// Type-specific fields (`peers`, `reply_to`, anything unknown) are kept in
/// `extra` so they stay covered by the signature and survive re-encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub agent_id: String,
    pub ip: String,
    pub port: u16,
    /// Unix seconds; doubles as the per-sender anti-replay counter.
    pub timestamp: f64,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Payload {
    /// Peers carried by a SYNC message. Malformed records are skipped.
    pub fn peers(&self) -> Vec<PeerInfo> {
        match self.extra.get(FIELD_PEERS) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value::<PeerInfo>(item.clone()).ok())
                .filter(|peer| !peer.agent_id.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The ANNOUNCE timestamp echoed by an ACK, if any.
    pub fn reply_to(&self) -> Option<f64> {
        self.extra.get(FIELD_REPLY_TO).and_then(Value::as_f64)
    }
}

/// Identity and address the local agent advertises in every payload.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalAgent {
    pub agent_id: String,
    pub ip: String,
    pub port: u16,
    pub metadata: Metadata,
}

/// On-the-wire unit: `{"data": Payload, "sig": string}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Envelope {
    pub data: Value,
    pub sig: String,
}

/// A parsed envelope.
///
/// `data` is the payload exactly as received, used for signature checks.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEnvelope {
    pub payload: Payload,
    pub data: Value,
    pub signature: String,
}

impl DecodedEnvelope {
    pub(crate) fn from_envelope(envelope: Envelope) -> DiscoveryResult<Self> {
        if !envelope.data.is_object() {
            return Err(DiscoveryError::Decode("`data` is not an object".into()));
        }
        let payload: Payload = serde_json::from_value(envelope.data.clone())
            .map_err(|e| DiscoveryError::Decode(e.to_string()))?;
        if payload.agent_id.trim().is_empty() {
            return Err(DiscoveryError::Decode("empty agent_id".into()));
        }
        Ok(Self {
            payload,
            data: envelope.data,
            signature: envelope.sig,
        })
    }
}
