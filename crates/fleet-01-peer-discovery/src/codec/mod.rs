//! # Message Codec
//!
//! Builds and parses signed discovery envelopes.
//!
//! ## Signing
//!
//! `sig` is the lowercase hex HMAC-SHA256 of the canonical JSON encoding
//! of the payload (object keys sorted at every depth, compact separators).
//! Without a shared secret every envelope carries the literal `"unsigned"`
//! and verification always passes.
//!
//! On receipt the signature is recomputed over the `data` object exactly as
//! it arrived, so fields this node does not understand are still covered.

mod message;

pub use message::{
    DecodedEnvelope, LocalAgent, MessageType, Payload, FIELD_PEERS, FIELD_REPLY_TO,
};

use crate::domain::{DiscoveryError, DiscoveryResult, Timestamp, MAX_DATAGRAM_SIZE};
use hmac::{Hmac, Mac};
use message::Envelope;
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signature value used when no shared secret is configured.
pub const UNSIGNED: &str = "unsigned";

/// Hex length of an HMAC-SHA256 tag.
const SIGNATURE_HEX_LEN: usize = 64;

/// Canonical (sorted-key, compact) JSON encoding of a value.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                if let Some(v) = map.get(key) {
                    write_canonical(v, out);
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn effective_secret(secret: Option<&[u8]>) -> Option<&[u8]> {
    secret.filter(|s| !s.is_empty())
}

/// Sign a payload value. Returns `"unsigned"` when `secret` is absent or empty.
pub fn sign(data: &Value, secret: Option<&[u8]>) -> String {
    let Some(secret) = effective_secret(secret) else {
        return UNSIGNED.to_string();
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return UNSIGNED.to_string();
    };
    mac.update(canonical_json(data).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a signature in constant time. Always true without a secret.
pub fn verify(data: &Value, signature: &str, secret: Option<&[u8]>) -> bool {
    let Some(secret) = effective_secret(secret) else {
        return true;
    };
    if signature.len() != SIGNATURE_HEX_LEN
        || !signature
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return false;
    }
    let Ok(tag) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(canonical_json(data).as_bytes());
    mac.verify_slice(&tag).is_ok()
}

/// Envelope builder/parser bound to one shared secret.
#[derive(Clone)]
pub struct MessageCodec {
    secret: Option<Vec<u8>>,
    max_size: usize,
}

impl std::fmt::Debug for MessageCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageCodec")
            .field("signed", &self.is_signed())
            .field("max_size", &self.max_size)
            .finish()
    }
}

impl MessageCodec {
    /// Create a codec. An empty secret counts as no secret.
    pub fn new(secret: Option<&[u8]>) -> Self {
        Self {
            secret: effective_secret(secret).map(<[u8]>::to_vec),
            max_size: MAX_DATAGRAM_SIZE,
        }
    }

    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn is_signed(&self) -> bool {
        self.secret.is_some()
    }

    fn secret(&self) -> Option<&[u8]> {
        self.secret.as_deref()
    }

    /// Signature for a payload.
    pub fn sign(&self, payload: &Payload) -> DiscoveryResult<String> {
        let data = to_value(payload)?;
        Ok(sign(&data, self.secret()))
    }

    /// Check a signature against a payload.
    pub fn verify(&self, payload: &Payload, signature: &str) -> bool {
        match to_value(payload) {
            Ok(data) => verify(&data, signature, self.secret()),
            Err(_) => false,
        }
    }

    /// Check a decoded envelope against the bytes that were actually received.
    pub fn verify_envelope(&self, envelope: &DecodedEnvelope) -> bool {
        verify(&envelope.data, &envelope.signature, self.secret())
    }

    /// Build the payload for `kind`, merge `extra`, sign and serialize.
    ///
    /// Core fields always win over colliding keys in `extra`.
    pub fn encode(
        &self,
        kind: MessageType,
        sender: &LocalAgent,
        timestamp: Timestamp,
        extra: serde_json::Map<String, Value>,
    ) -> DiscoveryResult<Vec<u8>> {
        let payload = Payload {
            kind,
            agent_id: sender.agent_id.clone(),
            ip: sender.ip.clone(),
            port: sender.port,
            timestamp: timestamp.as_secs_f64(),
            metadata: sender.metadata.clone(),
            extra,
        };
        let data = to_value(&payload)?;
        let envelope = Envelope {
            sig: sign(&data, self.secret()),
            data,
        };
        let bytes = serde_json::to_vec(&envelope)
            .map_err(|e| DiscoveryError::Decode(format!("cannot serialize envelope: {e}")))?;
        if bytes.len() > self.max_size {
            return Err(DiscoveryError::MessageTooLarge {
                size: bytes.len(),
                limit: self.max_size,
            });
        }
        Ok(bytes)
    }

    /// Parse an envelope. Does not verify the signature.
    pub fn decode(&self, bytes: &[u8]) -> DiscoveryResult<DecodedEnvelope> {
        if bytes.len() > self.max_size {
            return Err(DiscoveryError::MessageTooLarge {
                size: bytes.len(),
                limit: self.max_size,
            });
        }
        let envelope: Envelope =
            serde_json::from_slice(bytes).map_err(|e| DiscoveryError::Decode(e.to_string()))?;
        DecodedEnvelope::from_envelope(envelope)
    }
}

fn to_value(payload: &Payload) -> DiscoveryResult<Value> {
    serde_json::to_value(payload)
        .map_err(|e| DiscoveryError::Decode(format!("cannot serialize payload: {e}")))
}
