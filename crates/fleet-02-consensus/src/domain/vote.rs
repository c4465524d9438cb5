use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One proposal submission, weighted by the submitter's reliability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub agent: String,
    pub weight: f64,
    /// Lowercase hex SHA-256 of the proposal content.
    pub hash: String,
}

impl Vote {
    pub fn new(agent: impl Into<String>, weight: f64, hash: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            weight,
            hash: hash.into(),
        }
    }

    /// Weight as counted by the tally: non-finite and negative weights count as zero.
    pub fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            0.0
        }
    }
}

/// Lowercase hex SHA-256 of `content`.
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
