//! Domain Errors for Peer Discovery
//!
//! Every per-datagram error is contained by the listen loop; none of these
//! escape a running service. `severity` decides how loudly each is logged.

/// Errors that can occur during peer discovery operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiscoveryError {
    /// Malformed JSON or a missing `data`/`sig` pair.
    #[error("malformed envelope: {0}")]
    Decode(String),

    #[error("datagram of {size} bytes exceeds limit of {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },

    /// HMAC verification failed.
    ///
    /// Carries no payload data: the claimed sender is attacker-controlled.
    #[error("envelope signature verification failed")]
    Signature,

    #[error("timestamp {timestamp} outside the {max_skew}s skew window (now {now})")]
    ClockSkew {
        timestamp: f64,
        now: f64,
        max_skew: f64,
    },

    #[error("stale or replayed message from {agent_id}: {timestamp} <= {last_accepted}")]
    Replay {
        agent_id: String,
        timestamp: f64,
        last_accepted: f64,
    },

    /// Port unavailable. The service keeps running in send-only mode.
    #[error("cannot bind discovery port {port}: {reason}")]
    Bind { port: u16, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("transport is in send-only mode")]
    NotListening,

    #[error("configuration error: {0}")]
    Config(String),
}

/// How an error is reported by the loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Warn,
    Error,
}

impl DiscoveryError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Decode(_) | Self::MessageTooLarge { .. } => Severity::Debug,
            Self::ClockSkew { .. } | Self::Replay { .. } => Severity::Debug,
            Self::Signature | Self::Bind { .. } | Self::NotListening => Severity::Warn,
            Self::Transport(_) | Self::Config(_) => Severity::Error,
        }
    }

    /// True for errors that reject a datagram on integrity or freshness grounds.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Signature | Self::ClockSkew { .. } | Self::Replay { .. }
        )
    }
}

impl From<std::io::Error> for DiscoveryError {
    fn from(e: std::io::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Result type for discovery operations
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
