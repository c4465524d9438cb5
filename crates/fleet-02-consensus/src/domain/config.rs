use super::committee::{COMMITTEE_THRESHOLD, MIN_COMMITTEE_SIZE};
use super::reliability::DEFAULT_RELIABILITY;
use super::{ConsensusError, ConsensusResult, QuorumPolicy};
use serde::Deserialize;
use std::time::Duration;

/// Minimum penalized integrity a fallback winner must reach.
pub const MIN_INTEGRITY: f64 = 0.4;

/// Default deadline for fallback evaluation.
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

/// Committee voting configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Reliability given to agents with no history
    pub default_reliability: f64,
    /// Reliability an agent must exceed to sit on a committee
    pub committee_threshold: f64,
    pub min_committee_size: usize,
    pub min_integrity: f64,
    /// Evaluation deadline in seconds when a request sets none
    pub default_timeout_secs: f64,
    pub quorum: QuorumPolicy,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            default_reliability: DEFAULT_RELIABILITY,
            committee_threshold: COMMITTEE_THRESHOLD,
            min_committee_size: MIN_COMMITTEE_SIZE,
            min_integrity: MIN_INTEGRITY,
            default_timeout_secs: DEFAULT_TIMEOUT_SECS,
            quorum: QuorumPolicy::default(),
        }
    }
}

impl ConsensusConfig {
    /// Short deadline for tests.
    pub fn for_testing() -> Self {
        Self {
            default_timeout_secs: 1.0,
            ..Self::default()
        }
    }

    /// Deadline as a `Duration`; values too large to represent saturate.
    pub fn default_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.default_timeout_secs).unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> ConsensusResult<()> {
        let fraction = |v: f64| (0.0..=1.0).contains(&v);
        if !fraction(self.default_reliability) {
            return Err(ConsensusError::InvalidConfig(format!(
                "default_reliability {} outside [0, 1]",
                self.default_reliability
            )));
        }
        if !fraction(self.committee_threshold) {
            return Err(ConsensusError::InvalidConfig(format!(
                "committee_threshold {} outside [0, 1]",
                self.committee_threshold
            )));
        }
        if !fraction(self.min_integrity) {
            return Err(ConsensusError::InvalidConfig(format!(
                "min_integrity {} outside [0, 1]",
                self.min_integrity
            )));
        }
        if self.default_timeout_secs <= 0.0
            || Duration::try_from_secs_f64(self.default_timeout_secs).is_err()
        {
            return Err(ConsensusError::InvalidConfig(format!(
                "default_timeout_secs {} is not a representable positive duration",
                self.default_timeout_secs
            )));
        }
        if !self.quorum.is_valid() {
            return Err(ConsensusError::InvalidConfig(
                "quorum thresholds must lie in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}
