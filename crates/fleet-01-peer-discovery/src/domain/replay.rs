//! Anti-replay and clock-skew enforcement.
//!
//! The per-sender message timestamp doubles as a monotonic nonce: a payload
//! is fresh only if it lies within the skew window of local time AND is
//! strictly newer than the last accepted payload from the same sender.

use super::{DiscoveryError, DiscoveryResult, Timestamp};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug)]
pub struct ReplayGuard {
    max_skew: f64,
    last_accepted: Mutex<HashMap<String, f64>>,
}

impl ReplayGuard {
    pub fn new(max_skew: Duration) -> Self {
        Self {
            max_skew: max_skew.as_secs_f64(),
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    /// Check the skew window, then the per-sender counter.
    ///
    /// On success the timestamp is recorded as the sender's new high-water
    /// mark. A rejected payload leaves the guard unchanged.
    pub fn check_and_record(
        &self,
        agent_id: &str,
        timestamp: f64,
        now: Timestamp,
    ) -> DiscoveryResult<()> {
        self.check_skew(timestamp, now)?;

        let mut last = self.last_accepted.lock();
        if let Some(&previous) = last.get(agent_id) {
            if timestamp <= previous {
                return Err(DiscoveryError::Replay {
                    agent_id: agent_id.to_string(),
                    timestamp,
                    last_accepted: previous,
                });
            }
        }
        last.insert(agent_id.to_string(), timestamp);
        Ok(())
    }

    pub fn check_skew(&self, timestamp: f64, now: Timestamp) -> DiscoveryResult<()> {
        let now = now.as_secs_f64();
        if !timestamp.is_finite() || (timestamp - now).abs() > self.max_skew {
            return Err(DiscoveryError::ClockSkew {
                timestamp,
                now,
                max_skew: self.max_skew,
            });
        }
        Ok(())
    }

    pub fn last_accepted(&self, agent_id: &str) -> Option<f64> {
        self.last_accepted.lock().get(agent_id).copied()
    }

    /// Forget senders whose high-water mark fell out of the skew window.
    ///
    /// Any replay of their old messages now fails the skew check instead.
    pub fn prune(&self, now: Timestamp) -> usize {
        let cutoff = now.as_secs_f64() - self.max_skew;
        let mut last = self.last_accepted.lock();
        let before = last.len();
        last.retain(|_, ts| *ts >= cutoff);
        before - last.len()
    }

    pub fn tracked_senders(&self) -> usize {
        self.last_accepted.lock().len()
    }
}
