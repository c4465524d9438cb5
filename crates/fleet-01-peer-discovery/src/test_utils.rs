//! Test utilities for peer discovery.
//!
//! Deterministic time and a steppable clock for the announce loop.
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust
//! use fleet_01_peer_discovery::test_utils::FixedTimeSource;
//! use fleet_01_peer_discovery::ports::TimeSource;
//!
//! let time = FixedTimeSource::new(12345.5);
//! assert_eq!(time.now().as_secs_f64(), 12345.5);
//! ```

use crate::domain::Timestamp;
use crate::ports::{Clock, TimeSource};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// A time source that always returns the same timestamp.
#[derive(Debug, Clone)]
pub struct FixedTimeSource {
    timestamp: f64,
}

impl FixedTimeSource {
    pub fn new(timestamp: f64) -> Self {
        Self { timestamp }
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.timestamp)
    }
}

/// A time source the test moves by hand.
#[derive(Debug)]
pub struct ControllableTimeSource {
    now: Mutex<f64>,
}

impl ControllableTimeSource {
    pub fn new(start: f64) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn shared(start: f64) -> Arc<Self> {
        Arc::new(Self::new(start))
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by.as_secs_f64();
    }

    pub fn set(&self, secs: f64) {
        *self.now.lock() = secs;
    }
}

impl TimeSource for ControllableTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(*self.now.lock())
    }
}

/// A `Clock` whose sleeps complete only when the test calls `tick`.
///
/// A tick issued before anyone sleeps is banked and consumed by the next
/// sleep. When linked to a `ControllableTimeSource`, each completed sleep
/// advances it by the requested duration.
#[derive(Debug)]
pub struct ManualClock {
    permits: Semaphore,
    requested: Mutex<Vec<Duration>>,
    time: Option<Arc<ControllableTimeSource>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            permits: Semaphore::new(0),
            requested: Mutex::new(Vec::new()),
            time: None,
        }
    }

    pub fn linked(time: Arc<ControllableTimeSource>) -> Self {
        Self {
            time: Some(time),
            ..Self::new()
        }
    }

    /// Release one sleep.
    pub fn tick(&self) {
        self.permits.add_permits(1);
    }

    /// Number of sleeps started so far.
    pub fn sleeps_requested(&self) -> usize {
        self.requested.lock().len()
    }

    /// Durations passed to `sleep`, in call order.
    pub fn requested(&self) -> Vec<Duration> {
        self.requested.lock().clone()
    }

    /// Yield until at least `count` sleeps have started.
    pub async fn wait_for_sleepers(&self, count: usize) {
        while self.sleeps_requested() < count {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn sleep(&self, duration: Duration) {
        self.requested.lock().push(duration);
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
        if let Some(time) = &self.time {
            time.advance(duration);
        }
    }
}

/// Poll `condition` every millisecond until it holds or `limit` elapses.
pub async fn wait_until(limit: Duration, condition: impl Fn() -> bool) -> bool {
    tokio::time::timeout(limit, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .is_ok()
}
