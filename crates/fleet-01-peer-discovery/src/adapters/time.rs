use crate::domain::Timestamp;
use crate::ports::{Clock, TimeSource};
use async_trait::async_trait;
use std::time::Duration;

// ============================================================================
// SystemTimeSource - Production Time Source
// ============================================================================

/// Production time source using the system clock, with sub-second precision.
///
/// For testing, use `ControllableTimeSource` from the test utilities.
///
/// # Example
///
/// ```rust
/// use fleet_01_peer_discovery::adapters::SystemTimeSource;
/// use fleet_01_peer_discovery::ports::TimeSource;
///
/// let now = SystemTimeSource::new().now();
/// assert!(now.as_secs_f64() > 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        Timestamp::new(duration.as_secs_f64())
    }
}

// ============================================================================
// TokioClock - Production Clock
// ============================================================================

/// Sleeps on the tokio timer wheel.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
