//! # Consensus Metrics
//!
//! Prometheus metrics for committee votes.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! fleet-02-consensus = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `fleet_consensus_decisions_total` - Counter of vote decisions (by status and path)
//! - `fleet_consensus_evaluation_seconds` - Histogram of fallback evaluation time
//! - `fleet_consensus_scorer_failures_total` - Counter of scorer errors and panics

use crate::domain::{DecisionPath, VoteStatus};

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Vote decisions, labeled by status and decision path
    pub static ref DECISIONS: IntCounterVec = register_int_counter_vec!(
        "fleet_consensus_decisions_total",
        "Total number of committee vote decisions",
        &["status", "path"]
    )
    .expect("Failed to create DECISIONS metric");

    /// Wall time spent waiting on proposal scorers
    pub static ref EVALUATION_LATENCY: Histogram = register_histogram!(
        "fleet_consensus_evaluation_seconds",
        "Time spent in fallback proposal evaluation in seconds",
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .expect("Failed to create EVALUATION_LATENCY metric");

    pub static ref SCORER_FAILURES: IntCounter = register_int_counter!(
        "fleet_consensus_scorer_failures_total",
        "Total number of proposal scorer errors"
    )
    .expect("Failed to create SCORER_FAILURES metric");
}

#[cfg_attr(not(feature = "metrics"), allow(dead_code))]
fn path_label(path: DecisionPath) -> &'static str {
    match path {
        DecisionPath::Quorum => "quorum",
        DecisionPath::Evaluation => "evaluation",
        DecisionPath::None => "none",
    }
}

/// Record a vote decision
#[cfg(feature = "metrics")]
pub fn record_decision(status: VoteStatus, path: DecisionPath) {
    DECISIONS
        .with_label_values(&[status.as_str(), path_label(path)])
        .inc();
}

/// Record fallback evaluation latency
#[cfg(feature = "metrics")]
pub fn record_evaluation_latency(seconds: f64) {
    EVALUATION_LATENCY.observe(seconds);
}

#[cfg(feature = "metrics")]
pub fn record_scorer_failure() {
    SCORER_FAILURES.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_decision(_status: VoteStatus, _path: DecisionPath) {}

#[cfg(not(feature = "metrics"))]
pub fn record_evaluation_latency(_seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_scorer_failure() {}
