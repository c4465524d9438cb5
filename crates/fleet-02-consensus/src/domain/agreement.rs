//! # Agreement Scoring
//!
//! Votes are grouped by content hash and their weights summed. The
//! agreement score is the heaviest group's share of the total weight, so
//! a few high-reliability agents outweigh many low-reliability ones.
//!
//! All functions here are pure and deterministic.

use super::Vote;
use std::collections::BTreeMap;

/// Summed weight per content hash.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    pub totals: BTreeMap<String, f64>,
    pub total_weight: f64,
}

impl Tally {
    /// Heaviest hash and its weight. Ties break to the smallest hash.
    pub fn winner(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (hash, weight) in &self.totals {
            match best {
                Some((_, w)) if *weight <= w => {}
                _ => best = Some((hash.as_str(), *weight)),
            }
        }
        best
    }

    /// Winning weight over total weight; 0.0 when nothing carries weight.
    pub fn agreement(&self) -> f64 {
        match self.winner() {
            Some((_, weight)) if self.total_weight > 0.0 => {
                (weight / self.total_weight).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

pub fn tally(votes: &[Vote]) -> Tally {
    let mut result = Tally::default();
    for vote in votes {
        let weight = vote.effective_weight();
        *result.totals.entry(vote.hash.clone()).or_insert(0.0) += weight;
        result.total_weight += weight;
    }
    result
}

/// `max(group weight) / total weight`, or 0.0 for an empty vote list.
pub fn calculate_agreement_score(votes: &[Vote]) -> f64 {
    tally(votes).agreement()
}

/// Agents whose vote differs from the consensus hash, in vote order.
pub fn detect_deviating_hashes(votes: &[Vote], consensus_hash: &str) -> Vec<String> {
    let mut deviating: Vec<String> = Vec::new();
    for vote in votes {
        if vote.hash != consensus_hash && !deviating.contains(&vote.agent) {
            deviating.push(vote.agent.clone());
        }
    }
    deviating
}
