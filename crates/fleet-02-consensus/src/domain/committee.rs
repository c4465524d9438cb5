use std::cmp::Ordering;
use std::collections::HashMap;

/// Reliability above which an agent is trusted to sit on a committee.
pub const COMMITTEE_THRESHOLD: f64 = 0.7;

/// Smallest committee the selection degrades to.
pub const MIN_COMMITTEE_SIZE: usize = 3;

fn by_score_desc(a: &(&String, f64), b: &(&String, f64)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(b.0))
}

/// Agents with reliability strictly above `threshold`, best first.
///
/// When fewer than `min_size` qualify, returns the top `min_size` agents
/// by raw score instead. Equal scores order by agent id. Non-finite scores
/// rank last.
pub fn select_committee(
    reliability: &HashMap<String, f64>,
    threshold: f64,
    min_size: usize,
) -> Vec<String> {
    let mut ranked: Vec<(&String, f64)> = reliability
        .iter()
        .map(|(agent, score)| {
            let score = if score.is_finite() { *score } else { f64::MIN };
            (agent, score)
        })
        .collect();
    ranked.sort_by(by_score_desc);

    let qualified = ranked.iter().filter(|(_, score)| *score > threshold).count();
    let take = if qualified >= min_size {
        qualified
    } else {
        min_size.min(ranked.len())
    };
    ranked
        .into_iter()
        .take(take)
        .map(|(agent, _)| agent.clone())
        .collect()
}
