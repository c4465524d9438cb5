use std::collections::HashMap;

/// Reliability assumed for an agent seen for the first time.
pub const DEFAULT_RELIABILITY: f64 = 0.9;

/// In-memory reliability snapshot for the agents taking part in votes.
///
/// Unknown agents are initialized to the injected default on first lookup.
/// Persisting history across processes belongs to an external ledger.
#[derive(Debug, Clone)]
pub struct ReliabilityStore {
    scores: HashMap<String, f64>,
    default: f64,
}

impl Default for ReliabilityStore {
    fn default() -> Self {
        Self::new(DEFAULT_RELIABILITY)
    }
}

impl ReliabilityStore {
    pub fn new(default: f64) -> Self {
        Self {
            scores: HashMap::new(),
            default,
        }
    }

    /// Seed from an existing snapshot.
    pub fn with_scores(default: f64, scores: HashMap<String, f64>) -> Self {
        Self { scores, default }
    }

    pub fn default_score(&self) -> f64 {
        self.default
    }

    /// Score for `agent`, recording the default if the agent is new.
    pub fn get_or_default(&mut self, agent: &str) -> f64 {
        *self
            .scores
            .entry(agent.to_string())
            .or_insert(self.default)
    }

    pub fn get(&self, agent: &str) -> Option<f64> {
        self.scores.get(agent).copied()
    }

    pub fn set(&mut self, agent: impl Into<String>, score: f64) {
        self.scores.insert(agent.into(), score);
    }

    pub fn snapshot(&self) -> HashMap<String, f64> {
        self.scores.clone()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
