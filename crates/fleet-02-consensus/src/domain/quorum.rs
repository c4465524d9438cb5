//! Risk-tiered quorum policy.
//!
//! | change type                          | required agreement |
//! |--------------------------------------|--------------------|
//! | `infrastructure`, `security`, `core` | 0.80               |
//! | `documentation`, `examples`, `comments` | 0.50            |
//! | anything else                        | 0.67               |

use serde::Deserialize;
use std::collections::BTreeMap;

pub const HIGH_RISK_QUORUM: f64 = 0.8;
pub const LOW_RISK_QUORUM: f64 = 0.5;
pub const DEFAULT_QUORUM: f64 = 0.67;

const HIGH_RISK_TYPES: [&str; 3] = ["infrastructure", "security", "core"];
const LOW_RISK_TYPES: [&str; 3] = ["documentation", "examples", "comments"];

/// Maps a change type to the agreement fraction required to accept it.
///
/// `overrides` take precedence over the built-in tiers and match
/// ignoring case and surrounding whitespace. The built-in tiers match the
/// exact change type only.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuorumPolicy {
    pub high_risk: f64,
    pub low_risk: f64,
    pub default: f64,
    pub overrides: BTreeMap<String, f64>,
}

impl Default for QuorumPolicy {
    fn default() -> Self {
        Self {
            high_risk: HIGH_RISK_QUORUM,
            low_risk: LOW_RISK_QUORUM,
            default: DEFAULT_QUORUM,
            overrides: BTreeMap::new(),
        }
    }
}

impl QuorumPolicy {
    #[must_use]
    pub fn with_override(mut self, change_type: &str, quorum: f64) -> Self {
        self.overrides
            .insert(change_type.trim().to_ascii_lowercase(), quorum);
        self
    }

    pub fn required_quorum(&self, change_type: &str) -> f64 {
        let key = change_type.trim();
        if let Some(quorum) = self
            .overrides
            .iter()
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
            .map(|(_, q)| *q)
        {
            return quorum;
        }
        if HIGH_RISK_TYPES.contains(&change_type) {
            self.high_risk
        } else if LOW_RISK_TYPES.contains(&change_type) {
            self.low_risk
        } else {
            self.default
        }
    }

    /// Every threshold must be a fraction in `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        [self.high_risk, self.low_risk, self.default]
            .iter()
            .chain(self.overrides.values())
            .all(|q| (0.0..=1.0).contains(q))
    }
}

/// Required quorum under the default policy.
pub fn get_required_quorum(change_type: &str) -> f64 {
    QuorumPolicy::default().required_quorum(change_type)
}
