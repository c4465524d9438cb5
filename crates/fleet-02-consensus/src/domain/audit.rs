//! # Multi-Surgeon Audit
//!
//! A secondary integrity pass over proposal contents. Three independent
//! checks each produce a multiplier; their product is the proposal's
//! health in `[0, 1]`, used as the audit multiplier on vote weight.
//!
//! - Unfinished markers: x0.75 per distinct marker present
//! - Length: empty content scores 0, under 10 characters x0.3
//! - Bracket balance: unbalanced `()[]{}` x0.8

use std::collections::BTreeMap;

pub const UNFINISHED_MARKERS: [&str; 4] = ["TODO", "FIXME", "XXX", "HACK"];

const MARKER_FACTOR: f64 = 0.75;
const SHORT_CONTENT_CHARS: usize = 10;
const SHORT_CONTENT_FACTOR: f64 = 0.3;
const UNBALANCED_FACTOR: f64 = 0.8;

fn marker_surgeon(content: &str) -> f64 {
    let present = UNFINISHED_MARKERS
        .iter()
        .filter(|marker| content.contains(*marker))
        .count();
    MARKER_FACTOR.powi(present as i32)
}

fn length_surgeon(content: &str) -> f64 {
    let chars = content.trim().chars().count();
    if chars == 0 {
        0.0
    } else if chars < SHORT_CONTENT_CHARS {
        SHORT_CONTENT_FACTOR
    } else {
        1.0
    }
}

fn balance_surgeon(content: &str) -> f64 {
    let mut stack = Vec::new();
    for c in content.chars() {
        match c {
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return UNBALANCED_FACTOR;
                }
            }
            _ => {}
        }
    }
    if stack.is_empty() {
        1.0
    } else {
        UNBALANCED_FACTOR
    }
}

/// Health of a single proposal.
pub fn audit_content(content: &str) -> f64 {
    (marker_surgeon(content) * length_surgeon(content) * balance_surgeon(content)).clamp(0.0, 1.0)
}

/// Health per proposal hash.
pub fn run_multi_surgeon_audit(proposals: &BTreeMap<String, String>) -> BTreeMap<String, f64> {
    proposals
        .iter()
        .map(|(hash, content)| (hash.clone(), audit_content(content)))
        .collect()
}
