//! Deterministic penalties applied to fallback evaluation scores.

const FIXME_FACTOR: f64 = 0.5;
const SHORT_TODO_FACTOR: f64 = 0.4;
const LONG_TODO_FACTOR: f64 = 0.9;
const TODO_LENGTH_LIMIT: usize = 200;
const TINY_CONTENT_FACTOR: f64 = 0.2;
const TINY_CONTENT_LIMIT: usize = 10;

/// Penalize `score` for unfinished or trivially short `content`.
///
/// - `FIXME` present: x0.5
/// - `TODO` present: x0.4 under 200 characters, x0.9 otherwise
/// - under 10 characters: x0.2
///
/// Non-finite scores become 0; the result is clamped to `[0, 1]`.
pub fn apply_integrity_penalties(score: f64, content: &str) -> f64 {
    if !score.is_finite() {
        return 0.0;
    }
    let chars = content.chars().count();
    let mut penalized = score.clamp(0.0, 1.0);
    if content.contains("FIXME") {
        penalized *= FIXME_FACTOR;
    }
    if content.contains("TODO") {
        penalized *= if chars < TODO_LENGTH_LIMIT {
            SHORT_TODO_FACTOR
        } else {
            LONG_TODO_FACTOR
        };
    }
    if chars < TINY_CONTENT_LIMIT {
        penalized *= TINY_CONTENT_FACTOR;
    }
    penalized
}
