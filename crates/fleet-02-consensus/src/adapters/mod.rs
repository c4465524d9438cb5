//! # Adapters Layer
//!
//! - `PureAgreementBackend`: in-process agreement math
//! - `UnavailableScorer`: placeholder when no evaluator is wired in

pub mod backend;
pub mod scorer;

pub use backend::PureAgreementBackend;
pub use scorer::UnavailableScorer;
