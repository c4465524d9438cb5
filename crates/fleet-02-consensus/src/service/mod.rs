//! # Service Layer
//!
//! `CommitteeVoteCoordinator` wires the pure agreement logic to the
//! proposal scorer and runs the fallback evaluation under a deadline.

mod coordinator;
mod evaluation;


pub use coordinator::{CommitteeVoteCoordinator, CoordinatorDependencies};
