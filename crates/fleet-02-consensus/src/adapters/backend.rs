use crate::domain::{calculate_agreement_score, run_multi_surgeon_audit, Vote};
use crate::ports::AgreementBackend;
use std::collections::BTreeMap;

/// Agreement math straight from the domain functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PureAgreementBackend;

impl AgreementBackend for PureAgreementBackend {
    fn name(&self) -> &'static str {
        "pure"
    }

    fn agreement_score(&self, votes: &[Vote]) -> f64 {
        calculate_agreement_score(votes)
    }

    fn audit(&self, proposals: &BTreeMap<String, String>) -> BTreeMap<String, f64> {
        run_multi_surgeon_audit(proposals)
    }
}
