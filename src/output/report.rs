use serde::Serialize;

use crate::generator::CaseResult;
use crate::matrix::MATRIX_VERSION;
use crate::registry::CaseOutcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub expected_failures: usize,
    pub unexpected_successes: usize,
}

impl Summary {
    pub fn from_results(results: &[CaseResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            summary.total += 1;
            match result.outcome {
                CaseOutcome::Pass => summary.passed += 1,
                CaseOutcome::Fail => summary.failed += 1,
                CaseOutcome::ExpectedFailure => summary.expected_failures += 1,
                CaseOutcome::UnexpectedSuccess => summary.unexpected_successes += 1,
            }
            summary
        })
    }

    /// A run succeeds with no failures and, unless allowed, no stale
    /// expectation entries.
    pub fn is_success(&self, fail_on_unexpected_success: bool) -> bool {
        self.failed == 0 && !(fail_on_unexpected_success && self.unexpected_successes > 0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub matrix_version: u32,
    pub reference: String,
    pub target: String,
    pub summary: Summary,
    pub cases: Vec<CaseResult>,
}

impl Report {
    pub fn new(reference: impl Into<String>, target: impl Into<String>, cases: Vec<CaseResult>) -> Self {
        Self {
            matrix_version: MATRIX_VERSION,
            reference: reference.into(),
            target: target.into(),
            summary: Summary::from_results(&cases),
            cases,
        }
    }

    pub fn is_success(&self, fail_on_unexpected_success: bool) -> bool {
        self.summary.is_success(fail_on_unexpected_success)
    }
}
