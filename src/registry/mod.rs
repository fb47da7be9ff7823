//! Expectation registry: (function, type) pairs declared "not implemented".

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::compare::ComparisonVerdict;

/// Final result of one case after expectation polarity is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    Pass,
    Fail,
    /// A registered case whose backends still diverge. Reported as a skip.
    ExpectedFailure,
    /// A registered case whose backends now agree; the entry is stale.
    UnexpectedSuccess,
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Pass => "ok",
            Self::Fail => "FAIL",
            Self::ExpectedFailure => "expected failure",
            Self::UnexpectedSuccess => "unexpected success",
        };
        f.write_str(text)
    }
}

/// Accepts both `int` and the `test_int` spelling.
pub fn normalize_entry(entry: &str) -> &str {
    entry.strip_prefix("test_").unwrap_or(entry)
}

#[derive(Debug, Clone, Default)]
pub struct ExpectationRegistry {
    entries: BTreeSet<(String, String)>,
}

impl ExpectationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, function: impl Into<String>, label: &str) {
        self.entries
            .insert((function.into(), normalize_entry(label).to_string()));
    }

    pub fn contains(&self, function: &str, label: &str) -> bool {
        self.entries
            .contains(&(function.to_string(), normalize_entry(label).to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, l)| (f.as_str(), l.as_str()))
    }

    pub fn resolve(&self, function: &str, label: &str, verdict: ComparisonVerdict) -> CaseOutcome {
        let expected_failure = self.contains(function, label);
        match (expected_failure, verdict.is_agreement()) {
            (false, true) => CaseOutcome::Pass,
            (false, false) => CaseOutcome::Fail,
            (true, _) if verdict == ComparisonVerdict::Match => CaseOutcome::UnexpectedSuccess,
            (true, _) => CaseOutcome::ExpectedFailure,
        }
    }
}
