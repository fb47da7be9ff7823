//! Outcome comparator.

use serde::Serialize;
use std::fmt;

use crate::executor::ExecutionOutcome;

/// Ordered from agreeing to most divergent; aggregation keeps the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonVerdict {
    Match,
    BothFailedMatch,
    BothFailedMismatch,
    Mismatch,
}

impl ComparisonVerdict {
    /// True when the backends agree, by value or by failure kind.
    pub fn is_agreement(self) -> bool {
        matches!(self, Self::Match | Self::BothFailedMatch)
    }
}

impl fmt::Display for ComparisonVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Match => "match",
            Self::BothFailedMatch => "both failed alike",
            Self::BothFailedMismatch => "both failed differently",
            Self::Mismatch => "mismatch",
        };
        f.write_str(text)
    }
}

pub fn compare(reference: &ExecutionOutcome, target: &ExecutionOutcome) -> ComparisonVerdict {
    match (reference, target) {
        (
            ExecutionOutcome::Value {
                type_name: ref_type,
                value: ref_value,
                ..
            },
            ExecutionOutcome::Value {
                type_name: target_type,
                value: target_value,
                ..
            },
        ) => {
            if ref_type == target_type && ref_value.equivalent(target_value) {
                ComparisonVerdict::Match
            } else {
                ComparisonVerdict::Mismatch
            }
        }
        (
            ExecutionOutcome::Failure { kind: ref_kind, .. },
            ExecutionOutcome::Failure {
                kind: target_kind, ..
            },
        ) => {
            if ref_kind == target_kind {
                ComparisonVerdict::BothFailedMatch
            } else {
                ComparisonVerdict::BothFailedMismatch
            }
        }
        _ => ComparisonVerdict::Mismatch,
    }
}

/// Combines per-sample verdicts into the verdict of a case. No samples is a
/// `Match`.
pub fn aggregate<I>(verdicts: I) -> ComparisonVerdict
where
    I: IntoIterator<Item = ComparisonVerdict>,
{
    verdicts
        .into_iter()
        .max()
        .unwrap_or(ComparisonVerdict::Match)
}
