use anyhow::Result;
use std::fmt::Write;

use crate::cli::OutputFormat;
use crate::generator::CaseResult;
use crate::registry::CaseOutcome;

use super::Report;

const RULE_HEAVY: &str =
    "======================================================================";
const RULE_LIGHT: &str =
    "----------------------------------------------------------------------";

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn format(
        report: &Report,
        format: OutputFormat,
        fail_on_unexpected_success: bool,
    ) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Text => Ok(Self::format_text(report, fail_on_unexpected_success)?),
        }
    }

    /// One line per case, then details for every case that needs attention
    /// and a closing summary line, in the layout of a unittest run.
    pub fn format_text(report: &Report, fail_on_unexpected_success: bool) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        for case in &report.cases {
            writeln!(out, "{} ... {}", heading(case), case.outcome)?;
        }

        for case in report
            .cases
            .iter()
            .filter(|c| matches!(c.outcome, CaseOutcome::Fail | CaseOutcome::UnexpectedSuccess))
        {
            let label = match case.outcome {
                CaseOutcome::Fail => "FAIL",
                _ => "UNEXPECTED SUCCESS",
            };
            writeln!(out)?;
            writeln!(out, "{RULE_HEAVY}")?;
            writeln!(out, "{label}: {}", heading(case))?;
            writeln!(out, "{RULE_LIGHT}")?;
            if case.outcome == CaseOutcome::UnexpectedSuccess {
                writeln!(
                    out,
                    "  {} is registered as not implemented but both backends agree on every sample",
                    case.types.join("_")
                )?;
            }
            for sample in case.disagreements() {
                writeln!(out, "  {}: {}", sample.call, sample.verdict)?;
                writeln!(out, "    reference ({}): {}", report.reference, sample.reference)?;
                writeln!(out, "    target ({}): {}", report.target, sample.target)?;
            }
        }

        let summary = &report.summary;
        writeln!(out, "{RULE_LIGHT}")?;
        writeln!(
            out,
            "Ran {} cases ({} vs {})",
            summary.total, report.reference, report.target
        )?;
        writeln!(out)?;

        let mut details = Vec::new();
        if summary.failed > 0 {
            details.push(format!("failures={}", summary.failed));
        }
        if summary.expected_failures > 0 {
            details.push(format!("expected failures={}", summary.expected_failures));
        }
        if summary.unexpected_successes > 0 {
            details.push(format!("unexpected successes={}", summary.unexpected_successes));
        }
        let status = if summary.is_success(fail_on_unexpected_success) {
            "OK"
        } else {
            "FAILED"
        };
        if details.is_empty() {
            writeln!(out, "{status}")?;
        } else {
            writeln!(out, "{status} ({})", details.join(", "))?;
        }
        Ok(out)
    }
}

fn heading(case: &CaseResult) -> String {
    format!("{} ({}) [{}]", case.name, case.suite, case.function)
}
