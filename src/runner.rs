//! Ties configuration, suites and the case generator into one run.

use tracing::info;

use crate::config::HarnessConfig;
use crate::error::Result;
use crate::generator::{CaseGenerator, TestCase};
use crate::matrix::TypeMatrix;
use crate::output::Report;
use crate::suite::{load_suites, Suite};

/// Loads the configured suites against `matrix`.
pub fn load_configured_suites(config: &HarnessConfig, matrix: &TypeMatrix) -> Result<Vec<Suite>> {
    Ok(load_suites(&config.suites, matrix)?)
}

/// Ids of the cases a run would execute, in run order.
pub fn list_cases(suites: &[Suite], matrix: &TypeMatrix, filter: Option<&str>) -> Vec<String> {
    suites
        .iter()
        .flat_map(|suite| {
            let keys = matrix.case_keys(suite.arity);
            suite.functions.iter().flat_map(move |function| {
                keys.clone().into_iter().map(move |key| {
                    TestCase {
                        suite,
                        function,
                        key,
                    }
                    .id()
                })
            })
        })
        .filter(|id| filter.map_or(true, |f| id.contains(f)))
        .collect()
}

/// Runs every suite and collects the results into a report.
pub fn run(
    config: &HarnessConfig,
    matrix: &TypeMatrix,
    suites: &[Suite],
    filter: Option<&str>,
) -> Result<Report> {
    let executor = config.executor()?;
    let generator = CaseGenerator::new(matrix, &executor).with_jobs(config.jobs);
    generator.preflight()?;

    let mut cases = Vec::new();
    for suite in suites {
        cases.extend(generator.run_suite(suite, filter)?);
    }

    let report = Report::new(executor.reference_name(), executor.target_name(), cases);
    info!(
        total = report.summary.total,
        passed = report.summary.passed,
        failed = report.summary.failed,
        expected_failures = report.summary.expected_failures,
        unexpected_successes = report.summary.unexpected_successes,
        "run finished"
    );
    Ok(report)
}
