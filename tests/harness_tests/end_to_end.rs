//! Full runs against a local CPython. The target is CPython with `bin`
//! patched to drop the `0b` prefix, which reproduces a typical transpiler
//! bug. Skipped when `python3` is not installed.

use super::test_utils::*;
use crate::fixtures::get_shipped_suites_path;
use std::fs;
use tempfile::TempDir;
use transpile_parity::compare::ComparisonVerdict;
use transpile_parity::config::{BackendConfig, HarnessConfig};
use transpile_parity::matrix::TypeMatrix;
use transpile_parity::registry::CaseOutcome;
use transpile_parity::runner;

const PREFIXLESS_BIN: &str = r#"import builtins, sys
_bin = builtins.bin
builtins.bin = lambda x: _bin(x).replace('0b', '')
path = sys.argv[1]
with open(path) as f:
    exec(compile(f.read(), path, 'exec'), {'__name__': '__main__'})
"#;

fn config(dir: &TempDir, patched_target: bool) -> HarnessConfig {
    let target = if patched_target {
        let shim = dir.path().join("prefixless_bin.py");
        fs::write(&shim, PREFIXLESS_BIN).unwrap();
        BackendConfig::from_command_line("patched", &format!("python3 {}", shim.display())).unwrap()
    } else {
        BackendConfig::from_command_line("cpython-again", "python3").unwrap()
    };
    HarnessConfig {
        target: Some(target),
        jobs: 4,
        suites: vec![get_shipped_suites_path()],
        ..HarnessConfig::default()
    }
}

#[test]
fn test_prefixless_bin_is_caught() {
    if !python3_available() {
        eprintln!("python3 not found, skipping");
        return;
    }
    let dir = TempDir::new().unwrap();
    let config = config(&dir, true);
    let matrix = TypeMatrix::default();
    let suites = runner::load_configured_suites(&config, &matrix).unwrap();
    let report = runner::run(&config, &matrix, &suites, Some("[bin]")).unwrap();

    let outcome = |name: &str| {
        report
            .cases
            .iter()
            .find(|c| c.name == name)
            .map(|c| (c.verdict, c.outcome))
            .unwrap()
    };

    assert_eq!(report.cases.len(), matrix.len());
    // int is registered, so the mismatch is an expected failure.
    assert_eq!(
        outcome("test_int"),
        (ComparisonVerdict::Mismatch, CaseOutcome::ExpectedFailure)
    );
    assert_eq!(
        outcome("test_complex"),
        (ComparisonVerdict::BothFailedMatch, CaseOutcome::ExpectedFailure)
    );
    assert_eq!(
        outcome("test_str"),
        (ComparisonVerdict::BothFailedMatch, CaseOutcome::Pass)
    );
    assert_eq!(
        outcome("test_float"),
        (ComparisonVerdict::BothFailedMatch, CaseOutcome::Pass)
    );

    let int = report.cases.iter().find(|c| c.name == "test_int").unwrap();
    let negative = int.samples.iter().find(|s| s.call == "bin(-5)").unwrap();
    assert_eq!(negative.reference.repr(), Some("'-0b101'"));
    assert_eq!(negative.target.repr(), Some("'-101'"));
    assert!(report.is_success(true));
}

#[test]
fn test_identical_backends_flag_stale_registrations() {
    if !python3_available() {
        eprintln!("python3 not found, skipping");
        return;
    }
    let dir = TempDir::new().unwrap();
    let config = config(&dir, false);
    let matrix = TypeMatrix::default();
    let suites = runner::load_configured_suites(&config, &matrix).unwrap();
    let report = runner::run(&config, &matrix, &suites, None).unwrap();

    assert_eq!(report.summary.failed, 0);
    // bool and int succeed on both sides; the other registered types raise
    // TypeError on both and stay expected failures.
    let stale: Vec<&str> = report
        .cases
        .iter()
        .filter(|c| c.outcome == CaseOutcome::UnexpectedSuccess)
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(stale, vec!["test_bool", "test_int"]);
    assert_eq!(report.summary.expected_failures, 5);
    assert!(!report.is_success(true));
    assert!(report.is_success(false));
}
