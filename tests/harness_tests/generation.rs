//! Case enumeration over the full type matrix

use super::test_utils::*;
use pretty_assertions::assert_eq;
use transpile_parity::generator::CaseGenerator;
use transpile_parity::matrix::{Arity, TypeMatrix};
use transpile_parity::suite::Suite;

const BINARY: &str = "@@parity:ok str '0b11'";

#[test]
fn test_one_case_per_matrix_type() {
    let matrix = TypeMatrix::default();
    let executor = executor(
        ScriptedBackend::new("reference", BINARY),
        ScriptedBackend::new("target", BINARY),
    );
    let suite = Suite::new("BuiltinBinFunctionTests", ["bin"], Arity::One);
    let results = CaseGenerator::new(&matrix, &executor)
        .run_suite(&suite, None)
        .unwrap();

    assert_eq!(results.len(), matrix.len());
    let exercised: Vec<String> = results.iter().map(|r| r.types.join("_")).collect();
    let expected: Vec<String> = matrix.type_names().map(str::to_string).collect();
    assert_eq!(exercised, expected);
}

#[test]
fn test_two_argument_suites_cover_the_cartesian_product() {
    let matrix = TypeMatrix::default();
    let executor = executor(
        ScriptedBackend::new("reference", BINARY),
        ScriptedBackend::new("target", BINARY),
    );
    let suite = Suite::new("BuiltinPowFunctionTests", ["pow", "divmod"], Arity::Two);
    let generator = CaseGenerator::new(&matrix, &executor).with_jobs(4);
    let results = generator.run_suite(&suite, None).unwrap();

    let n = matrix.len();
    assert_eq!(results.len(), 2 * n * n);
    assert_eq!(results[0].name, "test_bool_bool");
    assert_eq!(results[1].name, "test_bool_bytearray");
    assert_eq!(results[n].name, "test_bytearray_bool");
    assert_eq!(results[n * n].function, "divmod");
}

#[test]
fn test_every_sample_is_exercised() {
    let matrix = TypeMatrix::default();
    let reference = ScriptedBackend::new("reference", BINARY);
    let target = ScriptedBackend::new("target", BINARY);
    let executor = executor(reference, target);
    let suite = Suite::new("BuiltinBinFunctionTests", ["bin"], Arity::One);
    let results = CaseGenerator::new(&matrix, &executor)
        .run_suite(&suite, None)
        .unwrap();

    let calls: Vec<&str> = results
        .iter()
        .find(|r| r.name == "test_int")
        .unwrap()
        .samples
        .iter()
        .map(|s| s.call.as_str())
        .collect();
    assert_eq!(calls, vec!["bin(3)", "bin(0)", "bin(-5)"]);

    let total_samples: usize = matrix
        .type_names()
        .map(|t| matrix.sample_for(t).unwrap().len())
        .sum();
    let run_samples: usize = results.iter().map(|r| r.samples.len()).sum();
    assert_eq!(run_samples, total_samples);
}

#[test]
fn test_runs_are_idempotent() {
    let matrix = TypeMatrix::default();
    let build = || {
        executor(
            ScriptedBackend::new("reference", BINARY).answer("bin(-5)", "@@parity:ok str '-0b101'"),
            ScriptedBackend::new("target", BINARY).answer("bin(-5)", "@@parity:ok str '-101'"),
        )
    };
    let suite = Suite::new("BuiltinBinFunctionTests", ["bin"], Arity::One);

    let first_executor = build();
    let second_executor = build();
    let first = CaseGenerator::new(&matrix, &first_executor)
        .run_suite(&suite, None)
        .unwrap();
    let second = CaseGenerator::new(&matrix, &second_executor)
        .with_jobs(3)
        .run_suite(&suite, None)
        .unwrap();

    let summarize = |results: &[transpile_parity::generator::CaseResult]| {
        results
            .iter()
            .map(|r| (r.id.clone(), r.verdict, r.outcome))
            .collect::<Vec<_>>()
    };
    assert_eq!(summarize(&first), summarize(&second));
}

#[test]
fn test_case_enumeration_is_restartable() {
    let matrix = TypeMatrix::default();
    let executor = executor(
        ScriptedBackend::new("reference", BINARY),
        ScriptedBackend::new("target", BINARY),
    );
    let generator = CaseGenerator::new(&matrix, &executor);
    let suite = Suite::new("BuiltinBinFunctionTests", ["bin"], Arity::One);

    let first: Vec<String> = generator.cases(&suite, &suite.functions[0]).map(|c| c.id()).collect();
    let second: Vec<String> = generator.cases(&suite, &suite.functions[0]).map(|c| c.id()).collect();
    assert_eq!(first, second);
    assert_eq!(first[0], "BuiltinBinFunctionTests.test_bool[bin]");
}
