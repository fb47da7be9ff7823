//! Suite declarations loaded from disk

use crate::fixtures::{get_fixture_path, get_shipped_suites_path};
use pretty_assertions::assert_eq;
use transpile_parity::matrix::{Arity, TypeMatrix};
use transpile_parity::suite::{discover_suite_files, load_suites};

#[test]
fn test_shipped_bin_suite_matches_the_known_gaps() {
    let matrix = TypeMatrix::default();
    let suites = load_suites(&[get_shipped_suites_path()], &matrix).unwrap();
    let bin = suites
        .iter()
        .find(|s| s.name == "BuiltinBinFunctionTests")
        .expect("bin suite is shipped");

    assert_eq!(bin.arity, Arity::One);
    assert_eq!(bin.functions.len(), 1);
    let registered: Vec<&str> = bin.registry.entries().map(|(_, label)| label).collect();
    assert_eq!(
        registered,
        vec!["bool", "bytearray", "complex", "dict", "frozenset", "int", "set"]
    );
}

#[test]
fn test_fixture_directory_is_walked_recursively_in_order() {
    let files = discover_suite_files(&[get_fixture_path(Some("suites"))]).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["formatting.yaml", "pow.json"]);
}

#[test]
fn test_fixture_suites_load_with_their_arity() {
    let matrix = TypeMatrix::default();
    let suites = load_suites(&[get_fixture_path(Some("suites"))], &matrix).unwrap();
    let names: Vec<&str> = suites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "BuiltinOctFunctionTests",
            "BuiltinHexFunctionTests",
            "BuiltinPowFunctionTests"
        ]
    );

    let pow = &suites[2];
    assert_eq!(pow.arity, Arity::Two);
    assert!(pow.registry.contains("pow", "int_float"));
    assert!(pow.registry.contains("pow", "float_int"));
    assert!(suites[1].registry.is_empty());
}
