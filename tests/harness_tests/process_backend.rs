//! Subprocess backends driven by small shell scripts
#![cfg(unix)]

use super::test_utils::*;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use transpile_parity::executor::{
    Backend, DualExecutor, ExecutionOutcome, FailureKind, ProcessBackend, SourceInput,
};
use transpile_parity::generator::CaseGenerator;
use transpile_parity::matrix::{Arity, TypeMatrix, TypeSample};
use transpile_parity::registry::CaseOutcome;
use transpile_parity::snippet::SnippetBuilder;
use transpile_parity::suite::Suite;
use transpile_parity::Value;

fn script_backend(dir: &TempDir, name: &str, body: &str) -> ProcessBackend {
    let script = write_script(dir.path(), &format!("{name}.sh"), body);
    ProcessBackend::new(name, "sh").with_args([script.to_string_lossy().into_owned()])
}

fn outcome(backend: &dyn Backend, source: &str, timeout: Duration) -> ExecutionOutcome {
    ExecutionOutcome::from_run(&backend.execute(source, timeout).unwrap())
}

#[test]
fn test_snippet_file_is_passed_as_last_argument() {
    let dir = TempDir::new().unwrap();
    let backend = script_backend(
        &dir,
        "echoer",
        r#"grep -q "__parity_result = bin(3)" "$1" && echo "@@parity:ok str '0b11'""#,
    );
    let sample = TypeSample::literal("int", Value::Int(3));
    let snippet = SnippetBuilder::new().build("bin", &[&sample]).unwrap();

    let result = outcome(&backend, &snippet.source, Duration::from_secs(10));
    assert_eq!(result.repr(), Some("'0b11'"));
}

#[test]
fn test_stdin_input() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "reader.sh",
        r#"grep -q "bin(0)" && echo "@@parity:ok str '0b0'""#,
    );
    let backend = ProcessBackend::new("reader", "sh")
        .with_args([script.to_string_lossy().into_owned()])
        .with_input(SourceInput::Stdin);

    let result = outcome(&backend, "__parity_result = bin(0)\n", Duration::from_secs(10));
    assert_eq!(result.repr(), Some("'0b0'"));
}

#[test]
fn test_environment_is_passed() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "env.sh", r#"echo "@@parity:ok str '$PARITY_MODE'""#);
    let backend = ProcessBackend::new("env", "sh")
        .with_args([script.to_string_lossy().into_owned()])
        .with_env("PARITY_MODE", "strict");

    let result = outcome(&backend, "", Duration::from_secs(10));
    assert_eq!(result.repr(), Some("'strict'"));
}

#[test]
fn test_nonzero_exit_without_outcome_is_a_crash() {
    let dir = TempDir::new().unwrap();
    let backend = script_backend(&dir, "crasher", "echo 'fatal: out of memory' >&2\nexit 3");

    let result = outcome(&backend, "", Duration::from_secs(10));
    assert_eq!(result.failure_kind(), Some(&FailureKind::Crash));
    let rendered = result.to_string();
    assert!(rendered.contains("exit status: 3"), "{rendered}");
    assert!(rendered.contains("fatal: out of memory"), "{rendered}");
}

#[test]
fn test_syntax_error_on_stderr() {
    let dir = TempDir::new().unwrap();
    let backend = script_backend(
        &dir,
        "parser",
        "echo '  File \"snippet.py\", line 2' >&2\necho 'SyntaxError: invalid syntax' >&2\nexit 1",
    );
    let result = outcome(&backend, "", Duration::from_secs(10));
    assert_eq!(result.failure_kind(), Some(&FailureKind::Syntax));
}

#[test]
fn test_sleeping_backend_is_killed_and_retried_once() {
    let dir = TempDir::new().unwrap();
    let counter = dir.path().join("attempts");
    let body = format!("echo x >> '{}'\nsleep 5", counter.display());
    let target = script_backend(&dir, "sleeper", &body);
    let reference = script_backend(&dir, "quick", "echo \"@@parity:ok str '0b11'\"");

    let executor = DualExecutor::new(Box::new(reference), Box::new(target))
        .with_timeout(Duration::from_millis(200));
    let sample = TypeSample::literal("int", Value::Int(3));
    let snippet = SnippetBuilder::new().build("bin", &[&sample]).unwrap();

    let started = Instant::now();
    let (reference, target) = executor.run(&snippet).unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!reference.is_failure());
    assert!(target.is_timeout());

    let attempts = std::fs::read_to_string(&counter).unwrap();
    assert_eq!(attempts.lines().count(), 2);
}

#[test]
fn test_timeouts_fail_the_case() {
    let dir = TempDir::new().unwrap();
    let matrix = TypeMatrix::empty().with_type("int", vec![TypeSample::literal("int", Value::Int(3))]);
    let reference = script_backend(&dir, "quick", "echo \"@@parity:ok str '0b11'\"");
    let target = script_backend(&dir, "sleeper", "sleep 5");
    let executor = DualExecutor::new(Box::new(reference), Box::new(target))
        .with_timeout(Duration::from_millis(100))
        .with_timeout_retry(false);

    let suite = Suite::new("BuiltinBinFunctionTests", ["bin"], Arity::One);
    let results = CaseGenerator::new(&matrix, &executor)
        .run_suite(&suite, None)
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].outcome, CaseOutcome::Fail);
    assert_eq!(results[0].samples[0].target.failure_kind(), Some(&FailureKind::Timeout));
}

#[test]
fn test_each_invocation_gets_a_fresh_scratch_directory() {
    let dir = TempDir::new().unwrap();
    let backend = script_backend(
        &dir,
        "scratch",
        "test -e marker && echo '@@parity:err RuntimeError reused' && exit 0\ntouch marker\necho \"@@parity:ok str 'fresh'\"",
    );
    for _ in 0..2 {
        let result = outcome(&backend, "", Duration::from_secs(10));
        assert_eq!(result.repr(), Some("'fresh'"));
    }
}

/// Alive means present in /proc and not a zombie waiting for its reaper.
#[cfg(target_os = "linux")]
fn process_alive(pid: &str) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .and_then(|rest| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z"),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
#[test]
fn test_timeout_kills_processes_spawned_by_the_backend() {
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("grandchild.pid");
    let body = format!("sleep 30 &\necho $! > '{}'\nwait", pid_file.display());
    let backend = script_backend(&dir, "wrapper", &body);

    let run = backend.execute("", Duration::from_millis(300)).unwrap();
    assert!(run.timed_out);

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    let pid = pid.trim();
    let deadline = Instant::now() + Duration::from_secs(3);
    while process_alive(pid) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(!process_alive(pid), "sleep {pid} outlived its backend");
}
