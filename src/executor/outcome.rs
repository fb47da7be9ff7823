use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::snippet::OUTCOME_MARKER;
use crate::value::parse_repr;
use crate::Value;

/// Raw result of one backend invocation, before interpretation.
#[derive(Debug, Clone, Default)]
pub struct BackendRun {
    /// `None` when the process was terminated by a signal or killed.
    pub exit_code: Option<i32>,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl BackendRun {
    /// A run that exited normally with the given stdout.
    pub fn completed(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            status: "exit status: 0".to_string(),
            stdout: stdout.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "exception", rename_all = "snake_case")]
pub enum FailureKind {
    Syntax,
    /// An exception escaped the call; carries the exception class name.
    Raised(String),
    Crash,
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Syntax => write!(f, "syntax error"),
            FailureKind::Raised(class) => write!(f, "raised {class}"),
            FailureKind::Crash => write!(f, "crash"),
            FailureKind::Timeout => write!(f, "timeout"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Value {
        type_name: String,
        repr: String,
        #[serde(skip)]
        value: Value,
    },
    Failure {
        kind: FailureKind,
        message: String,
    },
}

const STDERR_TAIL_LINES: usize = 5;

impl ExecutionOutcome {
    pub fn value(type_name: impl Into<String>, repr: impl Into<String>) -> Self {
        let repr = repr.into();
        Self::Value {
            type_name: type_name.into(),
            value: parse_repr(&repr),
            repr,
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Failure {
                kind: FailureKind::Timeout,
                ..
            }
        )
    }

    /// The result's repr, for a value outcome.
    pub fn repr(&self) -> Option<&str> {
        match self {
            Self::Value { repr, .. } => Some(repr),
            Self::Failure { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<&FailureKind> {
        match self {
            Self::Failure { kind, .. } => Some(kind),
            Self::Value { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Interprets a transport result. The last outcome line on stdout wins;
    /// without one, the run is a syntax error, or a crash.
    pub fn from_run(run: &BackendRun) -> Self {
        if run.timed_out {
            return Self::failure(
                FailureKind::Timeout,
                format!("no result after {}ms", run.elapsed.as_millis()),
            );
        }

        if let Some(line) = run
            .stdout
            .lines()
            .rev()
            .find_map(|l| l.trim_end().strip_prefix(OUTCOME_MARKER))
        {
            return Self::from_outcome_line(line);
        }

        if run.stderr.contains("SyntaxError") {
            return Self::failure(FailureKind::Syntax, stderr_tail(&run.stderr));
        }

        let detail = if run.exit_code == Some(0) {
            "exited without reporting an outcome".to_string()
        } else {
            run.status.clone()
        };
        let tail = stderr_tail(&run.stderr);
        let message = if tail.is_empty() {
            detail
        } else {
            format!("{detail}: {tail}")
        };
        Self::failure(FailureKind::Crash, message)
    }

    fn from_outcome_line(line: &str) -> Self {
        let (tag, rest) = line.split_once(' ').unwrap_or((line, ""));
        let (name, payload) = rest.split_once(' ').unwrap_or((rest, ""));
        match tag {
            "ok" if !name.is_empty() => Self::value(name, payload),
            "err" if !name.is_empty() => {
                Self::failure(FailureKind::Raised(name.to_string()), payload)
            }
            _ => Self::failure(
                FailureKind::Crash,
                format!("malformed outcome line: {OUTCOME_MARKER}{line}"),
            ),
        }
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value {
                type_name, repr, ..
            } => write!(f, "{type_name} {repr}"),
            Self::Failure { kind, message } if message.is_empty() => write!(f, "{kind}"),
            Self::Failure { kind, message } => write!(f, "{kind}: {message}"),
        }
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join(" | ")
}
