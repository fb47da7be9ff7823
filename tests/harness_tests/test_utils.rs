use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use transpile_parity::error::HarnessFault;
use transpile_parity::executor::{Backend, BackendRun, DualExecutor};
use transpile_parity::snippet::RESULT_BINDING;

/// In-process backend answering by call expression, e.g. `bin(-5)`.
pub struct ScriptedBackend {
    name: String,
    answers: HashMap<String, String>,
    fallback: String,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(name: &str, fallback: &str) -> Self {
        Self {
            name: name.to_string(),
            answers: HashMap::new(),
            fallback: fallback.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn answer(mut self, call: &str, line: &str) -> Self {
        self.answers.insert(call.to_string(), line.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Pulls the call expression out of a generated snippet.
pub fn call_in(source: &str) -> Option<&str> {
    let prefix = format!("{RESULT_BINDING} = ");
    source
        .lines()
        .find_map(|line| line.trim().strip_prefix(prefix.as_str()))
}

impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, source: &str, _timeout: Duration) -> Result<BackendRun, HarnessFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let line = call_in(source)
            .and_then(|call| self.answers.get(call))
            .unwrap_or(&self.fallback);
        Ok(BackendRun::completed(format!("{line}\n")))
    }
}

pub fn executor(reference: ScriptedBackend, target: ScriptedBackend) -> DualExecutor {
    DualExecutor::new(Box::new(reference), Box::new(target))
}

pub const TYPE_ERROR: &str = "@@parity:err TypeError unsupported operand";

/// Writes an executable shell script into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}

pub fn python3_available() -> bool {
    Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
