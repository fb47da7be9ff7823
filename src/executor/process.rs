use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use super::{Backend, BackendRun};
use crate::error::HarnessFault;

/// Argument replaced by the path of the snippet file.
pub const SOURCE_PLACEHOLDER: &str = "{source}";

const SNIPPET_FILE: &str = "snippet.py";
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// How the snippet reaches the backend process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceInput {
    /// Path to the snippet file, appended or substituted for `{source}`.
    #[default]
    File,
    /// Snippet text written to the process' stdin.
    Stdin,
}

/// Runs each snippet in a fresh process inside its own scratch directory.
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    name: String,
    program: String,
    args: Vec<String>,
    input: SourceInput,
    env: BTreeMap<String, String>,
}

impl ProcessBackend {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            input: SourceInput::File,
            env: BTreeMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_input(mut self, input: SourceInput) -> Self {
        self.input = input;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn resolved_args(&self, source_path: &Path) -> Vec<String> {
        let path = source_path.to_string_lossy();
        let has_placeholder = self.args.iter().any(|a| a.contains(SOURCE_PLACEHOLDER));
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(SOURCE_PLACEHOLDER, &path))
            .collect();
        if !has_placeholder && self.input == SourceInput::File {
            args.push(path.into_owned());
        }
        args
    }
}

impl Backend for ProcessBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, source: &str, timeout: Duration) -> Result<BackendRun, HarnessFault> {
        let scratch = tempfile::Builder::new()
            .prefix("parity-")
            .tempdir()
            .map_err(|e| HarnessFault::scratch(&self.name, e))?;
        let source_path = scratch.path().join(SNIPPET_FILE);
        let stdout_path = scratch.path().join("stdout");
        let stderr_path = scratch.path().join("stderr");

        fs::write(&source_path, source).map_err(|e| HarnessFault::scratch(&self.name, e))?;
        let stdout = File::create(&stdout_path).map_err(|e| HarnessFault::scratch(&self.name, e))?;
        let stderr = File::create(&stderr_path).map_err(|e| HarnessFault::scratch(&self.name, e))?;

        let mut command = Command::new(&self.program);
        command
            .args(self.resolved_args(&source_path))
            .current_dir(scratch.path())
            .envs(&self.env)
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .stdin(match self.input {
                SourceInput::File => Stdio::null(),
                SourceInput::Stdin => Stdio::piped(),
            });
        // Own process group, so a timeout also reaches whatever the backend spawned.
        #[cfg(unix)]
        command.process_group(0);
        trace!(backend = %self.name, command = ?command, "spawning backend");

        let started = Instant::now();
        let child = command
            .spawn()
            .map_err(|e| HarnessFault::backend_spawn(&self.name, e))?;
        let mut guard = ChildGuard::new(child);
        let stdin = guard.child.stdin.take();

        // The write runs beside the deadline wait: a backend that never
        // reads its input is killed on time and the writer sees a broken pipe.
        let status = thread::scope(|scope| {
            if let Some(mut stdin) = stdin {
                scope.spawn(move || {
                    if let Err(err) = stdin.write_all(source.as_bytes()) {
                        debug!(backend = %self.name, error = %err, "backend closed stdin early");
                    }
                });
            }
            guard.wait_with_deadline(timeout)
        })
        .map_err(|e| HarnessFault::backend_wait(&self.name, e))?;
        let elapsed = started.elapsed();
        if status.is_none() {
            warn!(backend = %self.name, elapsed_ms = elapsed.as_millis() as u64, "backend timed out and was killed");
        }

        let run = BackendRun {
            exit_code: status.and_then(|s| s.code()),
            status: status.map_or_else(|| "killed after timeout".to_string(), |s| s.to_string()),
            stdout: read_lossy(&stdout_path).map_err(|e| HarnessFault::scratch(&self.name, e))?,
            stderr: read_lossy(&stderr_path).map_err(|e| HarnessFault::scratch(&self.name, e))?,
            timed_out: status.is_none(),
            elapsed,
        };
        debug!(
            backend = %self.name,
            status = %run.status,
            elapsed_ms = elapsed.as_millis() as u64,
            "backend finished"
        );
        Ok(run)
    }
}

fn read_lossy(path: &Path) -> std::io::Result<String> {
    Ok(String::from_utf8_lossy(&fs::read(path)?).into_owned())
}

/// Owns a spawned backend; kills and reaps it on every exit path.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    /// `Ok(None)` means the deadline passed and the child was killed.
    fn wait_with_deadline(&mut self, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.reaped = true;
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                self.terminate();
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn terminate(&mut self) {
        kill_process_group(&self.child);
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.reaped = true;
    }
}

/// Kills every process in the child's group. The child is still unreaped
/// here, so its pid cannot have been reused as a group id.
#[cfg(unix)]
fn kill_process_group(child: &Child) {
    let pgid = child.id().to_string();
    let killed = Command::new("sh")
        .args(["-c", "kill -s KILL -- \"-$1\"", "sh", &pgid])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    if let Err(err) = killed {
        warn!(pgid = %pgid, error = %err, "could not kill backend process group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            self.terminate();
        }
    }
}
