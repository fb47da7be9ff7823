//! Harness configuration: backends, limits and suite locations.
//!
//! Loaded from YAML or JSON (by extension). Every field has a default, so an
//! empty file is a valid configuration as long as a target backend is given
//! on the command line.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::error::ConfigError;
use crate::executor::{DualExecutor, ProcessBackend, SourceInput};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub input: SourceInput,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl BackendConfig {
    /// Splits a command line on whitespace into program and arguments.
    pub fn from_command_line(name: &str, line: &str) -> Result<Self, ConfigError> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let command = parts
            .next()
            .ok_or_else(|| ConfigError::invalid_backend(name, "empty command"))?;
        Ok(Self {
            name: name.to_string(),
            command,
            args: parts.collect(),
            input: SourceInput::File,
            env: BTreeMap::new(),
        })
    }

    pub fn build(&self) -> Result<ProcessBackend, ConfigError> {
        if self.command.trim().is_empty() {
            return Err(ConfigError::invalid_backend(&self.name, "empty command"));
        }
        let backend = self.env.iter().fold(
            ProcessBackend::new(&self.name, &self.command)
                .with_args(self.args.iter().cloned())
                .with_input(self.input),
            |backend, (key, value)| backend.with_env(key, value),
        );
        Ok(backend)
    }
}

fn default_reference() -> BackendConfig {
    BackendConfig {
        name: "reference".to_string(),
        command: "python3".to_string(),
        args: Vec::new(),
        input: SourceInput::File,
        env: BTreeMap::new(),
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_jobs() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    #[serde(default = "default_reference")]
    pub reference: BackendConfig,
    #[serde(default)]
    pub target: Option<BackendConfig>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    #[serde(default = "default_true")]
    pub retry_timeouts: bool,
    #[serde(default = "default_true")]
    pub fail_on_unexpected_success: bool,
    /// Suite files or directories; relative paths resolve against the
    /// directory of the config file.
    #[serde(default)]
    pub suites: Vec<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            reference: default_reference(),
            target: None,
            timeout_ms: default_timeout_ms(),
            jobs: default_jobs(),
            retry_timeouts: true,
            fail_on_unexpected_success: true,
            suites: Vec::new(),
        }
    }
}

impl HarnessConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::file_read_error(path, e.to_string()))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        let mut config: Self = match extension {
            "yaml" | "yml" if content.trim().is_empty() => Self::default(),
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| ConfigError::parse_error(path, e.to_string()))?,
            "json" => serde_json::from_str(&content)
                .map_err(|e| ConfigError::parse_error(path, e.to_string()))?,
            other => return Err(ConfigError::unsupported_format(other)),
        };

        if let Some(base) = path.parent() {
            config.suites = config
                .suites
                .into_iter()
                .map(|p| if p.is_relative() { base.join(p) } else { p })
                .collect();
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs == 0 {
            return Err(ConfigError::ZeroJobs);
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid_backend(
                &self.reference.name,
                "timeout must be positive",
            ));
        }
        if self.target.is_none() {
            return Err(ConfigError::invalid_backend(
                "target",
                "no target backend configured",
            ));
        }
        Ok(())
    }

    /// Builds the executor for the configured reference and target.
    pub fn executor(&self) -> Result<DualExecutor, ConfigError> {
        self.validate()?;
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| ConfigError::invalid_backend("target", "no target backend configured"))?;
        if target.name == self.reference.name {
            return Err(ConfigError::invalid_backend(
                &target.name,
                "reference and target need distinct names",
            ));
        }

        Ok(DualExecutor::new(
            Box::new(self.reference.build()?),
            Box::new(target.build()?),
        )
        .with_timeout(self.timeout())
        .with_timeout_retry(self.retry_timeouts))
    }
}
