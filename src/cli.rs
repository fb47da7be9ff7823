use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use crate::config::{BackendConfig, HarnessConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "transpile-parity")]
#[command(about = "Parity harness - check that a transpiled runtime's built-ins behave like the reference interpreter", long_about = None)]
pub struct Args {
    /// Harness configuration file (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suite file or directory. Can be specified multiple times; replaces the configured suites.
    #[arg(long = "suites", value_name = "PATH")]
    pub suites: Vec<PathBuf>,

    /// Reference backend command line (e.g. "python3 -I")
    #[arg(long, value_name = "CMD")]
    pub reference: Option<String>,

    /// Target backend command line (e.g. "node run_in_batavia.js")
    #[arg(long, value_name = "CMD")]
    pub target: Option<String>,

    /// Per-invocation timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum number of cases run concurrently
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Only run cases whose id contains this text
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// List the cases that would run, without running them
    #[arg(long)]
    pub list: bool,

    /// Output file path (prints to stdout if not specified)
    #[arg(short = 'O', long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short = 'f', long, default_value = "text")]
    pub format: OutputFormat,

    /// Do not fail the run on registered cases that now pass
    #[arg(long)]
    pub allow_unexpected_success: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref config) = self.config {
            validate_path(config)?;
        }
        for path in &self.suites {
            validate_path(path)?;
        }
        if self.jobs == Some(0) {
            anyhow::bail!("--jobs must be at least 1");
        }
        if self.timeout_ms == Some(0) {
            anyhow::bail!("--timeout-ms must be positive");
        }
        if self.config.is_none() && self.suites.is_empty() {
            anyhow::bail!("Nothing to run: pass --config or --suites");
        }
        Ok(())
    }

    /// Loads the configuration file, if any, and applies command-line
    /// overrides on top of it.
    pub fn resolve_config(&self) -> Result<HarnessConfig> {
        let mut config = match self.config {
            Some(ref path) => HarnessConfig::load(path)
                .with_context(|| format!("Cannot load config: {}", path.display()))?,
            None => HarnessConfig::default(),
        };
        self.apply_overrides(&mut config)?;
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut HarnessConfig) -> Result<()> {
        if let Some(ref line) = self.reference {
            config.reference = BackendConfig::from_command_line("reference", line)?;
        }
        if let Some(ref line) = self.target {
            config.target = Some(BackendConfig::from_command_line("target", line)?);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if !self.suites.is_empty() {
            config.suites = self.suites.clone();
        }
        if self.allow_unexpected_success {
            config.fail_on_unexpected_success = false;
        }
        Ok(())
    }
}

pub fn validate_path(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    if path.is_file() {
        std::fs::metadata(path).with_context(|| format!("Cannot read file: {}", path.display()))?;
    } else if path.is_dir() {
        std::fs::metadata(path)
            .with_context(|| format!("Cannot read directory: {}", path.display()))?;
    } else {
        anyhow::bail!("Path is neither a file nor a directory: {}", path.display());
    }

    Ok(())
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}
