//! Dual executor: runs one snippet on the reference and the target backend.

mod outcome;
mod process;

pub use outcome::{BackendRun, ExecutionOutcome, FailureKind};
pub use process::{ProcessBackend, SourceInput, SOURCE_PLACEHOLDER};

use std::time::Duration;
use tracing::{debug, warn};

use crate::error::HarnessFault;
use crate::snippet::Snippet;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// One way of executing source text.
///
/// Implementations report crashes, timeouts and raised errors through the
/// returned [`BackendRun`]. An `Err` means the harness could not stage the run
/// at all.
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    fn execute(&self, source: &str, timeout: Duration) -> Result<BackendRun, HarnessFault>;
}

pub struct DualExecutor {
    reference: Box<dyn Backend>,
    target: Box<dyn Backend>,
    timeout: Duration,
    retry_timeouts: bool,
}

impl DualExecutor {
    pub fn new(reference: Box<dyn Backend>, target: Box<dyn Backend>) -> Self {
        Self {
            reference,
            target,
            timeout: DEFAULT_TIMEOUT,
            retry_timeouts: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a timed-out invocation is retried once before it is reported.
    pub fn with_timeout_retry(mut self, retry: bool) -> Self {
        self.retry_timeouts = retry;
        self
    }

    pub fn reference_name(&self) -> &str {
        self.reference.name()
    }

    pub fn target_name(&self) -> &str {
        self.target.name()
    }

    /// Returns `(reference, target)` outcomes.
    pub fn run(
        &self,
        snippet: &Snippet,
    ) -> Result<(ExecutionOutcome, ExecutionOutcome), HarnessFault> {
        let reference = self.run_on(self.reference.as_ref(), snippet)?;
        let target = self.run_on(self.target.as_ref(), snippet)?;
        debug!(
            call = %snippet.call,
            reference = %reference,
            target = %target,
            "executed snippet"
        );
        Ok((reference, target))
    }

    fn run_on(
        &self,
        backend: &dyn Backend,
        snippet: &Snippet,
    ) -> Result<ExecutionOutcome, HarnessFault> {
        let outcome = ExecutionOutcome::from_run(&backend.execute(&snippet.source, self.timeout)?);
        if !(self.retry_timeouts && outcome.is_timeout()) {
            return Ok(outcome);
        }
        warn!(
            backend = backend.name(),
            call = %snippet.call,
            "backend timed out, retrying once"
        );
        Ok(ExecutionOutcome::from_run(
            &backend.execute(&snippet.source, self.timeout)?,
        ))
    }
}
