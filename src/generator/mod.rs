//! Case generator: turns a suite into named cases, one per case key and
//! function, and runs them through snippet building, dual execution,
//! comparison and expectation resolution.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::compare::{aggregate, compare, ComparisonVerdict};
use crate::error::HarnessFault;
use crate::executor::{DualExecutor, ExecutionOutcome};
use crate::matrix::{CaseKey, TypeMatrix, TypeSample};
use crate::registry::CaseOutcome;
use crate::snippet::SnippetBuilder;
use crate::suite::{FunctionUnderTest, Suite};

/// One named case: a function of a suite applied to the samples of a key.
#[derive(Debug, Clone)]
pub struct TestCase<'s> {
    pub suite: &'s Suite,
    pub function: &'s FunctionUnderTest,
    pub key: CaseKey,
}

impl TestCase<'_> {
    /// `test_<label>`, as the case would be named in a unittest suite.
    pub fn name(&self) -> String {
        self.key.test_name()
    }

    /// `<suite>.<test name>[<function>]`, unique within a run.
    pub fn id(&self) -> String {
        format!("{}.{}[{}]", self.suite.name, self.name(), self.function)
    }

    pub fn expected_failure(&self) -> bool {
        self.suite
            .registry
            .contains(self.function.name(), &self.key.label())
    }
}

/// Verdict for one sample combination of a case.
#[derive(Debug, Clone, Serialize)]
pub struct SampleVerdict {
    pub call: String,
    pub verdict: ComparisonVerdict,
    pub reference: ExecutionOutcome,
    pub target: ExecutionOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub suite: String,
    pub function: String,
    pub name: String,
    pub id: String,
    pub types: Vec<String>,
    pub expected_failure: bool,
    pub verdict: ComparisonVerdict,
    pub outcome: CaseOutcome,
    pub samples: Vec<SampleVerdict>,
    pub duration_ms: u64,
}

impl CaseResult {
    /// Samples on which the backends did not agree.
    pub fn disagreements(&self) -> impl Iterator<Item = &SampleVerdict> {
        self.samples.iter().filter(|s| !s.verdict.is_agreement())
    }
}

pub struct CaseGenerator<'a> {
    matrix: &'a TypeMatrix,
    executor: &'a DualExecutor,
    builder: SnippetBuilder,
    jobs: usize,
}

impl<'a> CaseGenerator<'a> {
    pub fn new(matrix: &'a TypeMatrix, executor: &'a DualExecutor) -> Self {
        Self {
            matrix,
            executor,
            builder: SnippetBuilder::new(),
            jobs: 1,
        }
    }

    pub fn with_builder(mut self, builder: SnippetBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Maximum number of cases in flight. Zero is treated as one.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Builds a probe for every matrix sample before any backend runs.
    pub fn preflight(&self) -> Result<usize, HarnessFault> {
        let checked = self.builder.check_matrix(self.matrix)?;
        debug!(samples = checked, "matrix samples render to valid source");
        Ok(checked)
    }

    /// The cases of one function, in matrix order. Calling again
    /// enumerates the same sequence.
    pub fn cases<'s>(
        &self,
        suite: &'s Suite,
        function: &'s FunctionUnderTest,
    ) -> impl Iterator<Item = TestCase<'s>> {
        self.matrix
            .case_keys(suite.arity)
            .into_iter()
            .map(move |key| TestCase {
                suite,
                function,
                key,
            })
    }

    /// The cases of every function of the suite, function by function.
    pub fn suite_cases<'s>(&self, suite: &'s Suite) -> Vec<TestCase<'s>> {
        suite
            .functions
            .iter()
            .flat_map(|function| self.cases(suite, function))
            .collect()
    }

    pub fn run_case(&self, case: &TestCase<'_>) -> Result<CaseResult, HarnessFault> {
        let started = Instant::now();
        let function = case.function.name();

        let mut pools = Vec::with_capacity(case.key.types().len());
        for type_name in case.key.types() {
            pools.push(self.matrix.sample_for(type_name)?);
        }

        let mut samples = Vec::new();
        for combination in combinations(&pools) {
            let snippet = self.builder.build(function, &combination)?;
            let (reference, target) = self.executor.run(&snippet)?;
            let verdict = compare(&reference, &target);
            samples.push(SampleVerdict {
                call: snippet.call,
                verdict,
                reference,
                target,
            });
        }

        let label = case.key.label();
        let verdict = aggregate(samples.iter().map(|s| s.verdict));
        let outcome = case.suite.registry.resolve(function, &label, verdict);
        let result = CaseResult {
            suite: case.suite.name.clone(),
            function: function.to_string(),
            name: case.name(),
            id: case.id(),
            types: case.key.types().iter().map(|t| t.to_string()).collect(),
            expected_failure: case.expected_failure(),
            verdict,
            outcome,
            samples,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        match outcome {
            CaseOutcome::Fail | CaseOutcome::UnexpectedSuccess => {
                warn!(case = %result.id, verdict = %verdict, outcome = %outcome, "case did not pass")
            }
            _ => debug!(case = %result.id, verdict = %verdict, outcome = %outcome, "case finished"),
        }
        Ok(result)
    }

    /// Runs every case of the suite whose id contains `filter`, using up to
    /// `jobs` workers. Results come back in case order. The first harness
    /// fault stops further cases from starting and is returned.
    pub fn run_suite(
        &self,
        suite: &Suite,
        filter: Option<&str>,
    ) -> Result<Vec<CaseResult>, HarnessFault> {
        let cases: Vec<TestCase<'_>> = self
            .suite_cases(suite)
            .into_iter()
            .filter(|case| filter.map_or(true, |f| case.id().contains(f)))
            .collect();
        info!(suite = %suite.name, cases = cases.len(), jobs = self.jobs, "running suite");

        let results = if self.jobs <= 1 || cases.len() <= 1 {
            cases
                .iter()
                .map(|case| self.run_case(case))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            self.run_parallel(&cases)?
        };

        info!(suite = %suite.name, cases = results.len(), "suite finished");
        Ok(results)
    }

    fn run_parallel(&self, cases: &[TestCase<'_>]) -> Result<Vec<CaseResult>, HarnessFault> {
        let cursor = &AtomicUsize::new(0);
        let abort = &AtomicBool::new(false);
        let workers = self.jobs.min(cases.len());

        let outputs = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(move || -> Result<Vec<(usize, CaseResult)>, HarnessFault> {
                        let mut done = Vec::new();
                        while !abort.load(Ordering::SeqCst) {
                            let index = cursor.fetch_add(1, Ordering::SeqCst);
                            let Some(case) = cases.get(index) else {
                                break;
                            };
                            match self.run_case(case) {
                                Ok(result) => done.push((index, result)),
                                Err(fault) => {
                                    abort.store(true, Ordering::SeqCst);
                                    return Err(fault);
                                }
                            }
                        }
                        Ok(done)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or(Err(HarnessFault::WorkerPanicked)))
                .collect::<Vec<_>>()
        });

        let mut indexed = Vec::with_capacity(cases.len());
        for output in outputs {
            indexed.extend(output?);
        }
        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, result)| result).collect())
    }
}

/// Cartesian product of the sample pools, first pool as the outer loop.
fn combinations<'m>(pools: &[&'m [TypeSample]]) -> Vec<Vec<&'m TypeSample>> {
    pools.iter().copied().fold(vec![Vec::new()], |acc, pool| {
        acc.into_iter()
            .flat_map(|prefix| {
                pool.iter().map(move |sample| {
                    let mut next = prefix.clone();
                    next.push(sample);
                    next
                })
            })
            .collect()
    })
}
