//! Suite declarations: which functions to check, with how many sampled
//! arguments, and which types are known not to work yet.

mod loader;

pub use loader::{discover_suite_files, load_suite_file, load_suites};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::matrix::{Arity, TypeMatrix};
use crate::registry::{normalize_entry, ExpectationRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FunctionUnderTest(String);

impl FunctionUnderTest {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionUnderTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One declaration as written in a suite file.
#[derive(Debug, Clone, Deserialize)]
pub struct SuiteDeclaration {
    pub name: String,
    pub functions: Vec<String>,
    #[serde(default = "default_arity")]
    pub arity: u8,
    #[serde(default)]
    pub not_implemented: Vec<String>,
}

fn default_arity() -> u8 {
    1
}

#[derive(Debug, Clone)]
pub struct Suite {
    pub name: String,
    pub functions: Vec<FunctionUnderTest>,
    pub arity: Arity,
    pub registry: ExpectationRegistry,
    /// File the suite was declared in, when loaded from disk.
    pub source: Option<PathBuf>,
}

impl Suite {
    pub fn new<I, S>(name: impl Into<String>, functions: I, arity: Arity) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            functions: functions
                .into_iter()
                .map(|f| FunctionUnderTest::new(f))
                .collect(),
            arity,
            registry: ExpectationRegistry::new(),
            source: None,
        }
    }

    /// Marks `labels` as not implemented for every function of the suite.
    pub fn with_not_implemented<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for label in labels {
            for function in &self.functions {
                self.registry.insert(function.name(), label.as_ref());
            }
        }
        self
    }

    /// Builds a suite from its declaration, rejecting entries the matrix
    /// cannot produce.
    pub fn from_declaration(
        declaration: SuiteDeclaration,
        matrix: &TypeMatrix,
        source: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if declaration.functions.is_empty() {
            return Err(ConfigError::EmptyFunctions {
                suite: declaration.name,
            });
        }
        let arity =
            Arity::from_count(declaration.arity).ok_or_else(|| ConfigError::UnsupportedArity {
                suite: declaration.name.clone(),
                arity: declaration.arity,
            })?;

        let labels: HashSet<String> = matrix.case_keys(arity).iter().map(|k| k.label()).collect();
        if let Some(unknown) = declaration
            .not_implemented
            .iter()
            .find(|entry| !labels.contains(normalize_entry(entry)))
        {
            return Err(ConfigError::unknown_type_name(&declaration.name, unknown));
        }

        let mut suite = Suite::new(declaration.name, declaration.functions, arity)
            .with_not_implemented(&declaration.not_implemented);
        suite.source = source;
        Ok(suite)
    }
}
