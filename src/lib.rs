//! Transpile parity
//!
//! Checks that a transpiled runtime's built-in functions behave like the
//! reference interpreter: every built-in under test is applied to samples of
//! every type in a fixed matrix, on both backends, and the observable results
//! are compared.
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod executor;
pub mod generator;
pub mod logging;
pub mod matrix;
pub mod output;
pub mod registry;
pub mod runner;
pub mod snippet;
pub mod suite;
pub mod value;

pub use error::{Error, Result};
pub use value::Value;
