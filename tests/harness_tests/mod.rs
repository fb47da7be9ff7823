//! Harness Test Suite
//!
//! ## Structure
//! - `test_utils` - Scripted in-process backends and shell-script backends
//! - `generation` - Case enumeration: coverage, naming, order, idempotence
//! - `expectations` - Verdicts and expectation polarity through full cases
//! - `suites` - Loading suite declarations from disk
//! - `process_backend` - Real subprocess backends: crashes, timeouts, input modes
//! - `end_to_end` - Runs against a local `python3`, skipped when it is missing

pub mod end_to_end;
pub mod generation;
pub mod process_backend;
pub mod suites;
pub mod test_utils;
