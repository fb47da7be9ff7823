mod formatter;
mod report;

pub use formatter::OutputFormatter;
pub use report::{Report, Summary};

use std::fs;
use std::path::Path;

use crate::error::IoError;

/// Writes a rendered report, creating parent directories as needed.
pub fn write_report(path: &Path, rendered: &str) -> Result<(), IoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IoError::write_error(parent, e))?;
    }
    fs::write(path, rendered).map_err(|e| IoError::write_error(path, e))
}
