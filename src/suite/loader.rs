use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{Suite, SuiteDeclaration};
use crate::error::ConfigError;
use crate::matrix::TypeMatrix;

const SUITE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SuiteFile {
    Many(Vec<SuiteDeclaration>),
    Wrapped { suites: Vec<SuiteDeclaration> },
    Single(SuiteDeclaration),
}

impl SuiteFile {
    fn into_declarations(self) -> Vec<SuiteDeclaration> {
        match self {
            Self::Wrapped { suites } | Self::Many(suites) => suites,
            Self::Single(declaration) => vec![declaration],
        }
    }
}

/// Collects suite files from the given paths. Files are taken as they are;
/// directories are walked for `.yaml`, `.yml` and `.json` files, skipping
/// hidden entries. The result is sorted and free of duplicates.
pub fn discover_suite_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ConfigError> {
    let mut files = Vec::new();
    for root in paths {
        if root.is_file() {
            files.push(root.clone());
            continue;
        }
        if !root.exists() {
            return Err(ConfigError::file_read_error(root, "no such file or directory"));
        }

        for entry in WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry.map_err(|e| ConfigError::file_read_error(root, e.to_string()))?;
            if entry.file_type().is_file() && has_suite_extension(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    files.sort();
    files.dedup();
    debug!(count = files.len(), "discovered suite files");
    Ok(files)
}

fn has_suite_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUITE_EXTENSIONS.contains(&ext))
}

/// Parses one suite file, choosing the format by extension.
pub fn load_suite_file(path: &Path, matrix: &TypeMatrix) -> Result<Vec<Suite>, ConfigError> {
    let content =
        fs::read_to_string(path).map_err(|e| ConfigError::file_read_error(path, e.to_string()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    let file: SuiteFile = match extension {
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::parse_error(path, e.to_string()))?,
        "json" => serde_json::from_str(&content)
            .map_err(|e| ConfigError::parse_error(path, e.to_string()))?,
        other => return Err(ConfigError::unsupported_format(other)),
    };

    file.into_declarations()
        .into_iter()
        .map(|declaration| Suite::from_declaration(declaration, matrix, Some(path.to_path_buf())))
        .collect()
}

/// Discovers and loads every suite under `paths`. Finding none is an error.
pub fn load_suites(paths: &[PathBuf], matrix: &TypeMatrix) -> Result<Vec<Suite>, ConfigError> {
    let mut suites = Vec::new();
    for file in discover_suite_files(paths)? {
        let loaded = load_suite_file(&file, matrix)?;
        debug!(path = %file.display(), suites = loaded.len(), "loaded suite file");
        suites.extend(loaded);
    }
    if suites.is_empty() {
        return Err(ConfigError::NoSuites {
            paths: paths.to_vec(),
        });
    }
    info!(count = suites.len(), "loaded suites");
    Ok(suites)
}
