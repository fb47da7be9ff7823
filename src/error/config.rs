use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read '{path}': {message}")]
    FileReadError { path: PathBuf, message: String },

    #[error("failed to parse '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("unsupported declaration format: {format} (expected json or yaml)")]
    UnsupportedFormat { format: String },

    #[error("suite '{suite}' declares no functions")]
    EmptyFunctions { suite: String },

    #[error("suite '{suite}' declares unsupported arity {arity} (expected 1 or 2)")]
    UnsupportedArity { suite: String, arity: u8 },

    #[error("suite '{suite}' marks unknown type '{entry}' as not implemented")]
    UnknownTypeName { suite: String, entry: String },

    #[error("invalid backend '{name}': {message}")]
    InvalidBackend { name: String, message: String },

    #[error("concurrency limit must be at least 1")]
    ZeroJobs,

    #[error("no suite declarations found under {paths:?}")]
    NoSuites { paths: Vec<PathBuf> },
}

impl ConfigError {
    pub fn file_read_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FileReadError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn unknown_type_name(suite: impl Into<String>, entry: impl Into<String>) -> Self {
        Self::UnknownTypeName {
            suite: suite.into(),
            entry: entry.into(),
        }
    }

    pub fn invalid_backend(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidBackend {
            name: name.into(),
            message: message.into(),
        }
    }
}
