use thiserror::Error;

use super::SnippetError;

/// Faults in the harness itself. Backend misbehaviour is never reported
/// through this type; it is outcome data.
#[derive(Error, Debug)]
pub enum HarnessFault {
    #[error("type '{type_name}' is not in the type matrix")]
    MatrixLookupMiss { type_name: String },

    #[error("failed to spawn backend '{backend}': {source}")]
    BackendSpawn {
        backend: String,
        source: std::io::Error,
    },

    #[error("failed waiting on backend '{backend}': {source}")]
    BackendWait {
        backend: String,
        source: std::io::Error,
    },

    #[error("scratch space for backend '{backend}' failed: {source}")]
    Scratch {
        backend: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Snippet(#[from] SnippetError),

    #[error("case worker panicked")]
    WorkerPanicked,
}

impl HarnessFault {
    pub fn matrix_lookup_miss(type_name: impl Into<String>) -> Self {
        Self::MatrixLookupMiss {
            type_name: type_name.into(),
        }
    }

    pub fn backend_spawn(backend: impl Into<String>, source: std::io::Error) -> Self {
        Self::BackendSpawn {
            backend: backend.into(),
            source,
        }
    }

    pub fn backend_wait(backend: impl Into<String>, source: std::io::Error) -> Self {
        Self::BackendWait {
            backend: backend.into(),
            source,
        }
    }

    pub fn scratch(backend: impl Into<String>, source: std::io::Error) -> Self {
        Self::Scratch {
            backend: backend.into(),
            source,
        }
    }
}
