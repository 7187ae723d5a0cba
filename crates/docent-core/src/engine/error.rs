use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run.
///
/// Per-file problems never surface here; they become error documents or
/// skipped cache updates.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Caching is disabled")]
    CacheDisabled,
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors persisting the cache file.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CacheError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}
