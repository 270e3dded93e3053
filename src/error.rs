//! Fatal and recoverable error types for the root crate's orchestrator and
//! staging boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal — the staging directory is cleaned up and the live wiki is left
/// untouched whenever this is returned.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to swap {from} into {to}: {source}")]
    Swap {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize graph or metadata: {0}")]
    Serialize(String),
    #[error("failed to persist graph cache: {0}")]
    Persist(anyhow::Error),
}

/// One recoverable failure recorded in a [`crate::orchestrator::BuildReport`]
/// instead of aborting the build.
#[derive(Debug, Clone)]
pub enum BuildFailure {
    ParseFailed { path: PathBuf, message: String },
    PageGenerationFailed { target: String, message: String },
}

impl std::fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildFailure::ParseFailed { path, message } => {
                write!(f, "failed to parse {}: {message}", path.display())
            }
            BuildFailure::PageGenerationFailed { target, message } => {
                write!(f, "failed to generate page for {target}: {message}")
            }
        }
    }
}
