//! Error taxonomy shared by the graph, signature, and config layers.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort reference resolution or graph construction outright.
/// Per-reference ambiguity is not an error — see `resolve::resolve_reference`.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("edge references unknown kind for target '{target}'")]
    UnknownReferenceKind { target: String },
}

/// Failures computing or persisting content-addressed signatures.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize signature inputs: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Fatal configuration problems; always surfaced at startup, never mid-build.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}
