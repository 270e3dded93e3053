//! Error taxonomy for page generation (C5).

use thiserror::Error;

/// Failure talking to a [`crate::generator::TextGenerator`]. Recoverable at
/// the page level — the orchestrator retains the previous build's page if
/// one exists, otherwise records the failure and omits the page.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("text generator failed: {0}")]
    Failed(String),
    #[error("text generator returned empty output")]
    Empty,
}

/// The leading YAML block of a generated page couldn't be parsed against
/// its schema. Recoverable — one retry, then a fallback summary.
#[derive(Debug, Error)]
pub enum YamlParseFailure {
    #[error("no leading YAML block found in generated output")]
    Missing,
    #[error("failed to parse YAML block: {0}")]
    Invalid(#[source] serde_yaml::Error),
}

/// Top-level error for a single page generation attempt.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Yaml(#[from] YamlParseFailure),
}
