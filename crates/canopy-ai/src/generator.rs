//! The capability boundary between page generation (C5) and whatever
//! produces prose from a prompt. Concrete LLM transports are out of scope;
//! only [`crate::offline::OfflineTextGenerator`] ships here.

use crate::error::TransportError;

/// Turns a prompt into markdown. Implementations may be local (template,
/// offline model) or remote (hosted LLM) — the rest of the crate never
/// knows which.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String, TransportError>;
}
