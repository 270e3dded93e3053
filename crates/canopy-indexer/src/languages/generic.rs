//! Fallback extractor for files with no dedicated grammar.
//!
//! Produces no symbols or edges — such files still get a `File` node from
//! the directory/file containment pass, just no code-entity children.

use super::{ExtractionResult, LanguageExtractor};
use anyhow::Result;
use std::path::PathBuf;

pub struct GenericExtractor;

impl LanguageExtractor for GenericExtractor {
    fn extract(&self, _path: &PathBuf, _content: &[u8]) -> Result<ExtractionResult> {
        Ok(ExtractionResult::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_returns_empty() {
        let result = GenericExtractor.extract(&PathBuf::from("notes.md"), b"# hi").unwrap();
        assert!(result.nodes.is_empty());
        assert!(result.edges.is_empty());
    }
}
