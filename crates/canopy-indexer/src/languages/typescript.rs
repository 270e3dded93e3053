//! TypeScript language extractor using tree-sitter (C1).
//!
//! Reuses the JavaScript extractor's AST walker — the constructs this
//! extractor targets (functions, classes, imports, calls, type
//! annotations) share node shapes across the two grammars.

use super::javascript::extract_ecma_like;
use super::{ExtractionResult, LanguageExtractor};
use crate::parser_pool::{FileType, ParserPool};
use anyhow::Result;
use canopy_core::Language;
use std::path::PathBuf;

pub struct TypeScriptExtractor {
    parser_pool: ParserPool,
}

impl TypeScriptExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for TypeScriptExtractor {
    fn extract(&self, path: &PathBuf, content: &[u8]) -> Result<ExtractionResult> {
        extract_ecma_like(&self.parser_pool, path, content, FileType::TypeScript, Language::TypeScript)
    }
}
