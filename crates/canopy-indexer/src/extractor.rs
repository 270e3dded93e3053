//! Language extractor trait definition (C1).

use canopy_core::{GraphNode, UnresolvedEdge};
use std::path::PathBuf;

#[derive(Clone)]
pub struct ExtractionResult {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<UnresolvedEdge>,
}

impl ExtractionResult {
    pub fn empty() -> Self {
        ExtractionResult {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }
}

pub trait LanguageExtractor: Send + Sync {
    fn extract(&self, path: &PathBuf, content: &[u8]) -> anyhow::Result<ExtractionResult>;
}
