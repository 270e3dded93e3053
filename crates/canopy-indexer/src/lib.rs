//! File parsing and symbol extraction (C1): tree-sitter-backed language
//! extractors fanned out by the [`coordinator::Coordinator`], producing
//! [`extractor::ExtractionResult`]s that `canopy-core`'s resolver (C2)
//! turns into graph edges.

pub mod confidence;
pub mod coordinator;
pub mod extractor;
pub mod heuristics;
pub mod languages;
pub mod parser_pool;

#[cfg(test)]
mod tests;

pub use coordinator::{Coordinator, DiscoverResult, ParseFailure};
pub use extractor::{ExtractionResult, LanguageExtractor};
pub use languages::get_extractor;
