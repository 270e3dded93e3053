//! Canopy Core — graph data model, symbol table, reference resolution,
//! signatures, diagrams, dead-code analysis, and persistence.

pub mod config;
pub mod deadcode;
pub mod diagram;
pub mod error;
pub mod graph;
pub mod model;
pub mod notes;
pub mod page;
pub mod persist;
pub mod resolve;
pub mod signature;
pub mod symbols;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use error::{ConfigError, ResolveError, SignatureError};
pub use graph::Graph;
pub use model::{
    EdgeId, EdgeKind, EdgeSource, GraphEdge, GraphNode, Language, NodeId, NodeKind, UnresolvedEdge,
};
pub use notes::{InMemoryNotesQuery, Note, NoteScope, NotesQuery, NullNotesQuery};
pub use page::{DirectorySummary, FileSummary, GeneratedPage, Layer, LayerSummary, PageSidecar, PageType, SynthesisMap};
pub use symbols::SymbolTable;
