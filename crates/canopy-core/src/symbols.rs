//! Symbol table for cross-file reference resolution.

use crate::model::{NodeId, NodeKind};
use dashmap::DashMap;

/// Maps qualified and simple names to the NodeIds that define them.
///
/// A qualified name maps to at most one symbol. A simple name may map to
/// several (different files defining `helper`, overloaded methods, etc.) —
/// resolution against the simple-name index can be ambiguous.
pub struct SymbolTable {
    qualified: DashMap<String, NodeId>,
    by_name: DashMap<String, Vec<NodeId>>,
    file_symbols: DashMap<String, Vec<String>>,
    kinds: DashMap<NodeId, NodeKind>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            qualified: DashMap::new(),
            by_name: DashMap::new(),
            file_symbols: DashMap::new(),
            kinds: DashMap::new(),
        }
    }

    /// Insert a symbol under both its qualified and simple name.
    pub fn insert(&self, qualified_name: &str, simple_name: &str, node_id: NodeId, file_path: &str, kind: NodeKind) {
        self.qualified.insert(qualified_name.to_string(), node_id);
        self.by_name
            .entry(simple_name.to_string())
            .or_default()
            .push(node_id);
        self.file_symbols
            .entry(file_path.to_string())
            .or_default()
            .push(qualified_name.to_string());
        self.kinds.insert(node_id, kind);
    }

    /// The `NodeKind` a symbol was registered with, used by C2 to tell a
    /// constructor call from a plain function call after resolution.
    pub fn kind_of(&self, node_id: NodeId) -> Option<NodeKind> {
        self.kinds.get(&node_id).map(|r| *r.value())
    }

    /// Exact lookup by qualified name.
    pub fn lookup_qualified(&self, qualified_name: &str) -> Option<NodeId> {
        self.qualified.get(qualified_name).map(|r| *r.value())
    }

    /// All candidates registered under a simple name.
    pub fn lookup_by_name(&self, simple_name: &str) -> Vec<NodeId> {
        self.by_name
            .get(simple_name)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Get all symbols defined in a file.
    pub fn symbols_in_file(&self, file_path: &str) -> Vec<NodeId> {
        self.file_symbols
            .get(file_path)
            .map(|r| {
                r.value()
                    .iter()
                    .filter_map(|name| self.qualified.get(name).map(|n| *n.value()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remove all symbols for a file, for incremental re-indexing.
    pub fn remove_file(&self, file_path: &str) {
        if let Some((_, qualified_names)) = self.file_symbols.remove(file_path) {
            for qualified_name in qualified_names {
                if let Some((_, node_id)) = self.qualified.remove(&qualified_name) {
                    if let Some(simple_name) = qualified_name.rsplit("::").next() {
                        if let Some(mut ids) = self.by_name.get_mut(simple_name) {
                            ids.retain(|id| *id != node_id);
                        }
                    }
                    self.kinds.remove(&node_id);
                }
            }
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeKind, NodeId};
    use std::path::PathBuf;

    #[test]
    fn exact_qualified_lookup() {
        let table = SymbolTable::new();
        let id = NodeId::new(&PathBuf::from("a.rs"), NodeKind::Function, "mod::foo");
        table.insert("mod::foo", "foo", id, "a.rs", NodeKind::Function);
        assert_eq!(table.lookup_qualified("mod::foo"), Some(id));
        assert_eq!(table.lookup_by_name("foo"), vec![id]);
        assert_eq!(table.kind_of(id), Some(NodeKind::Function));
    }

    #[test]
    fn ambiguous_simple_name() {
        let table = SymbolTable::new();
        let id1 = NodeId::new(&PathBuf::from("a.rs"), NodeKind::Function, "a::foo");
        let id2 = NodeId::new(&PathBuf::from("b.rs"), NodeKind::Function, "b::foo");
        table.insert("a::foo", "foo", id1, "a.rs", NodeKind::Function);
        table.insert("b::foo", "foo", id2, "b.rs", NodeKind::Function);
        let candidates = table.lookup_by_name("foo");
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn remove_file_clears_both_indices() {
        let table = SymbolTable::new();
        let id = NodeId::new(&PathBuf::from("a.rs"), NodeKind::Function, "a::foo");
        table.insert("a::foo", "foo", id, "a.rs", NodeKind::Function);
        table.remove_file("a.rs");
        assert_eq!(table.lookup_qualified("a::foo"), None);
        assert!(table.lookup_by_name("foo").is_empty());
        assert_eq!(table.kind_of(id), None);
    }

    #[test]
    fn kind_of_distinguishes_classes_from_functions() {
        let table = SymbolTable::new();
        let class_id = NodeId::new(&PathBuf::from("a.py"), NodeKind::Class, "a::Widget");
        table.insert("a::Widget", "Widget", class_id, "a.py", NodeKind::Class);
        assert_eq!(table.kind_of(class_id), Some(NodeKind::Class));
    }
}
