//! Assembles the code graph (C2) from a discovery pass: structural
//! Directory/File containment, the per-file symbol nodes extracted by C1,
//! and the reference edges resolved against the symbol table.
//!
//! `Graph::add_node` assigns ids from petgraph's own node index rather than
//! reusing the content-addressed `NodeId` an extractor stamped onto a
//! `GraphNode`; edges produced by `canopy_core::resolve` reference those
//! content-addressed ids, so every edge endpoint must be translated through
//! an id map built while inserting nodes.

use canopy_core::{resolve, EdgeId, EdgeKind, EdgeSource, Graph, GraphEdge, GraphNode, NodeId, NodeKind, SymbolTable};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The assembled graph plus the lookup tables the orchestrator needs to
/// drive per-file/per-directory page generation without re-walking it.
pub struct BuiltGraph {
    pub graph: Graph,
    pub file_node_ids: HashMap<PathBuf, NodeId>,
    pub directory_node_ids: HashMap<String, NodeId>,
}

pub fn build_graph(
    root: &Path,
    directories: &[String],
    files: &[(PathBuf, canopy_indexer::ExtractionResult)],
    symbols: &SymbolTable,
) -> BuiltGraph {
    let mut graph = Graph::new();
    let mut content_to_graph: HashMap<NodeId, NodeId> = HashMap::new();
    let mut directory_ids: HashMap<String, NodeId> = HashMap::new();
    let mut file_ids: HashMap<PathBuf, NodeId> = HashMap::new();

    for dir in directories {
        let id = graph.add_node(directory_node(root, dir));
        directory_ids.insert(dir.clone(), id);
    }
    for dir in directories {
        if let Some(parent) = parent_of(dir) {
            if let (Some(&parent_id), Some(&child_id)) = (directory_ids.get(&parent), directory_ids.get(dir)) {
                add_contains_edge(&mut graph, parent_id, child_id);
            }
        }
    }

    for (path, extraction) in files {
        let relative = path.strip_prefix(root).unwrap_or(path).to_string_lossy().replace('\\', "--");
        let file_dir = dir_of(root, path);
        let file_node = file_node(path, relative);
        let file_graph_id = graph.add_node(file_node);
        file_ids.insert(path.clone(), file_graph_id);
        if let Some(&dir_id) = directory_ids.get(&file_dir) {
            add_contains_edge(&mut graph, dir_id, file_graph_id);
        }

        for node in &extraction.nodes {
            let graph_id = graph.add_node(node.clone());
            content_to_graph.insert(node.id, graph_id);
            if node.kind != NodeKind::File && node.kind != NodeKind::Directory {
                add_contains_edge(&mut graph, file_graph_id, graph_id);
            }
        }
    }

    let all_edges: Vec<_> = files.iter().flat_map(|(_, extraction)| extraction.edges.clone()).collect();
    let resolved = resolve::resolve_all(&all_edges, symbols);
    for external in resolved.externals {
        let content_id = external.id;
        let graph_id = graph.add_node(external);
        content_to_graph.insert(content_id, graph_id);
    }
    for edge in resolved.edges {
        if let (Some(&source), Some(&target)) = (content_to_graph.get(&edge.source), content_to_graph.get(&edge.target)) {
            graph.add_edge(GraphEdge { source, target, ..edge });
        }
    }

    BuiltGraph {
        graph,
        file_node_ids: file_ids,
        directory_node_ids: directory_ids,
    }
}

pub fn parent_of(dir: &str) -> Option<String> {
    if dir.is_empty() {
        return None;
    }
    match dir.rfind('/') {
        Some(idx) => Some(dir[..idx].to_string()),
        None => Some(String::new()),
    }
}

pub fn dir_of(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .parent()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .filter(|p| !p.is_empty())
        .unwrap_or_default()
}

fn directory_node(root: &Path, dir: &str) -> GraphNode {
    let name = if dir.is_empty() {
        root.file_name().and_then(|n| n.to_str()).unwrap_or("root").to_string()
    } else {
        dir.rsplit('/').next().unwrap_or(dir).to_string()
    };
    GraphNode {
        id: NodeId::new(&PathBuf::from(dir), NodeKind::Directory, dir),
        kind: NodeKind::Directory,
        name,
        qualified_name: dir.to_string(),
        file_path: root.join(dir),
        line_start: None,
        line_end: None,
        language: None,
        is_container: true,
        child_count: 0,
        loc: None,
        is_entry_point: false,
        docstring: None,
        signature: None,
        parent: None,
        metadata: Default::default(),
    }
}

fn file_node(path: &Path, qualified_name: String) -> GraphNode {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("file").to_string();
    GraphNode {
        id: NodeId::new(&path.to_path_buf(), NodeKind::File, &qualified_name),
        kind: NodeKind::File,
        name,
        qualified_name,
        file_path: path.to_path_buf(),
        line_start: None,
        line_end: None,
        language: Some(canopy_core::Language::from_path(&path.to_path_buf())),
        is_container: true,
        child_count: 0,
        loc: None,
        is_entry_point: false,
        docstring: None,
        signature: None,
        parent: None,
        metadata: Default::default(),
    }
}

fn add_contains_edge(graph: &mut Graph, source: NodeId, target: NodeId) {
    graph.add_edge(GraphEdge {
        id: EdgeId(0),
        source,
        target,
        kind: EdgeKind::Contains,
        edge_source: EdgeSource::Structural,
        confidence: 1.0,
        label: None,
        file_path: None,
        line: None,
        target_resolved: true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_indexer::ExtractionResult;

    #[test]
    fn builds_structural_hierarchy() {
        let root = PathBuf::from("/repo");
        let directories = vec!["".to_string(), "src".to_string()];
        let files = vec![(PathBuf::from("/repo/src/lib.rs"), ExtractionResult::empty())];
        let symbols = SymbolTable::new();

        let built = build_graph(&root, &directories, &files, &symbols);
        assert_eq!(built.graph.node_count(), 3); // root dir, src dir, lib.rs file
        assert!(built.graph.all_edges().any(|e| e.kind == EdgeKind::Contains));
        assert!(built.file_node_ids.contains_key(&PathBuf::from("/repo/src/lib.rs")));
        assert!(built.directory_node_ids.contains_key("src"));
    }
}
