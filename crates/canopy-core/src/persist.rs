//! Graph and page-sidecar persistence (C2/C4 file formats).
//!
//! The graph is stored as three pretty-printed, deterministically sorted
//! JSON documents under `<root>/graph/`. Page sidecars (signature +
//! generation timestamp) live alongside generated pages under `<root>/meta/`.

use crate::graph::Graph;
use crate::model::{GraphEdge, GraphNode};
use crate::page::PageSidecar;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CACHE_DIR: &str = ".canopy";
const NODES_FILE: &str = "nodes.json";
const EDGES_FILE: &str = "edges.json";
const METADATA_FILE: &str = "metadata.json";

pub fn cache_dir(root: &Path) -> PathBuf {
    root.join(CACHE_DIR)
}

pub fn graph_dir(root: &Path) -> PathBuf {
    cache_dir(root).join("graph")
}

pub fn meta_dir(root: &Path) -> PathBuf {
    cache_dir(root).join("meta")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub build_timestamp: chrono::DateTime<chrono::Utc>,
    pub node_count: usize,
    pub edge_count: usize,
}

/// Persist the graph's nodes and edges sorted for determinism, plus
/// build metadata.
pub fn save_graph(graph: &Graph, root: &Path) -> anyhow::Result<()> {
    let dir = graph_dir(root);
    std::fs::create_dir_all(&dir)?;

    let mut nodes: Vec<&GraphNode> = graph.all_nodes().collect();
    nodes.sort_by_key(|n| n.id.0);
    let nodes_json = serde_json::to_string_pretty(&nodes)?;
    std::fs::write(dir.join(NODES_FILE), nodes_json)?;

    let mut edges: Vec<&GraphEdge> = graph.all_edges().collect();
    edges.sort_by_key(|e| (e.source.0, e.target.0));
    let edges_json = serde_json::to_string_pretty(&edges)?;
    std::fs::write(dir.join(EDGES_FILE), edges_json)?;

    let metadata = GraphMetadata {
        build_timestamp: chrono::Utc::now(),
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
    };
    std::fs::write(dir.join(METADATA_FILE), serde_json::to_string_pretty(&metadata)?)?;

    tracing::debug!(path = %dir.display(), "graph persisted");
    Ok(())
}

/// Load a previously persisted graph, if one exists.
pub fn load_graph(root: &Path) -> anyhow::Result<Option<Graph>> {
    let dir = graph_dir(root);
    let nodes_path = dir.join(NODES_FILE);
    let edges_path = dir.join(EDGES_FILE);
    if !nodes_path.exists() || !edges_path.exists() {
        return Ok(None);
    }

    let nodes: Vec<GraphNode> = serde_json::from_str(&std::fs::read_to_string(&nodes_path)?)?;
    let edges: Vec<GraphEdge> = serde_json::from_str(&std::fs::read_to_string(&edges_path)?)?;

    let mut graph = Graph::new();
    // NodeId is an index into petgraph's internal storage, so nodes must be
    // re-inserted in their original id order for ids to line up again.
    let mut sorted_nodes = nodes;
    sorted_nodes.sort_by_key(|n| n.id.0);
    for node in sorted_nodes {
        graph.add_node(node);
    }
    for edge in edges {
        graph.add_edge(edge);
    }

    tracing::debug!(path = %dir.display(), "graph loaded from cache");
    Ok(Some(graph))
}

/// Read a page's sidecar, if any.
pub fn load_sidecar(root: &Path, slug: &str) -> anyhow::Result<Option<PageSidecar>> {
    let path = meta_dir(root).join(format!("{slug}.json"));
    if !path.exists() {
        return Ok(None);
    }
    let sidecar: PageSidecar = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    Ok(Some(sidecar))
}

/// Write a page's sidecar.
pub fn save_sidecar(root: &Path, slug: &str, sidecar: &PageSidecar) -> anyhow::Result<()> {
    let dir = meta_dir(root);
    std::fs::create_dir_all(&dir)?;
    std::fs::write(
        dir.join(format!("{slug}.json")),
        serde_json::to_string_pretty(sidecar)?,
    )?;
    Ok(())
}

/// Remove the entire signature/graph cache (not the live wiki).
pub fn clear_cache(root: &Path) -> std::io::Result<()> {
    let cache = cache_dir(root);
    if cache.exists() {
        std::fs::remove_dir_all(&cache)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeId, EdgeKind, EdgeSource, NodeId, NodeKind};
    use std::collections::HashMap;

    #[test]
    fn round_trips_node_set_and_edge_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = Graph::new();

        let a = graph.add_node(GraphNode {
            id: NodeId(0),
            kind: NodeKind::Function,
            name: "a".to_string(),
            qualified_name: "a".to_string(),
            file_path: PathBuf::from("a.rs"),
            line_start: None,
            line_end: None,
            language: None,
            is_container: false,
            child_count: 0,
            loc: None,
            is_entry_point: false,
            docstring: None,
            signature: None,
            parent: None,
            metadata: HashMap::new(),
        });
        let b = graph.add_node(GraphNode {
            id: NodeId(0),
            kind: NodeKind::Function,
            name: "b".to_string(),
            qualified_name: "b".to_string(),
            file_path: PathBuf::from("b.rs"),
            line_start: None,
            line_end: None,
            language: None,
            is_container: false,
            child_count: 0,
            loc: None,
            is_entry_point: false,
            docstring: None,
            signature: None,
            parent: None,
            metadata: HashMap::new(),
        });
        graph.add_edge(GraphEdge {
            id: EdgeId(0),
            source: a,
            target: b,
            kind: EdgeKind::Calls,
            edge_source: EdgeSource::Structural,
            confidence: 0.9,
            label: None,
            file_path: None,
            line: None,
            target_resolved: true,
        });

        save_graph(&graph, dir.path()).unwrap();
        let loaded = load_graph(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.node_count(), graph.node_count());
        assert_eq!(loaded.edge_count(), graph.edge_count());
    }

    #[test]
    fn load_graph_returns_none_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_graph(dir.path()).unwrap().is_none());
    }

    #[test]
    fn sidecar_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let sidecar = PageSidecar {
            source_hash: "abc".to_string(),
            generated_at: chrono::Utc::now(),
        };
        save_sidecar(dir.path(), "files--lib-rs", &sidecar).unwrap();
        let loaded = load_sidecar(dir.path(), "files--lib-rs").unwrap().unwrap();
        assert_eq!(loaded.source_hash, sidecar.source_hash);
    }
}
