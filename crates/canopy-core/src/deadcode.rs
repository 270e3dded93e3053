//! Dead-code analysis (C3): flags nodes with no detected callers, filtered
//! to avoid the common false positives of test discovery, reflection, and
//! dynamic dispatch.

use crate::graph::Graph;
use crate::model::{GraphNode, NodeKind};
use std::collections::HashSet;

/// Decides whether a file path is a test file, for both dead-code
/// exclusion and the entry-point immunity check. A trait so the
/// convention can vary per project without touching the analyzer.
pub trait TestFileHeuristic: Send + Sync {
    fn is_test_file(&self, path: &str) -> bool;
}

/// Path-prefix/naming-convention default: anything under a `tests/` or
/// `test/` directory, or whose file stem starts/ends with `test`.
pub struct DefaultTestFileHeuristic;

impl TestFileHeuristic for DefaultTestFileHeuristic {
    fn is_test_file(&self, path: &str) -> bool {
        let normalized = path.replace('\\', "/");
        if normalized
            .split('/')
            .any(|segment| segment == "tests" || segment == "test" || segment == "__tests__")
        {
            return true;
        }
        let stem = normalized
            .rsplit('/')
            .next()
            .unwrap_or(&normalized)
            .split('.')
            .next()
            .unwrap_or("");
        stem.starts_with("test_") || stem.ends_with("_test") || stem.ends_with(".test") || stem.ends_with(".spec")
    }
}

fn default_excluded_names() -> HashSet<&'static str> {
    [
        "__init__",
        "main",
        "new",
        "default",
        "from",
        "into",
        "test",
        "setup",
        "teardown",
    ]
    .into_iter()
    .collect()
}

#[derive(Debug, Clone)]
pub struct ReviewCandidate {
    pub node: GraphNode,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewCandidates {
    pub functions: Vec<ReviewCandidate>,
    pub classes: Vec<ReviewCandidate>,
    pub variables: Vec<ReviewCandidate>,
}

/// A node is a dead-code candidate when it has zero incoming edges of any
/// kind, its name is not in the excluded set, its file is not a test file,
/// and it is not flagged as an entry point.
pub fn find_review_candidates(graph: &Graph, test_heuristic: &dyn TestFileHeuristic) -> ReviewCandidates {
    let excluded = default_excluded_names();
    let mut candidates = ReviewCandidates::default();

    for node in graph.all_nodes() {
        if node.is_entry_point {
            continue;
        }
        if excluded.contains(node.name.as_str()) {
            continue;
        }
        if test_heuristic.is_test_file(&node.file_path.to_string_lossy()) {
            continue;
        }
        if graph.edges_to(node.id).next().is_some() {
            continue;
        }

        let candidate = ReviewCandidate { node: node.clone() };
        match node.kind {
            NodeKind::Function | NodeKind::Method => candidates.functions.push(candidate),
            NodeKind::Class | NodeKind::Struct | NodeKind::Enum | NodeKind::Interface => {
                candidates.classes.push(candidate)
            }
            NodeKind::Variable | NodeKind::Constant => candidates.variables.push(candidate),
            _ => {}
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeId, EdgeKind, EdgeSource, GraphEdge, NodeId};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn node(name: &str, kind: NodeKind, file_path: &str, is_entry_point: bool) -> GraphNode {
        GraphNode {
            id: NodeId::new(&PathBuf::from(file_path), kind, name),
            kind,
            name: name.to_string(),
            qualified_name: name.to_string(),
            file_path: PathBuf::from(file_path),
            line_start: None,
            line_end: None,
            language: None,
            is_container: false,
            child_count: 0,
            loc: None,
            is_entry_point,
            docstring: None,
            signature: None,
            parent: None,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn entry_points_are_never_flagged() {
        let mut graph = Graph::new();
        graph.add_node(node("handler", NodeKind::Function, "src/routes.rs", true));
        let candidates = find_review_candidates(&graph, &DefaultTestFileHeuristic);
        assert!(candidates.functions.is_empty());
    }

    #[test]
    fn test_files_are_excluded() {
        let mut graph = Graph::new();
        graph.add_node(node("helper", NodeKind::Function, "tests/common.rs", false));
        let candidates = find_review_candidates(&graph, &DefaultTestFileHeuristic);
        assert!(candidates.functions.is_empty());
    }

    #[test]
    fn node_with_no_callers_is_flagged() {
        let mut graph = Graph::new();
        graph.add_node(node("orphan", NodeKind::Function, "src/lib.rs", false));
        let candidates = find_review_candidates(&graph, &DefaultTestFileHeuristic);
        assert_eq!(candidates.functions.len(), 1);
    }

    #[test]
    fn node_with_any_caller_is_not_flagged() {
        let mut graph = Graph::new();
        let caller = graph.add_node(node("caller", NodeKind::Function, "src/lib.rs", false));
        let callee = graph.add_node(node("callee", NodeKind::Function, "src/lib.rs", false));
        graph.add_edge(GraphEdge {
            id: EdgeId(1),
            source: caller,
            target: callee,
            kind: EdgeKind::Calls,
            edge_source: EdgeSource::Structural,
            confidence: 0.9,
            label: None,
            file_path: None,
            line: None,
            target_resolved: true,
        });
        let candidates = find_review_candidates(&graph, &DefaultTestFileHeuristic);
        assert!(candidates.functions.is_empty());
    }
}
