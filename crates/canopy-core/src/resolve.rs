//! Reference resolution (C2): turns per-file `UnresolvedEdge`s into graph
//! edges, using the symbol table to match target names against known
//! symbols and adjusting confidence for ambiguous or unresolved matches.

use crate::model::{EdgeId, EdgeKind, EdgeSource, GraphEdge, GraphNode, NodeId, NodeKind, UnresolvedEdge};
use crate::symbols::SymbolTable;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::PathBuf;

/// Confidence is scaled by this factor when a reference can't be matched
/// against any known symbol; the edge still lands on a synthetic external
/// node rather than being dropped.
const UNRESOLVED_PENALTY: f32 = 0.3;

/// The node kinds a resolved `Calls` target upgrades to `Instantiates`.
fn is_constructible(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Class | NodeKind::Struct)
}

/// Resolve one unresolved reference into zero or more graph edges, plus any
/// synthetic external node it had to materialize.
///
/// - Exact match (qualified name known, or exactly one simple-name
///   candidate): one edge at the original confidence, `target_resolved: true`.
/// - Ambiguous (more than one simple-name candidate): one edge per
///   candidate, each at half the original confidence, `target_resolved: true`.
/// - Unresolved (no candidates): one edge at `confidence * 0.3` onto a
///   synthetic external node, `target_resolved: false`.
pub fn resolve_reference(edge: &UnresolvedEdge, symbols: &SymbolTable) -> (Vec<GraphEdge>, Option<GraphNode>) {
    if let Some(target) = symbols.lookup_qualified(&edge.target_name) {
        return (vec![make_edge(edge, target, edge.confidence, symbols, true)], None);
    }

    let candidates = symbols.lookup_by_name(&edge.target_name);
    match candidates.len() {
        0 => {
            let external = external_node(&edge.target_name);
            let graph_edge = make_edge(edge, external.id, edge.confidence * UNRESOLVED_PENALTY, symbols, false);
            (vec![graph_edge], Some(external))
        }
        1 => (vec![make_edge(edge, candidates[0], edge.confidence, symbols, true)], None),
        _ => (
            candidates
                .into_iter()
                .map(|target| make_edge(edge, target, edge.confidence * 0.5, symbols, true))
                .collect(),
            None,
        ),
    }
}

fn make_edge(
    edge: &UnresolvedEdge,
    target: NodeId,
    confidence: f32,
    symbols: &SymbolTable,
    target_resolved: bool,
) -> GraphEdge {
    let mut hasher = DefaultHasher::new();
    edge.source.hash(&mut hasher);
    target.hash(&mut hasher);
    edge.kind.hash(&mut hasher);
    edge.line.hash(&mut hasher);

    let kind = if edge.kind == EdgeKind::Calls
        && target_resolved
        && symbols.kind_of(target).is_some_and(is_constructible)
    {
        EdgeKind::Instantiates
    } else {
        edge.kind
    };

    GraphEdge {
        id: EdgeId(hasher.finish()),
        source: edge.source,
        target,
        kind,
        edge_source: EdgeSource::Structural,
        confidence,
        label: None,
        file_path: Some(edge.file_path.clone()),
        line: edge.line,
        target_resolved,
    }
}

/// Deterministic id for a synthetic node standing in for a name that
/// resolved to nothing in the parsed set — an external dependency.
fn external_node_id(name: &str) -> NodeId {
    NodeId::new(&PathBuf::from("<external>"), NodeKind::External, name)
}

fn external_node(name: &str) -> GraphNode {
    let qualified_name = format!("<external>::{name}");
    GraphNode {
        id: external_node_id(name),
        kind: NodeKind::External,
        name: name.to_string(),
        qualified_name,
        file_path: PathBuf::from("<external>"),
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
    }
}

/// The result of resolving a full batch of unresolved edges: the edges
/// themselves, plus the deduplicated set of synthetic external nodes any of
/// them had to materialize.
#[derive(Debug, Default)]
pub struct ResolvedReferences {
    pub edges: Vec<GraphEdge>,
    pub externals: Vec<GraphNode>,
}

/// Resolve a full batch of unresolved edges against a symbol table.
pub fn resolve_all(edges: &[UnresolvedEdge], symbols: &SymbolTable) -> ResolvedReferences {
    let mut out = ResolvedReferences::default();
    let mut seen_externals = std::collections::HashSet::new();

    for edge in edges {
        let (resolved, external) = resolve_reference(edge, symbols);
        out.edges.extend(resolved);
        if let Some(node) = external {
            if seen_externals.insert(node.id) {
                out.externals.push(node);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeKind, NodeId, NodeKind};
    use std::path::PathBuf;

    fn edge(target_name: &str, confidence: f32) -> UnresolvedEdge {
        UnresolvedEdge {
            source: NodeId::new(&PathBuf::from("a.rs"), NodeKind::Function, "a::caller"),
            target_name: target_name.to_string(),
            kind: EdgeKind::Calls,
            confidence,
            file_path: PathBuf::from("a.rs"),
            line: Some(3),
            target_resolved: false,
        }
    }

    #[test]
    fn exact_qualified_match_keeps_confidence() {
        let symbols = SymbolTable::new();
        let target = NodeId::new(&PathBuf::from("b.rs"), NodeKind::Function, "b::callee");
        symbols.insert("b::callee", "callee", target, "b.rs", NodeKind::Function);

        let (resolved, external) = resolve_reference(&edge("b::callee", 0.9), &symbols);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].confidence, 0.9);
        assert_eq!(resolved[0].target, target);
        assert!(resolved[0].target_resolved);
        assert!(external.is_none());
    }

    #[test]
    fn ambiguous_simple_name_halves_confidence_per_candidate() {
        let symbols = SymbolTable::new();
        let t1 = NodeId::new(&PathBuf::from("b.rs"), NodeKind::Function, "b::callee");
        let t2 = NodeId::new(&PathBuf::from("c.rs"), NodeKind::Function, "c::callee");
        symbols.insert("b::callee", "callee", t1, "b.rs", NodeKind::Function);
        symbols.insert("c::callee", "callee", t2, "c.rs", NodeKind::Function);

        let (resolved, external) = resolve_reference(&edge("callee", 0.9), &symbols);
        assert_eq!(resolved.len(), 2);
        for r in &resolved {
            assert!((r.confidence - 0.45).abs() < f32::EPSILON);
            assert!(r.target_resolved);
        }
        assert!(external.is_none());
    }

    #[test]
    fn unresolved_reference_materializes_external_node() {
        let symbols = SymbolTable::new();
        let (resolved, external) = resolve_reference(&edge("nowhere", 0.9), &symbols);
        assert_eq!(resolved.len(), 1);
        assert!(!resolved[0].target_resolved);
        assert!((resolved[0].confidence - 0.27).abs() < 1e-6);
        let external = external.expect("unresolved reference should materialize an external node");
        assert_eq!(external.kind, NodeKind::External);
        assert_eq!(external.name, "nowhere");
        assert_eq!(resolved[0].target, external.id);
    }

    #[test]
    fn calls_upgrades_to_instantiates_when_target_is_a_class() {
        let symbols = SymbolTable::new();
        let target = NodeId::new(&PathBuf::from("b.rs"), NodeKind::Class, "b::Widget");
        symbols.insert("b::Widget", "Widget", target, "b.rs", NodeKind::Class);

        let (resolved, _) = resolve_reference(&edge("Widget", 0.9), &symbols);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].kind, EdgeKind::Instantiates);
    }

    #[test]
    fn resolve_all_deduplicates_external_nodes() {
        let symbols = SymbolTable::new();
        let edges = vec![edge("nowhere", 0.9), edge("nowhere", 0.8)];
        let resolved = resolve_all(&edges, &symbols);
        assert_eq!(resolved.edges.len(), 2);
        assert_eq!(resolved.externals.len(), 1);
    }
}
