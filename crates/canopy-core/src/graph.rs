//! Graph wrapper using petgraph::StableDiGraph with custom NodeId/EdgeId

use crate::model::*;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashSet, VecDeque};

/// The code graph — a directed multigraph with stable node/edge indices.
pub struct Graph {
    inner: StableDiGraph<GraphNode, GraphEdge>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            inner: StableDiGraph::new(),
        }
    }

    /// Add a node to graph. Returns assigned NodeId.
    pub fn add_node(&mut self, node: GraphNode) -> NodeId {
        let idx = self.inner.add_node(node);
        NodeId(idx.index() as u64)
    }

    /// Add an edge to graph. Returns assigned EdgeId.
    pub fn add_edge(&mut self, edge: GraphEdge) -> EdgeId {
        let source = NodeIndex::new(edge.source.0 as usize);
        let target = NodeIndex::new(edge.target.0 as usize);
        let idx = self.inner.add_edge(source, target, edge);
        EdgeId(idx.index() as u64)
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        let idx = NodeIndex::new(id.0 as usize);
        self.inner.node_weight(idx)
    }

    /// Get a mutable node by ID.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        let idx = NodeIndex::new(id.0 as usize);
        self.inner.node_weight_mut(idx)
    }

    /// Get an edge by ID.
    pub fn edge(&self, id: EdgeId) -> Option<&GraphEdge> {
        let idx = EdgeIndex::new(id.0 as usize);
        self.inner.edge_weight(idx)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all nodes.
    pub fn all_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all edges.
    pub fn all_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Get all outgoing edges from a node.
    pub fn edges_from(&self, source: NodeId) -> impl Iterator<Item = &GraphEdge> {
        let idx = NodeIndex::new(source.0 as usize);
        self.inner
            .edges_directed(idx, Direction::Outgoing)
            .filter_map(move |edge_ref| self.inner.edge_weight(edge_ref.id()))
    }

    /// Get all incoming edges to a node.
    pub fn edges_to(&self, target: NodeId) -> impl Iterator<Item = &GraphEdge> {
        let idx = NodeIndex::new(target.0 as usize);
        self.inner
            .edges_directed(idx, Direction::Incoming)
            .filter_map(move |edge_ref| self.inner.edge_weight(edge_ref.id()))
    }

    /// Check if an edge exists between two nodes of a specific kind.
    pub fn has_edge_between(&self, source: NodeId, target: NodeId, kind: EdgeKind) -> bool {
        self.edges_from(source)
            .any(|e| e.target == target && e.kind == kind)
    }

    /// Find a node by name (first match).
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.inner
            .node_indices()
            .find(|&idx| {
                self.inner
                    .node_weight(idx)
                    .map_or(false, |n| n.name == name)
            })
            .map(|idx| NodeId(idx.index() as u64))
    }

    /// Find a node by fully qualified name.
    pub fn find_node_by_qualified(&self, qualified_name: &str) -> Option<NodeId> {
        self.inner
            .node_indices()
            .find(|&idx| {
                self.inner
                    .node_weight(idx)
                    .map_or(false, |n| n.qualified_name == qualified_name)
            })
            .map(|idx| NodeId(idx.index() as u64))
    }

    /// Get all nodes of a specific kind.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.inner
            .node_indices()
            .filter(move |&idx| {
                self.inner
                    .node_weight(idx)
                    .map_or(false, |n| n.kind == kind)
            })
            .map(|idx| NodeId(idx.index() as u64))
    }

    /// Remove a node and all its edges.
    pub fn remove_node(&mut self, id: NodeId) -> Option<GraphNode> {
        let idx = NodeIndex::new(id.0 as usize);
        self.inner.remove_node(idx)
    }

    /// Remove an edge by ID.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<GraphEdge> {
        let idx = EdgeIndex::new(id.0 as usize);
        self.inner.remove_edge(idx)
    }

    /// Get all nodes that are ancestors of a given node (following Contains edges).
    pub fn ancestors(&self, node: NodeId) -> HashSet<NodeId> {
        let mut ancestors = HashSet::new();
        let mut to_visit = vec![node];

        while let Some(current) = to_visit.pop() {
            let current_idx = NodeIndex::new(current.0 as usize);
            for edge_ref in self.inner.edges_directed(current_idx, Direction::Incoming) {
                if let Some(edge) = self.inner.edge_weight(edge_ref.id()) {
                    if edge.kind == EdgeKind::Contains && !ancestors.contains(&edge.source) {
                        ancestors.insert(edge.source);
                        to_visit.push(edge.source);
                    }
                }
            }
        }

        ancestors
    }

    /// Nodes reachable from `id` via a single outgoing `Calls` edge of at
    /// least `min_confidence`.
    pub fn calls(&self, id: NodeId, min_confidence: f32) -> Vec<NodeId> {
        self.edges_from(id)
            .filter(|e| e.kind == EdgeKind::Calls && e.confidence >= min_confidence)
            .map(|e| e.target)
            .collect()
    }

    /// Nodes with an outgoing `Calls` edge of at least `min_confidence`
    /// targeting `id`.
    pub fn callers(&self, id: NodeId, min_confidence: f32) -> Vec<NodeId> {
        self.edges_to(id)
            .filter(|e| e.kind == EdgeKind::Calls && e.confidence >= min_confidence)
            .map(|e| e.source)
            .collect()
    }

    /// Breadth-first, undirected neighborhood around `id` within `hops`,
    /// considering only edges with confidence at least `min_confidence`.
    /// Returns the nodes (including `id`) and the edges strictly between them.
    pub fn neighborhood(
        &self,
        id: NodeId,
        hops: u32,
        min_confidence: f32,
    ) -> (HashSet<NodeId>, Vec<&GraphEdge>) {
        let mut visited = HashSet::new();
        visited.insert(id);
        let mut frontier = VecDeque::new();
        frontier.push_back((id, 0u32));

        while let Some((current, depth)) = frontier.pop_front() {
            if depth >= hops {
                continue;
            }
            let idx = NodeIndex::new(current.0 as usize);
            for edge_ref in self
                .inner
                .edges_directed(idx, Direction::Outgoing)
                .chain(self.inner.edges_directed(idx, Direction::Incoming))
            {
                if let Some(edge) = self.inner.edge_weight(edge_ref.id()) {
                    if edge.confidence < min_confidence {
                        continue;
                    }
                    let other = if edge.source == current {
                        edge.target
                    } else {
                        edge.source
                    };
                    if visited.insert(other) {
                        frontier.push_back((other, depth + 1));
                    }
                }
            }
        }

        let edges = self
            .all_edges()
            .filter(|e| {
                e.confidence >= min_confidence
                    && visited.contains(&e.source)
                    && visited.contains(&e.target)
            })
            .collect();

        (visited, edges)
    }

    /// Up to `max_paths` simple directed paths from `from` to `to` over
    /// edges with confidence at least `min_confidence`, shortest first,
    /// capped at 10 hops.
    pub fn trace_flow(
        &self,
        from: NodeId,
        to: NodeId,
        min_confidence: f32,
        max_paths: usize,
    ) -> Vec<Vec<NodeId>> {
        const MAX_HOPS: usize = 10;
        let mut paths = Vec::new();
        let mut stack = vec![(from, vec![from])];

        while let Some((current, path)) = stack.pop() {
            if path.len() - 1 > MAX_HOPS {
                continue;
            }
            if current == to && path.len() > 1 {
                paths.push(path);
                continue;
            }
            let idx = NodeIndex::new(current.0 as usize);
            for edge_ref in self.inner.edges_directed(idx, Direction::Outgoing) {
                if let Some(edge) = self.inner.edge_weight(edge_ref.id()) {
                    if edge.confidence < min_confidence || path.contains(&edge.target) {
                        continue;
                    }
                    let mut next_path = path.clone();
                    next_path.push(edge.target);
                    stack.push((edge.target, next_path));
                }
            }
        }

        paths.sort_by_key(|p| p.len());
        paths.truncate(max_paths);
        paths
    }

    /// Nodes with at least one outgoing `Calls` edge and no incoming one —
    /// candidate program/handler entry points by call-graph shape alone.
    pub fn entry_points(&self) -> Vec<NodeId> {
        self.inner
            .node_indices()
            .map(|idx| NodeId(idx.index() as u64))
            .filter(|&id| {
                let has_outgoing = self.edges_from(id).any(|e| e.kind == EdgeKind::Calls);
                let has_incoming = self.edges_to(id).any(|e| e.kind == EdgeKind::Calls);
                has_outgoing && !has_incoming
            })
            .collect()
    }

    /// Nodes with no outgoing `Calls` edge.
    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.inner
            .node_indices()
            .map(|idx| NodeId(idx.index() as u64))
            .filter(|&id| !self.edges_from(id).any(|e| e.kind == EdgeKind::Calls))
            .collect()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
