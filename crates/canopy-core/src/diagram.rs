//! Mermaid diagram generation and structural validation (C3).

use crate::graph::Graph;
use crate::model::{EdgeKind, NodeId};
use crate::page::SynthesisMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Structural (not semantic) validation: balanced brackets, balanced
/// `subgraph`/`end` pairs, and a recognized diagram-type header.
pub fn validate(text: &str) -> ValidationResult {
    let mut errors = Vec::new();

    let first_line = text.lines().next().unwrap_or("").trim();
    const HEADERS: &[&str] = &["graph ", "flowchart ", "classDiagram", "sequenceDiagram"];
    if !HEADERS.iter().any(|h| first_line.starts_with(h)) {
        errors.push(format!("unrecognized diagram header: '{first_line}'"));
    }

    if !brackets_balanced(text) {
        errors.push("unbalanced brackets".to_string());
    }

    let subgraph_count = text.matches("subgraph").count();
    let end_count = text
        .lines()
        .filter(|l| l.trim() == "end")
        .count();
    if subgraph_count != end_count {
        errors.push(format!(
            "subgraph/end mismatch: {subgraph_count} subgraph vs {end_count} end"
        ));
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}

fn brackets_balanced(text: &str) -> bool {
    let mut stack = Vec::new();
    for c in text.chars() {
        match c {
            '(' | '[' | '{' => stack.push(c),
            ')' => {
                if stack.pop() != Some('(') {
                    return false;
                }
            }
            ']' => {
                if stack.pop() != Some('[') {
                    return false;
                }
            }
            '}' => {
                if stack.pop() != Some('{') {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}

/// Sanitize a user-facing label: strip newlines, swap bracket characters
/// mermaid would otherwise choke on, and cap length.
pub fn sanitize_label(label: &str) -> String {
    let collapsed = label.replace(['\n', '\r'], " ").replace(['[', ']', '{', '}'], "(").replace('"', "'");
    if collapsed.chars().count() > 40 {
        let truncated: String = collapsed.chars().take(37).collect();
        format!("{truncated}...")
    } else {
        collapsed
    }
}

/// Sanitize an identifier into a valid mermaid node id.
pub fn sanitize_node_id(raw: &str) -> String {
    let mut out = String::new();
    let mut last_was_underscore = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }
    let trimmed = out.trim_matches('_').to_string();
    if trimmed.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        format!("n_{trimmed}")
    } else {
        trimmed
    }
}

/// One `subgraph` per layer (up to 5 components each), edges between
/// layers from the synthesis map's dependency graph.
pub fn layer_diagram(synthesis: &SynthesisMap) -> String {
    let mut lines = vec!["graph TD".to_string()];

    let mut layer_names: Vec<&String> = synthesis.layers.keys().collect();
    layer_names.sort();

    for layer_name in &layer_names {
        let id = sanitize_node_id(layer_name);
        lines.push(format!("    subgraph {id}[\"{}\"]", sanitize_label(layer_name)));
        if let Some(summary) = synthesis.layers.get(*layer_name) {
            for component in summary.directories.iter().chain(summary.files.iter()).take(5) {
                let comp_id = format!("{id}_{}", sanitize_node_id(component));
                lines.push(format!("        {comp_id}[\"{}\"]", sanitize_label(component)));
            }
        }
        lines.push("    end".to_string());
    }

    let mut dep_names: Vec<&String> = synthesis.dependency_graph.keys().collect();
    dep_names.sort();
    for from in dep_names {
        if let Some(targets) = synthesis.dependency_graph.get(from) {
            let mut sorted_targets = targets.clone();
            sorted_targets.sort();
            for to in sorted_targets {
                lines.push(format!(
                    "    {} --> {}",
                    sanitize_node_id(from),
                    sanitize_node_id(&to)
                ));
            }
        }
    }

    lines.join("\n")
}

/// File dependency diagram. Nodes sorted by degree descending, truncated to
/// `max_nodes`.
pub fn file_dependency_diagram(graph: &Graph, max_nodes: usize) -> String {
    let mut degrees: Vec<(NodeId, usize)> = graph
        .all_nodes()
        .map(|n| {
            let degree = graph.edges_from(n.id).count() + graph.edges_to(n.id).count();
            (n.id, degree)
        })
        .collect();
    degrees.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0 .0.cmp(&b.0 .0)));
    degrees.truncate(max_nodes);

    let shown: std::collections::HashSet<NodeId> = degrees.iter().map(|(id, _)| *id).collect();

    let mut lines = vec!["graph LR".to_string()];
    for (id, _) in &degrees {
        if let Some(node) = graph.node(*id) {
            lines.push(format!(
                "    {}[\"{}\"]",
                sanitize_node_id(&node.qualified_name),
                sanitize_label(&node.name)
            ));
        }
    }
    for edge in graph.all_edges() {
        if edge.kind == EdgeKind::Imports && shown.contains(&edge.source) && shown.contains(&edge.target) {
            if let (Some(source), Some(target)) = (graph.node(edge.source), graph.node(edge.target)) {
                lines.push(format!(
                    "    {} --> {}",
                    sanitize_node_id(&source.qualified_name),
                    sanitize_node_id(&target.qualified_name)
                ));
            }
        }
    }

    lines.join("\n")
}

/// A neighborhood-focused dependency diagram centered on a single node,
/// used by the file-page generator.
pub fn focused_dependency_diagram(graph: &Graph, center: NodeId, max_nodes: usize) -> String {
    let (neighborhood, edges) = graph.neighborhood(center, 1, 0.0);
    let mut nodes: Vec<NodeId> = neighborhood.into_iter().collect();
    nodes.sort_by_key(|id| id.0);
    nodes.truncate(max_nodes);
    let shown: std::collections::HashSet<NodeId> = nodes.iter().copied().collect();

    let mut lines = vec!["graph LR".to_string()];
    for id in &nodes {
        if let Some(node) = graph.node(*id) {
            lines.push(format!(
                "    {}[\"{}\"]",
                sanitize_node_id(&node.qualified_name),
                sanitize_label(&node.name)
            ));
        }
    }
    for edge in edges {
        if shown.contains(&edge.source) && shown.contains(&edge.target) {
            if let (Some(source), Some(target)) = (graph.node(edge.source), graph.node(edge.target)) {
                lines.push(format!(
                    "    {} --> {}",
                    sanitize_node_id(&source.qualified_name),
                    sanitize_node_id(&target.qualified_name)
                ));
            }
        }
    }

    lines.join("\n")
}

/// One `class` block per class node, up to 5 methods.
pub fn class_diagram(graph: &Graph) -> String {
    use crate::model::NodeKind;

    let mut lines = vec!["classDiagram".to_string()];
    let mut classes: Vec<_> = graph
        .all_nodes()
        .filter(|n| n.kind == NodeKind::Class || n.kind == NodeKind::Struct)
        .collect();
    classes.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));

    for class in classes {
        let class_id = sanitize_node_id(&class.qualified_name);
        lines.push(format!("    class {class_id} {{"));
        let methods: Vec<_> = graph
            .all_nodes()
            .filter(|n| n.kind == NodeKind::Method && n.parent.as_deref() == Some(class.qualified_name.as_str()))
            .take(5)
            .collect();
        for method in methods {
            lines.push(format!("        +{}", sanitize_label(&method_signature(method))));
        }
        lines.push("    }".to_string());
    }

    lines.join("\n")
}

/// `name(args)`, with `args` lifted from the node's stored signature when
/// present; falls back to an empty arg list.
fn method_signature(method: &crate::model::GraphNode) -> String {
    let args = method
        .signature
        .as_deref()
        .and_then(|sig| {
            let open = sig.find('(')?;
            let close = sig[open..].find(')').map(|i| open + i)?;
            Some(sig[open + 1..close].trim().to_string())
        })
        .unwrap_or_default();
    format!("{}({args})", method.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_diagram_passes() {
        let text = "graph TD\n    subgraph a[\"A\"]\n        n1[\"x\"]\n    end\n    n1 --> n1";
        let result = validate(text);
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn unbalanced_brackets_rejected() {
        let text = "graph TD\n    n1[\"x\"";
        let result = validate(text);
        assert!(!result.valid);
    }

    #[test]
    fn mismatched_subgraph_end_rejected() {
        let text = "graph TD\n    subgraph a[\"A\"]\n        n1[\"x\"]";
        let result = validate(text);
        assert!(!result.valid);
    }

    #[test]
    fn missing_header_rejected() {
        let result = validate("n1 --> n2");
        assert!(!result.valid);
    }

    #[test]
    fn sanitize_node_id_avoids_leading_digit() {
        assert_eq!(sanitize_node_id("3files"), "n_3files");
    }

    #[test]
    fn sanitize_label_truncates_long_labels() {
        let long = "x".repeat(60);
        let sanitized = sanitize_label(&long);
        assert!(sanitized.ends_with("..."));
        assert!(sanitized.chars().count() <= 40);
    }
}
