//! Java language extractor using tree-sitter (C1).

use super::{ExtractionResult, LanguageExtractor};
use crate::confidence::{self, CallShape};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};
use anyhow::Result;
use canopy_core::{EdgeKind, GraphNode, Language, NodeId, NodeKind, UnresolvedEdge};
use std::collections::HashMap;
use std::path::PathBuf;
use tree_sitter::{Node, Point};

pub struct JavaExtractor {
    parser_pool: ParserPool,
}

impl JavaExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }

    fn line(point: Point) -> u32 {
        (point.row as u32) + 1
    }

    fn signature(node: Node, source: &[u8]) -> Option<String> {
        let body = node.child_by_field_name("body")?;
        let text = node.utf8_text(source).ok()?;
        let relative_end = (body.start_byte() - node.start_byte()).min(text.len());
        Some(text[..relative_end].trim().to_string())
    }

    /// `/** ... */` or `//` comment lines immediately preceding this node.
    fn doc_comment(node: Node, source: &[u8]) -> Option<String> {
        let sibling = node.prev_sibling()?;
        if sibling.kind() != "line_comment" && sibling.kind() != "block_comment" {
            return None;
        }
        let text = sibling.utf8_text(source).ok()?;
        let trimmed = text
            .trim_start_matches("/**")
            .trim_start_matches("/*")
            .trim_start_matches("//")
            .trim_end_matches("*/")
            .trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn call_shape(node: Node) -> CallShape {
        if node.child_by_field_name("object").is_some() {
            CallShape::Attribute
        } else {
            CallShape::Bare
        }
    }
}

struct Ctx<'a> {
    path: &'a PathBuf,
    source: &'a str,
    nodes: Vec<GraphNode>,
    edges: Vec<UnresolvedEdge>,
}

fn visit(node: Node, ctx: &mut Ctx, enclosing: Option<NodeId>, class_name: Option<&str>) {
    let source = ctx.source.as_bytes();

    match node.kind() {
        "class_declaration" | "interface_declaration" => {
            if let Some(name) = node.child_by_field_name("name").and_then(|n| n.utf8_text(source).ok()) {
                let kind = if node.kind() == "interface_declaration" { NodeKind::Interface } else { NodeKind::Class };
                let qualified_name = format!("{}::{}", ctx.path.display(), name);
                let id = NodeId::new(ctx.path, kind, &qualified_name);

                if let Some(superclass) = node.child_by_field_name("superclass") {
                    if let Ok(text) = superclass.utf8_text(source) {
                        ctx.edges.push(UnresolvedEdge {
                            source: id,
                            target_name: text.trim_start_matches("extends").trim().to_string(),
                            kind: EdgeKind::Inherits,
                            confidence: confidence::INHERITS,
                            file_path: ctx.path.clone(),
                            line: Some(JavaExtractor::line(node.start_position())),
                            target_resolved: false,
                        });
                    }
                }

                ctx.nodes.push(GraphNode {
                    id,
                    kind,
                    name: name.to_string(),
                    qualified_name: qualified_name.clone(),
                    file_path: ctx.path.clone(),
                    line_start: Some(JavaExtractor::line(node.start_position())),
                    line_end: Some(JavaExtractor::line(node.end_position())),
                    language: Some(Language::Java),
                    is_container: true,
                    child_count: 0,
                    loc: None,
                    is_entry_point: false,
                    docstring: JavaExtractor::doc_comment(node, source),
                    signature: None,
                    parent: None,
                    metadata: HashMap::new(),
                });

                if let Some(body) = node.child_by_field_name("body") {
                    visit(body, ctx, enclosing, Some(name));
                }
                return;
            }
        }
        "method_declaration" => {
            if let Some(name) = node.child_by_field_name("name").and_then(|n| n.utf8_text(source).ok()) {
                let qualified_name = match class_name {
                    Some(class) => format!("{}::{}::{}", ctx.path.display(), class, name),
                    None => format!("{}::{}", ctx.path.display(), name),
                };
                let id = NodeId::new(ctx.path, NodeKind::Method, &qualified_name);
                let is_main = name == "main";

                ctx.nodes.push(GraphNode {
                    id,
                    kind: NodeKind::Method,
                    name: name.to_string(),
                    qualified_name: qualified_name.clone(),
                    file_path: ctx.path.clone(),
                    line_start: Some(JavaExtractor::line(node.start_position())),
                    line_end: Some(JavaExtractor::line(node.end_position())),
                    language: Some(Language::Java),
                    is_container: false,
                    child_count: 0,
                    loc: Some(
                        JavaExtractor::line(node.end_position())
                            .saturating_sub(JavaExtractor::line(node.start_position())),
                    ),
                    is_entry_point: is_main,
                    docstring: JavaExtractor::doc_comment(node, source),
                    signature: JavaExtractor::signature(node, source),
                    parent: class_name.map(|c| format!("{}::{}", ctx.path.display(), c)),
                    metadata: HashMap::new(),
                });

                if let Some(body) = node.child_by_field_name("body") {
                    visit(body, ctx, Some(id), class_name);
                }
                return;
            }
        }
        "import_declaration" => {
            if let Some(source_id) = enclosing {
                if let Ok(text) = node.utf8_text(source) {
                    let module = text
                        .trim_start_matches("import")
                        .trim_end_matches(';')
                        .trim();
                    ctx.edges.push(UnresolvedEdge {
                        source: source_id,
                        target_name: module.to_string(),
                        kind: EdgeKind::Imports,
                        confidence: confidence::IMPORTS,
                        file_path: ctx.path.clone(),
                        line: Some(JavaExtractor::line(node.start_position())),
                        target_resolved: false,
                    });
                }
            }
        }
        "method_invocation" => {
            if let Some(source_id) = enclosing {
                if let Some(name) = node.child_by_field_name("name").and_then(|n| n.utf8_text(source).ok()) {
                    let shape = JavaExtractor::call_shape(node);
                    ctx.edges.push(UnresolvedEdge {
                        source: source_id,
                        target_name: name.to_string(),
                        kind: EdgeKind::Calls,
                        confidence: shape.confidence(),
                        file_path: ctx.path.clone(),
                        line: Some(JavaExtractor::line(node.start_position())),
                        target_resolved: false,
                    });
                }
            }
        }
        // `new` is resolved to Instantiates once the callee is known to name
        // a class, which only C2 can determine.
        "object_creation_expression" => {
            if let Some(source_id) = enclosing {
                if let Some(type_node) = node.child_by_field_name("type") {
                    if let Ok(name) = type_node.utf8_text(source) {
                        ctx.edges.push(UnresolvedEdge {
                            source: source_id,
                            target_name: name.to_string(),
                            kind: EdgeKind::Calls,
                            confidence: confidence::CALL_BARE,
                            file_path: ctx.path.clone(),
                            line: Some(JavaExtractor::line(node.start_position())),
                            target_resolved: false,
                        });
                    }
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, ctx, enclosing, class_name);
    }
}

impl LanguageExtractor for JavaExtractor {
    fn extract(&self, path: &PathBuf, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;

        let request = ParseRequest {
            file_type: FileType::Java,
            content: source_code.to_string(),
            path: path.clone(),
        };
        let parse_result = self.parser_pool.parse_blocking(request)?;
        let tree = parse_result.tree;

        let mut ctx = Ctx {
            path,
            source: source_code,
            nodes: Vec::new(),
            edges: Vec::new(),
        };
        visit(tree.root_node(), &mut ctx, None, None);

        Ok(ExtractionResult {
            nodes: ctx.nodes,
            edges: ctx.edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_class_and_method() {
        let extractor = JavaExtractor::new(crate::parser_pool::create_parser_pool());
        let code = r#"
import java.util.List;

public class Main {
    public static void main(String[] args) {
        System.out.println("hi");
    }
}
"#;
        let path = PathBuf::from("Main.java");
        let result = extractor.extract(&path, code.as_bytes()).unwrap();
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Class && n.name == "Main"));
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Method && n.name == "main" && n.is_entry_point));
        assert!(result.edges.iter().any(|e| e.kind == EdgeKind::Imports));
    }
}
