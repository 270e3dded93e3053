//! Go language extractor using tree-sitter (C1).

use super::{ExtractionResult, LanguageExtractor};
use crate::confidence::{self, CallShape};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};
use anyhow::Result;
use canopy_core::{EdgeKind, GraphNode, Language, NodeId, NodeKind, UnresolvedEdge};
use std::collections::HashMap;
use std::path::PathBuf;
use tree_sitter::{Node, Point};

pub struct GoExtractor {
    parser_pool: ParserPool,
}

impl GoExtractor {
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

    /// `//` doc comment lines immediately preceding this node.
    fn doc_comment(node: Node, source: &[u8]) -> Option<String> {
        let mut lines = Vec::new();
        let mut sibling = node.prev_sibling();
        while let Some(s) = sibling {
            if s.kind() != "comment" {
                break;
            }
            let Ok(text) = s.utf8_text(source) else { break };
            lines.push(text.trim_start_matches("//").trim().to_string());
            sibling = s.prev_sibling();
        }
        if lines.is_empty() {
            return None;
        }
        lines.reverse();
        Some(lines.join("\n"))
    }

    /// The receiver type name for a method declaration, e.g. `User` in
    /// `func (u *User) Greet() string`.
    fn receiver_type(node: Node, source: &[u8]) -> Option<String> {
        let receiver = node.child_by_field_name("receiver")?;
        let mut cursor = receiver.walk();
        for param in receiver.named_children(&mut cursor) {
            if let Some(type_node) = param.child_by_field_name("type") {
                let text = type_node.utf8_text(source).ok()?;
                return Some(text.trim_start_matches('*').to_string());
            }
        }
        None
    }

    fn call_shape(func: Node) -> CallShape {
        match func.kind() {
            "identifier" => CallShape::Bare,
            "selector_expression" => CallShape::Attribute,
            _ => CallShape::Dynamic,
        }
    }
}

struct Ctx<'a> {
    path: &'a PathBuf,
    source: &'a str,
    nodes: Vec<GraphNode>,
    edges: Vec<UnresolvedEdge>,
}

fn visit(node: Node, ctx: &mut Ctx, enclosing: Option<NodeId>) {
    let source = ctx.source.as_bytes();

    match node.kind() {
        "function_declaration" | "method_declaration" => {
            if let Some(name) = node.child_by_field_name("name").and_then(|n| n.utf8_text(source).ok()) {
                let qualified_name = format!("{}::{}", ctx.path.display(), name);
                let kind = if node.kind() == "method_declaration" { NodeKind::Method } else { NodeKind::Function };
                let id = NodeId::new(ctx.path, kind, &qualified_name);

                ctx.nodes.push(GraphNode {
                    id,
                    kind,
                    name: name.to_string(),
                    qualified_name: qualified_name.clone(),
                    file_path: ctx.path.clone(),
                    line_start: Some(GoExtractor::line(node.start_position())),
                    line_end: Some(GoExtractor::line(node.end_position())),
                    language: Some(Language::Go),
                    is_container: false,
                    child_count: 0,
                    loc: Some(
                        GoExtractor::line(node.end_position()).saturating_sub(GoExtractor::line(node.start_position())),
                    ),
                    is_entry_point: name == "main",
                    docstring: GoExtractor::doc_comment(node, source),
                    signature: GoExtractor::signature(node, source),
                    parent: GoExtractor::receiver_type(node, source)
                        .map(|t| format!("{}::{}", ctx.path.display(), t)),
                    metadata: HashMap::new(),
                });

                if let Some(body) = node.child_by_field_name("body") {
                    visit(body, ctx, Some(id));
                }
                return;
            }
        }
        "type_spec" => {
            if let Some(name) = node.child_by_field_name("name").and_then(|n| n.utf8_text(source).ok()) {
                if let Some(type_node) = node.child_by_field_name("type") {
                    let kind = if type_node.kind() == "struct_type" { NodeKind::Struct } else { NodeKind::TypeAlias };
                    let qualified_name = format!("{}::{}", ctx.path.display(), name);
                    ctx.nodes.push(GraphNode {
                        id: NodeId::new(ctx.path, kind, &qualified_name),
                        kind,
                        name: name.to_string(),
                        qualified_name,
                        file_path: ctx.path.clone(),
                        line_start: Some(GoExtractor::line(node.start_position())),
                        line_end: Some(GoExtractor::line(node.end_position())),
                        language: Some(Language::Go),
                        is_container: kind == NodeKind::Struct,
                        child_count: 0,
                        loc: None,
                        is_entry_point: false,
                        docstring: GoExtractor::doc_comment(node, source),
                        signature: None,
                        parent: None,
                        metadata: HashMap::new(),
                    });
                }
            }
        }
        "import_spec" => {
            if let Some(source_id) = enclosing {
                if let Some(path_node) = node.child_by_field_name("path") {
                    if let Ok(text) = path_node.utf8_text(source) {
                        ctx.edges.push(UnresolvedEdge {
                            source: source_id,
                            target_name: text.trim_matches('"').to_string(),
                            kind: EdgeKind::Imports,
                            confidence: confidence::IMPORTS,
                            file_path: ctx.path.clone(),
                            line: Some(GoExtractor::line(node.start_position())),
                            target_resolved: false,
                        });
                    }
                }
            }
        }
        "call_expression" => {
            if let Some(source_id) = enclosing {
                if let Some(func) = node.child_by_field_name("function") {
                    if let Ok(name) = func.utf8_text(source) {
                        let simple = name.rsplit('.').next().unwrap_or(name);
                        let shape = GoExtractor::call_shape(func);
                        ctx.edges.push(UnresolvedEdge {
                            source: source_id,
                            target_name: simple.to_string(),
                            kind: EdgeKind::Calls,
                            confidence: shape.confidence(),
                            file_path: ctx.path.clone(),
                            line: Some(GoExtractor::line(node.start_position())),
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
        visit(child, ctx, enclosing);
    }
}

impl LanguageExtractor for GoExtractor {
    fn extract(&self, path: &PathBuf, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;

        let request = ParseRequest {
            file_type: FileType::Go,
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
        visit(tree.root_node(), &mut ctx, None);

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
    fn extracts_funcs_and_struct() {
        let extractor = GoExtractor::new(crate::parser_pool::create_parser_pool());
        let code = r#"
package main

import "fmt"

type User struct {
    Name string
}

func main() {
    fmt.Println("hi")
}
"#;
        let path = PathBuf::from("main.go");
        let result = extractor.extract(&path, code.as_bytes()).unwrap();
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Function && n.name == "main" && n.is_entry_point));
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Struct && n.name == "User"));
        assert!(result.edges.iter().any(|e| e.kind == EdgeKind::Imports && e.target_name == "fmt"));
    }
}
