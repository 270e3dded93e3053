//! Rust language extractor using tree-sitter (C1).

use super::{ExtractionResult, LanguageExtractor};
use crate::confidence::{self, CallShape};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};
use anyhow::Result;
use canopy_core::{EdgeKind, GraphNode, Language, NodeId, NodeKind, UnresolvedEdge};
use std::collections::HashMap;
use std::path::PathBuf;
use tree_sitter::{Node, Point};

pub struct RustExtractor {
    parser_pool: ParserPool,
}

impl RustExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }

    fn line(point: Point) -> u32 {
        (point.row as u32) + 1
    }

    /// Simplified signature: declaration text up to the body block.
    fn signature(node: Node, source: &[u8]) -> Option<String> {
        let body = node.child_by_field_name("body")?;
        let text = node.utf8_text(source).ok()?;
        let relative_end = (body.start_byte() - node.start_byte()).min(text.len());
        Some(text[..relative_end].trim().to_string())
    }

    /// `///` doc comment lines immediately preceding this node.
    fn doc_comment(node: Node, source: &[u8]) -> Option<String> {
        let mut lines = Vec::new();
        let mut sibling = node.prev_sibling();
        while let Some(s) = sibling {
            if s.kind() != "line_comment" {
                break;
            }
            let Ok(text) = s.utf8_text(source) else { break };
            if !text.starts_with("///") {
                break;
            }
            lines.push(text.trim_start_matches("///").trim().to_string());
            sibling = s.prev_sibling();
        }
        if lines.is_empty() {
            return None;
        }
        lines.reverse();
        Some(lines.join("\n"))
    }

    fn call_shape(func: Node) -> CallShape {
        match func.kind() {
            "identifier" | "scoped_identifier" => CallShape::Bare,
            "field_expression" => CallShape::Attribute,
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

fn visit(node: Node, ctx: &mut Ctx, enclosing: Option<NodeId>, impl_target: Option<&str>) {
    let source = ctx.source.as_bytes();

    match node.kind() {
        "function_item" => {
            if let Some(name) = node.child_by_field_name("name").and_then(|n| n.utf8_text(source).ok()) {
                let kind = if impl_target.is_some() { NodeKind::Method } else { NodeKind::Function };
                let qualified_name = match impl_target {
                    Some(target) => format!("{}::{}::{}", ctx.path.display(), target, name),
                    None => format!("{}::{}", ctx.path.display(), name),
                };
                let id = NodeId::new(ctx.path, kind, &qualified_name);

                ctx.nodes.push(GraphNode {
                    id,
                    kind,
                    name: name.to_string(),
                    qualified_name: qualified_name.clone(),
                    file_path: ctx.path.clone(),
                    line_start: Some(RustExtractor::line(node.start_position())),
                    line_end: Some(RustExtractor::line(node.end_position())),
                    language: Some(Language::Rust),
                    is_container: false,
                    child_count: 0,
                    loc: Some(
                        RustExtractor::line(node.end_position())
                            .saturating_sub(RustExtractor::line(node.start_position())),
                    ),
                    is_entry_point: name == "main",
                    docstring: RustExtractor::doc_comment(node, source),
                    signature: RustExtractor::signature(node, source),
                    parent: impl_target.map(|target| format!("{}::{}", ctx.path.display(), target)),
                    metadata: HashMap::new(),
                });

                if let Some(body) = node.child_by_field_name("body") {
                    visit(body, ctx, Some(id), impl_target);
                }
                return;
            }
        }
        "struct_item" => {
            if let Some(name) = node.child_by_field_name("name").and_then(|n| n.utf8_text(source).ok()) {
                let qualified_name = format!("{}::{}", ctx.path.display(), name);
                ctx.nodes.push(GraphNode {
                    id: NodeId::new(ctx.path, NodeKind::Struct, &qualified_name),
                    kind: NodeKind::Struct,
                    name: name.to_string(),
                    qualified_name,
                    file_path: ctx.path.clone(),
                    line_start: Some(RustExtractor::line(node.start_position())),
                    line_end: Some(RustExtractor::line(node.end_position())),
                    language: Some(Language::Rust),
                    is_container: true,
                    child_count: 0,
                    loc: None,
                    is_entry_point: false,
                    docstring: RustExtractor::doc_comment(node, source),
                    signature: None,
                    parent: None,
                    metadata: HashMap::new(),
                });
            }
        }
        "enum_item" => {
            if let Some(name) = node.child_by_field_name("name").and_then(|n| n.utf8_text(source).ok()) {
                let qualified_name = format!("{}::{}", ctx.path.display(), name);
                ctx.nodes.push(GraphNode {
                    id: NodeId::new(ctx.path, NodeKind::Enum, &qualified_name),
                    kind: NodeKind::Enum,
                    name: name.to_string(),
                    qualified_name,
                    file_path: ctx.path.clone(),
                    line_start: Some(RustExtractor::line(node.start_position())),
                    line_end: Some(RustExtractor::line(node.end_position())),
                    language: Some(Language::Rust),
                    is_container: true,
                    child_count: 0,
                    loc: None,
                    is_entry_point: false,
                    docstring: RustExtractor::doc_comment(node, source),
                    signature: None,
                    parent: None,
                    metadata: HashMap::new(),
                });
            }
        }
        "trait_item" => {
            if let Some(name) = node.child_by_field_name("name").and_then(|n| n.utf8_text(source).ok()) {
                let qualified_name = format!("{}::{}", ctx.path.display(), name);
                ctx.nodes.push(GraphNode {
                    id: NodeId::new(ctx.path, NodeKind::Interface, &qualified_name),
                    kind: NodeKind::Interface,
                    name: name.to_string(),
                    qualified_name,
                    file_path: ctx.path.clone(),
                    line_start: Some(RustExtractor::line(node.start_position())),
                    line_end: Some(RustExtractor::line(node.end_position())),
                    language: Some(Language::Rust),
                    is_container: true,
                    child_count: 0,
                    loc: None,
                    is_entry_point: false,
                    docstring: RustExtractor::doc_comment(node, source),
                    signature: None,
                    parent: None,
                    metadata: HashMap::new(),
                });
            }
        }
        "impl_item" => {
            let target = node
                .child_by_field_name("type")
                .and_then(|n| n.utf8_text(source).ok());
            if let Some(trait_node) = node.child_by_field_name("trait") {
                if let (Ok(trait_name), Some(target_name)) = (trait_node.utf8_text(source), target) {
                    let qualified_name = format!("{}::{}", ctx.path.display(), target_name);
                    let id = NodeId::new(ctx.path, NodeKind::Struct, &qualified_name);
                    ctx.edges.push(UnresolvedEdge {
                        source: id,
                        target_name: trait_name.to_string(),
                        kind: EdgeKind::Inherits,
                        confidence: confidence::INHERITS,
                        file_path: ctx.path.clone(),
                        line: Some(RustExtractor::line(node.start_position())),
                        target_resolved: false,
                    });
                }
            }
            if let Some(body) = node.child_by_field_name("body") {
                visit(body, ctx, enclosing, target);
            }
            return;
        }
        "use_declaration" => {
            if let Some(source_id) = enclosing {
                if let Some(argument) = node.child_by_field_name("argument") {
                    if let Ok(path_text) = argument.utf8_text(source) {
                        let module = path_text.split("::").next().unwrap_or(path_text);
                        ctx.edges.push(UnresolvedEdge {
                            source: source_id,
                            target_name: module.trim().to_string(),
                            kind: EdgeKind::Imports,
                            confidence: confidence::IMPORTS,
                            file_path: ctx.path.clone(),
                            line: Some(RustExtractor::line(node.start_position())),
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
                        let simple = name.rsplit("::").next().unwrap_or(name);
                        let shape = RustExtractor::call_shape(func);
                        ctx.edges.push(UnresolvedEdge {
                            source: source_id,
                            target_name: simple.to_string(),
                            kind: EdgeKind::Calls,
                            confidence: shape.confidence(),
                            file_path: ctx.path.clone(),
                            line: Some(RustExtractor::line(node.start_position())),
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
        visit(child, ctx, enclosing, impl_target);
    }
}

impl LanguageExtractor for RustExtractor {
    fn extract(&self, path: &PathBuf, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;

        let request = ParseRequest {
            file_type: FileType::Rust,
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
    fn extracts_fn_struct_and_impl_trait() {
        let extractor = RustExtractor::new(crate::parser_pool::create_parser_pool());
        let code = r#"
use std::fmt;

struct User {
    name: String,
}

trait Greet {
    fn greet(&self) -> String;
}

impl Greet for User {
    fn greet(&self) -> String {
        format!("hi {}", self.name)
    }
}

fn main() {
    let u = User { name: "a".into() };
    println!("{}", u.greet());
}
"#;
        let path = PathBuf::from("main.rs");
        let result = extractor.extract(&path, code.as_bytes()).unwrap();
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Struct && n.name == "User"));
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Interface && n.name == "Greet"));
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Method && n.name == "greet"));
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Function && n.name == "main" && n.is_entry_point));
        assert!(result.edges.iter().any(|e| e.kind == EdgeKind::Inherits && e.target_name == "Greet"));
        assert!(result.edges.iter().any(|e| e.kind == EdgeKind::Imports && e.target_name == "std"));
    }
}
