//! JavaScript language extractor using tree-sitter (C1).

use super::{ExtractionResult, LanguageExtractor};
use crate::confidence::{self, CallShape};
use crate::parser_pool::{ParseRequest, ParserPool, FileType};
use anyhow::Result;
use canopy_core::{EdgeKind, GraphNode, Language, NodeId, NodeKind, UnresolvedEdge};
use std::collections::HashMap;
use std::path::PathBuf;
use tree_sitter::{Node, Point};

pub struct JavaScriptExtractor {
    parser_pool: ParserPool,
}

impl JavaScriptExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }

    fn identifier_name<'a>(node: Node, source: &'a [u8]) -> Option<&'a str> {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "identifier" || child.kind() == "type_identifier" {
                return child.utf8_text(source).ok();
            }
        }
        None
    }

    fn call_shape(func: Node) -> CallShape {
        match func.kind() {
            "identifier" => CallShape::Bare,
            "member_expression" => CallShape::Attribute,
            _ => CallShape::Dynamic,
        }
    }

    /// Doc comment (`/** ... */` or a run of `//` lines) immediately
    /// preceding this node.
    fn doc_comment(node: Node, source: &[u8]) -> Option<String> {
        let sibling = node.prev_sibling()?;
        if sibling.kind() != "comment" {
            return None;
        }
        let text = sibling.utf8_text(source).ok()?;
        let trimmed = text
            .trim_start_matches("/**")
            .trim_start_matches("//")
            .trim_end_matches("*/")
            .trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn signature(node: Node, source: &[u8]) -> Option<String> {
        let body = node.child_by_field_name("body")?;
        let text = node.utf8_text(source).ok()?;
        let relative_end = (body.start_byte() - node.start_byte()).min(text.len());
        Some(text[..relative_end].trim().to_string())
    }
}

struct Ctx<'a> {
    path: &'a PathBuf,
    source: &'a str,
    language: Language,
    nodes: Vec<GraphNode>,
    edges: Vec<UnresolvedEdge>,
}

fn visit(node: Node, ctx: &mut Ctx, enclosing: Option<(NodeId, String)>, class_name: Option<&str>) {
    let source = ctx.source.as_bytes();

    match node.kind() {
        "function_declaration" | "method_definition" | "function_expression" | "generator_function_declaration" => {
            if let Some(name) = node
                .child_by_field_name("name")
                .and_then(|n| n.utf8_text(source).ok())
            {
                let qualified_name = match class_name {
                    Some(class) => format!("{}::{}::{}", ctx.path.display(), class, name),
                    None => format!("{}::{}", ctx.path.display(), name),
                };
                let kind = if class_name.is_some() { NodeKind::Method } else { NodeKind::Function };
                let id = NodeId::new(ctx.path, kind, &qualified_name);

                ctx.nodes.push(GraphNode {
                    id,
                    kind,
                    name: name.to_string(),
                    qualified_name: qualified_name.clone(),
                    file_path: ctx.path.clone(),
                    line_start: Some(Ctx::line(node.start_position())),
                    line_end: Some(Ctx::line(node.end_position())),
                    language: Some(ctx.language),
                    is_container: false,
                    child_count: 0,
                    loc: Some(Ctx::line(node.end_position()).saturating_sub(Ctx::line(node.start_position()))),
                    is_entry_point: false,
                    docstring: JavaScriptExtractor::doc_comment(node, source),
                    signature: JavaScriptExtractor::signature(node, source),
                    parent: class_name.map(|c| format!("{}::{}", ctx.path.display(), c)),
                    metadata: HashMap::new(),
                });

                if let Some(body) = node.child_by_field_name("body") {
                    visit(body, ctx, Some((id, qualified_name)), class_name);
                }
                return;
            }
        }
        "class_declaration" => {
            if let Some(name) = JavaScriptExtractor::identifier_name(node, source) {
                let qualified_name = format!("{}::{}", ctx.path.display(), name);
                let id = NodeId::new(ctx.path, NodeKind::Class, &qualified_name);

                if let Some(heritage) = node.child_by_field_name("superclass") {
                    if let Ok(base) = heritage.utf8_text(source) {
                        ctx.edges.push(UnresolvedEdge {
                            source: id,
                            target_name: base.trim_start_matches("extends").trim().to_string(),
                            kind: EdgeKind::Inherits,
                            confidence: confidence::INHERITS,
                            file_path: ctx.path.clone(),
                            line: Some(Ctx::line(node.start_position())),
                            target_resolved: false,
                        });
                    }
                }

                ctx.nodes.push(GraphNode {
                    id,
                    kind: NodeKind::Class,
                    name: name.to_string(),
                    qualified_name: qualified_name.clone(),
                    file_path: ctx.path.clone(),
                    line_start: Some(Ctx::line(node.start_position())),
                    line_end: Some(Ctx::line(node.end_position())),
                    language: Some(ctx.language),
                    is_container: true,
                    child_count: 0,
                    loc: None,
                    is_entry_point: false,
                    docstring: JavaScriptExtractor::doc_comment(node, source),
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
        "import_statement" => {
            if let Some(source_node) = node.child_by_field_name("source") {
                if let Ok(module) = source_node.utf8_text(source) {
                    if let Some((source_id, _)) = &enclosing {
                        ctx.edges.push(UnresolvedEdge {
                            source: *source_id,
                            target_name: module.trim_matches(|c| c == '"' || c == '\'').to_string(),
                            kind: EdgeKind::Imports,
                            confidence: confidence::IMPORTS,
                            file_path: ctx.path.clone(),
                            line: Some(Ctx::line(node.start_position())),
                            target_resolved: false,
                        });
                    }
                }
            }
        }
        "call_expression" => {
            if let Some((source_id, _)) = &enclosing {
                if let Some(func) = node.child_by_field_name("function") {
                    if let Ok(callee) = func.utf8_text(source) {
                        let simple = callee.rsplit('.').next().unwrap_or(callee);
                        let shape = JavaScriptExtractor::call_shape(func);
                        ctx.edges.push(UnresolvedEdge {
                            source: *source_id,
                            target_name: simple.to_string(),
                            kind: EdgeKind::Calls,
                            confidence: shape.confidence(),
                            file_path: ctx.path.clone(),
                            line: Some(Ctx::line(node.start_position())),
                            target_resolved: false,
                        });
                    }
                }
            }
        }
        // `new` is a syntactic call; whether the callee resolves to a class
        // (and the edge becomes Instantiates) is decided once the symbol
        // table is available, not here.
        "new_expression" => {
            if let Some((source_id, _)) = &enclosing {
                if let Some(ctor) = node.child_by_field_name("constructor") {
                    if let Ok(name) = ctor.utf8_text(source) {
                        let shape = JavaScriptExtractor::call_shape(ctor);
                        ctx.edges.push(UnresolvedEdge {
                            source: *source_id,
                            target_name: name.to_string(),
                            kind: EdgeKind::Calls,
                            confidence: shape.confidence(),
                            file_path: ctx.path.clone(),
                            line: Some(Ctx::line(node.start_position())),
                            target_resolved: false,
                        });
                    }
                }
            }
        }
        "type_annotation" => {
            if let Some((source_id, _)) = &enclosing {
                if let Ok(text) = node.utf8_text(source) {
                    let simple = text.trim_start_matches(':').trim();
                    if simple.chars().next().map_or(false, |c| c.is_alphabetic()) {
                        ctx.edges.push(UnresolvedEdge {
                            source: *source_id,
                            target_name: simple.split(['<', '[', '|']).next().unwrap_or(simple).to_string(),
                            kind: EdgeKind::TypeReference,
                            confidence: confidence::TYPE_ANNOTATION,
                            file_path: ctx.path.clone(),
                            line: Some(Ctx::line(node.start_position())),
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
        visit(child, ctx, enclosing.clone(), class_name);
    }
}

impl<'a> Ctx<'a> {
    fn line(point: Point) -> u32 {
        (point.row as u32) + 1
    }
}

/// Shared walker for ECMAScript-family grammars (JS and TS share node shapes
/// for the constructs this extractor cares about).
pub(crate) fn extract_ecma_like(
    parser_pool: &ParserPool,
    path: &PathBuf,
    content: &[u8],
    file_type: FileType,
    language: Language,
) -> Result<ExtractionResult> {
    let source_code = std::str::from_utf8(content)?;

    let request = ParseRequest {
        file_type,
        content: source_code.to_string(),
        path: path.clone(),
    };
    let parse_result = parser_pool.parse_blocking(request)?;
    let tree = parse_result.tree;

    let mut ctx = Ctx {
        path,
        source: source_code,
        language,
        nodes: Vec::new(),
        edges: Vec::new(),
    };
    visit(tree.root_node(), &mut ctx, None, None);

    Ok(ExtractionResult {
        nodes: ctx.nodes,
        edges: ctx.edges,
    })
}

impl LanguageExtractor for JavaScriptExtractor {
    fn extract(&self, path: &PathBuf, content: &[u8]) -> Result<ExtractionResult> {
        extract_ecma_like(&self.parser_pool, path, content, FileType::JavaScript, Language::JavaScript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_class_and_functions() {
        let extractor = JavaScriptExtractor::new(crate::parser_pool::create_parser_pool());
        let code = r#"
import React from 'react';

class User {
    constructor(name) {
        this.name = name;
    }

    getName() {
        return this.name;
    }
}

function createUser(name) {
    return new User(name);
}
"#;
        let path = PathBuf::from("user.js");
        let result = extractor.extract(&path, code.as_bytes()).unwrap();

        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Class && n.name == "User"));
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Function && n.name == "createUser"));
        assert!(result.edges.iter().any(|e| e.kind == EdgeKind::Imports && e.target_name == "react"));
        // `new User(...)` surfaces as a Calls edge here; C2 upgrades it to
        // Instantiates once "User" resolves to a class symbol.
        assert!(result.edges.iter().any(|e| e.kind == EdgeKind::Calls && e.target_name == "User"));
    }
}
