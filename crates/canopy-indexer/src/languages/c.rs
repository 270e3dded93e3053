//! C language extractor using tree-sitter (C1).

use super::{ExtractionResult, LanguageExtractor};
use crate::confidence::{self, CallShape};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};
use anyhow::Result;
use canopy_core::{EdgeKind, GraphNode, Language, NodeId, NodeKind, UnresolvedEdge};
use std::collections::HashMap;
use std::path::PathBuf;
use tree_sitter::{Node, Point};

pub struct CExtractor {
    parser_pool: ParserPool,
}

impl CExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }

    fn line(point: Point) -> u32 {
        (point.row as u32) + 1
    }

    fn declarator_name<'a>(node: Node, source: &'a [u8]) -> Option<&'a str> {
        if node.kind() == "identifier" {
            return node.utf8_text(source).ok();
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if let Some(name) = Self::declarator_name(child, source) {
                return Some(name);
            }
        }
        None
    }

    fn signature(node: Node, source: &[u8]) -> Option<String> {
        let body = node.child_by_field_name("body")?;
        let text = node.utf8_text(source).ok()?;
        let relative_end = (body.start_byte() - node.start_byte()).min(text.len());
        Some(text[..relative_end].trim().to_string())
    }

    /// `//` or `/* */` comment lines immediately preceding this node.
    fn doc_comment(node: Node, source: &[u8]) -> Option<String> {
        let sibling = node.prev_sibling()?;
        if sibling.kind() != "comment" {
            return None;
        }
        let text = sibling.utf8_text(source).ok()?;
        let trimmed = text
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

    fn call_shape(func: Node) -> CallShape {
        match func.kind() {
            "identifier" => CallShape::Bare,
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

fn visit(node: Node, ctx: &mut Ctx, enclosing: Option<NodeId>) {
    let source = ctx.source.as_bytes();

    match node.kind() {
        "function_definition" => {
            if let Some(declarator) = node.child_by_field_name("declarator") {
                if let Some(name) = CExtractor::declarator_name(declarator, source) {
                    let qualified_name = format!("{}::{}", ctx.path.display(), name);
                    let id = NodeId::new(ctx.path, NodeKind::Function, &qualified_name);

                    ctx.nodes.push(GraphNode {
                        id,
                        kind: NodeKind::Function,
                        name: name.to_string(),
                        qualified_name,
                        file_path: ctx.path.clone(),
                        line_start: Some(CExtractor::line(node.start_position())),
                        line_end: Some(CExtractor::line(node.end_position())),
                        language: Some(Language::C),
                        is_container: false,
                        child_count: 0,
                        loc: Some(
                            CExtractor::line(node.end_position())
                                .saturating_sub(CExtractor::line(node.start_position())),
                        ),
                        is_entry_point: name == "main",
                        docstring: CExtractor::doc_comment(node, source),
                        signature: CExtractor::signature(node, source),
                        parent: None,
                        metadata: HashMap::new(),
                    });

                    if let Some(body) = node.child_by_field_name("body") {
                        visit(body, ctx, Some(id));
                    }
                    return;
                }
            }
        }
        "struct_specifier" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(source) {
                    let qualified_name = format!("{}::{}", ctx.path.display(), name);
                    let id = NodeId::new(ctx.path, NodeKind::Struct, &qualified_name);
                    ctx.nodes.push(GraphNode {
                        id,
                        kind: NodeKind::Struct,
                        name: name.to_string(),
                        qualified_name,
                        file_path: ctx.path.clone(),
                        line_start: Some(CExtractor::line(node.start_position())),
                        line_end: Some(CExtractor::line(node.end_position())),
                        language: Some(Language::C),
                        is_container: true,
                        child_count: 0,
                        loc: None,
                        is_entry_point: false,
                        docstring: CExtractor::doc_comment(node, source),
                        signature: None,
                        parent: None,
                        metadata: HashMap::new(),
                    });
                }
            }
        }
        "enum_specifier" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(source) {
                    let qualified_name = format!("{}::{}", ctx.path.display(), name);
                    ctx.nodes.push(GraphNode {
                        id: NodeId::new(ctx.path, NodeKind::Enum, &qualified_name),
                        kind: NodeKind::Enum,
                        name: name.to_string(),
                        qualified_name,
                        file_path: ctx.path.clone(),
                        line_start: Some(CExtractor::line(node.start_position())),
                        line_end: Some(CExtractor::line(node.end_position())),
                        language: Some(Language::C),
                        is_container: true,
                        child_count: 0,
                        loc: None,
                        is_entry_point: false,
                        docstring: CExtractor::doc_comment(node, source),
                        signature: None,
                        parent: None,
                        metadata: HashMap::new(),
                    });
                }
            }
        }
        "type_definition" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "type_identifier" {
                    if let Ok(name) = child.utf8_text(source) {
                        let qualified_name = format!("{}::{}", ctx.path.display(), name);
                        ctx.nodes.push(GraphNode {
                            id: NodeId::new(ctx.path, NodeKind::TypeAlias, &qualified_name),
                            kind: NodeKind::TypeAlias,
                            name: name.to_string(),
                            qualified_name,
                            file_path: ctx.path.clone(),
                            line_start: Some(CExtractor::line(node.start_position())),
                            line_end: Some(CExtractor::line(node.end_position())),
                            language: Some(Language::C),
                            is_container: false,
                            child_count: 0,
                            loc: None,
                            is_entry_point: false,
                            docstring: None,
                            signature: None,
                            parent: None,
                            metadata: HashMap::new(),
                        });
                    }
                }
            }
        }
        "preproc_include" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "string_literal" || child.kind() == "system_lib_string" {
                    if let Ok(header) = child.utf8_text(source) {
                        if let Some(source_id) = enclosing {
                            ctx.edges.push(UnresolvedEdge {
                                source: source_id,
                                target_name: header.trim_matches(|c| c == '"' || c == '<' || c == '>').to_string(),
                                kind: EdgeKind::Imports,
                                confidence: confidence::INCLUDE_DIRECTIVE,
                                file_path: ctx.path.clone(),
                                line: Some(CExtractor::line(node.start_position())),
                                target_resolved: false,
                            });
                        }
                    }
                }
            }
        }
        "call_expression" => {
            if let Some(source_id) = enclosing {
                if let Some(func) = node.child_by_field_name("function") {
                    if let Ok(name) = func.utf8_text(source) {
                        let shape = CExtractor::call_shape(func);
                        ctx.edges.push(UnresolvedEdge {
                            source: source_id,
                            target_name: name.to_string(),
                            kind: EdgeKind::Calls,
                            confidence: shape.confidence(),
                            file_path: ctx.path.clone(),
                            line: Some(CExtractor::line(node.start_position())),
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

impl LanguageExtractor for CExtractor {
    fn extract(&self, path: &PathBuf, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;

        let request = ParseRequest {
            file_type: FileType::C,
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
    fn extracts_function_struct_and_include() {
        let extractor = CExtractor::new(crate::parser_pool::create_parser_pool());
        let code = r#"
#include <stdio.h>

struct Point {
    int x;
    int y;
};

int main() {
    printf("hi");
    return 0;
}
"#;
        let path = PathBuf::from("main.c");
        let result = extractor.extract(&path, code.as_bytes()).unwrap();
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Function && n.name == "main" && n.is_entry_point));
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Struct && n.name == "Point"));
        assert!(result.edges.iter().any(|e| e.kind == EdgeKind::Calls && e.target_name == "printf"));
    }
}
