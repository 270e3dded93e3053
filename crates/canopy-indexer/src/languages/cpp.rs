//! C++ language extractor using tree-sitter (C1).
//!
//! Adds class/namespace/inheritance handling on top of the C extractor's
//! function/struct/include walk.

use super::{ExtractionResult, LanguageExtractor};
use crate::confidence::{self, CallShape};
use crate::parser_pool::{FileType, ParseRequest, ParserPool};
use anyhow::Result;
use canopy_core::{EdgeKind, GraphNode, Language, NodeId, NodeKind, UnresolvedEdge};
use std::collections::HashMap;
use std::path::PathBuf;
use tree_sitter::{Node, Point};

pub struct CppExtractor {
    parser_pool: ParserPool,
}

impl CppExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }

    fn line(point: Point) -> u32 {
        (point.row as u32) + 1
    }

    fn declarator_name<'a>(node: Node, source: &'a [u8]) -> Option<&'a str> {
        if node.kind() == "identifier" || node.kind() == "field_identifier" {
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

    fn base_classes(node: Node, source: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(base_clause) = (0..node.child_count())
            .map(|i| node.child(i).unwrap())
            .find(|c| c.kind() == "base_class_clause")
        {
            let mut cursor = base_clause.walk();
            for child in base_clause.children(&mut cursor) {
                if child.kind() == "type_identifier" {
                    if let Ok(text) = child.utf8_text(source) {
                        out.push(text.to_string());
                    }
                }
            }
        }
        out
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
            "identifier" | "qualified_identifier" => CallShape::Bare,
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

fn visit(node: Node, ctx: &mut Ctx, enclosing: Option<NodeId>, class_name: Option<&str>) {
    let source = ctx.source.as_bytes();

    match node.kind() {
        "class_specifier" | "struct_specifier" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                if let Ok(name) = name_node.utf8_text(source) {
                    let kind = if node.kind() == "class_specifier" { NodeKind::Class } else { NodeKind::Struct };
                    let qualified_name = format!("{}::{}", ctx.path.display(), name);
                    let id = NodeId::new(ctx.path, kind, &qualified_name);

                    for base in CppExtractor::base_classes(node, source) {
                        ctx.edges.push(UnresolvedEdge {
                            source: id,
                            target_name: base,
                            kind: EdgeKind::Inherits,
                            confidence: confidence::INHERITS,
                            file_path: ctx.path.clone(),
                            line: Some(CppExtractor::line(node.start_position())),
                            target_resolved: false,
                        });
                    }

                    ctx.nodes.push(GraphNode {
                        id,
                        kind,
                        name: name.to_string(),
                        qualified_name: qualified_name.clone(),
                        file_path: ctx.path.clone(),
                        line_start: Some(CppExtractor::line(node.start_position())),
                        line_end: Some(CppExtractor::line(node.end_position())),
                        language: Some(Language::Cpp),
                        is_container: true,
                        child_count: 0,
                        loc: None,
                        is_entry_point: false,
                        docstring: CppExtractor::doc_comment(node, source),
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
        }
        "function_definition" => {
            if let Some(declarator) = node.child_by_field_name("declarator") {
                if let Some(name) = CppExtractor::declarator_name(declarator, source) {
                    let kind = if class_name.is_some() { NodeKind::Method } else { NodeKind::Function };
                    let qualified_name = match class_name {
                        Some(class) => format!("{}::{}::{}", ctx.path.display(), class, name),
                        None => format!("{}::{}", ctx.path.display(), name),
                    };
                    let id = NodeId::new(ctx.path, kind, &qualified_name);

                    ctx.nodes.push(GraphNode {
                        id,
                        kind,
                        name: name.to_string(),
                        qualified_name: qualified_name.clone(),
                        file_path: ctx.path.clone(),
                        line_start: Some(CppExtractor::line(node.start_position())),
                        line_end: Some(CppExtractor::line(node.end_position())),
                        language: Some(Language::Cpp),
                        is_container: false,
                        child_count: 0,
                        loc: Some(
                            CppExtractor::line(node.end_position())
                                .saturating_sub(CppExtractor::line(node.start_position())),
                        ),
                        is_entry_point: name == "main",
                        docstring: CppExtractor::doc_comment(node, source),
                        signature: CppExtractor::signature(node, source),
                        parent: class_name.map(|c| format!("{}::{}", ctx.path.display(), c)),
                        metadata: HashMap::new(),
                    });

                    if let Some(body) = node.child_by_field_name("body") {
                        visit(body, ctx, Some(id), class_name);
                    }
                    return;
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
                                line: Some(CppExtractor::line(node.start_position())),
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
                        let simple = name.rsplit("::").next().unwrap_or(name);
                        let shape = CppExtractor::call_shape(func);
                        ctx.edges.push(UnresolvedEdge {
                            source: source_id,
                            target_name: simple.to_string(),
                            kind: EdgeKind::Calls,
                            confidence: shape.confidence(),
                            file_path: ctx.path.clone(),
                            line: Some(CppExtractor::line(node.start_position())),
                            target_resolved: false,
                        });
                    }
                }
            }
        }
        // `new` is resolved to Instantiates once the callee is known to name
        // a class, which only C2 can determine.
        "new_expression" => {
            if let Some(source_id) = enclosing {
                if let Some(type_node) = node.child_by_field_name("type") {
                    if let Ok(name) = type_node.utf8_text(source) {
                        ctx.edges.push(UnresolvedEdge {
                            source: source_id,
                            target_name: name.to_string(),
                            kind: EdgeKind::Calls,
                            confidence: confidence::CALL_BARE,
                            file_path: ctx.path.clone(),
                            line: Some(CppExtractor::line(node.start_position())),
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

impl LanguageExtractor for CppExtractor {
    fn extract(&self, path: &PathBuf, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;

        let request = ParseRequest {
            file_type: FileType::Cpp,
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
    fn extracts_class_with_base_and_method() {
        let extractor = CppExtractor::new(crate::parser_pool::create_parser_pool());
        let code = r#"
class Animal {
public:
    virtual void speak();
};

class Dog : public Animal {
public:
    void speak() {
        bark();
    }
};
"#;
        let path = PathBuf::from("animal.cpp");
        let result = extractor.extract(&path, code.as_bytes()).unwrap();
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Class && n.name == "Dog"));
        assert!(result.edges.iter().any(|e| e.kind == EdgeKind::Inherits && e.target_name == "Animal"));
    }
}
