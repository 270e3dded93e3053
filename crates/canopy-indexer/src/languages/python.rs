//! Python language extractor using tree-sitter (C1).

use super::{ExtractionResult, LanguageExtractor};
use crate::confidence::{self, CallShape};
use crate::heuristics::{decompose_decorator, default_entry_point_patterns, default_reference_patterns};
use crate::parser_pool::{ParseRequest, ParserPool, FileType};
use anyhow::Result;
use canopy_core::{EdgeKind, GraphNode, Language, NodeId, NodeKind, UnresolvedEdge};
use std::collections::HashMap;
use std::path::PathBuf;
use tree_sitter::{Node, Point};

pub struct PythonExtractor {
    parser_pool: ParserPool,
}

impl PythonExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }

    fn point_to_u32(point: Point) -> u32 {
        (point.row as u32) + 1
    }

    fn node_name<'a>(node: Node, source: &'a [u8]) -> Option<&'a str> {
        node.child_by_field_name("name")?.utf8_text(source).ok()
    }

    fn callee_text<'a>(node: Node, source: &'a [u8]) -> Option<&'a str> {
        node.utf8_text(source).ok()
    }

    /// Decorator names attached to a `function_definition`/`class_definition`, stripped of `@`.
    fn decorators(node: Node, source: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        let mut sibling = node.prev_sibling();
        while let Some(s) = sibling {
            if s.kind() != "decorator" {
                break;
            }
            if let Some(inner) = s.child(1) {
                let callee = match inner.kind() {
                    "call" => inner.child_by_field_name("function"),
                    _ => Some(inner),
                };
                if let Some(callee) = callee {
                    if let Ok(text) = callee.utf8_text(source) {
                        out.push(text.to_string());
                    }
                }
            }
            sibling = s.prev_sibling();
        }
        out
    }

    fn base_classes(node: Node, source: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(args) = node.child_by_field_name("superclasses") {
            let mut cursor = args.walk();
            for child in args.children(&mut cursor) {
                if child.kind() == "identifier" || child.kind() == "attribute" {
                    if let Ok(text) = child.utf8_text(source) {
                        out.push(text.to_string());
                    }
                }
            }
        }
        out
    }

    /// A function/class's simplified signature: the declaration text up to
    /// (not including) its body.
    fn signature(node: Node, source: &[u8]) -> Option<String> {
        let body = node.child_by_field_name("body")?;
        let text = node.utf8_text(source).ok()?;
        let relative_end = (body.start_byte() - node.start_byte()).min(text.len());
        Some(text[..relative_end].trim().trim_end_matches(':').to_string())
    }

    /// The first statement of a body, if it's a bare string literal (Python's
    /// docstring convention).
    fn docstring(body: Node, source: &[u8]) -> Option<String> {
        let first = body.named_child(0)?;
        let string_node = if first.kind() == "expression_statement" {
            first.named_child(0)?
        } else {
            first
        };
        if string_node.kind() != "string" {
            return None;
        }
        let text = string_node.utf8_text(source).ok()?;
        Some(text.trim_matches(['"', '\'']).trim().to_string())
    }

    /// Bare name, attribute access, or something more dynamic.
    fn call_shape(func: Node) -> CallShape {
        match func.kind() {
            "identifier" => CallShape::Bare,
            "attribute" => CallShape::Attribute,
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

fn visit(
    node: Node,
    ctx: &mut Ctx,
    enclosing: Option<(NodeId, String)>,
    class_name: Option<&str>,
) {
    let source = ctx.source.as_bytes();

    match node.kind() {
        "function_definition" => {
            if let Some(name) = PythonExtractor::node_name(node, source) {
                let qualified_name = match class_name {
                    Some(class) => format!("{}::{}::{}", ctx.path.display(), class, name),
                    None => format!("{}::{}", ctx.path.display(), name),
                };
                let kind = if class_name.is_some() {
                    NodeKind::Method
                } else {
                    NodeKind::Function
                };
                let id = NodeId::new(ctx.path, kind, &qualified_name);
                let decorators = PythonExtractor::decorators(node, source);
                let is_entry_point = decorators.iter().any(|d| {
                    let decomposed = decompose_decorator(d);
                    default_entry_point_patterns()
                        .iter()
                        .any(|p| p.matches(&decomposed))
                });

                for raw in &decorators {
                    let decomposed = decompose_decorator(raw);
                    for pattern in default_reference_patterns() {
                        if pattern.matches(&decomposed) {
                            ctx.edges.push(UnresolvedEdge {
                                source: id,
                                target_name: decomposed.object.clone().unwrap_or_else(|| decomposed.name.clone()),
                                kind: EdgeKind::ConfiguresArgument,
                                confidence: confidence::DECORATOR_ARGUMENT,
                                file_path: ctx.path.clone(),
                                line: Some(PythonExtractor::point_to_u32(node.start_position())),
                                target_resolved: false,
                            });
                        }
                    }
                }

                let body_node = node.child_by_field_name("body");
                ctx.nodes.push(GraphNode {
                    id,
                    kind,
                    name: name.to_string(),
                    qualified_name: qualified_name.clone(),
                    file_path: ctx.path.clone(),
                    line_start: Some(PythonExtractor::point_to_u32(node.start_position())),
                    line_end: Some(PythonExtractor::point_to_u32(node.end_position())),
                    language: Some(Language::Python),
                    is_container: false,
                    child_count: 0,
                    loc: Some(PythonExtractor::point_to_u32(node.end_position()).saturating_sub(
                        PythonExtractor::point_to_u32(node.start_position()),
                    )),
                    is_entry_point,
                    docstring: body_node.and_then(|b| PythonExtractor::docstring(b, source)),
                    signature: PythonExtractor::signature(node, source),
                    parent: class_name.map(|c| format!("{}::{}", ctx.path.display(), c)),
                    metadata: HashMap::new(),
                });

                if let Some(body) = body_node {
                    visit(body, ctx, Some((id, qualified_name)), class_name);
                }
                return;
            }
        }
        "class_definition" => {
            if let Some(name) = PythonExtractor::node_name(node, source) {
                let qualified_name = format!("{}::{}", ctx.path.display(), name);
                let id = NodeId::new(ctx.path, NodeKind::Class, &qualified_name);

                for base in PythonExtractor::base_classes(node, source) {
                    ctx.edges.push(UnresolvedEdge {
                        source: id,
                        target_name: base,
                        kind: EdgeKind::Inherits,
                        confidence: confidence::INHERITS,
                        file_path: ctx.path.clone(),
                        line: Some(PythonExtractor::point_to_u32(node.start_position())),
                        target_resolved: false,
                    });
                }

                let body_node = node.child_by_field_name("body");
                ctx.nodes.push(GraphNode {
                    id,
                    kind: NodeKind::Class,
                    name: name.to_string(),
                    qualified_name: qualified_name.clone(),
                    file_path: ctx.path.clone(),
                    line_start: Some(PythonExtractor::point_to_u32(node.start_position())),
                    line_end: Some(PythonExtractor::point_to_u32(node.end_position())),
                    language: Some(Language::Python),
                    is_container: true,
                    child_count: 0,
                    loc: None,
                    is_entry_point: false,
                    docstring: body_node.and_then(|b| PythonExtractor::docstring(b, source)),
                    signature: PythonExtractor::signature(node, source),
                    parent: None,
                    metadata: HashMap::new(),
                });

                if let Some(body) = body_node {
                    visit(body, ctx, enclosing, Some(name));
                }
                return;
            }
        }
        "import_statement" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "dotted_name" || child.kind() == "aliased_import" {
                    if let Ok(module) = child.utf8_text(source) {
                        if let Some((source_id, _)) = &enclosing {
                            ctx.edges.push(UnresolvedEdge {
                                source: *source_id,
                                target_name: module.split('.').next().unwrap_or(module).to_string(),
                                kind: EdgeKind::Imports,
                                confidence: confidence::IMPORTS,
                                file_path: ctx.path.clone(),
                                line: Some(PythonExtractor::point_to_u32(node.start_position())),
                                target_resolved: false,
                            });
                        }
                    }
                }
            }
        }
        "import_from_statement" => {
            if let Some(module_node) = node.child_by_field_name("module_name") {
                if let Ok(module) = module_node.utf8_text(source) {
                    if let Some((source_id, _)) = &enclosing {
                        ctx.edges.push(UnresolvedEdge {
                            source: *source_id,
                            target_name: module.to_string(),
                            kind: EdgeKind::Imports,
                            confidence: confidence::IMPORTS,
                            file_path: ctx.path.clone(),
                            line: Some(PythonExtractor::point_to_u32(node.start_position())),
                            target_resolved: false,
                        });
                    }
                }
            }
        }
        "call" => {
            if let Some((source_id, _)) = &enclosing {
                if let Some(func) = node.child_by_field_name("function") {
                    if let Some(callee) = PythonExtractor::callee_text(func, source) {
                        let simple = callee.rsplit('.').next().unwrap_or(callee);
                        let shape = PythonExtractor::call_shape(func);
                        ctx.edges.push(UnresolvedEdge {
                            source: *source_id,
                            target_name: simple.to_string(),
                            kind: EdgeKind::Calls,
                            confidence: shape.confidence(),
                            file_path: ctx.path.clone(),
                            line: Some(PythonExtractor::point_to_u32(node.start_position())),
                            target_resolved: false,
                        });
                    }
                }
            }
        }
        "typed_parameter" | "type" => {
            if let Some((source_id, _)) = &enclosing {
                if let Ok(type_text) = node.utf8_text(source) {
                    let simple = type_text.trim();
                    if !simple.is_empty() && simple.chars().next().map_or(false, |c| c.is_alphabetic()) {
                        ctx.edges.push(UnresolvedEdge {
                            source: *source_id,
                            target_name: simple.to_string(),
                            kind: EdgeKind::TypeReference,
                            confidence: confidence::TYPE_ANNOTATION,
                            file_path: ctx.path.clone(),
                            line: Some(PythonExtractor::point_to_u32(node.start_position())),
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

impl LanguageExtractor for PythonExtractor {
    fn extract(&self, path: &PathBuf, content: &[u8]) -> Result<ExtractionResult> {
        let source_code = std::str::from_utf8(content)?;

        let request = ParseRequest {
            file_type: FileType::Python,
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
    fn extracts_function_class_and_method() {
        let extractor = PythonExtractor::new(crate::parser_pool::create_parser_pool());
        let code = r#"
class Greeter:
    def greet(self, name):
        return f"hi {name}"

def standalone():
    return 1
"#;
        let path = PathBuf::from("greet.py");
        let result = extractor.extract(&path, code.as_bytes()).unwrap();
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Class && n.name == "Greeter"));
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Method && n.name == "greet"));
        assert!(result.nodes.iter().any(|n| n.kind == NodeKind::Function && n.name == "standalone"));
    }

    #[test]
    fn flags_route_decorator_as_entry_point() {
        let extractor = PythonExtractor::new(crate::parser_pool::create_parser_pool());
        let code = r#"
@app.route("/users")
def list_users():
    return []
"#;
        let path = PathBuf::from("views.py");
        let result = extractor.extract(&path, code.as_bytes()).unwrap();
        let f = result.nodes.iter().find(|n| n.name == "list_users").unwrap();
        assert!(f.is_entry_point);
        assert!(result.edges.iter().any(|e| e.kind == EdgeKind::ConfiguresArgument));
    }

    #[test]
    fn extracts_imports_and_calls() {
        let extractor = PythonExtractor::new(crate::parser_pool::create_parser_pool());
        let code = r#"
from pathlib import Path

def process(p):
    return helper(p)
"#;
        let path = PathBuf::from("proc.py");
        let result = extractor.extract(&path, code.as_bytes()).unwrap();
        assert!(result.edges.iter().any(|e| e.kind == EdgeKind::Imports && e.target_name == "pathlib"));
        assert!(result.edges.iter().any(|e| e.kind == EdgeKind::Calls && e.target_name == "helper"));
    }

    #[test]
    fn inheritance_produces_edge() {
        let extractor = PythonExtractor::new(crate::parser_pool::create_parser_pool());
        let code = "class Dog(Animal):\n    pass\n";
        let path = PathBuf::from("animals.py");
        let result = extractor.extract(&path, code.as_bytes()).unwrap();
        assert!(result.edges.iter().any(|e| e.kind == EdgeKind::Inherits && e.target_name == "Animal"));
    }
}
