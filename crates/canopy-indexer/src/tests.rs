//! Integration-style tests across the language dispatch table.

use crate::languages::get_extractor;
use canopy_core::{EdgeKind, NodeKind};
use std::path::PathBuf;

#[test]
fn test_extractor_detection() {
    let test_cases = [
        "main.rs", "app.ts", "index.js", "lib.py", "main.go", "Main.java", "main.c", "main.cpp", "unknown.xyz",
    ];

    for filename in test_cases {
        let path = PathBuf::from(filename);
        let extractor = get_extractor(&path);
        assert!(extractor.is_some(), "Should have extractor for {filename}");
        let result = extractor.unwrap().extract(&path, b"");
        assert!(result.is_ok(), "Extractor failed for {filename}");
    }
}

#[test]
fn test_rust_extraction() {
    let rust_code = r#"
fn main() {
    println!("Hello, world!");
}

fn helper() -> i32 {
    42
}

struct User {
    name: String,
}
"#;

    let path = PathBuf::from("test.rs");
    let extractor = get_extractor(&path).unwrap();
    let result = extractor.extract(&path, rust_code.as_bytes()).unwrap();

    let functions: Vec<_> = result.nodes.iter().filter(|n| n.kind == NodeKind::Function).collect();
    assert!(functions.len() >= 2, "Should extract at least 2 functions");
    assert!(functions.iter().any(|f| f.name == "main"));
    assert!(functions.iter().any(|f| f.name == "helper"));

    let structs: Vec<_> = result.nodes.iter().filter(|n| n.kind == NodeKind::Struct).collect();
    assert!(structs.iter().any(|s| s.name == "User"));
}

#[test]
fn test_javascript_extraction() {
    let js_code = r#"
function greet(name) {
    return "Hello, " + name;
}

class Person {
    constructor(name) {
        this.name = name;
    }

    greet() {
        return "Hello, I'm " + this.name;
    }
}
"#;

    let path = PathBuf::from("test.js");
    let extractor = get_extractor(&path).unwrap();
    let result = extractor.extract(&path, js_code.as_bytes()).unwrap();

    let functions: Vec<_> = result.nodes.iter().filter(|n| n.kind == NodeKind::Function).collect();
    assert!(functions.iter().any(|f| f.name == "greet"));

    let classes: Vec<_> = result.nodes.iter().filter(|n| n.kind == NodeKind::Class).collect();
    assert!(classes.iter().any(|c| c.name == "Person"));
}

#[test]
fn test_python_extraction() {
    let python_code = r#"
def greet(name):
    return f"Hello, {name}"

class Person:
    def __init__(self, name):
        self.name = name

    def greet(self):
        return f"Hello, I'm {self.name}"
"#;

    let path = PathBuf::from("test.py");
    let extractor = get_extractor(&path).unwrap();
    let result = extractor.extract(&path, python_code.as_bytes()).unwrap();

    let functions: Vec<_> = result.nodes.iter().filter(|n| n.kind == NodeKind::Function).collect();
    assert!(functions.iter().any(|f| f.name == "greet"));

    let methods: Vec<_> = result.nodes.iter().filter(|n| n.kind == NodeKind::Method).collect();
    assert!(methods.iter().any(|m| m.name == "greet"));

    let classes: Vec<_> = result.nodes.iter().filter(|n| n.kind == NodeKind::Class).collect();
    assert!(classes.iter().any(|c| c.name == "Person"));
}

#[test]
fn test_edge_creation() {
    let code = r#"
import os
from pathlib import Path

def process_file(path):
    return path.exists()
"#;

    let path = PathBuf::from("test.py");
    let extractor = get_extractor(&path).unwrap();
    let result = extractor.extract(&path, code.as_bytes()).unwrap();

    let imports: Vec<_> = result.edges.iter().filter(|e| e.kind == EdgeKind::Imports).collect();
    assert!(!imports.is_empty(), "Should extract import relationships");
}

#[test]
fn test_empty_extraction() {
    let path = PathBuf::from("empty.rs");
    let extractor = get_extractor(&path).unwrap();
    let result = extractor.extract(&path, b"").unwrap();
    assert_eq!(result.nodes.len(), 0);
    assert_eq!(result.edges.len(), 0);
}

#[test]
fn test_invalid_utf8_handling() {
    let path = PathBuf::from("binary.rs");
    let extractor = get_extractor(&path).unwrap();

    let invalid_utf8 = vec![0xFF, 0xFE, 0xFD];
    let result = extractor.extract(&path, &invalid_utf8);
    assert!(result.is_err() || result.unwrap().nodes.is_empty());
}
