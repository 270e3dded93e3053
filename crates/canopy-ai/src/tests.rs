//! Crate-level integration tests exercising the generator pipeline
//! end-to-end with the offline transport.

use crate::cache::ResponseCache;
use crate::generators::directory::{self, DirectoryGenerationInput};
use crate::generators::file::{self, FileGenerationInput};
use crate::generators::{architecture, root};
use crate::offline::OfflineTextGenerator;
use crate::prompts::{DirectoryContext, FileContext};
use canopy_core::{Graph, GraphNode, Language, NodeId, NodeKind, SynthesisMap};
use std::path::PathBuf;

fn file_node() -> GraphNode {
    GraphNode {
        id: NodeId::new(&PathBuf::from("src/main.rs"), NodeKind::File, "src/main.rs"),
        kind: NodeKind::File,
        name: "main.rs".to_string(),
        qualified_name: "src/main.rs".to_string(),
        file_path: PathBuf::from("src/main.rs"),
        line_start: None,
        line_end: None,
        language: Some(Language::Rust),
        is_container: false,
        child_count: 0,
        loc: None,
        is_entry_point: false,
        docstring: None,
        signature: None,
        parent: None,
        metadata: Default::default(),
    }
}

#[tokio::test]
async fn offline_generator_drives_a_full_file_page() {
    let mut graph = Graph::new();
    let graph_id = graph.add_node(file_node());
    let generator = OfflineTextGenerator::new();
    let cache = ResponseCache::new();

    let ctx = FileContext {
        path: "src/main.rs",
        language: None,
        symbols: &[],
        internal_deps: &[],
        external_deps: &[],
        notes: &[],
    };
    let input = FileGenerationInput {
        context: ctx,
        graph: &graph,
        file_node_id: graph_id,
        source_hash: "h1".to_string(),
    };

    let page = file::generate(&generator, &cache, &input).await.unwrap();
    assert!(page.content.starts_with("---"));
    assert_eq!(page.path, "files/src--main.rs.md");
}

#[tokio::test]
async fn offline_generator_drives_a_full_directory_page() {
    let generator = OfflineTextGenerator::new();
    let cache = ResponseCache::new();

    let breadcrumb = directory::breadcrumb_for("src");
    let ctx = DirectoryContext {
        path: "src",
        subdirectories: &[],
        files: &["main.rs".to_string()],
        child_purposes: &[],
        breadcrumb: &breadcrumb,
    };
    let input = DirectoryGenerationInput { context: ctx, source_hash: "h2".to_string() };

    let page = directory::generate(&generator, &cache, &input).await.unwrap();
    assert_eq!(page.path, "directories/src.md");
}

#[tokio::test]
async fn architecture_and_root_pages_compose() {
    let generator = OfflineTextGenerator::new();
    let graph = Graph::new();
    let synthesis = SynthesisMap::default();

    let arch_page = architecture::generate(&generator, &synthesis, &graph, "h3".to_string()).await.unwrap();
    assert_eq!(arch_page.path, "architecture.md");

    let root_page = root::generate(&generator, "canopy", &["src".to_string()], &[], "h4".to_string())
        .await
        .unwrap();
    assert_eq!(root_page.path, "root.md");
}
