//! File-page generator: prompt, generate, parse-or-fallback, then append
//! a class diagram (if the file defines any classes) and a focused
//! dependency diagram.

use crate::cache::ResponseCache;
use crate::error::GenerateError;
use crate::generator::TextGenerator;
use crate::prompts::{file_page_prompt, FileContext, SYSTEM_PROMPT};
use canopy_core::page::slug_for;
use canopy_core::{diagram, FileSummary, GeneratedPage, Graph, NodeId, NodeKind, PageType};

pub struct FileGenerationInput<'a> {
    pub context: FileContext<'a>,
    pub graph: &'a Graph,
    pub file_node_id: NodeId,
    pub source_hash: String,
}

const FOCUSED_DIAGRAM_NODE_CAP: usize = 15;

pub async fn generate(
    generator: &dyn TextGenerator,
    cache: &ResponseCache,
    input: &FileGenerationInput<'_>,
) -> Result<GeneratedPage, GenerateError> {
    let cache_key = format!("file:{}", input.context.path);
    if let Some(cached) = cache.get(&cache_key, &input.source_hash) {
        return Ok(finish_page(input.context.path, cached, input.source_hash.clone()));
    }

    let prompt = file_page_prompt(&input.context);
    let (summary, body) = super::generate_file_yaml(generator, &prompt, SYSTEM_PROMPT).await?;

    let mut content = render(&summary, &body);

    if input.context.symbols.iter().any(|s| s.kind == NodeKind::Class) {
        append_diagram(&mut content, "Class Diagram", &diagram::class_diagram(input.graph));
    }
    append_diagram(
        &mut content,
        "Dependency Diagram",
        &diagram::focused_dependency_diagram(input.graph, input.file_node_id, FOCUSED_DIAGRAM_NODE_CAP),
    );

    cache.put(cache_key, input.source_hash.clone(), content.clone());
    Ok(finish_page(input.context.path, content, input.source_hash.clone()))
}

fn render(summary: &FileSummary, body: &str) -> String {
    let front = serde_yaml::to_string(summary).unwrap_or_default();
    format!("---\n{front}---\n\n{}\n", body.trim())
}

/// Diagrams that fail structural validation are dropped silently.
fn append_diagram(content: &mut String, title: &str, diagram_text: &str) {
    if diagram::validate(diagram_text).valid {
        content.push_str(&format!("\n\n## {title}\n\n```mermaid\n{diagram_text}\n```\n"));
    }
}

fn finish_page(path: &str, content: String, source_hash: String) -> GeneratedPage {
    let slug = slug_for(path);
    GeneratedPage::new(content, PageType::File, format!("files/{slug}.md"), path.to_string(), source_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::OfflineTextGenerator;
    use canopy_core::{GraphNode, Language, NodeKind};
    use std::path::PathBuf;

    fn sample_node() -> GraphNode {
        GraphNode {
            id: NodeId::new(&PathBuf::from("src/lib.rs"), NodeKind::Function, "src/lib.rs::run"),
            kind: NodeKind::Function,
            name: "run".to_string(),
            qualified_name: "src/lib.rs::run".to_string(),
            file_path: PathBuf::from("src/lib.rs"),
            line_start: Some(1),
            line_end: Some(5),
            language: Some(Language::Rust),
            is_container: false,
            child_count: 0,
            loc: Some(4),
            is_entry_point: false,
            docstring: None,
            signature: None,
            parent: None,
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn generates_and_caches_file_page() {
        let mut graph = Graph::new();
        let node = sample_node();
        let graph_id = graph.add_node(node.clone());
        let ctx = FileContext {
            path: "src/lib.rs",
            language: Some(Language::Rust),
            symbols: std::slice::from_ref(&node),
            internal_deps: &[],
            external_deps: &[],
            notes: &[],
        };
        let input = FileGenerationInput {
            context: ctx,
            graph: &graph,
            file_node_id: graph_id,
            source_hash: "hash-1".to_string(),
        };
        let generator = OfflineTextGenerator::new();
        let cache = ResponseCache::new();

        let page = generate(&generator, &cache, &input).await.unwrap();
        assert_eq!(page.path, "files/src--lib.rs.md");
        assert!(page.content.starts_with("---"));
        assert_eq!(cache.len(), 1);

        let page2 = generate(&generator, &cache, &input).await.unwrap();
        assert_eq!(page2.content, page.content);
    }
}
