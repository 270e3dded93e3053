//! Architecture-page generator: no YAML schema (it isn't per-file or
//! per-directory), just a prompt built from the full `SynthesisMap` and the
//! three deterministic diagrams appended underneath.

use crate::error::GenerateError;
use crate::generator::TextGenerator;
use crate::prompts::{architecture_prompt, SYSTEM_PROMPT};
use canopy_core::{diagram, GeneratedPage, Graph, PageType, SynthesisMap};

const FILE_DEPENDENCY_DIAGRAM_NODE_CAP: usize = 30;

pub async fn generate(
    generator: &dyn TextGenerator,
    synthesis: &SynthesisMap,
    graph: &Graph,
    source_hash: String,
) -> Result<GeneratedPage, GenerateError> {
    let prompt = architecture_prompt(synthesis);
    let body = generator.generate(&prompt, SYSTEM_PROMPT).await?;

    let mut content = format!("{}\n\n## Generated Diagrams\n", body.trim());
    append_diagram(&mut content, "Layer Diagram", &diagram::layer_diagram(synthesis));
    append_diagram(
        &mut content,
        "File Dependency Diagram",
        &diagram::file_dependency_diagram(graph, FILE_DEPENDENCY_DIAGRAM_NODE_CAP),
    );
    append_diagram(&mut content, "Class Diagram", &diagram::class_diagram(graph));

    Ok(GeneratedPage::new(
        content,
        PageType::Architecture,
        "architecture.md".to_string(),
        "".to_string(),
        source_hash,
    ))
}

fn append_diagram(content: &mut String, title: &str, diagram_text: &str) {
    if diagram::validate(diagram_text).valid {
        content.push_str(&format!("\n### {title}\n\n```mermaid\n{diagram_text}\n```\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::OfflineTextGenerator;

    #[tokio::test]
    async fn produces_architecture_page_with_diagrams_section() {
        let synthesis = SynthesisMap::default();
        let graph = Graph::new();
        let generator = OfflineTextGenerator::new();

        let page = generate(&generator, &synthesis, &graph, "hash".to_string()).await.unwrap();
        assert_eq!(page.path, "architecture.md");
        assert!(page.content.contains("Generated Diagrams"));
    }
}
