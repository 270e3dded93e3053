//! Directory-page generator: breadcrumb, direct file/child-directory
//! tables, then prompt → generate → parse-or-fallback.

use crate::cache::ResponseCache;
use crate::error::GenerateError;
use crate::generator::TextGenerator;
use crate::prompts::{directory_page_prompt, DirectoryContext, SYSTEM_PROMPT};
use canopy_core::page::slug_for;
use canopy_core::{DirectorySummary, GeneratedPage, PageType};

pub struct DirectoryGenerationInput<'a> {
    pub context: DirectoryContext<'a>,
    pub source_hash: String,
}

pub async fn generate(
    generator: &dyn TextGenerator,
    cache: &ResponseCache,
    input: &DirectoryGenerationInput<'_>,
) -> Result<GeneratedPage, GenerateError> {
    let cache_key = format!("directory:{}", input.context.path);
    if let Some(cached) = cache.get(&cache_key, &input.source_hash) {
        return Ok(finish_page(input.context.path, cached, input.source_hash.clone()));
    }

    let prompt = directory_page_prompt(&input.context);
    let (summary, body) = super::generate_directory_yaml(generator, &prompt, SYSTEM_PROMPT).await?;

    let content = render(&summary, body, input.context.breadcrumb);
    cache.put(cache_key, input.source_hash.clone(), content.clone());
    Ok(finish_page(input.context.path, content, input.source_hash.clone()))
}

fn render(summary: &DirectorySummary, body: &str, breadcrumb: &str) -> String {
    let front = serde_yaml::to_string(summary).unwrap_or_default();
    format!("---\n{front}---\n\n{breadcrumb}\n\n{}\n", body.trim())
}

/// Markdown breadcrumb for a directory page: `[Home](../root.md)` plus up to
/// 3 ancestor links and the current directory name (unlinked). Deeper than 4
/// levels, the middle collapses into a single `…` so the trail stays short.
pub fn breadcrumb_for(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let home = "[Home](../root.md)".to_string();
    if segments.is_empty() {
        return home;
    }

    let ancestor_link = |upto: usize| -> String {
        let cumulative = segments[..upto].join("/");
        format!("[{}]({}.md)", segments[upto - 1], slug_for(&cumulative))
    };

    let depth = segments.len();
    let mut parts = vec![home];
    if depth <= 4 {
        for i in 1..depth {
            parts.push(ancestor_link(i));
        }
    } else {
        parts.push(ancestor_link(1));
        parts.push("…".to_string());
        parts.push(ancestor_link(depth - 1));
    }
    parts.push(segments[depth - 1].to_string());
    parts.join(" / ")
}

fn finish_page(path: &str, content: String, source_hash: String) -> GeneratedPage {
    let slug = slug_for(path);
    GeneratedPage::new(content, PageType::Directory, format!("directories/{slug}.md"), path.to_string(), source_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::OfflineTextGenerator;

    #[tokio::test]
    async fn generates_root_directory_page() {
        let breadcrumb = breadcrumb_for("");
        let ctx = DirectoryContext {
            path: "",
            subdirectories: &["src".to_string()],
            files: &["Cargo.toml".to_string()],
            child_purposes: &[("src".to_string(), "library source".to_string())],
            breadcrumb: &breadcrumb,
        };
        let input = DirectoryGenerationInput { context: ctx, source_hash: "hash-1".to_string() };
        let generator = OfflineTextGenerator::new();
        let cache = ResponseCache::new();

        let page = generate(&generator, &cache, &input).await.unwrap();
        assert_eq!(page.path, "directories/root.md");
        assert!(page.content.contains("Subdirectories"));
        assert!(page.content.contains("[Home](../root.md)"));
    }

    #[test]
    fn breadcrumb_shows_all_ancestors_up_to_depth_four() {
        let crumb = breadcrumb_for("src/components/ui");
        assert_eq!(
            crumb,
            "[Home](../root.md) / [src](src.md) / [components](src--components.md) / ui"
        );
    }

    #[test]
    fn breadcrumb_truncates_middle_past_depth_four() {
        let crumb = breadcrumb_for("src/components/ui/buttons/icons");
        assert_eq!(
            crumb,
            "[Home](../root.md) / [src](src.md) / … / [buttons](src--components--ui--buttons.md) / icons"
        );
        assert!(crumb.contains('…'));
    }
}
