//! Deterministic, offline [`TextGenerator`]: no network, no model weights —
//! templates a plausible page straight out of the facts already embedded in
//! the prompt by [`crate::prompts`]. Used when `canopy build --offline` is
//! passed, or as the default when no other generator is configured.

use crate::error::TransportError;
use crate::generator::TextGenerator;

pub struct OfflineTextGenerator;

impl OfflineTextGenerator {
    pub fn new() -> Self {
        OfflineTextGenerator
    }
}

impl Default for OfflineTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn field<'a>(prompt: &'a str, label: &str) -> Option<&'a str> {
    prompt
        .lines()
        .find(|line| line.starts_with(label))
        .map(|line| line[label.len()..].trim())
}

fn bullet_lines<'a>(prompt: &'a str, after_label: &str) -> Vec<&'a str> {
    let Some(start) = prompt.find(after_label) else {
        return Vec::new();
    };
    prompt[start + after_label.len()..]
        .lines()
        .take_while(|line| line.starts_with('-') || line.trim().is_empty())
        .filter(|line| line.starts_with('-'))
        .map(|line| line.trim_start_matches('-').trim())
        .collect()
}

fn render_file_page(prompt: &str) -> String {
    let path = field(prompt, "File: ").unwrap_or("unknown file");
    let symbols = bullet_lines(prompt, "Symbols:");
    let key_abstractions: Vec<&str> = symbols
        .iter()
        .map(|s| s.rsplit(' ').next().unwrap_or(s))
        .collect();

    let public_api = if symbols.is_empty() {
        "No symbols were extracted from this file.".to_string()
    } else {
        symbols.iter().map(|s| format!("- `{s}`")).collect::<Vec<_>>().join("\n")
    };

    format!(
        "---\npurpose: Implements {path}.\nlayer: utility\nkey_abstractions: {key_abstractions:?}\ninternal_deps: []\nexternal_deps: []\n---\n\n\
## Purpose\n\nThis file implements `{path}`.\n\n\
## Public API\n\n{public_api}\n\n\
## Internal Details\n\nGenerated offline; consult the source for full detail.\n\n\
## Dependencies\n\nSee the internal and external dependency lists above.\n\n\
## Usage Examples\n\nNo examples generated offline.\n"
    )
}

fn render_directory_page(prompt: &str) -> String {
    let path = field(prompt, "Directory: ").unwrap_or("unknown directory");
    let subdirs = field(prompt, "Subdirectories: ").unwrap_or("(none)");
    let files = field(prompt, "Files: ").unwrap_or("(none)");

    format!(
        "---\npurpose: Groups the contents of {path}.\ncontains: []\nrole_in_system: Supporting directory.\n---\n\n\
{path} groups related files and subdirectories.\n\n\
## Subdirectories\n\n| Name |\n|------|\n{subdir_rows}\n\n\
## Files\n\n| Name |\n|------|\n{file_rows}\n\n\
## Key Components\n\nGenerated offline; consult the source tree for full detail.\n\n\
## Dependencies\n\nNot determined offline.\n",
        subdir_rows = table_rows(subdirs),
        file_rows = table_rows(files),
    )
}

fn table_rows(csv: &str) -> String {
    if csv.trim() == "(none)" || csv.trim().is_empty() {
        return "| (none) |".to_string();
    }
    csv.split(',')
        .map(|s| format!("| {} |", s.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_architecture_page(prompt: &str) -> String {
    format!("## Architecture Overview\n\nGenerated offline from the layer synthesis map.\n\n{prompt}\n")
}

fn render_root_page(prompt: &str) -> String {
    let project = field(prompt, "Project: ").unwrap_or("this project");
    format!(
        "# {project}\n\nGenerated offline wiki home page.\n\n## Getting Around\n\nSee the directory pages for details.\n\n\
## Key Components\n\n{prompt}\n"
    )
}

#[async_trait::async_trait]
impl TextGenerator for OfflineTextGenerator {
    async fn generate(&self, prompt: &str, _system_prompt: &str) -> Result<String, TransportError> {
        if prompt.trim().is_empty() {
            return Err(TransportError::Empty);
        }
        let page = if prompt.starts_with("File: ") {
            render_file_page(prompt)
        } else if prompt.starts_with("Directory: ") {
            render_directory_page(prompt)
        } else if prompt.starts_with("Project: ") {
            render_root_page(prompt)
        } else {
            render_architecture_page(prompt)
        };
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::{file_page_prompt, FileContext};

    #[tokio::test]
    async fn generates_parseable_file_page() {
        let ctx = FileContext {
            path: "src/lib.rs",
            language: None,
            symbols: &[],
            internal_deps: &[],
            external_deps: &[],
            notes: &[],
        };
        let prompt = file_page_prompt(&ctx);
        let generator = OfflineTextGenerator::new();
        let output = generator.generate(&prompt, crate::prompts::SYSTEM_PROMPT).await.unwrap();
        assert!(output.starts_with("---"));
        assert!(output.contains("## Purpose"));
    }

    #[tokio::test]
    async fn rejects_empty_prompt() {
        let generator = OfflineTextGenerator::new();
        assert!(generator.generate("", "").await.is_err());
    }
}
