//! Root (wiki home) page generator: derived from project metadata and the
//! already-generated architecture page, with its own short prompt for the
//! summary prose.

use crate::error::GenerateError;
use crate::generator::TextGenerator;
use crate::prompts::{root_prompt, SYSTEM_PROMPT};
use canopy_core::{GeneratedPage, PageType};

pub async fn generate(
    generator: &dyn TextGenerator,
    project_name: &str,
    top_level_dirs: &[String],
    key_components: &[String],
    source_hash: String,
) -> Result<GeneratedPage, GenerateError> {
    let prompt = root_prompt(project_name, top_level_dirs, key_components);
    let body = generator.generate(&prompt, SYSTEM_PROMPT).await?;

    Ok(GeneratedPage::new(
        body.trim().to_string(),
        PageType::Root,
        "root.md".to_string(),
        "".to_string(),
        source_hash,
    ))
}
