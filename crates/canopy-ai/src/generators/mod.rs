//! Page generators (C5): file, directory, architecture, and root-page
//! generation, all sharing the prompt → generate → parse-with-retry →
//! fallback pipeline described in `generate_yaml_page`.

pub mod architecture;
pub mod directory;
pub mod file;
pub mod root;

use crate::error::GenerateError;
use crate::generator::TextGenerator;
use crate::yaml::{parse_directory_summary, parse_file_summary};
use canopy_core::{DirectorySummary, FileSummary};

/// A YAML-backed page schema that has a defined fallback when two
/// generation attempts both fail to parse.
pub trait FallbackSummary: Sized {
    fn fallback() -> Self;
}

impl FallbackSummary for FileSummary {
    fn fallback() -> Self {
        FileSummary::fallback()
    }
}

impl FallbackSummary for DirectorySummary {
    fn fallback() -> Self {
        DirectorySummary::fallback()
    }
}

/// Call `generator`, parse the leading YAML block with `parse`, retrying
/// once on parse failure and falling back to `T::fallback()` if the retry
/// also fails to parse. Transport errors are never retried — they propagate
/// immediately.
async fn generate_yaml_page<T, P>(
    generator: &dyn TextGenerator,
    prompt: &str,
    system_prompt: &str,
    parse: P,
) -> Result<(T, String), GenerateError>
where
    T: FallbackSummary,
    P: Fn(&str) -> Result<(T, String), crate::error::YamlParseFailure>,
{
    let raw = generator.generate(prompt, system_prompt).await?;
    match parse(&raw) {
        Ok(parsed) => Ok(parsed),
        Err(first_err) => {
            tracing::warn!(error = %first_err, "page YAML block failed to parse, retrying once");
            let retry = generator.generate(prompt, system_prompt).await?;
            match parse(&retry) {
                Ok(parsed) => Ok(parsed),
                Err(second_err) => {
                    tracing::error!(error = %second_err, "page YAML block failed to parse after retry, using fallback summary");
                    Ok((T::fallback(), retry))
                }
            }
        }
    }
}

async fn generate_file_yaml(
    generator: &dyn TextGenerator,
    prompt: &str,
    system_prompt: &str,
) -> Result<(FileSummary, String), GenerateError> {
    generate_yaml_page(generator, prompt, system_prompt, parse_file_summary).await
}

async fn generate_directory_yaml(
    generator: &dyn TextGenerator,
    prompt: &str,
    system_prompt: &str,
) -> Result<(DirectorySummary, String), GenerateError> {
    generate_yaml_page(generator, prompt, system_prompt, parse_directory_summary).await
}
