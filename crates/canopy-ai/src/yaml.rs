//! Parsing the leading YAML block out of a generator's markdown output.
//!
//! Generators are instructed to open with either a `---` frontmatter block
//! or a fenced ```yaml block; either is accepted so a retry that changes
//! style doesn't spuriously fail.

use crate::error::YamlParseFailure;
use canopy_core::{DirectorySummary, FileSummary};
use serde::de::DeserializeOwned;

/// Split `markdown` into its leading YAML block and the remaining body.
fn split_yaml_block(markdown: &str) -> Option<(&str, &str)> {
    let trimmed = markdown.trim_start();

    if let Some(rest) = trimmed.strip_prefix("```yaml") {
        let end = rest.find("```")?;
        return Some((rest[..end].trim(), rest[end + 3..].trim_start_matches(['\n', '\r'])));
    }

    if let Some(rest) = trimmed.strip_prefix("---") {
        let rest = rest.trim_start_matches(['\n', '\r']);
        let end = rest.find("\n---")?;
        let after = &rest[end + 4..];
        return Some((&rest[..end], after.trim_start_matches(['\n', '\r'])));
    }

    None
}

fn parse_block<T: DeserializeOwned>(markdown: &str) -> Result<(T, String), YamlParseFailure> {
    let (yaml, body) = split_yaml_block(markdown).ok_or(YamlParseFailure::Missing)?;
    let value = serde_yaml::from_str(yaml).map_err(YamlParseFailure::Invalid)?;
    Ok((value, body.to_string()))
}

/// Parse a file page's leading YAML block, returning the summary and the
/// markdown body that follows it.
pub fn parse_file_summary(markdown: &str) -> Result<(FileSummary, String), YamlParseFailure> {
    parse_block(markdown)
}

/// Parse a directory page's leading YAML block.
pub fn parse_directory_summary(markdown: &str) -> Result<(DirectorySummary, String), YamlParseFailure> {
    parse_block(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frontmatter_style() {
        let md = "---\npurpose: parses widgets\nlayer: domain\n---\n\n## Purpose\n\nIt parses widgets.\n";
        let (summary, body) = parse_file_summary(md).unwrap();
        assert_eq!(summary.purpose, "parses widgets");
        assert!(body.contains("## Purpose"));
    }

    #[test]
    fn parses_fenced_yaml_style() {
        let md = "```yaml\npurpose: handles requests\nlayer: api\n```\n\n## Purpose\n\nHandles requests.\n";
        let (summary, body) = parse_file_summary(md).unwrap();
        assert_eq!(summary.purpose, "handles requests");
        assert!(body.contains("Handles requests"));
    }

    #[test]
    fn missing_block_is_an_error() {
        let md = "## Purpose\n\nNo frontmatter here.\n";
        assert!(matches!(parse_file_summary(md), Err(YamlParseFailure::Missing)));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let md = "---\npurpose: [unterminated\n---\nbody\n";
        assert!(matches!(parse_file_summary(md), Err(YamlParseFailure::Invalid(_))));
    }

    #[test]
    fn parses_directory_summary() {
        let md = "---\npurpose: groups request handlers\ncontains: [routes.rs, middleware.rs]\nrole_in_system: api surface\n---\n\nOverview text.\n";
        let (summary, body) = parse_directory_summary(md).unwrap();
        assert_eq!(summary.contains, vec!["routes.rs".to_string(), "middleware.rs".to_string()]);
        assert!(body.contains("Overview"));
    }
}
