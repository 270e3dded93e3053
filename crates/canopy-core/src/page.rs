//! Page-level types shared between the signature layer and the generators:
//! the YAML summaries embedded in generated pages, the architecture
//! synthesis map, and the generated page artifact itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// YAML front-matter parsed out of a generated file page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    pub purpose: String,
    pub layer: Layer,
    #[serde(default)]
    pub key_abstractions: Vec<String>,
    #[serde(default)]
    pub internal_deps: Vec<String>,
    #[serde(default)]
    pub external_deps: Vec<String>,
}

impl FileSummary {
    pub fn fallback() -> Self {
        FileSummary {
            purpose: "Unknown".to_string(),
            layer: Layer::Utility,
            key_abstractions: Vec::new(),
            internal_deps: Vec::new(),
            external_deps: Vec::new(),
        }
    }
}

/// YAML front-matter parsed out of a generated directory page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorySummary {
    pub purpose: String,
    #[serde(default)]
    pub contains: Vec<String>,
    pub role_in_system: String,
}

impl DirectorySummary {
    pub fn fallback() -> Self {
        DirectorySummary {
            purpose: "Unknown".to_string(),
            contains: Vec::new(),
            role_in_system: "Unknown".to_string(),
        }
    }
}

/// The architectural layer a file or directory belongs to. Unknown values
/// returned by a generator are coerced to `Utility` with a logged warning —
/// see `Layer::coerce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Api,
    Domain,
    Infrastructure,
    Utility,
    Config,
    Test,
}

impl Layer {
    /// Parse a raw layer string, falling back to `Utility` for anything
    /// unrecognized. Returns whether a coercion happened.
    pub fn coerce(raw: &str) -> (Self, bool) {
        match raw.to_ascii_lowercase().as_str() {
            "api" => (Layer::Api, false),
            "domain" => (Layer::Domain, false),
            "infrastructure" => (Layer::Infrastructure, false),
            "utility" => (Layer::Utility, false),
            "config" => (Layer::Config, false),
            "test" => (Layer::Test, false),
            _ => (Layer::Utility, true),
        }
    }
}

/// Derived structure feeding the architecture generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesisMap {
    pub layers: HashMap<String, LayerSummary>,
    pub key_components: Vec<String>,
    /// Layer name -> layer names it depends on.
    pub dependency_graph: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerSummary {
    pub purpose: String,
    pub directories: Vec<String>,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageType {
    Root,
    Architecture,
    CodeHealth,
    File,
    Directory,
}

/// An in-memory documentation page produced by a generator, not yet
/// written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPage {
    pub content: String,
    pub page_type: PageType,
    /// Relative path under `wiki/`, e.g. `files/src--lib-rs.md`.
    pub path: String,
    /// The file or directory path this page documents, empty for root.
    pub target: String,
    pub word_count: usize,
    pub source_hash: String,
}

impl GeneratedPage {
    pub fn new(content: String, page_type: PageType, path: String, target: String, source_hash: String) -> Self {
        let word_count = content.split_whitespace().count();
        GeneratedPage {
            content,
            page_type,
            path,
            target,
            word_count,
            source_hash,
        }
    }
}

/// Companion metadata stored next to a page so the next build can decide
/// whether to regenerate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSidecar {
    pub source_hash: String,
    pub generated_at: DateTime<Utc>,
}

/// Convert a file or directory path into the slug used for its page path:
/// path separators become `--`, the empty (root directory) path becomes
/// `root`.
pub fn slug_for(target: &str) -> String {
    if target.is_empty() {
        "root".to_string()
    } else {
        target.replace(['/', '\\'], "--")
    }
}
