//! Prompt templates for the four page generators (C5). Each builder emits a
//! prompt that asks for a leading YAML block (schema matching
//! [`canopy_core::FileSummary`] or [`canopy_core::DirectorySummary`])
//! followed by a markdown body with a fixed section order — the shape
//! [`crate::yaml`] and the generators expect back.

use canopy_core::{GraphNode, Language, SynthesisMap};

pub const SYSTEM_PROMPT: &str = "You are a senior engineer writing internal documentation for a codebase. \
Be precise, avoid speculation, and never invent APIs that aren't in the provided context. \
Always begin your response with a YAML block (--- delimited) matching the requested schema, \
followed by the markdown body.";

/// Everything the file-page generator knows about one file.
pub struct FileContext<'a> {
    pub path: &'a str,
    pub language: Option<Language>,
    pub symbols: &'a [GraphNode],
    pub internal_deps: &'a [String],
    pub external_deps: &'a [String],
    pub notes: &'a [String],
}

pub fn file_page_prompt(ctx: &FileContext<'_>) -> String {
    let lang = ctx
        .language
        .map(|l| format!("{l:?}"))
        .unwrap_or_else(|| "unknown".to_string());

    let symbols = if ctx.symbols.is_empty() {
        "(none extracted)".to_string()
    } else {
        ctx.symbols
            .iter()
            .map(|s| format!("- {:?} {}", s.kind, s.qualified_name))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let notes = if ctx.notes.is_empty() {
        "(none)".to_string()
    } else {
        ctx.notes.join("\n")
    };

    format!(
        "File: {path}\nLanguage: {lang}\nSymbols:\n{symbols}\nInternal dependencies: {internal:?}\nExternal dependencies: {external:?}\nNotes:\n{notes}\n\n\
Produce a YAML block with keys `purpose` (one sentence), `layer` (one of api, domain, infrastructure, utility, config, test), \
`key_abstractions` (list of symbol names), `internal_deps` (list), `external_deps` (list). \
Then write the body with these sections in order: \
## Purpose, ## Public API, ## Internal Details, ## Dependencies, ## Usage Examples.",
        path = ctx.path,
        internal = ctx.internal_deps,
        external = ctx.external_deps,
    )
}

/// Everything the directory-page generator knows about one directory.
pub struct DirectoryContext<'a> {
    pub path: &'a str,
    pub subdirectories: &'a [String],
    pub files: &'a [String],
    pub child_purposes: &'a [(String, String)],
    /// Pre-rendered markdown breadcrumb (see
    /// [`crate::generators::directory::breadcrumb_for`]); computed
    /// deterministically rather than by the model so its links always resolve.
    pub breadcrumb: &'a str,
}

pub fn directory_page_prompt(ctx: &DirectoryContext<'_>) -> String {
    let subdirs = if ctx.subdirectories.is_empty() {
        "(none)".to_string()
    } else {
        ctx.subdirectories.join(", ")
    };
    let files = if ctx.files.is_empty() {
        "(none)".to_string()
    } else {
        ctx.files.join(", ")
    };
    let child_summaries = ctx
        .child_purposes
        .iter()
        .map(|(name, purpose)| format!("- {name}: {purpose}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Directory: {path}\nBreadcrumb: {breadcrumb}\nSubdirectories: {subdirs}\nFiles: {files}\nChild directory purposes:\n{child_summaries}\n\n\
Produce a YAML block with keys `purpose` (one sentence), `contains` (list of notable file or subdirectory names), \
`role_in_system` (one sentence). Then write the body: an overview paragraph, a subdirectories table, a files table, \
a Key Components section, and a Dependencies section.",
        path = ctx.path,
        breadcrumb = ctx.breadcrumb,
    )
}

pub fn architecture_prompt(synthesis: &SynthesisMap) -> String {
    let mut layer_names: Vec<&String> = synthesis.layers.keys().collect();
    layer_names.sort();
    let layers = layer_names
        .iter()
        .map(|name| format!("- {name}: {}", synthesis.layers[*name].purpose))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Layers:\n{layers}\nKey components: {components:?}\n\n\
Write a markdown architecture overview describing how these layers relate, referencing the key components.",
        components = synthesis.key_components,
    )
}

pub fn root_prompt(project_name: &str, top_level_dirs: &[String], key_components: &[String]) -> String {
    format!(
        "Project: {project_name}\nTop-level directories: {top_level_dirs:?}\nKey components: {key_components:?}\n\n\
Write the wiki home page: a one-paragraph project summary, a \"Getting Around\" section linking the top-level \
directories, and a \"Key Components\" section."
    )
}
