//! Build orchestrator (C6). Runs the pipeline in a fixed phase order —
//! Discover, Analyze, Files, Directories, Architecture, Commit — and never
//! lets a recoverable failure in one file or page abort the whole build.
//!
//! Files generate concurrently, bounded by `parallel_limit_local`.
//! Directories generate strictly sequentially, deepest first, so a parent's
//! prompt always sees every direct child's already-generated purpose.

use crate::error::{BuildFailure, CommitError};
use crate::graph_builder::{self, BuiltGraph};
use crate::walk;
use canopy_ai::generators::{architecture, directory, file, root};
use canopy_ai::prompts::{DirectoryContext, FileContext};
use canopy_ai::{ResponseCache, TextGenerator};
use canopy_core::page::slug_for;
use canopy_core::{
    deadcode, persist, signature, Config, DirectorySummary, EdgeKind, GeneratedPage, Graph, NoteScope, NotesQuery,
    PageType, SynthesisMap,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// `(phase, step, total, message)`.
pub type Progress<'a> = dyn Fn(&str, usize, usize, &str) + Send + Sync + 'a;

fn report_progress(progress: &Progress<'_>, phase: &str, step: usize, total: usize, message: &str) {
    progress(phase, step, total, message);
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub failures: Vec<BuildFailure>,
    pub pages_written: usize,
    pub pages_skipped: usize,
}

/// A directory's generated summary, keyed by its `/`-separated path
/// (`""` for the repository root). Kept as its own type rather than a bare
/// `HashMap` so the sequential directory loop reads clearly.
#[derive(Default)]
struct DirectorySummaries(HashMap<String, DirectorySummary>);

impl DirectorySummaries {
    fn get(&self, dir: &str) -> Option<&DirectorySummary> {
        self.0.get(dir)
    }

    fn insert(&mut self, dir: String, summary: DirectorySummary) {
        self.0.insert(dir, summary);
    }
}

fn depth(dir: &str) -> usize {
    if dir.is_empty() {
        0
    } else {
        dir.matches('/').count() + 1
    }
}

fn direct_subdirs<'a>(dir: &str, directories: &'a [String]) -> Vec<&'a str> {
    directories
        .iter()
        .filter(|d| graph_builder::parent_of(d).as_deref() == Some(dir))
        .map(String::as_str)
        .collect()
}

fn direct_files<'a>(root: &Path, dir: &str, files: &'a [PathBuf]) -> Vec<&'a PathBuf> {
    files
        .iter()
        .filter(|f| graph_builder::dir_of(root, f) == dir)
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string()
}

/// Run the full pipeline and return the pages staged for commit plus a
/// report of recoverable failures. Does not write anything outside the
/// content-addressed cache under `<root>/.canopy` — committing the pages to
/// disk is [`crate::staging::commit`]'s job.
pub async fn run_build(
    root: &Path,
    config: &Config,
    generator: Arc<dyn TextGenerator>,
    notes: Arc<dyn NotesQuery>,
    progress: &Progress<'_>,
) -> Result<(Vec<GeneratedPage>, BuildReport), CommitError> {
    let mut report = BuildReport::default();
    let mut pages = Vec::new();

    // ── Discover ─────────────────────────────────────────────
    report_progress(progress, "discover", 0, 1, "walking repository");
    let discovered = walk::discover_files(root, config);
    let directories = walk::directories_for(root, &discovered);

    let coordinator = canopy_indexer::Coordinator::new(config.parallel_limit_local);
    let discover = coordinator.run_full_index(discovered.clone()).await;
    for failure in &discover.failures {
        report.failures.push(BuildFailure::ParseFailed {
            path: failure.path.clone(),
            message: failure.message.clone(),
        });
    }
    report_progress(
        progress,
        "discover",
        1,
        1,
        &format!("{} files parsed, {} failed", discover.files.len(), discover.failures.len()),
    );

    // ── Analyze ──────────────────────────────────────────────
    report_progress(progress, "analyze", 0, 1, "building graph");
    let BuiltGraph {
        graph,
        file_node_ids,
        directory_node_ids: _,
    } = graph_builder::build_graph(root, &directories, &discover.files, &discover.symbols);
    persist::save_graph(&graph, root).map_err(CommitError::Persist)?;
    report_progress(
        progress,
        "analyze",
        1,
        1,
        &format!("{} nodes, {} edges", graph.node_count(), graph.edge_count()),
    );

    // ── Files ────────────────────────────────────────────────
    let cache = Arc::new(ResponseCache::new());
    let graph = Arc::new(graph);
    let total_files = discover.files.len();
    report_progress(progress, "files", 0, total_files, "generating file pages");

    let semaphore = Arc::new(Semaphore::new(config.parallel_limit_local.max(1)));
    let mut handles = Vec::with_capacity(total_files);
    for (path, extraction) in &discover.files {
        let Some(&file_id) = file_node_ids.get(path) else {
            continue;
        };
        let relative = path.strip_prefix(root).unwrap_or(path).to_string_lossy().replace('\\', "/");
        let symbols = extraction.nodes.clone();
        let generator = Arc::clone(&generator);
        let cache = Arc::clone(&cache);
        let graph = Arc::clone(&graph);
        let notes = Arc::clone(&notes);
        let semaphore = Arc::clone(&semaphore);
        let path = path.clone();
        let root = root.to_path_buf();
        let wiki_dir = config.wiki_dir.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
            let bytes = tokio::fs::read(&path).await.unwrap_or_default();
            let file_notes = notes.notes_for(NoteScope::File, &relative);
            let note_strings: Vec<String> = file_notes.iter().map(|n| n.content.clone()).collect();
            let source_hash = signature::file_signature(&bytes, &file_notes);
            let slug = slug_for(&relative);
            let page_path = format!("files/{slug}.md");

            let stored = persist::load_sidecar(&root, &slug).ok().flatten();
            let decision = signature::decide(&source_hash, stored.as_ref(), &file_notes);
            if decision == signature::Decision::Skip {
                if let Ok(existing) = tokio::fs::read_to_string(root.join(&wiki_dir).join(&page_path)).await {
                    let page = GeneratedPage::new(existing, PageType::File, page_path, relative.clone(), source_hash.clone());
                    return (relative, source_hash, Ok(page), true);
                }
            }

            let ctx = FileContext {
                path: &relative,
                language: symbols.first().and_then(|s| s.language),
                symbols: &symbols,
                internal_deps: &[],
                external_deps: &[],
                notes: &note_strings,
            };
            let input = file::FileGenerationInput {
                context: ctx,
                graph: graph.as_ref(),
                file_node_id: file_id,
                source_hash: source_hash.clone(),
            };
            let result = file::generate(generator.as_ref(), &cache, &input).await;
            (relative, source_hash, result, false)
        }));
    }

    let mut file_summaries: HashMap<String, canopy_core::FileSummary> = HashMap::new();
    let mut file_hashes: HashMap<String, String> = HashMap::new();
    let mut completed = 0usize;
    for handle in handles {
        completed += 1;
        match handle.await {
            Ok((relative, source_hash, Ok(page), skipped)) => {
                if let Ok((summary, _)) = canopy_ai::yaml::parse_file_summary(&page.content) {
                    file_summaries.insert(relative.clone(), summary);
                }
                file_hashes.insert(relative.clone(), source_hash.clone());
                if skipped {
                    report.pages_skipped += 1;
                } else {
                    let slug = slug_for(&relative);
                    let _ = persist::save_sidecar(
                        root,
                        &slug,
                        &canopy_core::PageSidecar {
                            source_hash,
                            generated_at: chrono::Utc::now(),
                        },
                    );
                    report.pages_written += 1;
                }
                pages.push(page);
            }
            Ok((relative, _, Err(err), _)) => {
                report.failures.push(BuildFailure::PageGenerationFailed {
                    target: relative,
                    message: err.to_string(),
                });
            }
            Err(join_error) => {
                report.failures.push(BuildFailure::PageGenerationFailed {
                    target: "<unknown>".to_string(),
                    message: format!("task panicked: {join_error}"),
                });
            }
        }
        report_progress(progress, "files", completed, total_files, "generating file pages");
    }

    // ── Directories ──────────────────────────────────────────
    let mut ordered: Vec<&String> = directories.iter().collect();
    ordered.sort_by(|a, b| depth(b).cmp(&depth(a)).then_with(|| a.cmp(b)));
    let total_dirs = ordered.len();
    report_progress(progress, "directories", 0, total_dirs, "generating directory pages");

    let mut summaries = DirectorySummaries::default();
    for (i, dir) in ordered.into_iter().enumerate() {
        let subdirs = direct_subdirs(dir, &directories);
        let files_here = direct_files(root, dir, &discovered);

        let child_purposes: Vec<(String, String)> = subdirs
            .iter()
            .filter_map(|d| summaries.get(d).map(|s| (d.to_string(), s.purpose.clone())))
            .collect();

        let subdir_names: Vec<String> = subdirs.iter().map(|s| s.to_string()).collect();
        let file_names: Vec<String> = files_here.iter().map(|f| file_name(f)).collect();
        let breadcrumb = directory::breadcrumb_for(dir);
        let ctx = DirectoryContext {
            path: dir,
            subdirectories: &subdir_names,
            files: &file_names,
            child_purposes: &child_purposes,
            breadcrumb: &breadcrumb,
        };

        let dir_notes = notes.notes_for(NoteScope::Directory, dir);
        let direct_file_sigs = files_here
            .iter()
            .filter_map(|f| {
                let relative = f.strip_prefix(root).unwrap_or(f).to_string_lossy().replace('\\', "/");
                file_hashes.get(&relative).map(|hash| signature::DirectFile {
                    name: file_name(f),
                    content_hash: hash.clone(),
                })
            })
            .collect();
        let child_sigs = subdirs
            .iter()
            .filter_map(|d| {
                summaries.get(d).map(|s| signature::ChildDirectory {
                    path: d.to_string(),
                    purpose: s.purpose.clone(),
                })
            })
            .collect();
        let source_hash = signature::directory_signature(direct_file_sigs, child_sigs);
        let slug = slug_for(dir);
        let page_path = format!("directories/{slug}.md");

        let stored = persist::load_sidecar(root, &slug).ok().flatten();
        let decision = signature::decide(&source_hash, stored.as_ref(), &dir_notes);
        let carried_forward = if decision == signature::Decision::Skip {
            std::fs::read_to_string(root.join(&config.wiki_dir).join(&page_path)).ok()
        } else {
            None
        };

        let outcome: Result<(GeneratedPage, bool), canopy_ai::GenerateError> = if let Some(existing) = carried_forward {
            Ok((
                GeneratedPage::new(existing, PageType::Directory, page_path, dir.clone(), source_hash.clone()),
                true,
            ))
        } else {
            let input = directory::DirectoryGenerationInput { context: ctx, source_hash: source_hash.clone() };
            directory::generate(generator.as_ref(), &cache, &input).await.map(|page| (page, false))
        };

        match outcome {
            Ok((page, skipped)) => {
                summaries.insert(dir.clone(), DirectorySummary {
                    purpose: canopy_ai::yaml::parse_directory_summary(&page.content)
                        .map(|(s, _)| s.purpose)
                        .unwrap_or_else(|_| "Unknown".to_string()),
                    contains: Vec::new(),
                    role_in_system: String::new(),
                });
                if skipped {
                    report.pages_skipped += 1;
                } else {
                    let _ = persist::save_sidecar(
                        root,
                        &slug,
                        &canopy_core::PageSidecar { source_hash, generated_at: chrono::Utc::now() },
                    );
                    report.pages_written += 1;
                }
                pages.push(page);
            }
            Err(err) => {
                report.failures.push(BuildFailure::PageGenerationFailed {
                    target: dir.clone(),
                    message: err.to_string(),
                });
            }
        }
        report_progress(progress, "directories", i + 1, total_dirs, dir);
    }

    // ── Architecture ─────────────────────────────────────────
    report_progress(progress, "architecture", 0, 1, "synthesizing architecture");
    let synthesis = build_synthesis(root, &graph, &file_summaries);
    let synthesis_hash =
        signature::architecture_signature(&synthesis).map_err(|e| CommitError::Serialize(e.to_string()))?;

    match architecture::generate(generator.as_ref(), &synthesis, &graph, synthesis_hash.clone()).await {
        Ok(page) => {
            pages.push(page);
            report.pages_written += 1;
        }
        Err(err) => report.failures.push(BuildFailure::PageGenerationFailed {
            target: "architecture".to_string(),
            message: err.to_string(),
        }),
    }

    let candidates = deadcode::find_review_candidates(&graph, &deadcode::DefaultTestFileHeuristic);
    pages.push(render_code_health_page(&candidates, &synthesis_hash));
    report.pages_written += 1;

    let top_level_dirs: Vec<String> = direct_subdirs("", &directories).into_iter().map(str::to_string).collect();
    let project_name = root.file_name().and_then(|n| n.to_str()).unwrap_or("project").to_string();
    match root::generate(generator.as_ref(), &project_name, &top_level_dirs, &synthesis.key_components, synthesis_hash).await {
        Ok(page) => {
            pages.push(page);
            report.pages_written += 1;
        }
        Err(err) => report.failures.push(BuildFailure::PageGenerationFailed {
            target: "root".to_string(),
            message: err.to_string(),
        }),
    }
    report_progress(progress, "architecture", 1, 1, "architecture, code health, and root pages generated");

    Ok((pages, report))
}

fn build_synthesis(root: &Path, graph: &Graph, file_summaries: &HashMap<String, canopy_core::FileSummary>) -> SynthesisMap {
    use canopy_core::page::LayerSummary;

    let mut layers: HashMap<String, LayerSummary> = HashMap::new();
    let mut file_layer: HashMap<PathBuf, String> = HashMap::new();

    for (path, summary) in file_summaries {
        let key = format!("{:?}", summary.layer).to_lowercase();
        let dir = graph_builder::dir_of(root, Path::new(path));
        let entry = layers.entry(key.clone()).or_insert_with(|| LayerSummary {
            purpose: summary.purpose.clone(),
            directories: Vec::new(),
            files: Vec::new(),
        });
        if !entry.directories.contains(&dir) {
            entry.directories.push(dir);
        }
        entry.files.push(path.clone());
        file_layer.insert(root.join(path), key);
    }

    let mut dependency_graph: HashMap<String, Vec<String>> = HashMap::new();
    for edge in graph.all_edges() {
        if !matches!(edge.kind, EdgeKind::Imports | EdgeKind::Calls | EdgeKind::TypeReference) {
            continue;
        }
        let (Some(source_node), Some(target_node)) = (graph.node(edge.source), graph.node(edge.target)) else {
            continue;
        };
        let (Some(source_layer), Some(target_layer)) =
            (file_layer.get(&source_node.file_path), file_layer.get(&target_node.file_path))
        else {
            continue;
        };
        if source_layer == target_layer {
            continue;
        }
        let deps = dependency_graph.entry(source_layer.clone()).or_default();
        if !deps.contains(target_layer) {
            deps.push(target_layer.clone());
        }
    }

    let mut key_components: Vec<String> = graph
        .entry_points()
        .into_iter()
        .filter_map(|id| graph.node(id).map(|n| n.qualified_name.clone()))
        .collect();
    key_components.sort();
    key_components.truncate(10);

    SynthesisMap { layers, key_components, dependency_graph }
}

fn render_code_health_page(candidates: &canopy_core::deadcode::ReviewCandidates, source_hash: &str) -> GeneratedPage {
    let mut content = String::from("# Code Health\n\nReview candidates with no detected callers, for a human to confirm before removal.\n\n");
    content.push_str(&render_candidate_section("Functions", &candidates.functions));
    content.push_str(&render_candidate_section("Classes", &candidates.classes));
    content.push_str(&render_candidate_section("Variables", &candidates.variables));
    GeneratedPage::new(content, PageType::CodeHealth, "code-health.md".to_string(), String::new(), source_hash.to_string())
}

fn render_candidate_section(title: &str, items: &[canopy_core::deadcode::ReviewCandidate]) -> String {
    if items.is_empty() {
        return format!("## {title}\n\nNone found.\n\n");
    }
    let mut section = format!("## {title}\n\n");
    for candidate in items {
        section.push_str(&format!(
            "- `{}` in {}\n",
            candidate.node.qualified_name,
            candidate.node.file_path.display()
        ));
    }
    section.push('\n');
    section
}
