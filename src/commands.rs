//! CLI command implementations: `build`, `index`, `clear`, `doctor`.

use crate::orchestrator;
use crate::staging;
use anyhow::Context;
use canopy_ai::{OfflineTextGenerator, TextGenerator};
use canopy_core::{Config, NotesQuery, NullNotesQuery};
use std::path::PathBuf;
use std::sync::Arc;

fn load_config(root: &PathBuf) -> anyhow::Result<Config> {
    Config::load(&root.join(".canopy/config.toml")).context("loading configuration")
}

fn progress_logger() -> impl Fn(&str, usize, usize, &str) + Send + Sync {
    |phase, step, total, message| {
        tracing::info!(phase, step, total, "{message}");
    }
}

pub async fn build(root: PathBuf, wiki_dir: Option<String>, offline: bool) -> anyhow::Result<()> {
    let mut config = load_config(&root)?;
    if let Some(dir) = wiki_dir {
        config.wiki_dir = dir;
    }
    if !offline {
        tracing::warn!("no cloud TextGenerator is bundled; falling back to the offline generator");
    }

    let generator: Arc<dyn TextGenerator> = Arc::new(OfflineTextGenerator::new());
    let notes: Arc<dyn NotesQuery> = Arc::new(NullNotesQuery);
    let progress = progress_logger();

    let (pages, report) = orchestrator::run_build(&root, &config, generator, notes, &progress)
        .await
        .context("running build pipeline")?;

    staging::commit(&root, &config, &pages).context("committing staged wiki")?;

    tracing::info!(
        pages_written = report.pages_written,
        pages_skipped = report.pages_skipped,
        failures = report.failures.len(),
        "build complete"
    );
    for failure in &report.failures {
        tracing::warn!("{failure}");
    }

    Ok(())
}

pub async fn index(root: PathBuf) -> anyhow::Result<()> {
    let config = load_config(&root)?;
    let discovered = crate::walk::discover_files(&root, &config);
    let directories = crate::walk::directories_for(&root, &discovered);

    let coordinator = canopy_indexer::Coordinator::new(config.parallel_limit_local);
    let discover = coordinator.run_full_index(discovered).await;

    let built = crate::graph_builder::build_graph(&root, &directories, &discover.files, &discover.symbols);
    canopy_core::persist::save_graph(&built.graph, &root).context("persisting graph cache")?;

    tracing::info!(
        nodes = built.graph.node_count(),
        edges = built.graph.edge_count(),
        parse_failures = discover.failures.len(),
        "index complete"
    );
    for failure in &discover.failures {
        tracing::warn!(path = %failure.path.display(), "{}", failure.message);
    }

    Ok(())
}

pub fn clear(root: PathBuf) -> anyhow::Result<()> {
    canopy_core::persist::clear_cache(&root).context("clearing cache")?;
    tracing::info!("cache cleared");
    Ok(())
}

/// Read-only staleness report: compares every page sidecar against the
/// current source tree without writing anything.
pub async fn doctor(root: PathBuf) -> anyhow::Result<()> {
    let config = load_config(&root)?;
    let wiki_dir = root.join(&config.wiki_dir);
    if !wiki_dir.exists() {
        println!("no wiki found at {} — run `canopy build` first", wiki_dir.display());
        return Ok(());
    }

    let discovered = crate::walk::discover_files(&root, &config);
    let mut stale = Vec::new();
    let mut fresh = 0usize;

    for path in &discovered {
        let relative = path.strip_prefix(&root).unwrap_or(path).to_string_lossy().replace('\\', "/");
        let slug = canopy_core::page::slug_for(&relative);
        let bytes = std::fs::read(path).unwrap_or_default();
        let current_hash = canopy_core::signature::file_signature(&bytes, &[]);
        let stored = canopy_core::persist::load_sidecar(&root, &slug)?;

        match canopy_core::signature::decide(&current_hash, stored.as_ref(), &[]) {
            canopy_core::signature::Decision::Skip => fresh += 1,
            canopy_core::signature::Decision::Regenerate => stale.push(relative),
        }
    }

    println!("{fresh} pages up to date, {} stale", stale.len());
    for path in &stale {
        println!("  stale: {path}");
    }

    Ok(())
}
