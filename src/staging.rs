//! Atomic staging and commit (C7): a build writes every page into a shadow
//! staging directory, then swaps it into place only once every page has
//! been written successfully. At no observable moment does the live wiki
//! contain a mix of old and new page content — a failure partway through
//! staging deletes the staging directory and leaves the live wiki
//! untouched.

use crate::error::CommitError;
use canopy_core::{Config, GeneratedPage};
use std::path::{Path, PathBuf};

fn staging_path(root: &Path, config: &Config) -> PathBuf {
    root.join(&config.staging_dir)
}

fn live_path(root: &Path, config: &Config) -> PathBuf {
    root.join(&config.wiki_dir)
}

fn backup_path(root: &Path, config: &Config) -> PathBuf {
    root.join(format!("{}.backup", config.wiki_dir))
}

/// Write `pages` into the staging directory and, if every write succeeds,
/// atomically swap it into the live wiki directory. Any failure removes the
/// staging directory and returns without touching the live wiki.
pub fn commit(root: &Path, config: &Config, pages: &[GeneratedPage]) -> Result<(), CommitError> {
    let staging = staging_path(root, config);

    match write_staging(&staging, pages) {
        Ok(()) => {}
        Err(err) => {
            let _ = std::fs::remove_dir_all(&staging);
            return Err(err);
        }
    }

    if let Err(err) = swap_into_place(root, config) {
        let _ = std::fs::remove_dir_all(&staging);
        return Err(err);
    }

    Ok(())
}

fn write_staging(staging: &Path, pages: &[GeneratedPage]) -> Result<(), CommitError> {
    if staging.exists() {
        std::fs::remove_dir_all(staging).map_err(|source| CommitError::Write { path: staging.to_path_buf(), source })?;
    }
    std::fs::create_dir_all(staging).map_err(|source| CommitError::Write { path: staging.to_path_buf(), source })?;

    for page in pages {
        let target = staging.join(&page.path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CommitError::Write { path: parent.to_path_buf(), source })?;
        }
        std::fs::write(&target, &page.content).map_err(|source| CommitError::Write { path: target, source })?;
    }

    Ok(())
}

/// `live -> backup`, `staging -> live`, delete `backup`. If the live
/// directory doesn't exist yet (first build), the rename to backup is
/// skipped.
fn swap_into_place(root: &Path, config: &Config) -> Result<(), CommitError> {
    let staging = staging_path(root, config);
    let live = live_path(root, config);
    let backup = backup_path(root, config);

    if backup.exists() {
        std::fs::remove_dir_all(&backup).map_err(|source| CommitError::Swap { from: live.clone(), to: backup.clone(), source })?;
    }

    let had_live = live.exists();
    if had_live {
        std::fs::rename(&live, &backup).map_err(|source| CommitError::Swap { from: live.clone(), to: backup.clone(), source })?;
    }

    if let Err(source) = std::fs::rename(&staging, &live) {
        if had_live {
            let _ = std::fs::rename(&backup, &live);
        }
        return Err(CommitError::Swap { from: staging, to: live, source });
    }

    if had_live {
        let _ = std::fs::remove_dir_all(&backup);
    }

    Ok(())
}
