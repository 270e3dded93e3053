//! Repository file discovery (CLI layer). Walks the repo root respecting
//! `.gitignore`/`.ignore` rules via the `ignore` crate, plus a small set of
//! Canopy-specific exclusions (its own wiki/staging/cache directories).

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

fn canopy_exclusions(config: &canopy_core::Config) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for dir in [&config.wiki_dir, &config.staging_dir, canopy_core::persist::CACHE_DIR] {
        builder.add(Glob::new(&format!("**/{dir}/**")).expect("static glob is valid"));
    }
    builder.build().expect("static globset is valid")
}

/// Every file under `root` eligible for indexing: not ignored by VCS rules,
/// not inside Canopy's own wiki/staging/cache directories, and at or under
/// `max_file_size_kb`.
pub fn discover_files(root: &Path, config: &canopy_core::Config) -> Vec<PathBuf> {
    let exclusions = canopy_exclusions(config);
    let max_bytes = config.max_file_size_kb * 1024;

    let mut files: Vec<PathBuf> = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| {
            let relative = path.strip_prefix(root).unwrap_or(path);
            !exclusions.is_match(relative)
        })
        .filter(|path| std::fs::metadata(path).map(|m| m.len() <= max_bytes).unwrap_or(false))
        .collect();

    files.sort();
    files
}

/// Every directory path (relative to `root`, `/`-separated, root itself as
/// `""`) that contains at least one discovered file, plus all of its
/// ancestors so the hierarchy has no gaps.
pub fn directories_for(root: &Path, files: &[PathBuf]) -> Vec<String> {
    use std::collections::BTreeSet;

    let mut dirs: BTreeSet<String> = BTreeSet::new();
    dirs.insert(String::new());

    for file in files {
        let relative = file.strip_prefix(root).unwrap_or(file);
        let mut ancestor = relative.parent();
        while let Some(dir) = ancestor {
            if dir.as_os_str().is_empty() {
                break;
            }
            dirs.insert(dir.to_string_lossy().replace('\\', "/"));
            ancestor = dir.parent();
        }
    }

    dirs.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovers_files_and_skips_canopy_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lib.rs"), "fn main() {}").unwrap();
        fs::create_dir_all(dir.path().join(".canopy-wiki")).unwrap();
        fs::write(dir.path().join(".canopy-wiki/root.md"), "stale").unwrap();

        let config = canopy_core::Config::default();
        let files = discover_files(dir.path(), &config);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("lib.rs"));
    }

    #[test]
    fn directories_include_all_ancestors() {
        let root = PathBuf::from("/repo");
        let files = vec![PathBuf::from("/repo/src/inner/lib.rs")];
        let dirs = directories_for(&root, &files);
        assert!(dirs.contains(&String::new()));
        assert!(dirs.contains(&"src".to_string()));
        assert!(dirs.contains(&"src/inner".to_string()));
    }
}
