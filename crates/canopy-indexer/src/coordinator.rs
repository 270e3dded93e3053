//! Discover-phase coordinator (C1): parses every eligible file in
//! parallel, bounded by a semaphore, and folds the results into a shared
//! [`SymbolTable`]. Per-file parse failures are recorded but never abort
//! the run — one unparsable file must not sink the whole index.

use crate::extractor::ExtractionResult;
use crate::languages::get_extractor_with_pool;
use crate::parser_pool::{create_parser_pool, ParserPool};
use canopy_core::SymbolTable;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// A file that failed to parse. Non-fatal — the build proceeds without it.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub path: PathBuf,
    pub message: String,
}

/// The folded output of a full discovery pass.
pub struct DiscoverResult {
    pub files: Vec<(PathBuf, ExtractionResult)>,
    pub failures: Vec<ParseFailure>,
    pub symbols: SymbolTable,
}

pub struct Coordinator {
    parallel_limit: usize,
    parser_pool: ParserPool,
}

impl Coordinator {
    pub fn new(parallel_limit: usize) -> Self {
        Coordinator {
            parallel_limit: parallel_limit.max(1),
            parser_pool: create_parser_pool(),
        }
    }

    /// Parse every file in `files`, bounded by `parallel_limit` concurrent
    /// tasks, and populate a symbol table from the resulting nodes.
    pub async fn run_full_index(&self, files: Vec<PathBuf>) -> DiscoverResult {
        let semaphore = Arc::new(Semaphore::new(self.parallel_limit));
        let mut handles = Vec::with_capacity(files.len());

        for path in files {
            let permit = Arc::clone(&semaphore);
            let pool = self.parser_pool.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit.acquire_owned().await.expect("semaphore not closed");
                let extractor = get_extractor_with_pool(&path, pool);
                let content = tokio::fs::read(&path).await;
                let outcome = match content {
                    Ok(bytes) => extractor
                        .expect("dispatch always returns an extractor")
                        .extract(&path, &bytes)
                        .map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };
                (path, outcome)
            }));
        }

        let mut files_out = Vec::new();
        let mut failures = Vec::new();
        let symbols = SymbolTable::new();

        for handle in handles {
            match handle.await {
                Ok((path, Ok(extraction))) => {
                    for node in &extraction.nodes {
                        symbols.insert(
                            &node.qualified_name,
                            &node.name,
                            node.id,
                            &path.display().to_string(),
                            node.kind,
                        );
                    }
                    files_out.push((path, extraction));
                }
                Ok((path, Err(message))) => failures.push(ParseFailure { path, message }),
                Err(join_error) => failures.push(ParseFailure {
                    path: PathBuf::new(),
                    message: format!("task panicked: {join_error}"),
                }),
            }
        }

        DiscoverResult {
            files: files_out,
            failures,
            symbols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn indexes_files_and_builds_symbol_table() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("a.py");
        let mut f = std::fs::File::create(&file_path).unwrap();
        writeln!(f, "def helper():\n    return 1\n").unwrap();

        let coordinator = Coordinator::new(4);
        let result = coordinator.run_full_index(vec![file_path]).await;

        assert!(result.failures.is_empty());
        assert_eq!(result.files.len(), 1);
        assert!(!result.symbols.lookup_by_name("helper").is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_a_non_fatal_failure() {
        let coordinator = Coordinator::new(2);
        let result = coordinator
            .run_full_index(vec![PathBuf::from("/nonexistent/path/a.rs")])
            .await;
        assert_eq!(result.failures.len(), 1);
        assert!(result.files.is_empty());
    }
}
