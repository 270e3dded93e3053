//! End-to-end tests exercising the full build pipeline against a small
//! fixture repository: Discover -> Analyze -> Files -> Directories ->
//! Architecture -> Commit.

use canopy::{orchestrator, staging};
use canopy_ai::{OfflineTextGenerator, TextGenerator};
use canopy_core::{Config, NotesQuery, NullNotesQuery};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn write_fixture_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src/util")).unwrap();
    fs::write(
        dir.path().join("src/lib.rs"),
        "mod util;\n\npub fn entry() -> i32 {\n    util::helper()\n}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("src/util/mod.rs"),
        "pub fn helper() -> i32 {\n    42\n}\n",
    )
    .unwrap();
    dir
}

fn noop_progress(_: &str, _: usize, _: usize, _: &str) {}

#[tokio::test]
async fn build_produces_pages_and_commits_a_wiki() {
    let dir = write_fixture_repo();
    let config = Config::default();
    let generator: Arc<dyn TextGenerator> = Arc::new(OfflineTextGenerator::new());
    let notes: Arc<dyn NotesQuery> = Arc::new(NullNotesQuery);

    let (pages, report) = orchestrator::run_build(dir.path(), &config, generator, notes, &noop_progress)
        .await
        .expect("build should succeed against a well-formed fixture repo");

    assert!(report.failures.is_empty(), "unexpected failures: {:?}", report.failures);
    assert!(pages.iter().any(|p| p.path.starts_with("files/")));
    assert!(pages.iter().any(|p| p.path.starts_with("directories/")));
    assert!(pages.iter().any(|p| p.path == "code-health.md"));

    staging::commit(dir.path(), &config, &pages).expect("commit should succeed");
    let wiki = dir.path().join(&config.wiki_dir);
    assert!(wiki.join("code-health.md").exists());
}

#[tokio::test]
async fn second_build_skips_unchanged_files() {
    let dir = write_fixture_repo();
    let config = Config::default();

    let generator: Arc<dyn TextGenerator> = Arc::new(OfflineTextGenerator::new());
    let notes: Arc<dyn NotesQuery> = Arc::new(NullNotesQuery);
    let (pages, _) = orchestrator::run_build(dir.path(), &config, generator.clone(), notes.clone(), &noop_progress)
        .await
        .unwrap();
    staging::commit(dir.path(), &config, &pages).unwrap();

    let (_, report) = orchestrator::run_build(dir.path(), &config, generator, notes, &noop_progress)
        .await
        .unwrap();

    assert!(report.pages_skipped > 0, "second build should carry forward unchanged pages");
}

#[test]
fn language_extractors_cover_supported_languages() {
    use canopy_indexer::get_extractor;
    use std::path::PathBuf;

    let cases = [
        ("test.rs", true),
        ("test.ts", true),
        ("test.js", true),
        ("test.py", true),
        ("test.go", true),
        ("test.java", true),
        ("test.c", true),
        ("test.cpp", true),
        ("test.txt", false),
    ];

    for (filename, should_have_extractor) in cases {
        let path = PathBuf::from(filename);
        let extractor = get_extractor(&path);
        assert_eq!(extractor.is_some(), should_have_extractor, "extractor mismatch for {filename}");
    }
}
