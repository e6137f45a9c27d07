//! Scanner selection and dry-run behavior over a lesson corpus

use super::test_utils::{corpus, fast_config, write_lesson};
use playgen::category::ContentCategory;
use playgen::corpus::{CorpusScanner, ScanOptions};
use playgen::error::ApiError;
use playgen::extraction::BlockFormat;
use playgen::generation::{plan_generation, run_generate, GenerateRequest, NoopObserver};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[test]
fn test_scan_skips_reserved_and_illustrated_lessons() {
    let (temp, dir) = corpus("css");
    write_lesson(&dir, "_meta.mdx", "# Index\n");
    write_lesson(&dir, "grid.mdx", "# Grid\n");
    write_lesson(&dir, "flexbox.mdx", "# Flexbox\n\n<Sandpack template=\"vanilla\" />\n");
    write_lesson(&dir, "notes.md", "# Notes\n");
    fs::create_dir_all(dir.join("nested")).unwrap();
    write_lesson(&dir.join("nested"), "deep.mdx", "# Deep\n");

    let scanner = CorpusScanner::new(temp.path().to_path_buf(), BlockFormat::default());
    let scan = scanner.scan(ContentCategory::Css).unwrap();

    assert_eq!(scan.total_documents, 2);
    let names: Vec<&str> = scan.eligible.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["grid"]);
}

#[test]
fn test_scan_respects_custom_layout() {
    let temp = tempfile::TempDir::new().unwrap();
    let dir = temp.path().join("content").join("php");
    fs::create_dir_all(&dir).unwrap();
    write_lesson(&dir, "arrays.md", "# Arrays\n");
    write_lesson(&dir, "strings.mdx", "# Strings\n");

    let options = ScanOptions {
        pages_dir: PathBuf::from("content"),
        extension: "md".to_string(),
        ..ScanOptions::default()
    };
    let scanner = CorpusScanner::with_options(temp.path().to_path_buf(), BlockFormat::default(), options);
    let scan = scanner.scan(ContentCategory::Php).unwrap();

    assert_eq!(scan.eligible.len(), 1);
    assert_eq!(scan.eligible[0].title(), "Arrays");
}

#[test]
fn test_plan_for_missing_section_fails() {
    let (temp, _dir) = corpus("css");
    let request = GenerateRequest {
        category: ContentCategory::React,
        target: temp.path().to_path_buf(),
        limit: 0,
        dry_run: true,
    };
    let err = plan_generation(&fast_config(), &request).unwrap_err();
    assert!(matches!(err, ApiError::CategoryNotFound(_)));
}

#[tokio::test]
async fn test_dry_run_lists_without_writing() {
    let (temp, dir) = corpus("javascript");
    let a = write_lesson(&dir, "arrays.mdx", "# Arrays\n");
    let b = write_lesson(&dir, "closures.mdx", "# Closures\n");

    let request = GenerateRequest {
        category: ContentCategory::Javascript,
        target: temp.path().to_path_buf(),
        limit: 0,
        dry_run: true,
    };
    let report = run_generate(
        &fast_config(),
        &request,
        None,
        Arc::new(NoopObserver),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.documents, vec![a.clone(), b.clone()]);
    assert_eq!(report.succeeded + report.failed, 0);
    assert_eq!(fs::read_to_string(a).unwrap(), "# Arrays\n");
    assert_eq!(fs::read_to_string(b).unwrap(), "# Closures\n");
}
