//! End-to-end runs of the generation pipeline against a scripted model client

use super::test_utils::{
    corpus, fast_config, playground, truncated_playground, write_lesson, ScriptedClient,
};
use playgen::category::ContentCategory;
use playgen::generation::{run_generate, GenerateRequest, NoopObserver};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const LOOPS: &str = "# Loops\n\nA `for` loop repeats a block of code.\n";

fn request(target: &Path, category: ContentCategory, limit: usize) -> GenerateRequest {
    GenerateRequest {
        category,
        target: target.to_path_buf(),
        limit,
        dry_run: false,
    }
}

#[tokio::test]
async fn test_successful_generation_appends_block() {
    let (temp, dir) = corpus("javascript");
    let lesson = write_lesson(&dir, "loops.mdx", LOOPS);
    let block = playground("vanilla", "/index.html", "<script>\nfor (let i = 0; i < 3; i++) {}\n</script>");
    let client = ScriptedClient::always(&format!("```mdx\n{block}\n```"));

    let report = run_generate(
        &fast_config(),
        &request(temp.path(), ContentCategory::Javascript, 0),
        Some(&client),
        Arc::new(NoopObserver),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(client.calls(), 1);
    assert!(client.prompts()[0].contains("Loops"));

    let content = fs::read_to_string(&lesson).unwrap();
    assert_eq!(content, format!("{LOOPS}\n{block}\n"));
    assert!(content.trim_end().ends_with("/>"));
}

#[tokio::test]
async fn test_unterminated_output_leaves_document_unmodified() {
    let (temp, dir) = corpus("javascript");
    let lesson = write_lesson(&dir, "loops.mdx", LOOPS);
    let client = ScriptedClient::always(&truncated_playground(
        "vanilla",
        "/index.html",
        "<p>cut short</p>",
    ));

    let report = run_generate(
        &fast_config(),
        &request(temp.path(), ContentCategory::Javascript, 0),
        Some(&client),
        Arc::new(NoopObserver),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].attempts, 3);
    assert_eq!(client.calls(), 3);
    assert_eq!(fs::read_to_string(&lesson).unwrap(), LOOPS);
}

#[tokio::test]
async fn test_retry_recovers_after_bad_responses() {
    let (temp, dir) = corpus("react");
    let lesson = write_lesson(&dir, "hooks.mdx", "# Hooks\n");
    let block = playground("react", "/App.tsx", "export default function App() {\n  return <p>hi</p>;\n}");
    let client = ScriptedClient::new(vec![
        Err("connection reset".to_string()),
        Ok("Sorry, I cannot help with that.".to_string()),
        Ok(block.clone()),
    ]);

    let report = run_generate(
        &fast_config(),
        &request(temp.path(), ContentCategory::React, 0),
        Some(&client),
        Arc::new(NoopObserver),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(client.calls(), 3);
    assert_eq!(
        fs::read_to_string(&lesson).unwrap(),
        format!("# Hooks\n\n{block}\n")
    );
}

#[tokio::test]
async fn test_limit_caps_processed_documents() {
    let (temp, dir) = corpus("css");
    for name in ["a.mdx", "b.mdx", "c.mdx", "d.mdx"] {
        write_lesson(&dir, name, "# Lesson\n");
    }
    let client = ScriptedClient::always(&playground("vanilla", "/index.html", "<p>x</p>"));

    let report = run_generate(
        &fast_config(),
        &request(temp.path(), ContentCategory::Css, 2),
        Some(&client),
        Arc::new(NoopObserver),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.eligible, 2);
    assert_eq!(report.succeeded, 2);
    assert_eq!(client.calls(), 2);
    assert_eq!(fs::read_to_string(dir.join("c.mdx")).unwrap(), "# Lesson\n");
    assert_eq!(fs::read_to_string(dir.join("d.mdx")).unwrap(), "# Lesson\n");
}

#[tokio::test]
async fn test_rerun_never_double_appends() {
    let (temp, dir) = corpus("html");
    let lesson = write_lesson(&dir, "forms.mdx", "# Forms\n");
    let client = ScriptedClient::always(&playground("vanilla", "/index.html", "<form></form>"));
    let config = fast_config();
    let request = request(temp.path(), ContentCategory::Html, 0);

    let first = run_generate(&config, &request, Some(&client), Arc::new(NoopObserver), CancellationToken::new())
        .await
        .unwrap();
    let after_first = fs::read_to_string(&lesson).unwrap();

    let second = run_generate(&config, &request, Some(&client), Arc::new(NoopObserver), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(first.succeeded, 1);
    assert_eq!(second.eligible, 0);
    assert_eq!(second.succeeded, 0);
    assert_eq!(client.calls(), 1);
    assert_eq!(fs::read_to_string(&lesson).unwrap(), after_first);
}

#[tokio::test]
async fn test_failures_do_not_stop_the_run() {
    let (temp, dir) = corpus("typescript");
    write_lesson(&dir, "a.mdx", "# Generics\n");
    write_lesson(&dir, "b.mdx", "# Enums\n");
    let block = playground("vanilla-ts", "/index.html", "<p>ok</p>");
    let client = ScriptedClient::new(vec![
        Ok("no block here".to_string()),
        Ok("still nothing".to_string()),
        Ok("give up".to_string()),
        Ok(block),
    ]);

    let report = run_generate(
        &fast_config(),
        &request(temp.path(), ContentCategory::Typescript, 0),
        Some(&client),
        Arc::new(NoopObserver),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failures[0].name, "a");
    assert_eq!(fs::read_to_string(dir.join("a.mdx")).unwrap(), "# Generics\n");
    assert!(fs::read_to_string(dir.join("b.mdx")).unwrap().ends_with("/>\n"));
}

#[tokio::test]
async fn test_unreadable_lesson_is_counted_as_failure() {
    let (temp, dir) = corpus("javascript");
    write_lesson(&dir, "a.mdx", "# Arrays\n");
    fs::write(dir.join("b.mdx"), [0xff, 0xfe]).unwrap();
    write_lesson(&dir, "c.mdx", "# Closures\n");
    let client = ScriptedClient::always(&playground("vanilla", "/index.html", "<p>x</p>"));

    let report = run_generate(
        &fast_config(),
        &request(temp.path(), ContentCategory::Javascript, 0),
        Some(&client),
        Arc::new(NoopObserver),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.total_documents, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].name, "b");
    assert_eq!(report.failures[0].attempts, 0);
    assert_eq!(client.calls(), 2);
    assert_eq!(fs::read(dir.join("b.mdx")).unwrap(), vec![0xff, 0xfe]);
}
