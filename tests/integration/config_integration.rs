//! Integration tests for the configuration system

use super::test_utils::{playground, write_lesson, ScriptedClient};
use playgen::category::ContentCategory;
use playgen::config::ConfigLoader;
use playgen::generation::{run_generate, Backoff, GenerateRequest, NoopObserver};
use playgen::provider::ProviderKind;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[test]
fn test_explicit_file_overrides_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("custom.toml");
    fs::write(
        &config_file,
        r#"
[generation]
provider = "openai"
model = "gpt-4o"
temperature = 0.5

[retry]
max_attempts = 5
backoff = "exponential"

[pipeline]
pages_dir = "content"
max_in_flight = 2
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert_eq!(config.generation.provider, ProviderKind::OpenAI);
    assert_eq!(config.generation.resolve_model(None), "gpt-4o");
    assert_eq!(config.generation.credential_env(), "OPENAI_API_KEY");
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.backoff, Backoff::Exponential);
    assert_eq!(config.pipeline.max_in_flight, 2);
    // Untouched sections keep their defaults
    assert_eq!(config.prompt.max_code_lines, 50);
    assert_eq!(config.pipeline.extension, "mdx");
}

#[test]
fn test_invalid_values_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("bad.toml");
    fs::write(
        &config_file,
        "[retry]\nmax_attempts = 0\n\n[prompt]\nmin_code_lines = 60\nmax_code_lines = 10\n",
    )
    .unwrap();

    let err = ConfigLoader::load_from_file(&config_file).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("max_attempts"));
    assert!(message.contains("min_code_lines"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml")).is_err());
}

#[tokio::test]
async fn test_custom_block_format_flows_through_the_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("playgen-test.toml");
    fs::write(
        &config_file,
        r###"
[retry]
extraction_delay_ms = 0
transport_delay_ms = 0

[pipeline]
pages_dir = "docs"
pacing_delay_ms = 0

[block]
heading = "## Try it"
"###,
    )
    .unwrap();
    let config = ConfigLoader::load_from_file(&config_file).unwrap();

    let dir = temp_dir.path().join("docs").join("html");
    fs::create_dir_all(&dir).unwrap();
    let lesson = write_lesson(&dir, "links.mdx", "# Links\n");
    let done = write_lesson(&dir, "lists.mdx", "# Lists\n\n## Try it\n");

    // The default heading is missing from the response, so the configured one is prepended.
    let response = playground("vanilla", "/index.html", "<a href=\"#\">x</a>")
        .replace("## Интерактивный пример\n\n", "");
    let client = ScriptedClient::always(&response);
    let request = GenerateRequest {
        category: ContentCategory::Html,
        target: temp_dir.path().to_path_buf(),
        limit: 0,
        dry_run: false,
    };

    let report = run_generate(&config, &request, Some(&client), Arc::new(NoopObserver), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.total_documents, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(
        fs::read_to_string(&lesson).unwrap(),
        format!("# Links\n\n## Try it\n\n{response}\n")
    );
    assert_eq!(fs::read_to_string(&done).unwrap(), "# Lists\n\n## Try it\n");
}
