//! Shared test utilities for integration tests
//!
//! Scripted model client and lesson corpus fixtures.

use async_trait::async_trait;
use parking_lot::Mutex;
use playgen::config::PlaygenConfig;
use playgen::error::ApiError;
use playgen::provider::{
    ChatMessage, CompletionOptions, CompletionResponse, ModelProviderClient, TokenUsage,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Model client that replays a fixed script and records every prompt it receives.
///
/// Once the script runs out the last entry repeats.
pub struct ScriptedClient {
    script: Vec<Result<String, String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Result<String, String>>) -> Self {
        Self {
            script,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(response: &str) -> Self {
        Self::new(vec![Ok(response.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl ModelProviderClient for ScriptedClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, ApiError> {
        let prompt = messages
            .into_iter()
            .map(|m| m.content)
            .collect::<Vec<_>>()
            .join("\n");
        let index = {
            let mut prompts = self.prompts.lock();
            prompts.push(prompt);
            prompts.len() - 1
        };
        let slot = index.min(self.script.len().saturating_sub(1));
        let content = self
            .script
            .get(slot)
            .cloned()
            .unwrap_or_else(|| Err("empty script".to_string()))
            .map_err(ApiError::ProviderRequestFailed)?;
        Ok(CompletionResponse {
            content,
            model: "scripted".to_string(),
            usage: TokenUsage::default(),
            finish_reason: Some("stop".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// Default configuration without retry or pacing delays.
pub fn fast_config() -> PlaygenConfig {
    let mut config = PlaygenConfig::default();
    config.retry.extraction_delay_ms = 0;
    config.retry.transport_delay_ms = 0;
    config.pipeline.pacing_delay_ms = 0;
    config
}

/// Corpus root with a `pages/<section>` directory.
pub fn corpus(section: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("pages").join(section);
    fs::create_dir_all(&dir).unwrap();
    (temp, dir)
}

pub fn write_lesson(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// A well-formed playground block as a model would return it.
pub fn playground(template: &str, entry: &str, code: &str) -> String {
    format!(
        "## Интерактивный пример\n\n<Sandpack\n  template=\"{template}\"\n  files={{{{\n    \"{entry}\": `\n{code}\n`\n  }}}}\n/>"
    )
}

/// The same block cut off before its closing marker.
pub fn truncated_playground(template: &str, entry: &str, code: &str) -> String {
    let full = playground(template, entry, code);
    full.trim_end_matches("/>").to_string()
}
