//! Configuration System
//!
//! Layered configuration built with the `config` crate: compiled defaults, a global
//! user file, a per-corpus `playgen.toml` and `PLAYGEN__<SECTION>__<KEY>`
//! environment overrides. Command-line flags are applied on top by the CLI.

use crate::extraction::{BlockExtractor, BlockFormat};
use crate::generation::executor::ExecutorSettings;
use crate::generation::orchestrator::{Backoff, RetryPolicy};
use crate::corpus::ScanOptions;
use crate::logging::LoggingConfig;
use crate::provider::ProviderKind;
use crate::synthesis::SynthesisSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use merge::merge_policy::{ENV_PREFIX, ENV_SEPARATOR};
pub use sources::workspace_file::WORKSPACE_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaygenConfig {
    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub block: BlockConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Model and sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub provider: ProviderKind,

    /// Model id; the provider default applies when unset
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Base URL override for the provider API
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Environment variable holding the credential; the provider default applies when unset
    #[serde(default)]
    pub credential_env: Option<String>,
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_output_tokens() -> u32 {
    16384
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            endpoint: None,
            credential_env: None,
        }
    }
}

impl GenerationConfig {
    /// Model to use: explicit override, then config, then the provider default.
    pub fn resolve_model(&self, cli_model: Option<&str>) -> String {
        cli_model
            .or(self.model.as_deref())
            .unwrap_or_else(|| self.provider.default_model())
            .to_string()
    }

    pub fn credential_env(&self) -> &str {
        self.credential_env
            .as_deref()
            .unwrap_or_else(|| self.provider.credential_env())
    }
}

/// Retry ceiling and delays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub extraction_delay_ms: u64,

    #[serde(default = "default_retry_delay_ms")]
    pub transport_delay_ms: u64,

    #[serde(default)]
    pub backoff: Backoff,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            extraction_delay_ms: default_retry_delay_ms(),
            transport_delay_ms: default_retry_delay_ms(),
            backoff: Backoff::default(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Corpus layout and pacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_pages_dir")]
    pub pages_dir: PathBuf,

    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default = "default_reserved_prefix")]
    pub reserved_prefix: String,

    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_pages_dir() -> PathBuf {
    PathBuf::from("pages")
}

fn default_extension() -> String {
    "mdx".to_string()
}

fn default_reserved_prefix() -> String {
    "_".to_string()
}

fn default_pacing_delay_ms() -> u64 {
    1500
}

fn default_max_in_flight() -> usize {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pages_dir: default_pages_dir(),
            extension: default_extension(),
            reserved_prefix: default_reserved_prefix(),
            pacing_delay_ms: default_pacing_delay_ms(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

/// Prompt shaping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_max_excerpt_chars")]
    pub max_excerpt_chars: usize,

    #[serde(default = "default_min_code_lines")]
    pub min_code_lines: usize,

    #[serde(default = "default_max_code_lines")]
    pub max_code_lines: usize,
}

fn default_max_excerpt_chars() -> usize {
    2000
}

fn default_min_code_lines() -> usize {
    20
}

fn default_max_code_lines() -> usize {
    50
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_excerpt_chars: default_max_excerpt_chars(),
            min_code_lines: default_min_code_lines(),
            max_code_lines: default_max_code_lines(),
        }
    }
}

/// Block shape and extraction options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConfig {
    #[serde(default = "default_heading")]
    pub heading: String,

    #[serde(default = "default_component")]
    pub component: String,

    /// Decode `\uXXXX` escapes of non-ASCII characters before extraction
    #[serde(default)]
    pub decode_unicode_escapes: bool,
}

fn default_heading() -> String {
    BlockFormat::default().heading
}

fn default_component() -> String {
    BlockFormat::default().component
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            heading: default_heading(),
            component: default_component(),
            decode_unicode_escapes: false,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Generation(String),
    Retry(String),
    Pipeline(String),
    Prompt(String),
    Block(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Generation(msg) => write!(f, "generation: {}", msg),
            ValidationError::Retry(msg) => write!(f, "retry: {}", msg),
            ValidationError::Pipeline(msg) => write!(f, "pipeline: {}", msg),
            ValidationError::Prompt(msg) => write!(f, "prompt: {}", msg),
            ValidationError::Block(msg) => write!(f, "block: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PlaygenConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let temperature = self.generation.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            errors.push(ValidationError::Generation(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                temperature
            )));
        }
        if self.generation.max_output_tokens == 0 {
            errors.push(ValidationError::Generation(
                "max_output_tokens must be greater than 0".to_string(),
            ));
        }
        if matches!(&self.generation.model, Some(model) if model.trim().is_empty()) {
            errors.push(ValidationError::Generation("model cannot be empty".to_string()));
        }

        if self.retry.max_attempts == 0 {
            errors.push(ValidationError::Retry(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        if self.pipeline.max_in_flight == 0 {
            errors.push(ValidationError::Pipeline(
                "max_in_flight must be at least 1".to_string(),
            ));
        }
        if self.pipeline.extension.trim().is_empty() {
            errors.push(ValidationError::Pipeline("extension cannot be empty".to_string()));
        }

        if self.prompt.min_code_lines > self.prompt.max_code_lines {
            errors.push(ValidationError::Prompt(format!(
                "min_code_lines ({}) exceeds max_code_lines ({})",
                self.prompt.min_code_lines, self.prompt.max_code_lines
            )));
        }
        if self.prompt.max_excerpt_chars == 0 {
            errors.push(ValidationError::Prompt(
                "max_excerpt_chars must be greater than 0".to_string(),
            ));
        }

        if self.block.heading.trim().is_empty() {
            errors.push(ValidationError::Block("heading cannot be empty".to_string()));
        }
        if self.block.component.trim().is_empty() {
            errors.push(ValidationError::Block("component cannot be empty".to_string()));
        }

        if let Err(e) = crate::logging::validate_format(&self.logging.format) {
            errors.push(ValidationError::Logging(e.to_string()));
        }
        if let Err(e) = crate::logging::validate_output(&self.logging.output) {
            errors.push(ValidationError::Logging(e.to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn block_format(&self) -> BlockFormat {
        BlockFormat::new(self.block.heading.clone(), self.block.component.clone())
    }

    pub fn extractor(&self) -> BlockExtractor {
        BlockExtractor::new(self.block_format())
            .with_unicode_escape_decoding(self.block.decode_unicode_escapes)
    }

    pub fn scan_options(&self, limit: usize) -> ScanOptions {
        ScanOptions {
            pages_dir: self.pipeline.pages_dir.clone(),
            extension: self.pipeline.extension.clone(),
            reserved_prefix: self.pipeline.reserved_prefix.clone(),
            limit,
        }
    }

    pub fn synthesis_settings(&self) -> SynthesisSettings {
        SynthesisSettings {
            max_excerpt_chars: self.prompt.max_excerpt_chars,
            min_code_lines: self.prompt.min_code_lines,
            max_code_lines: self.prompt.max_code_lines,
            temperature: self.generation.temperature,
            max_output_tokens: self.generation.max_output_tokens,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            extraction_delay: Duration::from_millis(self.retry.extraction_delay_ms),
            transport_delay: Duration::from_millis(self.retry.transport_delay_ms),
            backoff: self.retry.backoff,
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
        }
    }

    pub fn executor_settings(&self) -> ExecutorSettings {
        ExecutorSettings {
            max_in_flight: self.pipeline.max_in_flight,
            pacing_delay: Duration::from_millis(self.pipeline.pacing_delay_ms),
        }
    }
}

/// Serializes tests that read or write `PLAYGEN__*` variables.
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
