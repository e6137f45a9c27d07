//! Merge rules: defaults, override order, conflict handling.
//!
//! Later layers win key by key: defaults, then the global file, then the corpus
//! file (or the explicit `--config` file), then `PLAYGEN__*` environment variables.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Prefix of environment overrides, e.g. `PLAYGEN__RETRY__MAX_ATTEMPTS=5`
pub const ENV_PREFIX: &str = "PLAYGEN";
pub const ENV_SEPARATOR: &str = "__";

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("generation.provider", "gemini")?
        .set_default("generation.temperature", 0.2)?
        .set_default("generation.max_output_tokens", 16384_i64)?
        .set_default("retry.max_attempts", 3_i64)?
        .set_default("retry.extraction_delay_ms", 2000_i64)?
        .set_default("retry.transport_delay_ms", 2000_i64)?
        .set_default("retry.backoff", "fixed")?
        .set_default("retry.max_delay_ms", 30000_i64)?
        .set_default("pipeline.pages_dir", "pages")?
        .set_default("pipeline.extension", "mdx")?
        .set_default("pipeline.reserved_prefix", "_")?
        .set_default("pipeline.pacing_delay_ms", 1500_i64)?
        .set_default("pipeline.max_in_flight", 1_i64)?
        .set_default("prompt.max_excerpt_chars", 2000_i64)?
        .set_default("prompt.min_code_lines", 20_i64)?
        .set_default("prompt.max_code_lines", 50_i64)
}

/// Add the environment override layer; must be the last source.
pub fn with_env_overrides(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    )
}
