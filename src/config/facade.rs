//! Config loading facade: builds `PlaygenConfig` from layered sources.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::PlaygenConfig;
use crate::error::ApiError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a corpus root.
    ///
    /// Layers: defaults, global file, `<target>/playgen.toml`, `PLAYGEN__*` env.
    pub fn load(target: &Path) -> Result<PlaygenConfig, ApiError> {
        Self::load_layers(Self::global_config_path().as_deref(), Some(target), None)
    }

    /// Load configuration from an explicit file, replacing the file layers.
    pub fn load_from_file(path: &Path) -> Result<PlaygenConfig, ApiError> {
        if !path.is_file() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Self::load_layers(None, None, Some(path))
    }

    /// Path of the global config file, if a home directory is known
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    pub(crate) fn load_layers(
        global: Option<&Path>,
        target: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<PlaygenConfig, ApiError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = global_file::add_to_builder(builder, global)?;
        if let Some(target) = target {
            builder = workspace_file::add_to_builder(builder, target)?;
        }
        if let Some(path) = explicit {
            builder = builder.add_source(
                config::File::from(path.to_path_buf())
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }
        builder = merge_policy::with_env_overrides(builder);

        let config: PlaygenConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        debug!(
            provider = %config.generation.provider,
            max_attempts = config.retry.max_attempts,
            max_in_flight = config.pipeline.max_in_flight,
            "Configuration loaded"
        );
        Ok(config)
    }
}
