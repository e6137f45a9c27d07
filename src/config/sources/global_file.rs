//! Global config file source: `<user config dir>/playgen/config.toml`

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use config::FileFormat;
use directories::BaseDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path to global config file.
///
/// On Linux this honors `XDG_CONFIG_HOME`, falling back to `~/.config`.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join("playgen").join("config.toml"))
}

/// Add the global config file to the builder if it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: Option<&Path>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let Some(path) = path else {
        return Ok(builder);
    };
    if !path.exists() {
        debug!(config_path = %path.display(), "No global configuration file");
        return Ok(builder);
    }
    let canonical = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    Ok(builder.add_source(File::from(canonical).format(FileFormat::Toml).required(false)))
}
