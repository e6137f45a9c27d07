//! Corpus config file source: `<target>/playgen.toml`

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use config::FileFormat;
use std::path::{Path, PathBuf};

pub const WORKSPACE_CONFIG_FILE: &str = "playgen.toml";

pub fn workspace_config_path(target: &Path) -> PathBuf {
    target.join(WORKSPACE_CONFIG_FILE)
}

/// Add the corpus config file to the builder if it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    target: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = workspace_config_path(target);
    if path.exists() {
        return Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(false)));
    }
    Ok(builder)
}
