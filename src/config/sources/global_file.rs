//! Global config file source: $XDG_CONFIG_HOME/bloodlink/config.toml (platform config dir elsewhere)

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path to the global config file, if a home directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bloodlink").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global config file to the builder if it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: Option<&Path>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match path {
        Some(path) if path.exists() => Ok(builder.add_source(File::from(path).required(false))),
        Some(path) => {
            debug!(config_path = %path.display(), "No global configuration file");
            Ok(builder)
        }
        None => Ok(builder),
    }
}
