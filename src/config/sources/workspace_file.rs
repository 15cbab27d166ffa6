//! Workspace config file source: config/config.toml and config/{env}.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::Path;

pub const ENV_VAR: &str = "BLOODLINK_ENV";
pub const DEFAULT_ENV: &str = "development";

/// Active environment name from BLOODLINK_ENV.
pub fn environment_name() -> String {
    std::env::var(ENV_VAR)
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_ENV.to_string())
}

/// Layers `config/config.toml`, then `config/<env_name>.toml` on top of it.
/// Either file may be absent.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
    env_name: &str,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let config_dir = workspace_root.join("config");
    let layers = [
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", env_name)),
    ];

    Ok(layers
        .into_iter()
        .filter(|path| path.is_file())
        .fold(builder, |builder, path| {
            builder.add_source(File::from(path).required(false))
        }))
}
