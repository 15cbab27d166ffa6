use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::BloodlinkConfig;
use config::{ConfigError, File};
use std::path::Path;
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace from every source.
    pub fn load(workspace_root: &Path) -> Result<BloodlinkConfig, ConfigError> {
        let global_path = global_file::global_config_path();
        Self::load_layered(
            global_path.as_deref(),
            workspace_root,
            &workspace_file::environment_name(),
        )
    }

    /// Load with an explicit global file and environment name.
    pub fn load_layered(
        global_path: Option<&Path>,
        workspace_root: &Path,
        env_name: &str,
    ) -> Result<BloodlinkConfig, ConfigError> {
        debug!(
            workspace = %workspace_root.display(),
            environment = env_name,
            "Loading configuration"
        );
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder, global_path)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root, env_name)?;
        let builder = environment::add_to_builder(builder);
        builder.build()?.try_deserialize()
    }

    /// Load from a single file; environment variables still apply on top.
    pub fn load_from_file(path: &Path) -> Result<BloodlinkConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        environment::add_to_builder(builder)
            .build()?
            .try_deserialize()
    }
}
