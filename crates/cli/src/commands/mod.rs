//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_pipeline;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::FollowMeConfig;
use tracing::info;

use crate::error::CliError;

/// Load the config file, or fall back to built-in defaults when none is given
fn load_config(path: Option<&Path>) -> Result<FollowMeConfig> {
    let Some(path) = path else {
        info!("No configuration file given, using defaults");
        return Ok(FollowMeConfig::default());
    };

    if !path.exists() {
        return Err(CliError::config_not_found(path).into());
    }

    ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
