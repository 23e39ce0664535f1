//! Command implementations.

mod info;
mod preview;
mod run;
mod validate;

pub use info::run_info;
pub use preview::run_preview;
pub use run::run_server;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::RelayConfig;
use tracing::info;

use crate::error::CliError;

/// Load configuration from `path`, or fall back to defaults when none is given
pub(crate) fn load_config(path: Option<&Path>) -> Result<RelayConfig> {
    let Some(path) = path else {
        info!("No configuration file given, using defaults");
        return Ok(RelayConfig::default());
    };

    info!(config = %path.display(), "Loading configuration");
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }

    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
