//! Configuration handling for Protolib CLI

use anyhow::{Context, Result};
use protolib_stdlib::ProtolibConfig;
use std::path::PathBuf;

/// Load from an explicit path, or from the default location when none is given
pub fn load_config(path: Option<PathBuf>) -> Result<ProtolibConfig> {
    match path {
        Some(path) => ProtolibConfig::load_from(&path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(ProtolibConfig::load()?),
    }
}
