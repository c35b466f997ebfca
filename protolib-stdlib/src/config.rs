//! Installer configuration

use protolib_core::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides [`ProtolibConfig::force`]
pub const FORCE_ENV: &str = "PROTOLIB_FORCE";

/// Installer configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProtolibConfig {
    /// Identifier recorded in installed markers
    #[serde(default = "default_library")]
    pub library: String,

    /// Rebind methods that are already bound
    #[serde(default)]
    pub force: bool,

    /// Default selectors for `install`; empty means every group
    #[serde(default)]
    pub install: Vec<String>,
}

fn default_library() -> String {
    crate::installer::LIBRARY.to_string()
}

impl Default for ProtolibConfig {
    fn default() -> Self {
        Self {
            library: default_library(),
            force: false,
            install: Vec::new(),
        }
    }
}

impl ProtolibConfig {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        let config = match Self::config_path() {
            Some(path) if path.exists() => Self::read(&path)?,
            _ => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(Self::read(path)?.with_env_overrides())
    }

    /// Get the configuration file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("protolib").join("config.toml"))
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Parse(e.to_string()))
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(FORCE_ENV) {
            self.force = parse_flag(&value);
        }
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
