//! Engine configuration loaded from `.taskview/config.toml`.
//!
//! Every key is optional; a missing file means defaults.

use crate::error::{CollectionError, CollectionResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding project-local configuration and the default database.
pub const PROJECT_DIR: &str = ".taskview";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub saved_filters: SavedFilterConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

/// How a saved filter combines with criteria supplied on the same request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavedFilterPrecedence {
    /// Stored criteria stand alone; supplied filters, sorts and search are ignored.
    #[default]
    Stored,
    /// Supplied criteria replace the stored ones.
    Supplied,
    /// Both predicates must hold; stored sort keys come first.
    Merge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFilterConfig {
    #[serde(default)]
    pub precedence: SavedFilterPrecedence,
}

const fn default_per_page() -> u32 {
    50
}

const fn default_max_per_page() -> u32 {
    250
}

/// Path of the project-local config file under `root`.
#[must_use]
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(PROJECT_DIR).join("config.toml")
}

/// Parse a config document.
///
/// # Errors
///
/// Returns [`CollectionError::Config`] on malformed TOML or unknown values.
pub fn parse_config(content: &str) -> CollectionResult<EngineConfig> {
    let config: EngineConfig =
        toml::from_str(content).map_err(|err| CollectionError::Config(err.to_string()))?;
    if config.pagination.default_per_page == 0 || config.pagination.max_per_page == 0 {
        return Err(CollectionError::Config(
            "pagination sizes must be greater than zero".to_string(),
        ));
    }
    Ok(config)
}

fn load_file(path: &Path) -> CollectionResult<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| CollectionError::Config(format!("failed to read {}: {err}", path.display())))?;
    parse_config(&content).map_err(|err| match err {
        CollectionError::Config(reason) => {
            CollectionError::Config(format!("failed to parse {}: {reason}", path.display()))
        }
        other => other,
    })
}

/// Load the effective config: project file first, then the user-level
/// `taskview/config.toml` in the platform config directory, then defaults.
///
/// # Errors
///
/// Returns [`CollectionError::Config`] when a present file cannot be read or parsed.
pub fn load_config(root: &Path) -> CollectionResult<EngineConfig> {
    let project = project_config_path(root);
    if project.exists() {
        tracing::debug!(path = %project.display(), "loading project config");
        return load_file(&project);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let user = config_dir.join("taskview/config.toml");
        if user.exists() {
            tracing::debug!(path = %user.display(), "loading user config");
            return load_file(&user);
        }
    }

    Ok(EngineConfig::default())
}
