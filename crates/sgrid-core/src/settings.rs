//! Grid timing and paging settings.
//!
//! Loaded from a TOML file when one exists; every field falls back to its
//! default so partial files are fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Settings shared by every grid instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Quiet period before a state change is fetched.
    ///
    /// A newer change inside the window cancels the pending fetch.
    pub debounce_ms: u64,

    /// Minimum time the loading indicator stays visible.
    pub min_loading_ms: u64,

    /// Page size used when the query state does not carry one.
    pub default_page_size: u32,

    /// Identifier given to grids mounted without one.
    pub fallback_grid_id: String,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            min_loading_ms: 300,
            default_page_size: 10,
            fallback_grid_id: sgrid_model::FALLBACK_GRID_ID.to_string(),
        }
    }
}

impl GridSettings {
    /// Settings with no debounce and no loading hold, for synchronous hosts.
    pub fn immediate() -> Self {
        Self {
            debounce_ms: 0,
            min_loading_ms: 0,
            ..Default::default()
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn min_loading(&self) -> Duration {
        Duration::from_millis(self.min_loading_ms)
    }

    /// Default page size, never zero.
    pub fn page_size(&self) -> u32 {
        self.default_page_size.max(1)
    }

    /// Load settings from the default path.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from a specific path.
    ///
    /// A missing file yields defaults silently; an unparsable one is logged.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        toml::from_str(&content).unwrap_or_else(|error| {
            warn!(path = %path.display(), %error, "ignoring unparsable grid settings");
            Self::default()
        })
    }

    /// Default config file path.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "sgrid", "sgrid")
            .map(|dirs| dirs.config_dir().join("grid.toml"))
    }
}
