//! Engine configuration
//!
//! Loaded from a RON file, falling back to built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::data::DataError;
use crate::items::shape::MAX_SHAPE_SIZE;

/// Largest bag side accepted when none is configured
pub const MAX_GRID_SIZE: u16 = 64;

/// Tunables shared by the template library and new grids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest width or height an item shape may have
    pub max_shape_size: u8,
    /// Bag width used by [`InventoryGrid::from_config`](crate::items::InventoryGrid::from_config)
    pub default_grid_width: u16,
    /// Bag height used by [`InventoryGrid::from_config`](crate::items::InventoryGrid::from_config)
    pub default_grid_height: u16,
    /// Largest width or height a loaded bag may declare
    pub max_grid_size: u16,
    /// Directory holding `templates.ron`
    pub data_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_shape_size: MAX_SHAPE_SIZE,
            default_grid_width: 8,
            default_grid_height: 6,
            max_grid_size: MAX_GRID_SIZE,
            data_dir: PathBuf::from("assets/data"),
        }
    }
}

impl EngineConfig {
    /// Parse a config from RON text
    pub fn from_ron(text: &str) -> Result<Self, DataError> {
        let config: Self = ron::from_str(text).map_err(|e| DataError::Parse {
            what: "config".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let text = fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&text)?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Load a config file, or use defaults if it is missing or broken
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            warn!("Failed to load {}: {}. Using defaults.", path.display(), e);
            Self::default()
        })
    }

    /// Path of the template file inside `data_dir`
    pub fn templates_path(&self) -> PathBuf {
        self.data_dir.join("templates.ron")
    }

    fn validate(&self) -> Result<(), DataError> {
        if self.max_shape_size == 0 {
            return Err(DataError::InvalidConfig(
                "max_shape_size must be at least 1".to_string(),
            ));
        }
        if self.default_grid_width == 0 || self.default_grid_height == 0 {
            return Err(DataError::InvalidConfig(format!(
                "default grid {}x{} has no cells",
                self.default_grid_width, self.default_grid_height
            )));
        }
        if self.default_grid_width > self.max_grid_size
            || self.default_grid_height > self.max_grid_size
        {
            return Err(DataError::InvalidConfig(format!(
                "default grid {}x{} exceeds max_grid_size {}",
                self.default_grid_width, self.default_grid_height, self.max_grid_size
            )));
        }
        Ok(())
    }
}
