//! Bag save/load
//!
//! A bag is saved as an ordered list of placement records. Loading never
//! trusts stored occupancy: every record is replayed through validated
//! placement, so a corrupted save is reported instead of desyncing the grid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::MAX_GRID_SIZE;
use crate::data::TemplateLibrary;
use crate::error::InventoryError;
use crate::items::grid::InventoryGrid;
use crate::items::instance::{InstanceIdGen, ItemInstance};
use crate::items::shape::Rotation;

/// Save file version for compatibility checking
pub const BAG_SAVE_VERSION: u32 = 1;

/// One placed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRecord {
    pub template_id: String,
    pub origin_x: u16,
    pub origin_y: u16,
    pub rotation: Rotation,
}

/// Complete bag save structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagSave {
    pub version: u32,
    pub width: u16,
    pub height: u16,
    pub placements: Vec<PlacementRecord>,
}

/// Save error types
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("bag size {width}x{height} is outside 1..={max}")]
    InvalidSize { width: u16, height: u16, max: u16 },

    #[error("record {index}: unknown template '{template_id}'")]
    UnknownTemplate { index: usize, template_id: String },

    #[error("record {index}: {reason}")]
    Rejected {
        index: usize,
        #[source]
        reason: InventoryError,
    },
}

impl BagSave {
    /// Snapshot a grid, items listed in grid position order
    pub fn capture(grid: &InventoryGrid) -> Self {
        let placements = grid
            .placed_items()
            .into_iter()
            .filter_map(|item| {
                let origin = item.origin()?;
                Some(PlacementRecord {
                    template_id: item.template().id().to_string(),
                    origin_x: origin.x,
                    origin_y: origin.y,
                    rotation: item.rotation(),
                })
            })
            .collect();

        Self {
            version: BAG_SAVE_VERSION,
            width: grid.width(),
            height: grid.height(),
            placements,
        }
    }

    /// Rebuild the grid by replaying every record in order, accepting bags
    /// up to [`MAX_GRID_SIZE`] on a side.
    pub fn restore(
        &self,
        library: &TemplateLibrary,
        ids: &mut InstanceIdGen,
    ) -> Result<InventoryGrid, SaveError> {
        self.restore_with_limit(library, ids, MAX_GRID_SIZE)
    }

    /// Rebuild the grid by replaying every record in order.
    ///
    /// The declared size is checked before anything is allocated. Fails on
    /// the first record that names an unknown template or whose placement
    /// is out of bounds or overlapping.
    pub fn restore_with_limit(
        &self,
        library: &TemplateLibrary,
        ids: &mut InstanceIdGen,
        max_grid_size: u16,
    ) -> Result<InventoryGrid, SaveError> {
        if self.version != BAG_SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: BAG_SAVE_VERSION,
                found: self.version,
            });
        }
        let sides = 1..=max_grid_size;
        if !sides.contains(&self.width) || !sides.contains(&self.height) {
            return Err(SaveError::InvalidSize {
                width: self.width,
                height: self.height,
                max: max_grid_size,
            });
        }

        let mut grid = InventoryGrid::new(self.width, self.height);
        for (index, record) in self.placements.iter().enumerate() {
            let template =
                library
                    .get(&record.template_id)
                    .ok_or_else(|| SaveError::UnknownTemplate {
                        index,
                        template_id: record.template_id.clone(),
                    })?;
            let instance = ItemInstance::with_rotation(ids.next_id(), template.clone(), record.rotation);
            grid.place_at(instance, record.origin_x, record.origin_y)
                .map_err(|rejected| SaveError::Rejected {
                    index,
                    reason: rejected.reason,
                })?;
        }
        Ok(grid)
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Get the save directory path
pub fn save_directory() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "satchel", "Satchel") {
        let mut path = proj_dirs.data_local_dir().to_path_buf();
        path.push("bags");
        path
    } else {
        // Fallback to current directory
        PathBuf::from("./bags")
    }
}

/// Get the path for a named bag
pub fn bag_path(name: &str) -> PathBuf {
    let mut path = save_directory();
    path.push(format!("{}.json", name));
    path
}

/// Save a grid to a file
pub fn save_bag(grid: &InventoryGrid, path: &Path) -> Result<(), SaveError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let save = BagSave::capture(grid);
    fs::write(path, save.to_json()?)?;

    log::info!(
        "Saved bag with {} items to {}",
        save.placements.len(),
        path.display()
    );
    Ok(())
}

/// Load a grid from a file, rejecting bags wider or taller than
/// `max_grid_size`
pub fn load_bag(
    path: &Path,
    library: &TemplateLibrary,
    ids: &mut InstanceIdGen,
    max_grid_size: u16,
) -> Result<InventoryGrid, SaveError> {
    let data = fs::read_to_string(path)?;
    let grid = BagSave::from_json(&data)?.restore_with_limit(library, ids, max_grid_size)?;

    log::info!("Loaded bag with {} items from {}", grid.count(), path.display());
    Ok(grid)
}
