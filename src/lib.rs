//! Satchel - a shape-based spatial inventory engine
//!
//! Free-form items live on a fixed 2-D grid. Shapes turn in quarter steps,
//! placements never overlap, and socket anchors follow their item's
//! rotation cell for cell.

pub mod config;
pub mod data;
pub mod error;
pub mod items;
pub mod save;

// Re-export commonly used types
pub use config::EngineConfig;
pub use data::{DataError, TemplateLibrary};
pub use error::{InventoryError, PlacementRejected};
pub use items::{
    resolve_socket, GridPosition, InstanceId, InstanceIdGen, InventoryGrid, ItemInstance,
    ItemTemplate, Rotation, ShapeMask, SharedGrid,
};
pub use save::{BagSave, SaveError};
