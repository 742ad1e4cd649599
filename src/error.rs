//! Inventory error types
//!
//! Every failure the engine can detect is returned as a value. Only
//! `InvalidTemplate` signals a content bug; the rest are ordinary
//! gameplay outcomes for the caller to react to.

use crate::items::grid::GridPosition;
use crate::items::instance::{InstanceId, ItemInstance};

/// Errors raised by shape, template and grid operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    /// Malformed shape mask or socket offset at authoring time.
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    /// Footprint would leave the grid.
    #[error("placement at {origin:?} extends outside the {width}x{height} grid")]
    OutOfBounds {
        origin: GridPosition,
        width: u16,
        height: u16,
    },

    /// Footprint intersects a cell held by another instance.
    #[error("cell {cell:?} is already occupied by {other}")]
    Overlap { cell: GridPosition, other: InstanceId },

    /// Rotation requested while the instance sits in a grid.
    #[error("{0} is placed; remove it before rotating")]
    InstanceAlreadyPlaced(InstanceId),

    /// Instance is not a member of this grid.
    #[error("{0} is not placed in this grid")]
    NotPlaced(InstanceId),

    /// A different item already holds this id in the grid.
    #[error("{0} already belongs to another item in this grid")]
    IdCollision(InstanceId),

    /// No origin in the grid admits the shape.
    #[error("no free placement for {0}")]
    NoFreePlacement(InstanceId),
}

/// A failed placement. Ownership of the instance goes back to the caller
/// untouched, so a rejected drag can snap back to where it came from.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct PlacementRejected {
    pub reason: InventoryError,
    pub instance: ItemInstance,
}

impl PlacementRejected {
    pub fn new(reason: InventoryError, instance: ItemInstance) -> Self {
        Self { reason, instance }
    }

    /// Take the instance back, dropping the reason
    pub fn into_instance(self) -> ItemInstance {
        self.instance
    }
}
