//! Runtime item instances
//!
//! An instance binds a shared template to a rotation and, while it sits in
//! a grid, an origin. Grids own placed instances by value and refer to them
//! through [`InstanceId`] handles, so there are no back-pointers.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::grid::GridPosition;
use super::shape::{Rotation, ShapeMask};
use super::template::ItemTemplate;
use crate::error::InventoryError;

/// Stable handle identifying one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance #{}", self.0)
    }
}

/// Monotonic id source, one per world/session
#[derive(Debug, Clone, Default)]
pub struct InstanceIdGen {
    next: u64,
}

impl InstanceIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after ids already handed out
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    pub fn next_id(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        id
    }
}

/// One item in the world, placed or not
#[derive(Debug, Clone)]
pub struct ItemInstance {
    id: InstanceId,
    template: Arc<ItemTemplate>,
    rotation: Rotation,
    origin: Option<GridPosition>,
    /// Template shape under `rotation`; rebuilt whenever rotation changes
    shape: ShapeMask,
}

impl ItemInstance {
    /// Create an unplaced instance at rotation 0
    pub fn new(id: InstanceId, template: Arc<ItemTemplate>) -> Self {
        let shape = template.base_shape().clone();
        Self {
            id,
            template,
            rotation: Rotation::R0,
            origin: None,
            shape,
        }
    }

    /// Create an unplaced instance already turned to `rotation`
    pub fn with_rotation(id: InstanceId, template: Arc<ItemTemplate>, rotation: Rotation) -> Self {
        let mut instance = Self::new(id, template);
        instance.set_rotation(rotation);
        instance
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn template(&self) -> &Arc<ItemTemplate> {
        &self.template
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Top-left of the rotated bounding box, if placed
    pub fn origin(&self) -> Option<GridPosition> {
        self.origin
    }

    pub fn is_placed(&self) -> bool {
        self.origin.is_some()
    }

    /// Turn the instance. Only unplaced instances may rotate; placed ones
    /// go through the grid so occupancy stays in sync.
    pub fn rotate(&mut self, rotation: Rotation) -> Result<(), InventoryError> {
        if self.is_placed() {
            return Err(InventoryError::InstanceAlreadyPlaced(self.id));
        }
        self.set_rotation(rotation);
        Ok(())
    }

    /// One more clockwise quarter turn
    pub fn rotate_clockwise(&mut self) -> Result<(), InventoryError> {
        self.rotate(self.rotation.clockwise())
    }

    /// The template shape as currently rotated
    pub fn actual_shape(&self) -> &ShapeMask {
        &self.shape
    }

    /// `(width, height)` of the rotated shape
    pub fn bounding_size(&self) -> (u8, u8) {
        self.shape.size()
    }

    /// Absolute cells covered at the current origin; empty when unplaced
    pub fn footprint(&self) -> Vec<GridPosition> {
        match self.origin {
            Some(origin) => self.footprint_at(origin),
            None => Vec::new(),
        }
    }

    /// Absolute cells the rotated shape would cover at `origin`
    pub fn footprint_at(&self, origin: GridPosition) -> Vec<GridPosition> {
        self.shape
            .solid_cells()
            .map(|c| {
                GridPosition::new(
                    origin.x.saturating_add(u16::from(c.x)),
                    origin.y.saturating_add(u16::from(c.y)),
                )
            })
            .collect()
    }

    pub(crate) fn set_rotation(&mut self, rotation: Rotation) {
        if rotation != self.rotation {
            self.rotation = rotation;
            self.shape = self.template.base_shape().rotated(rotation);
        }
    }

    pub(crate) fn set_origin(&mut self, origin: Option<GridPosition>) {
        self.origin = origin;
    }
}
