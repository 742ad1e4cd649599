//! Item system

pub mod shape;
pub mod template;
pub mod instance;
pub mod grid;
pub mod socket;
pub mod shared;

pub use shape::{rotate, rotate_point, CellOffset, InvalidRotation, Rotation, ShapeMask, MAX_SHAPE_SIZE};
pub use template::{ItemCategory, ItemMetadata, ItemTemplate, ItemTemplateBuilder, Rarity};
pub use instance::{InstanceId, InstanceIdGen, ItemInstance};
pub use grid::{GridPosition, InventoryGrid, SortMode};
pub use socket::{resolve_socket, resolve_sockets, socket_cell};
pub use shared::SharedGrid;
