//! Socket resolution
//!
//! Sockets are authored against the unrotated shape. To find where one
//! sits in the grid, the offset goes through the same point map as the
//! shape cells and is then shifted by the instance's origin.

use super::grid::GridPosition;
use super::instance::ItemInstance;
use super::shape::{rotate_point, CellOffset};

/// Absolute grid cell of a template-local offset, or `None` while the
/// instance is unplaced or the offset lies outside the base shape's box.
pub fn resolve_socket(instance: &ItemInstance, offset: CellOffset) -> Option<GridPosition> {
    let origin = instance.origin()?;
    let base = instance.template().base_shape();
    let local = rotate_point(offset, base.width(), base.height(), instance.rotation())?;
    Some(GridPosition::new(
        origin.x + u16::from(local.x),
        origin.y + u16::from(local.y),
    ))
}

/// Resolve the template's `index`-th socket
pub fn socket_cell(instance: &ItemInstance, index: usize) -> Option<GridPosition> {
    let offset = *instance.template().sockets().get(index)?;
    resolve_socket(instance, offset)
}

/// Resolve every template socket, in authoring order. Empty when unplaced.
pub fn resolve_sockets(instance: &ItemInstance) -> Vec<GridPosition> {
    instance
        .template()
        .sockets()
        .iter()
        .filter_map(|&offset| resolve_socket(instance, offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::grid::InventoryGrid;
    use crate::items::instance::InstanceIdGen;
    use crate::items::shape::{Rotation, ShapeMask};
    use crate::items::template::ItemTemplate;
    use std::sync::Arc;

    fn socketed(rows: &[&str], sockets: &[(u8, u8)]) -> Arc<ItemTemplate> {
        let mut builder = ItemTemplate::builder("socketed", ShapeMask::from_rows(rows).unwrap());
        for &(x, y) in sockets {
            builder = builder.socket(x, y);
        }
        Arc::new(builder.build().unwrap())
    }

    #[test]
    fn test_unplaced_has_no_socket_cells() {
        let mut ids = InstanceIdGen::new();
        let inst = ItemInstance::new(ids.next_id(), socketed(&["###"], &[(0, 0)]));
        assert_eq!(resolve_socket(&inst, CellOffset::new(0, 0)), None);
        assert!(resolve_sockets(&inst).is_empty());
    }

    #[test]
    fn test_center_socket_follows_rotation() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(6, 6);
        let template = socketed(&["###", "###", "###"], &[(1, 1)]);
        let id = grid
            .place_at(ItemInstance::new(ids.next_id(), template), 2, 2)
            .unwrap();
        assert_eq!(socket_cell(grid.get(id).unwrap(), 0), Some(GridPosition::new(3, 3)));

        // Take it out, turn it, put it back at the same origin
        let mut inst = grid.remove_instance(id).unwrap();
        inst.rotate(Rotation::R90).unwrap();
        grid.place_at(inst, 2, 2).unwrap();

        let expected = rotate_point(CellOffset::new(1, 1), 3, 3, Rotation::R90).unwrap();
        assert_eq!(
            socket_cell(grid.get(id).unwrap(), 0),
            Some(GridPosition::new(2 + u16::from(expected.x), 2 + u16::from(expected.y)))
        );
        assert_eq!(socket_cell(grid.get(id).unwrap(), 0), Some(GridPosition::new(3, 3)));
    }

    #[test]
    fn test_off_center_socket_matches_point_formula() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(8, 8);
        // Socket on the foot of the L
        let template = socketed(&["#.", "#.", "##"], &[(1, 2)]);
        let id = grid
            .place_at(ItemInstance::new(ids.next_id(), template), 1, 1)
            .unwrap();

        let expected = [
            (Rotation::R0, GridPosition::new(2, 3)),
            (Rotation::R90, GridPosition::new(1, 2)),
            (Rotation::R180, GridPosition::new(1, 1)),
            (Rotation::R270, GridPosition::new(3, 1)),
        ];
        for (rotation, cell) in expected {
            grid.rotate_item(id, rotation).unwrap();
            let inst = grid.get(id).unwrap();
            assert_eq!(socket_cell(inst, 0), Some(cell), "{:?}", rotation);
            // Still on a solid cell of the item it belongs to
            assert_eq!(grid.id_at(cell.x, cell.y), Some(id));
        }
    }

    #[test]
    fn test_socket_on_empty_cell_and_bad_offsets() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(5, 5);
        let template = socketed(&["#.", "##"], &[(1, 0)]);
        let id = grid
            .place_at(ItemInstance::new(ids.next_id(), template), 0, 0)
            .unwrap();

        let inst = grid.get(id).unwrap();
        assert_eq!(resolve_sockets(inst), vec![GridPosition::new(1, 0)]);
        assert_eq!(grid.id_at(1, 0), None);
        assert_eq!(resolve_socket(inst, CellOffset::new(2, 0)), None);
        assert_eq!(socket_cell(inst, 1), None);
    }
}
