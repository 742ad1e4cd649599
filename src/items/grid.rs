//! Grid-based inventory system (Resident Evil 4 style)
//!
//! Items occupy the solid cells of their rotated shape mask. The grid owns
//! every placed instance by value and keeps a per-cell occupancy buffer
//! that is always the exact union of their footprints.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::instance::{InstanceId, ItemInstance};
use super::shape::{Rotation, ShapeMask};
use crate::config::EngineConfig;
use crate::error::{InventoryError, PlacementRejected};

/// Sorting options for [`InventoryGrid::auto_organize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Most cells first - default tetris packing
    #[default]
    Size,
    /// Sort by rarity (legendary first), then by category
    Rarity,
    /// Sort by category, then by rarity
    Category,
    /// Sort by name alphabetically
    Name,
}

/// Position in the inventory grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: u16,
    pub y: u16,
}

impl GridPosition {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Fixed-size inventory container
#[derive(Debug)]
pub struct InventoryGrid {
    width: u16,
    height: u16,
    /// Row-major cells, each naming the instance that covers it
    cells: Vec<Option<InstanceId>>,
    /// Placed instances stored by ID
    items: HashMap<InstanceId, ItemInstance>,
}

impl InventoryGrid {
    /// Create a new empty inventory grid
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
            items: HashMap::new(),
        }
    }

    /// Empty grid using the configured default bag size
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.default_grid_width, config.default_grid_height)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Check if a position is valid within the grid
    pub fn is_valid_position(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Validate a shape for instance `id` at origin `(x, y)`.
    ///
    /// The whole footprint is bounds-checked before any cell is tested for
    /// overlap, so an item hanging off the edge always reports
    /// `OutOfBounds`. Cells already owned by `id` count as free.
    fn check_shape(
        &self,
        id: InstanceId,
        shape: &ShapeMask,
        x: u16,
        y: u16,
    ) -> Result<(), InventoryError> {
        let origin = GridPosition::new(x, y);
        let out_of_bounds = shape.solid_cells().any(|c| {
            u32::from(x) + u32::from(c.x) >= u32::from(self.width)
                || u32::from(y) + u32::from(c.y) >= u32::from(self.height)
        });
        if out_of_bounds {
            return Err(InventoryError::OutOfBounds {
                origin,
                width: self.width,
                height: self.height,
            });
        }

        for c in shape.solid_cells() {
            let cell = GridPosition::new(x + u16::from(c.x), y + u16::from(c.y));
            match self.cells[self.index(cell.x, cell.y)] {
                Some(other) if other != id => {
                    return Err(InventoryError::Overlap { cell, other });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// A same-id instance only stands for the member if it is a copy of it:
    /// same template and same origin. Anything else is a foreign item whose
    /// id happens to clash.
    fn check_identity(&self, instance: &ItemInstance) -> Result<(), InventoryError> {
        match self.items.get(&instance.id()) {
            Some(member)
                if !Arc::ptr_eq(member.template(), instance.template())
                    || member.origin() != instance.origin() =>
            {
                Err(InventoryError::IdCollision(instance.id()))
            }
            _ => Ok(()),
        }
    }

    /// Explain why `instance` cannot go at `(x, y)`, or `Ok` if it can
    pub fn check_placement(
        &self,
        instance: &ItemInstance,
        x: u16,
        y: u16,
    ) -> Result<(), InventoryError> {
        self.check_identity(instance)?;
        self.check_shape(instance.id(), instance.actual_shape(), x, y)
    }

    /// Check if an instance can be placed at a position.
    ///
    /// Works for loose instances and for instances already in this grid
    /// (their own cells do not block them).
    pub fn can_place_at(&self, instance: &ItemInstance, x: u16, y: u16) -> bool {
        self.check_placement(instance, x, y).is_ok()
    }

    fn mark_cells(&mut self, instance: &ItemInstance) {
        let id = instance.id();
        for cell in instance.footprint() {
            let index = self.index(cell.x, cell.y);
            self.cells[index] = Some(id);
        }
    }

    fn clear_cells(&mut self, instance: &ItemInstance) {
        for cell in instance.footprint() {
            let index = self.index(cell.x, cell.y);
            self.cells[index] = None;
        }
    }

    /// Place an instance with its rotated bounding box at `(x, y)`.
    ///
    /// If `instance` is a copy of a member (same id, template and origin),
    /// the member is moved: its old cells are released and the new ones
    /// claimed in one step. A different item reusing a member's id is
    /// rejected with `IdCollision`. On failure the grid is untouched and the
    /// instance is handed back.
    pub fn place_at(
        &mut self,
        mut instance: ItemInstance,
        x: u16,
        y: u16,
    ) -> Result<InstanceId, PlacementRejected> {
        if let Err(reason) = self.check_placement(&instance, x, y) {
            debug!("Rejected {} at ({}, {}): {}", instance.id(), x, y, reason);
            return Err(PlacementRejected::new(reason, instance));
        }

        let id = instance.id();
        if let Some(old) = self.items.remove(&id) {
            self.clear_cells(&old);
        }

        instance.set_origin(Some(GridPosition::new(x, y)));
        self.mark_cells(&instance);
        debug!(
            "Placed {} ('{}', {:?}) at ({}, {})",
            id,
            instance.template().id(),
            instance.rotation(),
            x,
            y
        );
        self.items.insert(id, instance);
        Ok(id)
    }

    /// Move and/or turn an instance that is already in the grid.
    ///
    /// The new footprint is validated with the instance's current cells
    /// treated as free; nothing changes on failure.
    pub fn relocate(
        &mut self,
        id: InstanceId,
        x: u16,
        y: u16,
        rotation: Rotation,
    ) -> Result<(), InventoryError> {
        let placed = self.items.get(&id).ok_or(InventoryError::NotPlaced(id))?;
        let shape = placed.template().base_shape().rotated(rotation);
        self.check_shape(id, &shape, x, y)?;

        let Some(mut instance) = self.items.remove(&id) else {
            return Err(InventoryError::NotPlaced(id));
        };
        self.clear_cells(&instance);
        instance.set_rotation(rotation);
        instance.set_origin(Some(GridPosition::new(x, y)));
        self.mark_cells(&instance);
        self.items.insert(id, instance);

        debug!("Relocated {} to ({}, {}) at {:?}", id, x, y, rotation);
        Ok(())
    }

    /// Move a placed instance to a new origin (if possible)
    pub fn move_item(&mut self, id: InstanceId, x: u16, y: u16) -> Result<(), InventoryError> {
        let rotation = self
            .items
            .get(&id)
            .ok_or(InventoryError::NotPlaced(id))?
            .rotation();
        self.relocate(id, x, y, rotation)
    }

    /// Turn a placed instance in place, keeping its origin (if possible)
    pub fn rotate_item(&mut self, id: InstanceId, rotation: Rotation) -> Result<(), InventoryError> {
        let origin = self
            .items
            .get(&id)
            .and_then(|p| p.origin())
            .ok_or(InventoryError::NotPlaced(id))?;
        self.relocate(id, origin.x, origin.y, rotation)
    }

    /// Remove an instance, returning it unplaced
    pub fn remove_instance(&mut self, id: InstanceId) -> Result<ItemInstance, InventoryError> {
        let mut instance = self.items.remove(&id).ok_or(InventoryError::NotPlaced(id))?;
        self.clear_cells(&instance);
        instance.set_origin(None);
        debug!("Removed {}", id);
        Ok(instance)
    }

    /// Remove whatever occupies a grid cell
    pub fn remove_at(&mut self, x: u16, y: u16) -> Option<ItemInstance> {
        let id = self.id_at(x, y)?;
        self.remove_instance(id).ok()
    }

    fn scan_for(&self, id: InstanceId, shape: &ShapeMask) -> Option<GridPosition> {
        for y in 0..self.height {
            for x in 0..self.width {
                if self.check_shape(id, shape, x, y).is_ok() {
                    return Some(GridPosition::new(x, y));
                }
            }
        }
        None
    }

    /// First origin, scanning rows top to bottom and each row left to
    /// right, where the instance fits in its current rotation.
    pub fn find_free_placement(&self, instance: &ItemInstance) -> Option<GridPosition> {
        self.check_identity(instance).ok()?;
        let found = self.scan_for(instance.id(), instance.actual_shape());
        trace!("Free placement for {}: {:?}", instance.id(), found);
        found
    }

    /// Like [`find_free_placement`](Self::find_free_placement), but falls
    /// back to further clockwise turns when the current rotation does not fit.
    pub fn find_free_placement_any_rotation(
        &self,
        instance: &ItemInstance,
    ) -> Option<(GridPosition, Rotation)> {
        self.check_identity(instance).ok()?;
        let base = instance.template().base_shape();
        let mut tried: Vec<ShapeMask> = Vec::with_capacity(4);
        for step in 0..4 {
            let rotation = instance.rotation().then(Rotation::from_steps(step));
            let shape = base.rotated(rotation);
            // Symmetric shapes repeat; no point scanning twice
            if tried.contains(&shape) {
                continue;
            }
            if let Some(pos) = self.scan_for(instance.id(), &shape) {
                return Some((pos, rotation));
            }
            tried.push(shape);
        }
        None
    }

    /// Place an instance at its first free origin
    pub fn auto_place(&mut self, instance: ItemInstance) -> Result<InstanceId, PlacementRejected> {
        if let Err(reason) = self.check_identity(&instance) {
            return Err(PlacementRejected::new(reason, instance));
        }
        match self.find_free_placement(&instance) {
            Some(pos) => self.place_at(instance, pos.x, pos.y),
            None => {
                let reason = InventoryError::NoFreePlacement(instance.id());
                Err(PlacementRejected::new(reason, instance))
            }
        }
    }

    /// Place an instance at its first free origin, turning it if needed
    pub fn auto_place_any_rotation(
        &mut self,
        mut instance: ItemInstance,
    ) -> Result<InstanceId, PlacementRejected> {
        if let Err(reason) = self.check_identity(&instance) {
            return Err(PlacementRejected::new(reason, instance));
        }
        match self.find_free_placement_any_rotation(&instance) {
            Some((pos, rotation)) => {
                instance.set_rotation(rotation);
                self.place_at(instance, pos.x, pos.y)
            }
            None => {
                let reason = InventoryError::NoFreePlacement(instance.id());
                Err(PlacementRejected::new(reason, instance))
            }
        }
    }

    /// ID of the instance covering a cell
    pub fn id_at(&self, x: u16, y: u16) -> Option<InstanceId> {
        if !self.is_valid_position(x, y) {
            return None;
        }
        self.cells[self.index(x, y)]
    }

    /// Get the instance covering a cell
    pub fn instance_at(&self, x: u16, y: u16) -> Option<&ItemInstance> {
        self.id_at(x, y).and_then(|id| self.items.get(&id))
    }

    /// Get a placed instance by ID
    pub fn get(&self, id: InstanceId) -> Option<&ItemInstance> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.items.contains_key(&id)
    }

    /// Get all placed instances in grid position order (top-left to
    /// bottom-right by first covered cell)
    pub fn placed_items(&self) -> Vec<&ItemInstance> {
        let mut seen = HashSet::new();
        let mut result = Vec::with_capacity(self.items.len());

        for id in self.cells.iter().flatten() {
            if seen.insert(*id) {
                if let Some(placed) = self.items.get(id) {
                    result.push(placed);
                }
            }
        }
        result
    }

    /// Get item count
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Check if the grid is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of uncovered cells
    pub fn free_cell_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Check if any space is available
    pub fn has_space(&self) -> bool {
        self.cells.iter().any(|c| c.is_none())
    }

    /// Get the cell contents (for rendering), row-major
    pub fn cells(&self) -> &[Option<InstanceId>] {
        &self.cells
    }

    /// Repack every item in the order given by `mode`, turning items where
    /// that helps. The new layout is built on a scratch grid and only
    /// swapped in if everything fits; otherwise the grid is left as it was.
    pub fn auto_organize(&mut self, mode: SortMode) -> Result<(), InventoryError> {
        let mut order: Vec<&ItemInstance> = self.items.values().collect();
        order.sort_by(|a, b| {
            let (ta, tb) = (a.template(), b.template());
            let (ma, mb) = (ta.metadata(), tb.metadata());
            let primary = match mode {
                SortMode::Size => tb.cell_count().cmp(&ta.cell_count()).then_with(|| {
                    let area = |t: &ShapeMask| t.width() as u16 * t.height() as u16;
                    area(tb.base_shape()).cmp(&area(ta.base_shape()))
                }),
                SortMode::Rarity => mb
                    .rarity
                    .sort_value()
                    .cmp(&ma.rarity.sort_value())
                    .then_with(|| ma.category.sort_value().cmp(&mb.category.sort_value()))
                    .then_with(|| ta.name().cmp(tb.name())),
                SortMode::Category => ma
                    .category
                    .sort_value()
                    .cmp(&mb.category.sort_value())
                    .then_with(|| mb.rarity.sort_value().cmp(&ma.rarity.sort_value()))
                    .then_with(|| ta.name().cmp(tb.name())),
                SortMode::Name => ta.name().cmp(tb.name()),
            };
            primary.then_with(|| a.id().cmp(&b.id()))
        });

        let mut scratch = InventoryGrid::new(self.width, self.height);
        for placed in order {
            let probe =
                ItemInstance::with_rotation(placed.id(), placed.template().clone(), placed.rotation());
            scratch
                .auto_place_any_rotation(probe)
                .map_err(|rejected| rejected.reason)?;
        }

        debug!("Organized {} items by {:?}", scratch.count(), mode);
        *self = scratch;
        Ok(())
    }

    /// Text picture of the occupancy buffer, one line per row. Items get
    /// letters in [`placed_items`](Self::placed_items) order; `.` is free.
    pub fn render(&self) -> String {
        const GLYPHS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
        let glyphs: HashMap<InstanceId, char> = self
            .placed_items()
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id(), GLYPHS.get(i).map(|&g| g as char).unwrap_or('#')))
            .collect();

        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for row in self.cells.chunks(self.width.max(1) as usize) {
            for cell in row {
                out.push(cell.and_then(|id| glyphs.get(&id).copied()).unwrap_or('.'));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::instance::InstanceIdGen;
    use crate::items::template::{ItemTemplate, Rarity};
    use std::sync::Arc;

    fn template(id: &str, rows: &[&str]) -> Arc<ItemTemplate> {
        Arc::new(
            ItemTemplate::builder(id, ShapeMask::from_rows(rows).unwrap())
                .build()
                .unwrap(),
        )
    }

    fn cross() -> Arc<ItemTemplate> {
        template("cross", &[".#.", "###", ".#."])
    }

    fn l_shape() -> Arc<ItemTemplate> {
        template("l", &["#.", "#.", "##"])
    }

    fn dot() -> Arc<ItemTemplate> {
        template("dot", &["#"])
    }

    #[test]
    fn test_place_cross_overlap_and_edge() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(5, 5);

        let a = ItemInstance::new(ids.next_id(), cross());
        assert!(grid.can_place_at(&a, 1, 1));
        let a = grid.place_at(a, 1, 1).unwrap();

        let b = ItemInstance::new(ids.next_id(), cross());
        assert!(!grid.can_place_at(&b, 2, 2));
        let rejected = grid.place_at(b, 2, 2).unwrap_err();
        assert!(matches!(
            rejected.reason,
            InventoryError::Overlap { other, .. } if other == a
        ));

        // A 3x3 cross at (3, 0) reaches column 5, past the edge of a 5x5 bag
        let b = rejected.into_instance();
        assert!(!b.is_placed());
        let rejected = grid.place_at(b, 3, 0).unwrap_err();
        assert!(matches!(rejected.reason, InventoryError::OutOfBounds { .. }));
        assert_eq!(grid.count(), 1);
        assert_eq!(grid.id_at(2, 2), Some(a));
    }

    #[test]
    fn test_cross_beside_cross_in_wider_bag() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(6, 5);
        let a = grid.place_at(ItemInstance::new(ids.next_id(), cross()), 1, 1).unwrap();
        let b = grid.place_at(ItemInstance::new(ids.next_id(), cross()), 3, 0).unwrap();

        assert_eq!(grid.count(), 2);
        assert_eq!(grid.id_at(2, 2), Some(a));
        assert_eq!(grid.id_at(5, 1), Some(b));
        assert_eq!(grid.id_at(3, 0), None);
        assert_eq!(grid.free_cell_count(), 30 - 10);
    }

    #[test]
    fn test_out_of_bounds_beats_overlap() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(5, 5);
        grid.place_at(ItemInstance::new(ids.next_id(), cross()), 1, 1).unwrap();

        let probe = ItemInstance::new(ids.next_id(), cross());
        assert!(matches!(
            grid.check_placement(&probe, 3, 2),
            Err(InventoryError::OutOfBounds { .. })
        ));
        assert!(matches!(
            grid.check_placement(&probe, 60000, 60000),
            Err(InventoryError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_empty_corner_of_mask_may_hang_over_nothing() {
        // Only the solid cells have to land in bounds
        let mut ids = InstanceIdGen::new();
        let grid = InventoryGrid::new(3, 3);
        let probe = ItemInstance::new(ids.next_id(), template("hook", &["#.", ".."]));
        assert!(grid.can_place_at(&probe, 2, 2));
    }

    #[test]
    fn test_placement_postconditions() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(6, 4);
        let inst = ItemInstance::new(ids.next_id(), l_shape());
        assert!(grid.can_place_at(&inst, 2, 1));
        let id = grid.place_at(inst, 2, 1).unwrap();

        let footprint: HashSet<GridPosition> = grid.get(id).unwrap().footprint().into_iter().collect();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let expected = footprint.contains(&GridPosition::new(x, y)).then_some(id);
                assert_eq!(grid.id_at(x, y), expected);
            }
        }
        assert_eq!(grid.get(id).unwrap().origin(), Some(GridPosition::new(2, 1)));
    }

    #[test]
    fn test_place_remove_round_trip() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(5, 5);
        grid.place_at(ItemInstance::new(ids.next_id(), cross()), 2, 2).unwrap();
        let before: Vec<_> = grid.cells().to_vec();
        let free = grid.free_cell_count();

        let id = grid.place_at(ItemInstance::new(ids.next_id(), l_shape()), 0, 0).unwrap();
        let removed = grid.remove_instance(id).unwrap();

        assert!(!removed.is_placed());
        assert_eq!(grid.cells(), before.as_slice());
        assert_eq!(grid.free_cell_count(), free);
        assert!(!grid.contains(id));
    }

    #[test]
    fn test_remove_then_reinsert_other() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(5, 5);
        let id = grid.place_at(ItemInstance::new(ids.next_id(), l_shape()), 0, 0).unwrap();
        grid.remove_instance(id).unwrap();

        let other = ItemInstance::new(ids.next_id(), l_shape());
        assert!(grid.can_place_at(&other, 0, 0));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_remove_unknown_is_not_placed() {
        let mut grid = InventoryGrid::new(5, 5);
        assert_eq!(
            grid.remove_instance(InstanceId(42)).unwrap_err(),
            InventoryError::NotPlaced(InstanceId(42))
        );
        assert!(grid.remove_at(0, 0).is_none());
        assert!(grid.remove_at(9, 9).is_none());
    }

    #[test]
    fn test_single_gap() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(5, 5);
        for y in 0..5 {
            for x in 0..5 {
                if (x, y) != (3, 2) {
                    grid.place_at(ItemInstance::new(ids.next_id(), dot()), x, y).unwrap();
                }
            }
        }

        for big in [l_shape(), cross(), template("bar", &["##"])] {
            let probe = ItemInstance::new(ids.next_id(), big);
            assert_eq!(grid.find_free_placement(&probe), None);
            assert_eq!(grid.find_free_placement_any_rotation(&probe), None);
        }
        let small = ItemInstance::new(ids.next_id(), dot());
        assert_eq!(grid.find_free_placement(&small), Some(GridPosition::new(3, 2)));
    }

    #[test]
    fn test_find_is_row_major() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(4, 3);
        grid.place_at(ItemInstance::new(ids.next_id(), dot()), 0, 0).unwrap();
        grid.place_at(ItemInstance::new(ids.next_id(), dot()), 3, 0).unwrap();

        // (1, 0) fits a 2x1 bar before anything on row 1
        let bar = ItemInstance::new(ids.next_id(), template("bar", &["##"]));
        assert_eq!(grid.find_free_placement(&bar), Some(GridPosition::new(1, 0)));

        // A 3-wide bar cannot use row 0, so the first hit is (0, 1)
        let long = ItemInstance::new(ids.next_id(), template("long", &["###"]));
        assert_eq!(grid.find_free_placement(&long), Some(GridPosition::new(0, 1)));
    }

    #[test]
    fn test_find_none_iff_no_origin_fits() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(2024);
        let shapes = [cross(), l_shape(), dot(), template("bar", &["###"])];
        for _ in 0..50 {
            let mut ids = InstanceIdGen::new();
            let mut grid = InventoryGrid::new(6, 5);
            for _ in 0..rng.gen_range(0..12) {
                let t = shapes[rng.gen_range(0..shapes.len())].clone();
                let inst = ItemInstance::with_rotation(
                    ids.next_id(),
                    t,
                    Rotation::from_steps(rng.gen_range(0..4)),
                );
                let (x, y) = (rng.gen_range(0..6), rng.gen_range(0..5));
                let _ = grid.place_at(inst, x, y);
            }

            for t in &shapes {
                let probe = ItemInstance::new(ids.next_id(), t.clone());
                let any = (0..grid.height())
                    .flat_map(|y| (0..grid.width()).map(move |x| (x, y)))
                    .any(|(x, y)| grid.can_place_at(&probe, x, y));
                assert_eq!(grid.find_free_placement(&probe).is_some(), any);
            }
        }
    }

    #[test]
    fn test_place_at_moves_member() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(5, 5);
        let id = ids.next_id();
        grid.place_at(ItemInstance::new(id, l_shape()), 0, 0).unwrap();

        // A copy of the member moves it, overlapping its own old cells
        let copy = grid.get(id).unwrap().clone();
        assert!(grid.can_place_at(&copy, 0, 1));
        grid.place_at(copy, 0, 1).unwrap();
        assert_eq!(grid.count(), 1);
        assert_eq!(grid.id_at(0, 0), None);
        assert_eq!(grid.id_at(0, 1), Some(id));
        assert_eq!(grid.free_cell_count(), 25 - 4);
    }

    #[test]
    fn test_foreign_item_with_clashing_id_is_rejected() {
        let mut grid = InventoryGrid::new(5, 5);
        let sword = template("sword", &["#", "#", "#"]);
        let sword_id = grid
            .place_at(ItemInstance::new(InstanceIdGen::new().next_id(), sword.clone()), 0, 0)
            .unwrap();

        // Item from another bag whose generator also started at zero
        let gem = ItemInstance::new(InstanceIdGen::new().next_id(), dot());
        assert_eq!(gem.id(), sword_id);
        assert_eq!(
            grid.check_placement(&gem, 3, 3),
            Err(InventoryError::IdCollision(sword_id))
        );
        assert_eq!(grid.find_free_placement(&gem), None);
        let rejected = grid.place_at(gem, 3, 3).unwrap_err();
        assert_eq!(rejected.reason, InventoryError::IdCollision(sword_id));
        let rejected = grid.auto_place(rejected.into_instance()).unwrap_err();
        assert_eq!(rejected.reason, InventoryError::IdCollision(sword_id));
        assert_eq!(rejected.instance.template().id(), "dot");

        // Same template but a fresh, unplaced instance is still not the member
        let twin = ItemInstance::new(sword_id, sword);
        assert!(!grid.can_place_at(&twin, 2, 0));

        assert_eq!(grid.count(), 1);
        assert_eq!(grid.instance_at(0, 0).map(|i| i.template().id()), Some("sword"));
        assert_eq!(grid.id_at(3, 3), None);
    }

    #[test]
    fn test_relocate_and_rotate_in_place() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(4, 4);
        let id = grid.place_at(ItemInstance::new(ids.next_id(), l_shape()), 0, 0).unwrap();

        grid.rotate_item(id, Rotation::R90).unwrap();
        let placed = grid.get(id).unwrap();
        assert_eq!(placed.rotation(), Rotation::R90);
        assert_eq!(placed.bounding_size(), (3, 2));
        assert_eq!(grid.render(), "AAA.\nA...\n....\n....\n");

        grid.move_item(id, 1, 2).unwrap();
        assert_eq!(grid.render(), "....\n....\n.AAA\n.A..\n");
        assert_eq!(grid.free_cell_count(), 16 - 4);
    }

    #[test]
    fn test_failed_relocate_changes_nothing() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(4, 3);
        let id = grid.place_at(ItemInstance::new(ids.next_id(), l_shape()), 0, 0).unwrap();
        grid.place_at(ItemInstance::new(ids.next_id(), dot()), 2, 0).unwrap();
        let before = grid.render();

        assert!(matches!(
            grid.rotate_item(id, Rotation::R90),
            Err(InventoryError::Overlap { .. })
        ));
        assert!(matches!(
            grid.move_item(id, 3, 0),
            Err(InventoryError::OutOfBounds { .. })
        ));
        assert_eq!(grid.render(), before);
        assert_eq!(grid.get(id).unwrap().rotation(), Rotation::R0);
        assert_eq!(
            grid.move_item(InstanceId(99), 0, 0),
            Err(InventoryError::NotPlaced(InstanceId(99)))
        );
    }

    #[test]
    fn test_auto_place_rotates_when_needed() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(3, 1);
        let tall = ItemInstance::new(ids.next_id(), template("tall", &["#", "#", "#"]));

        let rejected = grid.auto_place(tall).unwrap_err();
        assert!(matches!(rejected.reason, InventoryError::NoFreePlacement(_)));

        let id = grid.auto_place_any_rotation(rejected.into_instance()).unwrap();
        assert_eq!(grid.get(id).unwrap().rotation(), Rotation::R90);
        assert!(!grid.has_space());
    }

    #[test]
    fn test_placed_items_in_grid_order() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(4, 4);
        let low = grid.place_at(ItemInstance::new(ids.next_id(), dot()), 0, 3).unwrap();
        let high = grid.place_at(ItemInstance::new(ids.next_id(), dot()), 2, 0).unwrap();

        let order: Vec<InstanceId> = grid.placed_items().iter().map(|p| p.id()).collect();
        assert_eq!(order, vec![high, low]);
        assert!(grid.instance_at(2, 0).is_some());
        assert!(grid.instance_at(1, 0).is_none());
        assert!(grid.instance_at(4, 0).is_none());
    }

    #[test]
    fn test_auto_organize_packs_largest_first() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(3, 3);
        let dot_id = grid.place_at(ItemInstance::new(ids.next_id(), dot()), 0, 0).unwrap();
        let block = grid
            .place_at(ItemInstance::new(ids.next_id(), template("block", &["##", "##"])), 1, 1)
            .unwrap();

        grid.auto_organize(SortMode::Size).unwrap();
        assert_eq!(grid.get(block).unwrap().origin(), Some(GridPosition::new(0, 0)));
        assert_eq!(grid.get(dot_id).unwrap().origin(), Some(GridPosition::new(2, 0)));
        assert_eq!(grid.count(), 2);
        assert_eq!(grid.free_cell_count(), 4);
    }

    #[test]
    fn test_auto_organize_by_rarity() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(3, 1);
        let gem = Arc::new(
            ItemTemplate::builder("gem", ShapeMask::from_rows(&["#"]).unwrap())
                .rarity(Rarity::Legendary)
                .build()
                .unwrap(),
        );
        let bar = grid.place_at(ItemInstance::new(ids.next_id(), template("bar", &["##"])), 0, 0).unwrap();
        let gem = grid.place_at(ItemInstance::new(ids.next_id(), gem), 2, 0).unwrap();

        grid.auto_organize(SortMode::Rarity).unwrap();
        assert_eq!(grid.get(gem).unwrap().origin(), Some(GridPosition::new(0, 0)));
        assert_eq!(grid.get(bar).unwrap().origin(), Some(GridPosition::new(1, 0)));
    }

    #[test]
    fn test_auto_organize_failure_leaves_grid() {
        let mut ids = InstanceIdGen::new();
        let mut grid = InventoryGrid::new(3, 3);
        // The cross fills the middle; two small items sit in the top corners
        let cross_id = grid.place_at(ItemInstance::new(ids.next_id(), cross()), 0, 0).unwrap();
        grid.place_at(ItemInstance::new(ids.next_id(), template("a", &["#"])), 0, 0).unwrap();
        grid.place_at(ItemInstance::new(ids.next_id(), template("a", &["#"])), 2, 0).unwrap();
        let before = grid.render();

        // By name the small items go first and take (0, 0) and (1, 0),
        // which leaves no room for the cross
        assert_eq!(
            grid.auto_organize(SortMode::Name),
            Err(InventoryError::NoFreePlacement(cross_id))
        );
        assert_eq!(grid.render(), before);
        assert_eq!(grid.count(), 3);

        grid.auto_organize(SortMode::Size).unwrap();
        assert_eq!(grid.get(cross_id).unwrap().origin(), Some(GridPosition::new(0, 0)));
    }
}
