//! Grid shared between threads
//!
//! One lock per grid. Footprints are tiny, so every operation holds the
//! lock for a handful of cell reads at most.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::grid::{GridPosition, InventoryGrid};
use super::instance::{InstanceId, ItemInstance};
use crate::error::{InventoryError, PlacementRejected};

/// Cloneable handle to a mutex-guarded grid
#[derive(Debug, Clone)]
pub struct SharedGrid {
    inner: Arc<Mutex<InventoryGrid>>,
}

impl SharedGrid {
    pub fn new(grid: InventoryGrid) -> Self {
        Self {
            inner: Arc::new(Mutex::new(grid)),
        }
    }

    /// Exclusive access for a sequence of operations
    pub fn lock(&self) -> MutexGuard<'_, InventoryGrid> {
        self.inner.lock()
    }

    /// Run `f` with the grid locked
    pub fn with<R>(&self, f: impl FnOnce(&mut InventoryGrid) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn place_at(
        &self,
        instance: ItemInstance,
        x: u16,
        y: u16,
    ) -> Result<InstanceId, PlacementRejected> {
        self.inner.lock().place_at(instance, x, y)
    }

    /// Find and claim a spot under one lock, so no other thread can take
    /// it between the scan and the placement
    pub fn auto_place(&self, instance: ItemInstance) -> Result<InstanceId, PlacementRejected> {
        self.inner.lock().auto_place(instance)
    }

    pub fn remove_instance(&self, id: InstanceId) -> Result<ItemInstance, InventoryError> {
        self.inner.lock().remove_instance(id)
    }

    pub fn id_at(&self, x: u16, y: u16) -> Option<InstanceId> {
        self.inner.lock().id_at(x, y)
    }

    pub fn origin_of(&self, id: InstanceId) -> Option<GridPosition> {
        self.inner.lock().get(id).and_then(|p| p.origin())
    }

    /// Recover the grid once every other handle is gone
    pub fn try_unwrap(self) -> Result<InventoryGrid, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::shape::ShapeMask;
    use crate::items::template::ItemTemplate;
    use std::thread;

    #[test]
    fn test_concurrent_auto_place_never_overlaps() {
        let bar = Arc::new(
            ItemTemplate::builder("bar", ShapeMask::from_rows(&["##"]).unwrap())
                .build()
                .unwrap(),
        );
        let shared = SharedGrid::new(InventoryGrid::new(6, 4));

        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let shared = shared.clone();
                let bar = bar.clone();
                thread::spawn(move || {
                    (0..4u64)
                        .filter(|i| {
                            let inst = ItemInstance::new(InstanceId(t * 100 + i), bar.clone());
                            shared.auto_place(inst).is_ok()
                        })
                        .count()
                })
            })
            .collect();

        let placed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(placed, 12);

        let grid = shared.try_unwrap().unwrap();
        assert_eq!(grid.count(), 12);
        assert_eq!(grid.free_cell_count(), 0);
        for item in grid.placed_items() {
            for cell in item.footprint() {
                assert_eq!(grid.id_at(cell.x, cell.y), Some(item.id()));
            }
        }
    }

    #[test]
    fn test_handles_share_state() {
        let dot = Arc::new(
            ItemTemplate::builder("dot", ShapeMask::rect(1, 1).unwrap())
                .build()
                .unwrap(),
        );
        let a = SharedGrid::new(InventoryGrid::new(2, 2));
        let b = a.clone();

        let id = a.place_at(ItemInstance::new(InstanceId(1), dot), 1, 1).unwrap();
        assert_eq!(b.id_at(1, 1), Some(id));
        assert_eq!(b.origin_of(id), Some(GridPosition::new(1, 1)));
        assert!(b.try_unwrap().is_err());

        a.remove_instance(id).unwrap();
        assert_eq!(a.with(|g| g.free_cell_count()), 4);
    }
}
