// Common contract for occupancy backings

use crate::grid::footprint::{first_conflict, footprint_in_bounds, Footprint};
use crate::grid_errors::{GridError, GridResult};
use crate::item::{ItemId, ItemRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which backing an occupancy store uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StoreKind {
    /// Dense matrix of optional item ids
    #[default]
    Dense,
    /// Boolean matrix plus a list of placed-item records
    Records,
}

/// An item held by a store together with the footprint the store recorded for it
#[derive(Debug, Clone)]
pub struct PlacedItem {
    pub id: ItemId,
    pub item: ItemRef,
    pub footprint: Footprint,
}

/// Authoritative record of which cells are occupied and by what.
///
/// Implementations keep three invariants: a cell reports item X iff X's
/// recorded footprint covers it, no two items share a cell, and a failed
/// `place` leaves the store untouched.
pub trait OccupancyStore: fmt::Debug {
    fn kind(&self) -> StoreKind;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Item covering the cell, `None` when empty or out of range
    fn occupant(&self, x: i32, y: i32) -> Option<ItemId>;

    /// Placement record for an item held by this store
    fn placed(&self, id: ItemId) -> Option<&PlacedItem>;

    /// All placed items, ordered by id
    fn placed_items(&self) -> Vec<&PlacedItem>;

    /// Write `item` into every cell of `footprint` after validating bounds,
    /// conflicts and duplicate identity. Nothing is written on failure.
    fn place(&mut self, item: ItemRef, footprint: Footprint) -> GridResult<()>;

    /// Remove whatever covers (x, y), clearing the footprint recorded in the
    /// store. Returns `None` and changes nothing when the cell is empty.
    fn remove_at(&mut self, x: i32, y: i32) -> Option<PlacedItem>;

    /// Drop every placement, returning what was held
    fn clear(&mut self) -> Vec<PlacedItem>;

    /// Change dimensions. Only allowed while the store is empty.
    fn reallocate(&mut self, width: u32, height: u32) -> GridResult<()>;

    fn get(&self, x: i32, y: i32) -> Option<ItemRef> {
        self.occupant(x, y)
            .and_then(|id| self.placed(id))
            .map(|placed| placed.item.clone())
    }

    fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.occupant(x, y).is_some()
    }

    fn is_empty(&self) -> bool {
        self.placed_items().is_empty()
    }

    fn placed_count(&self) -> usize {
        self.placed_items().len()
    }

    /// Check a candidate footprint without mutating anything
    fn validate(&self, footprint: &Footprint, exclude: Option<ItemId>) -> GridResult<()> {
        if !footprint_in_bounds(footprint, self.width(), self.height()) {
            return Err(GridError::OutOfBounds {
                footprint: *footprint,
                grid_width: self.width(),
                grid_height: self.height(),
            });
        }
        match first_conflict(footprint, self, exclude) {
            Some(occupant) => Err(GridError::Conflict {
                footprint: *footprint,
                occupant,
            }),
            None => Ok(()),
        }
    }

    /// Move a placed item to a new anchor. The item's own cells do not count
    /// as conflicts; on failure the original placement is untouched.
    fn relocate(&mut self, id: ItemId, x: i32, y: i32) -> GridResult<Footprint> {
        let current = self.placed(id).cloned().ok_or(GridError::UnknownItem(id))?;
        let target = Footprint::new(x, y, current.footprint.width, current.footprint.height);
        self.validate(&target, Some(id))?;

        let removed = self
            .remove_at(current.footprint.x, current.footprint.y)
            .ok_or(GridError::UnknownItem(id))?;
        if let Err(err) = self.place(removed.item.clone(), target) {
            // validated above, so this only happens if a backing is broken
            log::error!("Relocation of {} failed after validation: {}", id, err);
            self.place(removed.item, current.footprint)?;
            return Err(err);
        }
        Ok(current.footprint)
    }

    fn occupied_cell_count(&self) -> usize {
        let mut count = 0;
        for y in 0..self.height() as i32 {
            for x in 0..self.width() as i32 {
                if self.is_occupied(x, y) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Row-major occupant ids, for comparisons and diagnostics
    fn occupancy_snapshot(&self) -> Vec<Option<ItemId>> {
        let mut cells = Vec::with_capacity(self.width() as usize * self.height() as usize);
        for y in 0..self.height() as i32 {
            for x in 0..self.width() as i32 {
                cells.push(self.occupant(x, y));
            }
        }
        cells
    }

    /// Verify the cell table against the recorded footprints
    fn is_consistent(&self) -> bool {
        match expected_coverage(self) {
            Some(expected) => expected == self.occupancy_snapshot(),
            None => false,
        }
    }
}

/// Row-major coverage implied by the recorded footprints alone. `None` when
/// a footprint leaves the grid or two footprints share a cell.
pub fn expected_coverage<S: OccupancyStore + ?Sized>(store: &S) -> Option<Vec<Option<ItemId>>> {
    let width = store.width() as usize;
    let mut expected = vec![None; width * store.height() as usize];
    for placed in store.placed_items() {
        if !footprint_in_bounds(&placed.footprint, store.width(), store.height()) {
            return None;
        }
        for (x, y) in placed.footprint.cells() {
            let slot = &mut expected[y as usize * width + x as usize];
            if slot.is_some() {
                return None;
            }
            *slot = Some(placed.id);
        }
    }
    Some(expected)
}

/// Build an empty store of the requested kind
pub fn new_store(kind: StoreKind, width: u32, height: u32) -> Box<dyn OccupancyStore> {
    match kind {
        StoreKind::Dense => Box::new(crate::grid::DenseStore::new(width, height)),
        StoreKind::Records => Box::new(crate::grid::RecordStore::new(width, height)),
    }
}
