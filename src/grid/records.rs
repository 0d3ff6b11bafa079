// Record Store - boolean occupancy matrix plus a list of placed-item records
// Used by container-style grids; records are indexed by item id and by cell so nothing scans the list

use crate::grid::footprint::Footprint;
use crate::grid::traits::{expected_coverage, OccupancyStore, PlacedItem, StoreKind};
use crate::grid_errors::{safe_borrow, GridError, GridResult};
use crate::item::{ItemId, ItemRef};
use log::debug;
use std::collections::HashMap;

#[derive(Debug)]
pub struct RecordStore {
    width: u32,
    height: u32,
    occupied: Vec<Vec<bool>>,
    // record slot covering each cell, kept beside the flags
    slots: Vec<Vec<Option<usize>>>,
    records: Vec<PlacedItem>,
    index: HashMap<ItemId, usize>,
}

impl RecordStore {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            occupied: vec![vec![false; width as usize]; height as usize],
            slots: vec![vec![None; width as usize]; height as usize],
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn in_range(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    fn slot_at(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_range(x, y) || !self.occupied[y as usize][x as usize] {
            return None;
        }
        self.slots[y as usize][x as usize]
    }

    fn write_slot(&mut self, footprint: &Footprint, slot: Option<usize>) {
        for (x, y) in footprint.cells() {
            if self.in_range(x, y) {
                self.occupied[y as usize][x as usize] = slot.is_some();
                self.slots[y as usize][x as usize] = slot;
            }
        }
    }

    /// Raw occupancy flags, row-major `[y][x]`
    pub fn occupied(&self) -> &Vec<Vec<bool>> {
        &self.occupied
    }

    /// Records in insertion order (removal swaps the last record into the gap)
    pub fn records(&self) -> &[PlacedItem] {
        &self.records
    }

    // The last record moves into `slot`, so its cells are rewritten
    fn take_record(&mut self, slot: usize) -> PlacedItem {
        let record = self.records.swap_remove(slot);
        self.index.remove(&record.id);
        if let Some(moved) = self.records.get(slot) {
            let (id, footprint) = (moved.id, moved.footprint);
            self.index.insert(id, slot);
            self.write_slot(&footprint, Some(slot));
        }
        record
    }
}

impl OccupancyStore for RecordStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Records
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn occupant(&self, x: i32, y: i32) -> Option<ItemId> {
        self.slot_at(x, y)
            .and_then(|slot| self.records.get(slot))
            .map(|record| record.id)
    }

    fn placed(&self, id: ItemId) -> Option<&PlacedItem> {
        self.index.get(&id).map(|&slot| &self.records[slot])
    }

    fn placed_items(&self) -> Vec<&PlacedItem> {
        let mut placed: Vec<&PlacedItem> = self.records.iter().collect();
        placed.sort_by_key(|p| p.id);
        placed
    }

    fn place(&mut self, item: ItemRef, footprint: Footprint) -> GridResult<()> {
        let id = safe_borrow(&item, "store place")?.item_id();
        if self.index.contains_key(&id) {
            return Err(GridError::DuplicateItem(id));
        }
        self.validate(&footprint, None)?;

        let slot = self.records.len();
        self.write_slot(&footprint, Some(slot));
        self.index.insert(id, slot);
        self.records.push(PlacedItem { id, item, footprint });
        debug!("Record store placed {} at {}", id, footprint);
        Ok(())
    }

    fn remove_at(&mut self, x: i32, y: i32) -> Option<PlacedItem> {
        let slot = self.slot_at(x, y)?;
        let footprint = self.records.get(slot)?.footprint;

        // clear before the swap so only cells still naming this slot are touched
        for (cx, cy) in footprint.cells() {
            if self.in_range(cx, cy) && self.slots[cy as usize][cx as usize] == Some(slot) {
                self.occupied[cy as usize][cx as usize] = false;
                self.slots[cy as usize][cx as usize] = None;
            }
        }
        let record = self.take_record(slot);
        debug!("Record store removed {} from {}", record.id, record.footprint);
        Some(record)
    }

    fn clear(&mut self) -> Vec<PlacedItem> {
        for row in &mut self.occupied {
            row.iter_mut().for_each(|cell| *cell = false);
        }
        for row in &mut self.slots {
            row.iter_mut().for_each(|slot| *slot = None);
        }
        self.index.clear();
        let mut removed: Vec<PlacedItem> = self.records.drain(..).collect();
        removed.sort_by_key(|p| p.id);
        removed
    }

    fn reallocate(&mut self, width: u32, height: u32) -> GridResult<()> {
        if !self.records.is_empty() {
            return Err(GridError::ResizeRejected {
                placed_items: self.records.len(),
            });
        }
        self.width = width;
        self.height = height;
        self.occupied = vec![vec![false; width as usize]; height as usize];
        self.slots = vec![vec![None; width as usize]; height as usize];
        Ok(())
    }

    // The flag matrix and slot index must agree with the records too
    fn is_consistent(&self) -> bool {
        let Some(expected) = expected_coverage(self) else {
            return false;
        };
        let flags_match = self
            .occupied
            .iter()
            .flatten()
            .zip(self.slots.iter().flatten())
            .zip(expected.iter())
            .all(|((flag, slot), owner)| {
                *flag == owner.is_some()
                    && slot.and_then(|s| self.records.get(s)).map(|r| r.id) == *owner
            });
        let index_matches = self.index.len() == self.records.len()
            && self
                .index
                .iter()
                .all(|(id, &slot)| self.records.get(slot).map(|r| r.id) == Some(*id));
        flags_match && index_matches && expected == self.occupancy_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::InventoryItem;

    fn item(id: u64, w: u32, h: u32) -> ItemRef {
        InventoryItem::shared(id, format!("item-{}", id), w, h)
    }

    #[test]
    fn test_flags_follow_records() {
        let mut store = RecordStore::new(4, 3);
        store.place(item(1, 2, 2), Footprint::new(0, 0, 2, 2)).unwrap();
        assert!(store.occupied()[1][1]);
        assert!(!store.occupied()[2][1]);
        assert_eq!(store.records().len(), 1);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_remove_keeps_index_valid_after_swap() {
        let mut store = RecordStore::new(6, 1);
        store.place(item(1, 1, 1), Footprint::new(0, 0, 1, 1)).unwrap();
        store.place(item(2, 1, 1), Footprint::new(1, 0, 1, 1)).unwrap();
        store.place(item(3, 2, 1), Footprint::new(2, 0, 2, 1)).unwrap();

        let removed = store.remove_at(0, 0).unwrap();
        assert_eq!(removed.id, ItemId(1));
        assert_eq!(store.placed(ItemId(3)).unwrap().footprint, Footprint::new(2, 0, 2, 1));
        assert_eq!(store.occupant(3, 0), Some(ItemId(3)));
        assert!(store.is_consistent());

        store.remove_at(3, 0).unwrap();
        assert_eq!(store.occupied_cell_count(), 1);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_slot_index_follows_swapped_record() {
        let mut store = RecordStore::new(4, 4);
        store.place(item(1, 1, 1), Footprint::new(0, 0, 1, 1)).unwrap();
        store.place(item(2, 2, 2), Footprint::new(2, 2, 2, 2)).unwrap();

        // record 2 moves into slot 0; every one of its cells must follow
        store.remove_at(0, 0).unwrap();
        for (x, y) in Footprint::new(2, 2, 2, 2).cells() {
            assert_eq!(store.occupant(x, y), Some(ItemId(2)));
        }
        assert!(store.is_consistent());

        store.place(item(3, 2, 1), Footprint::new(0, 0, 2, 1)).unwrap();
        assert_eq!(store.remove_at(3, 3).unwrap().id, ItemId(2));
        assert_eq!(store.occupant(1, 0), Some(ItemId(3)));
        assert_eq!(store.occupied_cell_count(), 2);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_conflicting_place_leaves_flags_untouched() {
        let mut store = RecordStore::new(3, 3);
        store.place(item(1, 2, 2), Footprint::new(1, 1, 2, 2)).unwrap();
        let before = store.occupied().clone();
        let err = store.place(item(2, 2, 2), Footprint::new(0, 0, 2, 2)).unwrap_err();
        assert_eq!(
            err,
            GridError::Conflict {
                footprint: Footprint::new(0, 0, 2, 2),
                occupant: ItemId(1)
            }
        );
        assert_eq!(store.occupied(), &before);
        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn test_remove_empty_cell_is_noop() {
        let mut store = RecordStore::new(3, 3);
        assert!(store.remove_at(1, 1).is_none());
        assert!(store.remove_at(-4, 9).is_none());
        assert!(store.is_consistent());
    }
}
