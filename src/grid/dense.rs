// Dense Store - one slot per cell holding the occupant's id
// O(1) lookup and O(footprint) removal; the default backing

use crate::grid::footprint::Footprint;
use crate::grid::traits::{OccupancyStore, PlacedItem, StoreKind};
use crate::grid_errors::{safe_borrow, GridError, GridResult};
use crate::item::{ItemId, ItemRef};
use log::{debug, warn};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Occupied(ItemId),
}

#[derive(Debug)]
pub struct DenseStore {
    width: u32,
    height: u32,
    cells: Vec<Vec<CellState>>,
    items: HashMap<ItemId, PlacedItem>,
}

impl DenseStore {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![CellState::Empty; width as usize]; height as usize],
            items: HashMap::new(),
        }
    }

    fn cell(&self, x: i32, y: i32) -> Option<CellState> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(self.cells[y as usize][x as usize])
    }

    // Clears only cells that are in bounds and still hold `id`
    fn clear_footprint(&mut self, id: ItemId, footprint: &Footprint) -> usize {
        let mut cleared = 0;
        for (x, y) in footprint.cells() {
            if self.cell(x, y) == Some(CellState::Occupied(id)) {
                self.cells[y as usize][x as usize] = CellState::Empty;
                cleared += 1;
            }
        }
        if cleared != footprint.cell_count() {
            warn!(
                "⚠️ Item {} covered {} of {} recorded cells",
                id,
                cleared,
                footprint.cell_count()
            );
        }
        cleared
    }

    pub fn cells(&self) -> &Vec<Vec<CellState>> {
        &self.cells
    }
}

impl OccupancyStore for DenseStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Dense
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn occupant(&self, x: i32, y: i32) -> Option<ItemId> {
        match self.cell(x, y)? {
            CellState::Occupied(id) => Some(id),
            CellState::Empty => None,
        }
    }

    fn placed(&self, id: ItemId) -> Option<&PlacedItem> {
        self.items.get(&id)
    }

    fn placed_items(&self) -> Vec<&PlacedItem> {
        let mut placed: Vec<&PlacedItem> = self.items.values().collect();
        placed.sort_by_key(|p| p.id);
        placed
    }

    fn place(&mut self, item: ItemRef, footprint: Footprint) -> GridResult<()> {
        let id = safe_borrow(&item, "store place")?.item_id();
        if self.items.contains_key(&id) {
            return Err(GridError::DuplicateItem(id));
        }
        self.validate(&footprint, None)?;

        for (x, y) in footprint.cells() {
            self.cells[y as usize][x as usize] = CellState::Occupied(id);
        }
        self.items.insert(id, PlacedItem { id, item, footprint });
        debug!("Dense store placed {} at {}", id, footprint);
        Ok(())
    }

    fn remove_at(&mut self, x: i32, y: i32) -> Option<PlacedItem> {
        let id = self.occupant(x, y)?;
        let Some(placed) = self.items.remove(&id) else {
            // cell names an item with no record; drop the stray reference only
            warn!("⚠️ Cell ({}, {}) referenced unknown item {}", x, y, id);
            self.cells[y as usize][x as usize] = CellState::Empty;
            return None;
        };
        self.clear_footprint(id, &placed.footprint);
        debug!("Dense store removed {} from {}", id, placed.footprint);
        Some(placed)
    }

    fn clear(&mut self) -> Vec<PlacedItem> {
        for row in &mut self.cells {
            for cell in row.iter_mut() {
                *cell = CellState::Empty;
            }
        }
        let mut removed: Vec<PlacedItem> = self.items.drain().map(|(_, placed)| placed).collect();
        removed.sort_by_key(|p| p.id);
        removed
    }

    fn reallocate(&mut self, width: u32, height: u32) -> GridResult<()> {
        if !self.items.is_empty() {
            return Err(GridError::ResizeRejected {
                placed_items: self.items.len(),
            });
        }
        self.width = width;
        self.height = height;
        self.cells = vec![vec![CellState::Empty; width as usize]; height as usize];
        Ok(())
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
    fn test_new_store_is_empty() {
        let store = DenseStore::new(3, 2);
        assert_eq!(store.cells().len(), 2);
        assert_eq!(store.cells()[0].len(), 3);
        assert_eq!(store.occupied_cell_count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_place_writes_every_cell() {
        let mut store = DenseStore::new(5, 5);
        store.place(item(1, 2, 3), Footprint::new(1, 1, 2, 3)).unwrap();
        assert_eq!(store.occupied_cell_count(), 6);
        assert_eq!(store.occupant(2, 3), Some(ItemId(1)));
        assert_eq!(store.occupant(3, 3), None);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_duplicate_item_rejected() {
        let mut store = DenseStore::new(5, 5);
        let handle = item(1, 1, 1);
        store.place(handle.clone(), Footprint::new(0, 0, 1, 1)).unwrap();
        let before = store.occupancy_snapshot();
        assert_eq!(
            store.place(handle, Footprint::new(4, 4, 1, 1)),
            Err(GridError::DuplicateItem(ItemId(1)))
        );
        assert_eq!(store.occupancy_snapshot(), before);
    }

    #[test]
    fn test_remove_from_any_covered_cell() {
        let mut store = DenseStore::new(4, 4);
        store.place(item(9, 2, 2), Footprint::new(2, 2, 2, 2)).unwrap();
        let removed = store.remove_at(3, 3).expect("cell is covered");
        assert_eq!(removed.id, ItemId(9));
        assert_eq!(removed.footprint, Footprint::new(2, 2, 2, 2));
        assert_eq!(store.occupied_cell_count(), 0);
    }

    #[test]
    fn test_out_of_range_queries_are_empty() {
        let store = DenseStore::new(2, 2);
        assert_eq!(store.occupant(-1, 0), None);
        assert_eq!(store.occupant(2, 0), None);
        assert!(store.get(0, 5).is_none());
    }

    #[test]
    fn test_reallocate_requires_empty() {
        let mut store = DenseStore::new(4, 4);
        store.place(item(1, 1, 1), Footprint::new(0, 0, 1, 1)).unwrap();
        assert_eq!(
            store.reallocate(2, 2),
            Err(GridError::ResizeRejected { placed_items: 1 })
        );
        store.clear();
        store.reallocate(2, 3).unwrap();
        assert_eq!((store.width(), store.height()), (2, 3));
    }
}
