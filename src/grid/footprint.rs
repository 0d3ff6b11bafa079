// Footprint Validator - pure bounds and overlap predicates
// Both backings answer `occupant`, so the checks here never depend on how cells are stored

use crate::grid::traits::OccupancyStore;
use crate::item::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rectangle of cells an item covers: top-left anchor plus extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom-right cell covered by this footprint
    pub fn bottom_right(&self) -> (i64, i64) {
        (
            self.x as i64 + self.width as i64 - 1,
            self.y as i64 + self.height as i64 - 1,
        )
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (right, bottom) = self.bottom_right();
        x >= self.x && y >= self.y && (x as i64) <= right && (y as i64) <= bottom
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Every covered cell in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let (x, y, w, h) = (self.x, self.y, self.width as i32, self.height as i32);
        (0..h).flat_map(move |dy| (0..w).map(move |dx| (x + dx, y + dy)))
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@({},{})", self.width, self.height, self.x, self.y)
    }
}

/// True iff the rectangle lies fully inside a `grid_width` x `grid_height` grid.
///
/// Only the top-left and bottom-right corners are checked; the rectangle is
/// axis-aligned and contiguous so that is sufficient. Empty rectangles are
/// never in bounds.
pub fn in_bounds(x: i32, y: i32, width: u32, height: u32, grid_width: u32, grid_height: u32) -> bool {
    if width == 0 || height == 0 {
        return false;
    }
    let right = x as i64 + width as i64 - 1;
    let bottom = y as i64 + height as i64 - 1;
    x >= 0 && y >= 0 && right < grid_width as i64 && bottom < grid_height as i64
}

pub fn footprint_in_bounds(footprint: &Footprint, grid_width: u32, grid_height: u32) -> bool {
    in_bounds(
        footprint.x,
        footprint.y,
        footprint.width,
        footprint.height,
        grid_width,
        grid_height,
    )
}

/// First occupant other than `exclude` found inside the footprint
pub fn first_conflict<S: OccupancyStore + ?Sized>(
    footprint: &Footprint,
    store: &S,
    exclude: Option<ItemId>,
) -> Option<ItemId> {
    footprint
        .cells()
        .filter_map(|(cx, cy)| store.occupant(cx, cy))
        .find(|occupant| Some(*occupant) != exclude)
}

/// True if the rectangle is out of bounds or overlaps any occupant other than
/// `exclude`. Drag previews pass the dragged item as `exclude` so it does not
/// collide with its own current footprint.
pub fn conflicts<S: OccupancyStore + ?Sized>(
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    store: &S,
    exclude: Option<ItemId>,
) -> bool {
    if !in_bounds(x, y, width, height, store.width(), store.height()) {
        return true;
    }
    first_conflict(&Footprint::new(x, y, width, height), store, exclude).is_some()
}
