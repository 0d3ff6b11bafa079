// Coordinate Mapper - continuous pointer positions to discrete cells and back

use crate::grid::footprint::Footprint;
use crate::DEFAULT_CELL_SIZE;
use serde::{Deserialize, Serialize};

/// Direction in which the host's vertical coordinate grows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalAxis {
    /// Screen space: y grows downward, like the row index
    #[default]
    Down,
    /// World/canvas space: y grows upward, opposite to the row index
    Up,
}

/// Grid-local position at which an item's visual is centred.
///
/// The row axis is negated so the value can be used directly on an
/// upward-growing visual axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderAnchor {
    pub x: f32,
    pub y: f32,
}

/// Everything needed to turn a pointer position into a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMapper {
    /// Grid top-left corner, same space as the pointer
    pub origin: (f32, f32),
    pub cell_size: f32,
    pub scale_factor: f32,
    pub vertical_axis: VerticalAxis,
}

impl CellMapper {
    pub fn new(origin: (f32, f32), cell_size: f32, scale_factor: f32) -> Self {
        Self {
            origin,
            cell_size,
            scale_factor,
            vertical_axis: VerticalAxis::Down,
        }
    }

    pub fn with_vertical_axis(mut self, axis: VerticalAxis) -> Self {
        self.vertical_axis = axis;
        self
    }

    /// On-screen size of one cell. Falls back to the crate default when the
    /// configured size or scale would make it zero, negative or non-finite.
    pub fn effective_cell_size(&self) -> f32 {
        let size = self.cell_size * self.scale_factor;
        if size.is_finite() && size > 0.0 {
            size
        } else {
            log::debug!(
                "Invalid effective cell size {} (cell_size={}, scale={}), using default",
                size,
                self.cell_size,
                self.scale_factor
            );
            DEFAULT_CELL_SIZE
        }
    }

    /// Cell containing `pointer`, clamped into a `grid_width` x `grid_height` grid.
    /// Never fails: positions outside the grid snap to the nearest edge cell.
    pub fn to_cell(&self, pointer: (f32, f32), grid_width: u32, grid_height: u32) -> (i32, i32) {
        let size = self.effective_cell_size();
        let local_x = pointer.0 - self.origin.0;
        let local_y = match self.vertical_axis {
            VerticalAxis::Down => pointer.1 - self.origin.1,
            VerticalAxis::Up => self.origin.1 - pointer.1,
        };

        (
            clamp_index(local_x / size, grid_width),
            clamp_index(local_y / size, grid_height),
        )
    }

    /// Pointer-space centre of a cell, the inverse of `to_cell`
    pub fn cell_center(&self, x: i32, y: i32) -> (f32, f32) {
        let size = self.effective_cell_size();
        let local_x = (x as f32 + 0.5) * size;
        let local_y = (y as f32 + 0.5) * size;
        match self.vertical_axis {
            VerticalAxis::Down => (self.origin.0 + local_x, self.origin.1 + local_y),
            VerticalAxis::Up => (self.origin.0 + local_x, self.origin.1 - local_y),
        }
    }
}

// floor, then clamp; `as` saturates and maps NaN to 0
fn clamp_index(offset: f32, extent: u32) -> i32 {
    let max = extent.max(1) as i64 - 1;
    let index = offset.floor() as i64;
    index.clamp(0, max) as i32
}

/// Pointer-to-cell mapping for hosts that keep no mapper around
pub fn to_cell(
    pointer: (f32, f32),
    origin: (f32, f32),
    cell_size: f32,
    scale_factor: f32,
    grid_width: u32,
    grid_height: u32,
    vertical_axis: VerticalAxis,
) -> (i32, i32) {
    CellMapper::new(origin, cell_size, scale_factor)
        .with_vertical_axis(vertical_axis)
        .to_cell(pointer, grid_width, grid_height)
}

/// Grid-local top-left pixel of a cell (row axis growing downward)
pub fn cell_origin(x: i32, y: i32, cell_size: f32) -> (f32, f32) {
    (x as f32 * cell_size, y as f32 * cell_size)
}

pub fn render_anchor(footprint: &Footprint, cell_size: f32) -> RenderAnchor {
    let (left, top) = cell_origin(footprint.x, footprint.y, cell_size);
    RenderAnchor {
        x: left + footprint.width as f32 * cell_size / 2.0,
        y: -(top + footprint.height as f32 * cell_size / 2.0),
    }
}
