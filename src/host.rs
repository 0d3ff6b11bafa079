// Host layout collaborator - where the grid sits on screen and at what scale

use crate::grid::VerticalAxis;
use std::cell::Cell;

/// Layout facts the grid reads from its host each time a pointer is mapped.
/// Anchor/pivot is fixed at top-left: cell (0, 0) is drawn at `grid_origin`.
pub trait HostLayout {
    /// Grid top-left corner, in the pointer's coordinate space
    fn grid_origin(&self) -> (f32, f32);

    fn scale_factor(&self) -> f32;

    fn vertical_axis(&self) -> VerticalAxis {
        VerticalAxis::Down
    }
}

/// Layout whose values are set by hand. Interior mutability lets the host
/// move the grid while a grid instance shares the same layout.
#[derive(Debug, Clone)]
pub struct FixedLayout {
    origin: Cell<(f32, f32)>,
    scale: Cell<f32>,
    axis: VerticalAxis,
}

impl FixedLayout {
    pub fn new(origin: (f32, f32), scale: f32) -> Self {
        Self {
            origin: Cell::new(origin),
            scale: Cell::new(scale),
            axis: VerticalAxis::Down,
        }
    }

    pub fn with_vertical_axis(mut self, axis: VerticalAxis) -> Self {
        self.axis = axis;
        self
    }

    pub fn set_origin(&self, origin: (f32, f32)) {
        self.origin.set(origin);
    }

    pub fn set_scale(&self, scale: f32) {
        self.scale.set(scale);
    }
}

impl Default for FixedLayout {
    fn default() -> Self {
        Self::new((0.0, 0.0), 1.0)
    }
}

impl HostLayout for FixedLayout {
    fn grid_origin(&self) -> (f32, f32) {
        self.origin.get()
    }

    fn scale_factor(&self) -> f32 {
        self.scale.get()
    }

    fn vertical_axis(&self) -> VerticalAxis {
        self.axis
    }
}
