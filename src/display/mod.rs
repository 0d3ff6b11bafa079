// Display module for grid formatting and visualization
pub mod formatters;

use crate::item::ItemId;

// Re-export main functions
pub use formatters::{
    column_headers, format_item_display, print_grid, render_occupancy, row_prefix, store_header,
};

/// Trait for displaying grid cells
pub trait CellDisplay {
    /// Get the display string for this cell
    fn display_cell(&self) -> String;

    /// Get the item id if this cell holds an item
    fn item_id(&self) -> Option<ItemId>;
}

impl CellDisplay for Option<ItemId> {
    fn display_cell(&self) -> String {
        match self {
            Some(id) => format_item_display(*id),
            None => ".".to_string(),
        }
    }

    fn item_id(&self) -> Option<ItemId> {
        *self
    }
}
