// Grid module - occupancy backings and the pure helpers they share
// Every backing implements `OccupancyStore`, so grid instances can swap them freely

pub mod dense;
pub mod footprint;
pub mod mapper;
pub mod records;
pub mod traits;

// Re-export the main grid types for easy access
pub use dense::{CellState, DenseStore};
pub use footprint::{conflicts, in_bounds, Footprint};
pub use mapper::{render_anchor, to_cell, CellMapper, RenderAnchor, VerticalAxis};
pub use records::RecordStore;
pub use traits::{new_store, OccupancyStore, PlacedItem, StoreKind};
