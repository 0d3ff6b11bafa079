// Inventory Grid: cell occupancy and placement engine for grid-based inventories
// Each grid owns an occupancy store and answers placement, removal and pointer mapping

// Modular structure
pub mod config;
pub mod display;
pub mod grid;
pub mod host;
pub mod item;
pub mod metadata;
pub mod persistence;

// Import our error handling module
pub mod grid_errors;
pub use grid_errors::{report, safe_borrow, safe_borrow_mut, GridError, GridResult, InactiveReason};

pub mod grid_instance;

// Re-export main types for convenience
pub use config::GridConfig;
pub use grid::{
    CellMapper, DenseStore, Footprint, OccupancyStore, PlacedItem, RecordStore, RenderAnchor,
    StoreKind, VerticalAxis,
};
pub use grid_instance::{GridInstance, GridLifecycle, ResizePolicy};
pub use host::{FixedLayout, HostLayout};
pub use item::{GridItem, InventoryItem, ItemId, ItemPlacement, ItemRef};
pub use metadata::{AccessLevel, GridFeatures, GridType};
pub use persistence::{GridSnapshot, PlacementRecord, RestoreReport};
pub use display::{format_item_display, print_grid, render_occupancy, CellDisplay};

/// World units per cell when a grid does not configure its own size
pub const DEFAULT_CELL_SIZE: f32 = 64.0;

/// Largest width or height a grid accepts; larger requests are clamped
pub const MAX_GRID_DIMENSION: u32 = 256;

pub const MAX_PRIORITY: u8 = 100;
