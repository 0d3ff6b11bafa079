use crate::grid::footprint::Footprint;
use crate::item::{GridItem, ItemId, ItemRef};
use log::warn;
use std::cell::{Ref, RefMut};
use std::fmt;

/// Why a grid refused a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InactiveReason {
    /// `initialize` has not run yet
    Uninitialized,
    /// Disabled at initialization because the host layout was missing
    Disabled,
    /// The active flag is off
    Inactive,
    /// Access level or feature set marks the grid read-only
    ReadOnly,
}

impl fmt::Display for InactiveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InactiveReason::Uninitialized => write!(f, "grid is not initialized"),
            InactiveReason::Disabled => write!(f, "grid was disabled at initialization"),
            InactiveReason::Inactive => write!(f, "grid is inactive"),
            InactiveReason::ReadOnly => write!(f, "grid is read-only"),
        }
    }
}

/// Errors reported by grid operations
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Coordinate or rectangle outside the grid extent
    OutOfBounds {
        footprint: Footprint,
        grid_width: u32,
        grid_height: u32,
    },
    /// Target cells already hold a different item
    Conflict {
        footprint: Footprint,
        occupant: ItemId,
    },
    /// Grid inactive, read-only, disabled or not yet initialized
    NotActive { reason: InactiveReason },
    /// Required host layout collaborator unavailable at init
    MissingHostState(String),
    /// Item still records a placement (in this grid or another one)
    AlreadyPlaced { item: ItemId, grid_id: String },
    /// Item id already held by this store
    DuplicateItem(ItemId),
    /// Item id is not placed in this grid
    UnknownItem(ItemId),
    /// No free rectangle of the requested size
    NoSpace { width: u32, height: u32 },
    /// Item handle is already borrowed elsewhere
    ItemBorrowed(String),
    /// Resize refused because cells are occupied
    ResizeRejected { placed_items: usize },
    /// Configuration errors
    Config(String),
    /// Snapshot encode/decode or restore errors
    Snapshot(String),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::OutOfBounds {
                footprint,
                grid_width,
                grid_height,
            } => write!(
                f,
                "Footprint {} is outside the {}x{} grid",
                footprint, grid_width, grid_height
            ),
            GridError::Conflict {
                footprint,
                occupant,
            } => write!(f, "Footprint {} overlaps item {}", footprint, occupant),
            GridError::NotActive { reason } => write!(f, "Grid rejected mutation: {}", reason),
            GridError::MissingHostState(msg) => write!(f, "Missing host state: {}", msg),
            GridError::AlreadyPlaced { item, grid_id } => {
                write!(f, "Item {} is already placed in grid '{}'", item, grid_id)
            }
            GridError::DuplicateItem(item) => {
                write!(f, "Item {} is already held by this store", item)
            }
            GridError::UnknownItem(item) => write!(f, "Item {} is not placed in this grid", item),
            GridError::NoSpace { width, height } => {
                write!(f, "No free {}x{} area in grid", width, height)
            }
            GridError::ItemBorrowed(msg) => write!(f, "Item handle busy: {}", msg),
            GridError::ResizeRejected { placed_items } => write!(
                f,
                "Resize rejected: {} item(s) still placed",
                placed_items
            ),
            GridError::Config(msg) => write!(f, "Configuration error: {}", msg),
            GridError::Snapshot(msg) => write!(f, "Snapshot error: {}", msg),
        }
    }
}

impl std::error::Error for GridError {}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::Snapshot(err.to_string())
    }
}

impl From<bincode::Error> for GridError {
    fn from(err: bincode::Error) -> Self {
        GridError::Snapshot(err.to_string())
    }
}

/// Result type alias for grid operations
pub type GridResult<T> = Result<T, GridError>;

impl GridError {
    /// Expected outcomes of interactive placement (hovering over an occupied
    /// cell, dropping outside the grid) as opposed to misuse of the API.
    pub fn is_placement_rejection(&self) -> bool {
        matches!(
            self,
            GridError::OutOfBounds { .. } | GridError::Conflict { .. }
        )
    }
}

/// Turn a result into the boolean/optional reporting used by interactive
/// callers, leaving a diagnostic log entry for failures.
pub fn report<T>(result: GridResult<T>, context: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            if err.is_placement_rejection() {
                log::debug!("{}: {}", context, err);
            } else {
                warn!("⚠️ {}: {}", context, err);
            }
            None
        }
    }
}

/// Safe shared borrow of an item handle
pub fn safe_borrow<'a>(
    item: &'a ItemRef,
    context: &str,
) -> GridResult<Ref<'a, dyn GridItem + 'static>> {
    item.try_borrow()
        .map_err(|_| GridError::ItemBorrowed(format!("cannot read item for {}", context)))
}

/// Safe exclusive borrow of an item handle
pub fn safe_borrow_mut<'a>(
    item: &'a ItemRef,
    context: &str,
) -> GridResult<RefMut<'a, dyn GridItem + 'static>> {
    item.try_borrow_mut()
        .map_err(|_| GridError::ItemBorrowed(format!("cannot update item for {}", context)))
}
