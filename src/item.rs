// Item collaborator - what the grid needs to know about the things it holds

use crate::grid::footprint::Footprint;
use crate::grid::mapper::RenderAnchor;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Stable identity of an item, assigned by whoever creates it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Back-reference recorded on an item while it sits in a grid.
///
/// Relation only: the grid is named by id, not owned or borrowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPlacement {
    pub grid_id: String,
    pub footprint: Footprint,
    pub render_anchor: RenderAnchor,
}

/// Interface the grid consumes from items.
///
/// The footprint handed to `set_placement` is a copy for the item's own use;
/// the grid never reads it back when removing.
pub trait GridItem: fmt::Debug {
    fn item_id(&self) -> ItemId;

    /// Extent in cells (width, height)
    fn size(&self) -> (u32, u32);

    fn placement(&self) -> Option<&ItemPlacement>;

    fn set_placement(&mut self, placement: Option<ItemPlacement>);

    /// Called after the grid dropped the item during a resize
    fn on_evicted(&mut self, _grid_id: &str) {}
}

/// Shared handle to an item. The creator owns the item; grids keep clones
/// only while the item is placed.
pub type ItemRef = Rc<RefCell<dyn GridItem>>;

/// Plain item used by factories, persistence restore and tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    placement: Option<ItemPlacement>,
    #[serde(skip)]
    evictions: u32,
}

impl InventoryItem {
    pub fn new(id: u64, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: ItemId(id),
            name: name.into(),
            width,
            height,
            placement: None,
            evictions: 0,
        }
    }

    /// Create the item already wrapped in a shared handle
    pub fn shared(id: u64, name: impl Into<String>, width: u32, height: u32) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(id, name, width, height)))
    }

    /// How many times a grid evicted this item
    pub fn evictions(&self) -> u32 {
        self.evictions
    }
}

impl GridItem for InventoryItem {
    fn item_id(&self) -> ItemId {
        self.id
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn placement(&self) -> Option<&ItemPlacement> {
        self.placement.as_ref()
    }

    fn set_placement(&mut self, placement: Option<ItemPlacement>) {
        self.placement = placement;
    }

    fn on_evicted(&mut self, _grid_id: &str) {
        self.evictions += 1;
    }
}
