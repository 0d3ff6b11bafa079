// Grid Instance - one occupancy store plus identity and metadata
// Composes the mapper and validator into the placement API used by drag handlers, factories and loaders

use crate::config::grid_config::clamp_dimension;
use crate::config::GridConfig;
use crate::display::render_occupancy;
use crate::grid::{
    conflicts, in_bounds, new_store, render_anchor, CellMapper, Footprint, OccupancyStore,
    RenderAnchor, StoreKind,
};
use crate::grid_errors::{
    report, safe_borrow, safe_borrow_mut, GridError, GridResult, InactiveReason,
};
use crate::host::HostLayout;
use crate::item::{ItemId, ItemPlacement, ItemRef};
use crate::metadata::{AccessLevel, GridFeatures, GridType};
use crate::persistence::{GridSnapshot, PlacementRecord, RestoreReport};
use crate::MAX_PRIORITY;
use log::{debug, error, info, warn};
use std::rc::Rc;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLifecycle {
    /// Dimensions known, store not allocated yet
    Uninitialized,
    /// Store allocated and host layout attached
    Active,
    /// Host layout was missing at initialization; refuses all operations
    Disabled,
}

/// What to do with placed items when the grid changes size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizePolicy {
    /// Refuse the resize while anything is placed
    #[default]
    RejectIfOccupied,
    /// Drop every item, clearing its back-reference and calling `on_evicted`
    EvictAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingResize {
    width: u32,
    height: u32,
    policy: ResizePolicy,
}

pub struct GridInstance {
    id: String,
    name: String,
    description: String,
    width: u32,
    height: u32,
    cell_size: f32,
    grid_type: GridType,
    access_level: AccessLevel,
    features: GridFeatures,
    active: bool,
    priority: u8,
    sort_weight: i32,
    created_at: SystemTime,
    modified_at: SystemTime,
    revision: u64,
    store_kind: StoreKind,
    store: Option<Box<dyn OccupancyStore>>,
    host: Option<Rc<dyn HostLayout>>,
    lifecycle: GridLifecycle,
    pending_resize: Option<PendingResize>,
}

impl GridInstance {
    pub fn new(config: GridConfig) -> Self {
        let config = config.clamped();
        let now = SystemTime::now();
        let mut grid = Self {
            id: config.id.unwrap_or_default(),
            name: config.name,
            description: config.description,
            width: config.width,
            height: config.height,
            cell_size: config.cell_size,
            grid_type: config.grid_type,
            access_level: config.access_level,
            features: config.features,
            active: config.active,
            priority: config.priority,
            sort_weight: config.sort_weight,
            created_at: now,
            modified_at: now,
            revision: 0,
            store_kind: config.store,
            store: None,
            host: None,
            lifecycle: GridLifecycle::Uninitialized,
            pending_resize: None,
        };
        grid.ensure_id();
        grid
    }

    /// Create and initialize in one step
    pub fn with_host(config: GridConfig, host: Rc<dyn HostLayout>) -> GridResult<Self> {
        let mut grid = Self::new(config);
        grid.initialize(Some(host))?;
        Ok(grid)
    }

    /// Assign a fresh unique id if none is set. Runs once from `new`; `id()`
    /// never generates anything.
    pub fn ensure_id(&mut self) -> &str {
        if self.id.is_empty() {
            self.id = uuid::Uuid::new_v4().to_string();
            debug!("Generated id {} for grid '{}'", self.id, self.name);
            self.touch();
        }
        &self.id
    }

    /// Allocate the occupancy store and attach the host layout.
    ///
    /// A missing host disables the grid for good; the error is logged once.
    pub fn initialize(&mut self, host: Option<Rc<dyn HostLayout>>) -> GridResult<()> {
        match self.lifecycle {
            GridLifecycle::Disabled => {
                return Err(GridError::NotActive {
                    reason: InactiveReason::Disabled,
                })
            }
            GridLifecycle::Active => {
                if let Some(host) = host {
                    self.host = Some(host);
                }
                debug!("Grid '{}' already initialized", self.name);
                return Ok(());
            }
            GridLifecycle::Uninitialized => {}
        }

        let Some(host) = host else {
            self.lifecycle = GridLifecycle::Disabled;
            let msg = format!("grid '{}' ({}) has no host layout", self.name, self.id);
            error!("❌ {}; disabling grid", msg);
            return Err(GridError::MissingHostState(msg));
        };

        self.store = Some(new_store(self.store_kind, self.width, self.height));
        self.host = Some(host);
        self.lifecycle = GridLifecycle::Active;
        info!(
            "✅ Grid '{}' initialized: {}x{} cells, {:?} store",
            self.name, self.width, self.height, self.store_kind
        );
        Ok(())
    }

    fn touch(&mut self) {
        self.modified_at = SystemTime::now();
        self.revision += 1;
    }

    // ----- identity and metadata -----

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lifecycle(&self) -> GridLifecycle {
        self.lifecycle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.name != name {
            self.name = name;
            self.touch();
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        if self.description != description {
            self.description = description;
            self.touch();
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Change the per-grid cell size. Placed items get their render anchors
    /// refreshed since those are derived from it. Zero, negative and
    /// non-finite sizes are ignored.
    pub fn set_cell_size(&mut self, cell_size: f32) {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            warn!(
                "⚠️ Ignoring cell size {} for grid '{}', keeping {}",
                cell_size, self.name, self.cell_size
            );
            return;
        }
        if self.cell_size == cell_size {
            return;
        }
        self.cell_size = cell_size;
        self.touch();

        let Some(store) = self.store.as_ref() else {
            return;
        };
        for placed in store.placed_items() {
            match safe_borrow_mut(&placed.item, "cell size change") {
                Ok(mut item) => item.set_placement(Some(ItemPlacement {
                    grid_id: self.id.clone(),
                    footprint: placed.footprint,
                    render_anchor: render_anchor(&placed.footprint, cell_size),
                })),
                Err(err) => warn!("⚠️ Could not refresh anchor of {}: {}", placed.id, err),
            }
        }
    }

    pub fn grid_type(&self) -> GridType {
        self.grid_type
    }

    pub fn set_grid_type(&mut self, grid_type: GridType) {
        if self.grid_type != grid_type {
            self.grid_type = grid_type;
            self.touch();
        }
    }

    pub fn access_level(&self) -> AccessLevel {
        self.access_level
    }

    pub fn set_access_level(&mut self, access_level: AccessLevel) {
        if self.access_level != access_level {
            self.access_level = access_level;
            self.touch();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            self.active = active;
            self.touch();
        }
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: u8) {
        let priority = priority.min(MAX_PRIORITY);
        if self.priority != priority {
            self.priority = priority;
            self.touch();
        }
    }

    pub fn sort_weight(&self) -> i32 {
        self.sort_weight
    }

    pub fn set_sort_weight(&mut self, sort_weight: i32) {
        if self.sort_weight != sort_weight {
            self.sort_weight = sort_weight;
            self.touch();
        }
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn modified_at(&self) -> SystemTime {
        self.modified_at
    }

    /// Bumped together with every modification stamp
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ----- feature flags -----

    pub fn features(&self) -> GridFeatures {
        self.features
    }

    /// True when every flag in `feature` is set
    pub fn has_feature(&self, feature: GridFeatures) -> bool {
        self.features.contains(feature)
    }

    pub fn add_feature(&mut self, feature: GridFeatures) {
        self.set_features(self.features | feature);
    }

    pub fn remove_feature(&mut self, feature: GridFeatures) {
        self.set_features(self.features - feature);
    }

    pub fn set_features(&mut self, features: GridFeatures) {
        if self.features != features {
            self.features = features;
            self.touch();
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.access_level == AccessLevel::ReadOnly || self.features.contains(GridFeatures::READ_ONLY)
    }

    /// Gate shared by every mutating entry point
    fn check_mutable(&self) -> GridResult<()> {
        let reason = match self.lifecycle {
            GridLifecycle::Uninitialized => Some(InactiveReason::Uninitialized),
            GridLifecycle::Disabled => Some(InactiveReason::Disabled),
            GridLifecycle::Active if !self.active => Some(InactiveReason::Inactive),
            GridLifecycle::Active if self.is_read_only() => Some(InactiveReason::ReadOnly),
            GridLifecycle::Active => None,
        };
        match reason {
            Some(reason) => Err(GridError::NotActive { reason }),
            None => Ok(()),
        }
    }

    fn store_mut(&mut self) -> GridResult<&mut Box<dyn OccupancyStore>> {
        self.store.as_mut().ok_or(GridError::NotActive {
            reason: InactiveReason::Uninitialized,
        })
    }

    // ----- queries -----

    /// The occupancy store, once initialized
    pub fn store(&self) -> Option<&dyn OccupancyStore> {
        self.store.as_deref()
    }

    pub fn get(&self, x: i32, y: i32) -> Option<ItemRef> {
        self.store.as_ref()?.get(x, y)
    }

    pub fn occupant(&self, x: i32, y: i32) -> Option<ItemId> {
        self.store.as_ref()?.occupant(x, y)
    }

    /// Footprint the store recorded for a placed item
    pub fn item_footprint(&self, id: ItemId) -> Option<Footprint> {
        self.store.as_ref()?.placed(id).map(|p| p.footprint)
    }

    pub fn placements(&self) -> Vec<PlacementRecord> {
        self.store
            .as_ref()
            .map(|store| {
                store
                    .placed_items()
                    .into_iter()
                    .map(|p| PlacementRecord {
                        item_id: p.id,
                        footprint: p.footprint,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn in_bounds(&self, x: i32, y: i32, width: u32, height: u32) -> bool {
        in_bounds(x, y, width, height, self.width, self.height)
    }

    /// Out-of-bounds, overlapping an item other than `exclude`, or not yet
    /// initialized
    pub fn conflicts(&self, x: i32, y: i32, width: u32, height: u32, exclude: Option<ItemId>) -> bool {
        match self.store.as_ref() {
            Some(store) => conflicts(x, y, width, height, store.as_ref(), exclude),
            None => true,
        }
    }

    /// Drag preview: would `item` fit with its top-left at (x, y)? An item
    /// already in this grid does not collide with its own cells; an item
    /// held by another grid never fits.
    pub fn can_place(&self, item: &ItemRef, x: i32, y: i32) -> bool {
        if self.check_mutable().is_err() {
            return false;
        }
        let Ok(item) = safe_borrow(item, "can_place") else {
            return false;
        };
        if item.placement().is_some_and(|p| p.grid_id != self.id) {
            return false;
        }
        let id = item.item_id();
        let exclude = self.item_footprint(id).map(|_| id);
        let (width, height) = item.size();
        !self.conflicts(x, y, width, height, exclude)
    }

    pub fn occupied_cell_count(&self) -> usize {
        self.store.as_ref().map_or(0, |s| s.occupied_cell_count())
    }

    pub fn placed_count(&self) -> usize {
        self.store.as_ref().map_or(0, |s| s.placed_count())
    }

    pub fn occupancy_snapshot(&self) -> Vec<Option<ItemId>> {
        self.store
            .as_ref()
            .map(|s| s.occupancy_snapshot())
            .unwrap_or_default()
    }

    pub fn is_consistent(&self) -> bool {
        self.store.as_ref().map_or(true, |s| s.is_consistent())
    }

    /// First free top-left cell (row-major) for a `width` x `height` item
    pub fn find_free_slot(&self, width: u32, height: u32) -> Option<(i32, i32)> {
        let store = self.store.as_ref()?;
        if width == 0 || height == 0 || width > self.width || height > self.height {
            return None;
        }
        for y in 0..=(self.height - height) as i32 {
            for x in 0..=(self.width - width) as i32 {
                if !conflicts(x, y, width, height, store.as_ref(), None) {
                    return Some((x, y));
                }
            }
        }
        None
    }

    pub fn render_text(&self) -> String {
        match self.store.as_ref() {
            Some(store) => render_occupancy(store.as_ref()),
            None => format!("(grid '{}' not initialized)\n", self.name),
        }
    }

    // ----- coordinate mapping -----

    pub fn mapper(&self) -> CellMapper {
        match self.host.as_ref() {
            Some(host) => CellMapper::new(host.grid_origin(), self.cell_size, host.scale_factor())
                .with_vertical_axis(host.vertical_axis()),
            None => CellMapper::new((0.0, 0.0), self.cell_size, 1.0),
        }
    }

    /// Cell under a pointer, always inside the grid
    pub fn to_cell(&self, pointer: (f32, f32)) -> (i32, i32) {
        self.mapper().to_cell(pointer, self.width, self.height)
    }

    // ----- placement -----

    /// Place `item` with its top-left cell at (x, y) and return where its
    /// visual should be centred. Nothing changes on failure.
    pub fn try_place(&mut self, item: ItemRef, x: i32, y: i32) -> GridResult<RenderAnchor> {
        self.check_mutable()?;
        let (id, (width, height), held_by) = {
            let item = safe_borrow(&item, "place")?;
            (
                item.item_id(),
                item.size(),
                item.placement().map(|p| p.grid_id.clone()),
            )
        };
        if let Some(grid_id) = held_by {
            return Err(GridError::AlreadyPlaced { item: id, grid_id });
        }
        // fail before the store write if the back-reference cannot be recorded
        safe_borrow_mut(&item, "place")?;

        let footprint = Footprint::new(x, y, width, height);
        self.store_mut()?.place(item.clone(), footprint)?;

        let anchor = render_anchor(&footprint, self.cell_size);
        self.record_placement(&item, footprint, anchor)?;
        self.touch();
        debug!("Placed {} in grid '{}' at {}", id, self.name, footprint);
        Ok(anchor)
    }

    /// Boolean form of `try_place` for interactive callers
    pub fn place(&mut self, item: ItemRef, x: i32, y: i32) -> bool {
        report(self.try_place(item, x, y), "place").is_some()
    }

    /// Drop `item` with its top-left cell under the pointer
    pub fn place_at_pointer(&mut self, item: ItemRef, pointer: (f32, f32)) -> bool {
        let (x, y) = self.to_cell(pointer);
        self.place(item, x, y)
    }

    /// Factory placement into the first free slot
    pub fn try_place_anywhere(&mut self, item: ItemRef) -> GridResult<Footprint> {
        self.check_mutable()?;
        let (width, height) = safe_borrow(&item, "place_anywhere")?.size();
        let (x, y) = self
            .find_free_slot(width, height)
            .ok_or(GridError::NoSpace { width, height })?;
        self.try_place(item, x, y)?;
        Ok(Footprint::new(x, y, width, height))
    }

    pub fn place_anywhere(&mut self, item: ItemRef) -> bool {
        report(self.try_place_anywhere(item), "place_anywhere").is_some()
    }

    fn record_placement(
        &self,
        item: &ItemRef,
        footprint: Footprint,
        render_anchor: RenderAnchor,
    ) -> GridResult<()> {
        safe_borrow_mut(item, "record placement")?.set_placement(Some(ItemPlacement {
            grid_id: self.id.clone(),
            footprint,
            render_anchor,
        }));
        Ok(())
    }

    /// Remove whatever covers (x, y). `Ok(None)` when the cell is empty.
    /// A busy item handle is refused with `ItemBorrowed` and nothing changes.
    pub fn try_remove(&mut self, x: i32, y: i32) -> GridResult<Option<ItemRef>> {
        self.check_mutable()?;
        let placed = match self.store.as_ref() {
            Some(store) => store.occupant(x, y).and_then(|id| store.placed(id)).cloned(),
            None => None,
        };
        let Some(placed) = placed else {
            return Ok(None);
        };
        // hold the handle before the store changes so the back-reference is always cleared
        let mut item = safe_borrow_mut(&placed.item, "remove")?;
        self.store_mut()?.remove_at(x, y);
        item.set_placement(None);
        drop(item);
        self.touch();
        debug!("Removed {} from grid '{}'", placed.id, self.name);
        Ok(Some(placed.item))
    }

    pub fn remove(&mut self, x: i32, y: i32) -> Option<ItemRef> {
        report(self.try_remove(x, y), "remove").flatten()
    }

    pub fn remove_item(&mut self, id: ItemId) -> Option<ItemRef> {
        let footprint = self.item_footprint(id)?;
        self.remove(footprint.x, footprint.y)
    }

    /// Move a placed item to a new top-left cell; its current cells do not
    /// block the move. Nothing changes on failure.
    pub fn try_relocate(&mut self, id: ItemId, x: i32, y: i32) -> GridResult<RenderAnchor> {
        self.check_mutable()?;
        let placed = self
            .store
            .as_ref()
            .and_then(|s| s.placed(id))
            .cloned()
            .ok_or(GridError::UnknownItem(id))?;
        safe_borrow_mut(&placed.item, "relocate")?;

        self.store_mut()?.relocate(id, x, y)?;
        let footprint = Footprint::new(x, y, placed.footprint.width, placed.footprint.height);
        let anchor = render_anchor(&footprint, self.cell_size);
        self.record_placement(&placed.item, footprint, anchor)?;
        self.touch();
        debug!("Moved {} from {} to {}", id, placed.footprint, footprint);
        Ok(anchor)
    }

    pub fn relocate(&mut self, id: ItemId, x: i32, y: i32) -> bool {
        report(self.try_relocate(id, x, y), "relocate").is_some()
    }

    // ----- resizing -----

    /// Change dimensions. Returns the items evicted under `EvictAll`.
    pub fn resize(&mut self, width: u32, height: u32, policy: ResizePolicy) -> GridResult<Vec<ItemRef>> {
        let (width, height) = (clamp_dimension(width), clamp_dimension(height));
        if self.lifecycle == GridLifecycle::Uninitialized {
            if (width, height) != (self.width, self.height) {
                self.width = width;
                self.height = height;
                self.touch();
            }
            return Ok(Vec::new());
        }
        self.check_mutable()?;
        if (width, height) == (self.width, self.height) {
            return Ok(Vec::new());
        }

        let placed = self.placed_count();
        if placed > 0 && policy == ResizePolicy::RejectIfOccupied {
            warn!(
                "⚠️ Resize of grid '{}' to {}x{} rejected: {} item(s) placed",
                self.name, width, height, placed
            );
            return Err(GridError::ResizeRejected {
                placed_items: placed,
            });
        }

        let evicted = self.evict_all("resize")?;
        self.store_mut()?.reallocate(width, height)?;
        if !evicted.is_empty() {
            info!(
                "Grid '{}' resized to {}x{}, evicted {} item(s)",
                self.name,
                width,
                height,
                evicted.len()
            );
        }
        self.width = width;
        self.height = height;
        self.touch();
        Ok(evicted)
    }

    /// Empty the store, clearing every item's back-reference and calling its
    /// `on_evicted` hook. Every handle is borrowed first; if any is busy the
    /// eviction is refused and nothing changes.
    fn evict_all(&mut self, context: &str) -> GridResult<Vec<ItemRef>> {
        let handles: Vec<ItemRef> = match self.store.as_ref() {
            Some(store) => store
                .placed_items()
                .into_iter()
                .map(|p| p.item.clone())
                .collect(),
            None => return Ok(Vec::new()),
        };
        let mut items = handles
            .iter()
            .map(|handle| safe_borrow_mut(handle, context))
            .collect::<GridResult<Vec<_>>>()
            .map_err(|err| {
                warn!("⚠️ {} of grid '{}' refused: {}", context, self.name, err);
                err
            })?;

        self.store_mut()?.clear();
        for item in items.iter_mut() {
            item.set_placement(None);
            item.on_evicted(&self.id);
        }
        drop(items);
        Ok(handles)
    }

    /// Queue a resize for the next `apply_pending_resize`; a later request
    /// replaces an earlier one
    pub fn request_resize(&mut self, width: u32, height: u32, policy: ResizePolicy) {
        self.pending_resize = Some(PendingResize {
            width,
            height,
            policy,
        });
    }

    pub fn has_pending_resize(&self) -> bool {
        self.pending_resize.is_some()
    }

    /// Commit a queued resize. Called by the host between frames, never from
    /// inside a placement.
    pub fn apply_pending_resize(&mut self) -> Option<GridResult<Vec<ItemRef>>> {
        let pending = self.pending_resize.take()?;
        Some(self.resize(pending.width, pending.height, pending.policy))
    }

    // ----- persistence -----

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            width: self.width,
            height: self.height,
            cell_size: self.cell_size,
            grid_type: self.grid_type,
            access_level: self.access_level,
            features: self.features,
            active: self.active,
            priority: self.priority,
            sort_weight: self.sort_weight,
            store: self.store_kind,
            created_at: self.created_at,
            modified_at: self.modified_at,
            placements: self.placements(),
        }
    }

    /// Trusted load path: applies the snapshot's metadata and occupancy
    /// without the active/read-only gates. Items already here are evicted
    /// first, and the call is refused with nothing changed while any of them
    /// is borrowed. Records that leave the grid or overlap are refused, and
    /// so are items that still record a placement (they sit in another grid).
    pub fn restore<F>(&mut self, snapshot: &GridSnapshot, mut resolve: F) -> GridResult<RestoreReport>
    where
        F: FnMut(ItemId) -> Option<ItemRef>,
    {
        match self.lifecycle {
            GridLifecycle::Active => {}
            GridLifecycle::Uninitialized => {
                return Err(GridError::NotActive {
                    reason: InactiveReason::Uninitialized,
                })
            }
            GridLifecycle::Disabled => {
                return Err(GridError::NotActive {
                    reason: InactiveReason::Disabled,
                })
            }
        }
        self.evict_all("restore")?;
        let config = snapshot.config();
        let mut store = new_store(config.store, config.width, config.height);

        self.id = config.id.unwrap_or_default();
        self.ensure_id();
        self.name = config.name;
        self.description = config.description;
        self.width = config.width;
        self.height = config.height;
        self.cell_size = config.cell_size;
        self.grid_type = config.grid_type;
        self.access_level = config.access_level;
        self.features = config.features;
        self.active = config.active;
        self.priority = config.priority;
        self.sort_weight = config.sort_weight;
        self.store_kind = config.store;
        self.created_at = snapshot.created_at;
        self.modified_at = snapshot.modified_at;
        self.pending_resize = None;

        let mut result = RestoreReport::default();
        for record in &snapshot.placements {
            let Some(item) = resolve(record.item_id) else {
                warn!("⚠️ Restore: item {} could not be resolved", record.item_id);
                result.missing.push(record.item_id);
                continue;
            };
            let claim = match safe_borrow(&item, "restore") {
                Ok(item) => item.placement().map(|p| p.grid_id.clone()),
                Err(err) => {
                    warn!("⚠️ Restore: record {} refused: {}", record.item_id, err);
                    result.rejected.push((record.item_id, err));
                    continue;
                }
            };
            if let Some(grid_id) = claim {
                let err = GridError::AlreadyPlaced {
                    item: record.item_id,
                    grid_id,
                };
                warn!("⚠️ Restore: record {} refused: {}", record.item_id, err);
                result.rejected.push((record.item_id, err));
                continue;
            }
            if let Err(err) = store.place(item.clone(), record.footprint) {
                warn!("⚠️ Restore: record {} refused: {}", record.item_id, err);
                result.rejected.push((record.item_id, err));
                continue;
            }
            let anchor = render_anchor(&record.footprint, self.cell_size);
            if let Err(err) = self.record_placement(&item, record.footprint, anchor) {
                store.remove_at(record.footprint.x, record.footprint.y);
                warn!("⚠️ Restore: record {} refused: {}", record.item_id, err);
                result.rejected.push((record.item_id, err));
                continue;
            }
            result.restored += 1;
        }
        self.store = Some(store);

        info!(
            "📋 Restored grid '{}': {} placed, {} missing, {} rejected",
            self.name,
            result.restored,
            result.missing.len(),
            result.rejected.len()
        );
        Ok(result)
    }
}

// Items outlive the grid; they must not keep pointing at it
impl Drop for GridInstance {
    fn drop(&mut self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        for placed in store.placed_items() {
            match safe_borrow_mut(&placed.item, "drop") {
                Ok(mut item) => {
                    if item.placement().is_some_and(|p| p.grid_id == self.id) {
                        item.set_placement(None);
                    }
                }
                Err(err) => warn!("⚠️ Grid '{}' dropped while {} busy: {}", self.name, placed.id, err),
            }
        }
    }
}

impl std::fmt::Debug for GridInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("size", &(self.width, self.height))
            .field("lifecycle", &self.lifecycle)
            .field("placed", &self.placed_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FixedLayout;
    use crate::item::{GridItem, InventoryItem};

    fn active_grid(width: u32, height: u32) -> GridInstance {
        GridInstance::with_host(GridConfig::new(width, height), Rc::new(FixedLayout::default()))
            .unwrap()
    }

    #[test]
    fn test_new_generates_id_once() {
        let mut grid = GridInstance::new(GridConfig::new(2, 2));
        let id = grid.id().to_string();
        assert!(!id.is_empty());
        let revision = grid.revision();
        assert_eq!(grid.ensure_id(), id);
        assert_eq!(grid.revision(), revision);
        assert_eq!(grid.id(), id);
    }

    #[test]
    fn test_configured_id_is_kept() {
        let config = GridConfig {
            id: Some("backpack-1".to_string()),
            ..GridConfig::new(2, 2)
        };
        let grid = GridInstance::new(config);
        assert_eq!(grid.id(), "backpack-1");
        assert_eq!(grid.revision(), 0);
    }

    #[test]
    fn test_uninitialized_grid_refuses_placement() {
        let mut grid = GridInstance::new(GridConfig::new(3, 3));
        let item: ItemRef = InventoryItem::shared(1, "coin", 1, 1);
        assert_eq!(
            grid.try_place(item, 0, 0),
            Err(GridError::NotActive {
                reason: InactiveReason::Uninitialized
            })
        );
        assert!(grid.get(0, 0).is_none());
    }

    #[test]
    fn test_missing_host_disables_grid() {
        let mut grid = GridInstance::new(GridConfig::new(3, 3));
        assert!(matches!(
            grid.initialize(None),
            Err(GridError::MissingHostState(_))
        ));
        assert_eq!(grid.lifecycle(), GridLifecycle::Disabled);
        assert_eq!(
            grid.initialize(Some(Rc::new(FixedLayout::default()))),
            Err(GridError::NotActive {
                reason: InactiveReason::Disabled
            })
        );
        let item: ItemRef = InventoryItem::shared(1, "coin", 1, 1);
        assert!(!grid.place(item, 0, 0));
    }

    #[test]
    fn test_setters_only_stamp_on_change() {
        let mut grid = active_grid(2, 2);
        let revision = grid.revision();
        grid.set_name("Grid");
        grid.set_priority(50);
        grid.set_active(true);
        assert_eq!(grid.revision(), revision);

        grid.set_name("Satchel");
        assert_eq!(grid.revision(), revision + 1);
        grid.set_priority(200);
        assert_eq!(grid.priority(), MAX_PRIORITY);
        assert_eq!(grid.revision(), revision + 2);
    }

    #[test]
    fn test_feature_flags() {
        let mut grid = active_grid(2, 2);
        let revision = grid.revision();
        grid.add_feature(GridFeatures::SAVEABLE);
        assert_eq!(grid.revision(), revision);

        grid.add_feature(GridFeatures::SORTABLE | GridFeatures::STACKABLE);
        assert!(grid.has_feature(GridFeatures::SORTABLE));
        assert!(grid.has_feature(GridFeatures::SORTABLE | GridFeatures::STACKABLE));
        grid.remove_feature(GridFeatures::STACKABLE);
        assert!(!grid.has_feature(GridFeatures::STACKABLE));
        assert_eq!(grid.revision(), revision + 2);
    }

    #[test]
    fn test_read_only_feature_blocks_mutation() {
        let mut grid = active_grid(3, 3);
        let item = InventoryItem::shared(1, "key", 1, 1);
        assert!(grid.place(item.clone(), 0, 0));
        grid.add_feature(GridFeatures::READ_ONLY);
        assert!(grid.remove(0, 0).is_none());
        assert!(grid.get(0, 0).is_some());
        assert!(!grid.can_place(&(item as ItemRef), 1, 1));
    }

    #[test]
    fn test_place_records_back_reference() {
        let mut grid = active_grid(10, 10);
        let item = InventoryItem::shared(5, "rifle", 2, 3);
        let anchor = grid.try_place(item.clone(), 1, 2).unwrap();
        assert_eq!(anchor, RenderAnchor { x: 128.0, y: -224.0 });

        let item = item.borrow();
        let placement = item.placement().unwrap();
        assert_eq!(placement.grid_id, grid.id());
        assert_eq!(placement.footprint, Footprint::new(1, 2, 2, 3));
        assert_eq!(placement.render_anchor, anchor);
    }

    #[test]
    fn test_cell_size_change_refreshes_anchor() {
        let mut grid = active_grid(4, 4);
        let item = InventoryItem::shared(1, "gem", 1, 1);
        grid.try_place(item.clone(), 1, 1).unwrap();
        grid.set_cell_size(32.0);
        let anchor = item.borrow().placement().unwrap().render_anchor;
        assert_eq!(anchor, RenderAnchor { x: 48.0, y: -48.0 });
    }

    #[test]
    fn test_invalid_cell_size_keeps_current_value() {
        let mut grid = active_grid(4, 4);
        grid.set_cell_size(32.0);
        let revision = grid.revision();
        grid.set_cell_size(-1.0);
        grid.set_cell_size(f32::NAN);
        grid.set_cell_size(0.0);
        assert_eq!(grid.cell_size(), 32.0);
        assert_eq!(grid.revision(), revision);
    }

    #[test]
    fn test_relocate_allows_overlap_with_own_cells() {
        let mut grid = active_grid(5, 5);
        let item = InventoryItem::shared(1, "plank", 3, 1);
        grid.try_place(item.clone(), 0, 0).unwrap();
        assert!(grid.relocate(ItemId(1), 1, 0));
        assert_eq!(grid.item_footprint(ItemId(1)), Some(Footprint::new(1, 0, 3, 1)));
        assert_eq!(grid.occupant(0, 0), None);
        assert_eq!(
            item.borrow().placement().unwrap().footprint,
            Footprint::new(1, 0, 3, 1)
        );
        assert!(grid.is_consistent());
    }

    #[test]
    fn test_pending_resize_applies_later() {
        let mut grid = active_grid(4, 4);
        grid.request_resize(6, 2, ResizePolicy::RejectIfOccupied);
        assert_eq!((grid.width(), grid.height()), (4, 4));
        assert!(grid.has_pending_resize());
        let evicted = grid.apply_pending_resize().unwrap().unwrap();
        assert!(evicted.is_empty());
        assert_eq!((grid.width(), grid.height()), (6, 2));
        assert!(grid.apply_pending_resize().is_none());
    }

    #[test]
    fn test_to_cell_uses_host_layout() {
        let layout = Rc::new(FixedLayout::new((100.0, 50.0), 1.0));
        let grid = GridInstance::with_host(GridConfig::new(10, 10), layout.clone()).unwrap();
        assert_eq!(grid.to_cell((230.0, 120.0)), (2, 1));

        layout.set_origin((0.0, 0.0));
        layout.set_scale(2.0);
        assert_eq!(grid.to_cell((230.0, 120.0)), (1, 0));
    }
}
