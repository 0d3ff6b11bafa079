//! Persistence contract: what a save system reads from and writes back into a grid

use crate::config::GridConfig;
use crate::grid::{Footprint, StoreKind};
use crate::grid_errors::{GridError, GridResult};
use crate::item::ItemId;
use crate::metadata::{AccessLevel, GridFeatures, GridType};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// One placed item as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub item_id: ItemId,
    pub footprint: Footprint,
}

/// Everything needed to rebuild a grid and its occupancy on load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub id: String,
    pub name: String,
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub cell_size: f32,
    pub grid_type: GridType,
    pub access_level: AccessLevel,
    pub features: GridFeatures,
    pub active: bool,
    pub priority: u8,
    pub sort_weight: i32,
    pub store: StoreKind,
    pub created_at: SystemTime,
    pub modified_at: SystemTime,
    pub placements: Vec<PlacementRecord>,
}

impl GridSnapshot {
    /// Configuration for a fresh instance that `restore` will then fill
    pub fn config(&self) -> GridConfig {
        GridConfig {
            id: Some(self.id.clone()),
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
            store: self.store,
        }
        .clamped()
    }

    pub fn to_json(&self) -> GridResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> GridResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_bytes(&self) -> GridResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> GridResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Outcome of a trusted restore
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RestoreReport {
    pub restored: usize,
    /// Records whose item the resolver could not supply
    pub missing: Vec<ItemId>,
    /// Records the store refused (out of bounds or overlapping)
    pub rejected: Vec<(ItemId, GridError)>,
}

impl RestoreReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.rejected.is_empty()
    }
}
