// Grid configuration supplied by the owning component's setup step
use crate::grid::StoreKind;
use crate::grid_errors::{GridError, GridResult};
use crate::metadata::{AccessLevel, GridFeatures, GridType};
use crate::{DEFAULT_CELL_SIZE, MAX_GRID_DIMENSION, MAX_PRIORITY};
use log::warn;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Pre-assigned id; a fresh one is generated when absent or empty
    pub id: Option<String>,
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
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            id: None,
            name: "Grid".to_string(),
            description: String::new(),
            width: 10, // Default grid size
            height: 10,
            cell_size: DEFAULT_CELL_SIZE,
            grid_type: GridType::default(),
            access_level: AccessLevel::default(),
            features: GridFeatures::default(),
            active: true,
            priority: 50,
            sort_weight: 0,
            store: StoreKind::default(),
        }
    }
}

impl GridConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
        .clamped()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self.clamped()
    }

    pub fn with_store(mut self, store: StoreKind) -> Self {
        self.store = store;
        self
    }

    pub fn with_grid_type(mut self, grid_type: GridType) -> Self {
        self.grid_type = grid_type;
        self
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Force every value into its legal range
    pub fn clamped(mut self) -> Self {
        let width = clamp_dimension(self.width);
        let height = clamp_dimension(self.height);
        if (width, height) != (self.width, self.height) {
            warn!(
                "⚠️ Grid '{}' size {}x{} clamped to {}x{}",
                self.name, self.width, self.height, width, height
            );
        }
        self.width = width;
        self.height = height;

        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            warn!(
                "⚠️ Grid '{}' cell size {} replaced with {}",
                self.name, self.cell_size, DEFAULT_CELL_SIZE
            );
            self.cell_size = DEFAULT_CELL_SIZE;
        }
        self.priority = self.priority.min(MAX_PRIORITY);
        self
    }

    pub fn from_json_str(json: &str) -> GridResult<Self> {
        let config: GridConfig = serde_json::from_str(json)
            .map_err(|e| GridError::Config(format!("invalid grid config: {}", e)))?;
        Ok(config.clamped())
    }

    pub fn load(path: impl AsRef<Path>) -> GridResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| GridError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> GridResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GridError::Config(e.to_string()))
    }
}

pub(crate) fn clamp_dimension(value: u32) -> u32 {
    value.clamp(1, MAX_GRID_DIMENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_dimensions() {
        let config = GridConfig::new(0, 100_000);
        assert_eq!(config.width, 1);
        assert_eq!(config.height, MAX_GRID_DIMENSION);
        assert_eq!(config.cell_count(), MAX_GRID_DIMENSION as usize);
    }

    #[test]
    fn test_invalid_cell_size_falls_back() {
        assert_eq!(GridConfig::new(2, 2).with_cell_size(-3.0).cell_size, DEFAULT_CELL_SIZE);
        assert_eq!(GridConfig::new(2, 2).with_cell_size(f32::NAN).cell_size, DEFAULT_CELL_SIZE);
        assert_eq!(GridConfig::new(2, 2).with_cell_size(32.0).cell_size, 32.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GridConfig::from_json_str(
            r#"{ "name": "Chest", "width": 6, "height": 4, "grid_type": "Container", "store": "Records", "priority": 250 }"#,
        )
        .unwrap();
        assert_eq!(config.name, "Chest");
        assert_eq!((config.width, config.height), (6, 4));
        assert_eq!(config.grid_type, GridType::Container);
        assert_eq!(config.store, StoreKind::Records);
        assert_eq!(config.priority, MAX_PRIORITY);
        assert_eq!(config.cell_size, DEFAULT_CELL_SIZE);
        assert!(config.active);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = GridConfig::from_json_str("{ width: ").unwrap_err();
        assert!(matches!(err, GridError::Config(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = GridConfig::new(3, 7).with_name("Belt");
        let json = config.to_json_pretty().unwrap();
        assert_eq!(GridConfig::from_json_str(&json).unwrap(), config);
    }
}
