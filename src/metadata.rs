// Grid classification: type, access level and feature flags

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GridType {
    #[default]
    Backpack,
    Storage,
    Equipment,
    Ground,
    Container,
    Other,
    Custom,
    Test,
    Trading,
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessLevel {
    #[default]
    Public,
    Private,
    Shared,
    ReadOnly,
}

bitflags! {
    /// Behaviour switches carried by a grid
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct GridFeatures: u32 {
        const SAVEABLE             = 1 << 0;
        const DRAGGABLE            = 1 << 1;
        const SORTABLE             = 1 << 2;
        const AUTO_ORGANIZE        = 1 << 3;
        const ITEM_TYPE_RESTRICTED = 1 << 4;
        const READ_ONLY            = 1 << 5;
        const STACKABLE            = 1 << 6;
        const AUTO_SAVE            = 1 << 7;
        const TEMPORARY_STORAGE    = 1 << 8;
    }
}

impl Default for GridFeatures {
    fn default() -> Self {
        Self::SAVEABLE | Self::DRAGGABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_features() {
        let features = GridFeatures::default();
        assert!(features.contains(GridFeatures::SAVEABLE));
        assert!(features.contains(GridFeatures::DRAGGABLE));
        assert!(!features.contains(GridFeatures::READ_ONLY));
    }

    #[test]
    fn test_features_serialize_as_names() {
        let features = GridFeatures::SORTABLE | GridFeatures::AUTO_SAVE;
        let json = serde_json::to_string(&features).unwrap();
        let decoded: GridFeatures = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, features);
        assert!(json.contains("SORTABLE"));
    }
}
