//! Integration tests: grid identity, metadata stamps and initialization lifecycle
use inventory_grid::{
    AccessLevel, FixedLayout, GridConfig, GridError, GridFeatures, GridInstance, GridLifecycle,
    GridType, InactiveReason, InventoryItem, ItemRef, StoreKind, VerticalAxis,
};
use std::rc::Rc;
use std::thread;
use std::time::Duration;

#[test]
fn test_ids_are_unique_and_stable() {
    let a = GridInstance::new(GridConfig::default());
    let b = GridInstance::new(GridConfig::default());
    assert_ne!(a.id(), b.id());
    assert_eq!(a.id(), a.id());
    assert_eq!(a.snapshot().id, a.id());
}

#[test]
fn test_empty_configured_id_is_replaced() {
    let config = GridConfig {
        id: Some(String::new()),
        ..GridConfig::default()
    };
    let grid = GridInstance::new(config);
    assert!(!grid.id().is_empty());
}

#[test]
fn test_modification_stamps_follow_changes() {
    let mut grid = GridInstance::with_host(GridConfig::new(4, 4), Rc::new(FixedLayout::default()))
        .unwrap();
    let created = grid.created_at();
    let stamp = grid.modified_at();
    let revision = grid.revision();

    thread::sleep(Duration::from_millis(5));
    grid.set_grid_type(GridType::Equipment);
    assert!(grid.modified_at() > stamp);
    assert_eq!(grid.revision(), revision + 1);
    assert_eq!(grid.created_at(), created);

    let stamp = grid.modified_at();
    grid.set_grid_type(GridType::Equipment);
    grid.set_sort_weight(0);
    assert_eq!(grid.modified_at(), stamp);

    grid.place(InventoryItem::shared(1, "helmet", 2, 2), 0, 0);
    assert_eq!(grid.revision(), revision + 2);
    grid.remove(1, 1);
    assert_eq!(grid.revision(), revision + 3);

    // rejected placements leave the stamp alone
    grid.place(InventoryItem::shared(2, "boots", 5, 1), 0, 0);
    assert_eq!(grid.revision(), revision + 3);
}

#[test]
fn test_lifecycle_transitions() {
    let mut grid = GridInstance::new(GridConfig::new(3, 3).with_store(StoreKind::Records));
    assert_eq!(grid.lifecycle(), GridLifecycle::Uninitialized);
    assert!(grid.store().is_none());
    assert!(grid.conflicts(0, 0, 1, 1, None));
    assert_eq!(grid.render_text(), "(grid 'Grid' not initialized)\n");

    grid.initialize(Some(Rc::new(FixedLayout::default()))).unwrap();
    assert_eq!(grid.lifecycle(), GridLifecycle::Active);
    assert_eq!(grid.store().unwrap().kind(), StoreKind::Records);

    // a second initialize keeps the store
    grid.place(InventoryItem::shared(1, "coin", 1, 1), 2, 2);
    grid.initialize(Some(Rc::new(FixedLayout::default()))).unwrap();
    assert_eq!(grid.placed_count(), 1);
}

#[test]
fn test_disabled_grid_refuses_everything() {
    let mut grid = GridInstance::new(GridConfig::new(3, 3));
    assert!(matches!(
        grid.initialize(None),
        Err(GridError::MissingHostState(_))
    ));
    assert_eq!(grid.lifecycle(), GridLifecycle::Disabled);
    assert_eq!(
        grid.try_place(InventoryItem::shared(1, "coin", 1, 1), 0, 0),
        Err(GridError::NotActive {
            reason: InactiveReason::Disabled
        })
    );
    assert!(grid.remove(0, 0).is_none());
}

#[test]
fn test_read_only_access_level_blocks_placement() {
    let mut grid = GridInstance::with_host(GridConfig::new(3, 3), Rc::new(FixedLayout::default()))
        .unwrap();
    grid.set_access_level(AccessLevel::ReadOnly);
    assert!(grid.is_read_only());
    assert_eq!(
        grid.try_place(InventoryItem::shared(1, "coin", 1, 1), 0, 0),
        Err(GridError::NotActive {
            reason: InactiveReason::ReadOnly
        })
    );

    grid.set_access_level(AccessLevel::Shared);
    grid.add_feature(GridFeatures::READ_ONLY);
    assert!(grid.is_read_only());
    grid.remove_feature(GridFeatures::READ_ONLY);
    assert!(grid.place(InventoryItem::shared(1, "coin", 1, 1), 0, 0));
}

#[test]
fn test_upward_host_axis_flips_rows() {
    let layout = FixedLayout::new((0.0, 640.0), 1.0).with_vertical_axis(VerticalAxis::Up);
    let grid = GridInstance::with_host(GridConfig::new(10, 10), Rc::new(layout)).unwrap();
    assert_eq!(grid.to_cell((130.0, 570.0)), (2, 1));
    assert_eq!(grid.to_cell((0.0, 639.0)), (0, 0));
}

#[test]
fn test_config_file_round_trip() {
    let config = GridConfig::new(12, 8)
        .with_name("Vault")
        .with_grid_type(GridType::Trading)
        .with_store(StoreKind::Records);
    let path = std::env::temp_dir().join(format!("inventory_grid_{}.json", std::process::id()));
    std::fs::write(&path, config.to_json_pretty().unwrap()).unwrap();
    let loaded = GridConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, config);

    assert!(matches!(
        GridConfig::load(path.with_extension("missing")),
        Err(GridError::Config(_))
    ));
}

#[test]
fn test_dropped_grid_releases_its_items() {
    let coin: ItemRef = InventoryItem::shared(1, "coin", 1, 1);
    {
        let mut pouch =
            GridInstance::with_host(GridConfig::new(2, 2), Rc::new(FixedLayout::default())).unwrap();
        assert!(pouch.place(coin.clone(), 0, 0));
        assert!(coin.borrow().placement().is_some());
    }
    assert!(coin.borrow().placement().is_none());

    let mut stash = GridInstance::with_host(GridConfig::new(2, 2), Rc::new(FixedLayout::default()))
        .unwrap();
    assert!(stash.place(coin, 1, 1));
}
