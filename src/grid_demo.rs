// Grid Demo - walks a backpack grid through placement, pointer drops, removal and resizing
use inventory_grid::{
    print_grid, FixedLayout, GridConfig, GridInstance, GridItem, GridType, InventoryItem, ItemRef,
    ResizePolicy, StoreKind,
};
use std::rc::Rc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🎒 Inventory Grid Demo");
    println!("======================");

    let layout = Rc::new(FixedLayout::default());
    let config = GridConfig::new(10, 10)
        .with_name("Backpack")
        .with_grid_type(GridType::Backpack)
        .with_cell_size(64.0);
    let mut backpack = GridInstance::with_host(config, layout.clone())?;

    // A 2x3 rifle blocks (1,1) but leaves (3,3) free
    let rifle = InventoryItem::shared(1, "Rifle", 2, 3);
    let anchor = backpack.try_place(rifle.clone(), 0, 0)?;
    println!("📦 Rifle placed at (0,0), render anchor {:?}", anchor);
    let coin = InventoryItem::shared(2, "Coin", 1, 1);
    println!("📦 Coin at (1,1): placed={}", backpack.place(coin.clone(), 1, 1));
    println!("📦 Coin at (3,3): placed={}", backpack.place(coin.clone(), 3, 3));
    print!("{}", backpack.render_text());

    // Pointer drop mapped to a cell
    let pointer = (130.0, 70.0);
    let cell = backpack.to_cell(pointer);
    println!("🖱️ Pointer {:?} maps to cell {:?}", pointer, cell);
    let medkit = InventoryItem::shared(3, "Medkit", 1, 1);
    let dropped = backpack.place_at_pointer(medkit, pointer);
    println!("📦 Medkit dropped at {:?}: placed={}", cell, dropped);
    let center = backpack.mapper().cell_center(cell.0, cell.1);
    println!("🖱️ Cell {:?} centre {:?} maps back to {:?}", cell, center, backpack.to_cell(center));

    // Removing from an empty cell changes nothing
    let before = backpack.occupancy_snapshot();
    let removed = backpack.remove(5, 5);
    println!(
        "🗑️ Remove(5,5): {:?}, occupancy unchanged={}",
        removed.as_ref().map(|item| item.borrow().item_id()),
        backpack.occupancy_snapshot() == before
    );
    let removed = backpack.remove(1, 2);
    println!(
        "🗑️ Remove(1,2): {:?}, cell (0,0) now {:?}",
        removed.as_ref().map(|item| item.borrow().item_id()),
        backpack.occupant(0, 0)
    );

    // A 5x5 pouch holding a 2x2 item shrinks to 3x3
    let mut pouch =
        GridInstance::with_host(GridConfig::new(5, 5).with_name("Pouch"), layout.clone())?;
    let chest = InventoryItem::shared(4, "Chest", 2, 2);
    pouch.try_place(chest.clone(), 3, 3)?;
    match pouch.resize(3, 3, ResizePolicy::RejectIfOccupied) {
        Ok(_) => println!("📐 Resized to 3x3"),
        Err(err) => println!("📐 Resize refused: {}", err),
    }
    let evicted = pouch.resize(3, 3, ResizePolicy::EvictAll)?;
    println!(
        "📐 Resized to {}x{}, evicted {} item(s), chest evictions={}, chest placed={}",
        pouch.width(),
        pouch.height(),
        evicted.len(),
        chest.borrow().evictions(),
        chest.borrow().placement().is_some()
    );

    // Factory fill into a container-style grid, then save and reload it
    let mut crate_grid = GridInstance::with_host(
        GridConfig::new(6, 3)
            .with_name("Supply Crate")
            .with_grid_type(GridType::Container)
            .with_store(StoreKind::Records),
        layout,
    )?;
    let mut items: Vec<ItemRef> = Vec::new();
    for (id, (w, h)) in [(1, 1), (2, 2), (3, 1), (1, 3), (2, 1)].into_iter().enumerate() {
        let item: ItemRef = InventoryItem::shared(100 + id as u64, format!("Supply {}", id), w, h);
        match crate_grid.try_place_anywhere(item.clone()) {
            Ok(footprint) => println!("📦 Supply {} -> {}", id, footprint),
            Err(err) => println!("📦 Supply {} not stored: {}", id, err),
        }
        items.push(item);
    }
    if let Some(store) = crate_grid.store() {
        print_grid(store);
    }

    let bytes = crate_grid.snapshot().to_bytes()?;
    println!("💾 Snapshot encoded to {} bytes", bytes.len());

    let snapshot = inventory_grid::GridSnapshot::from_bytes(&bytes)?;
    let mut reloaded = GridInstance::with_host(snapshot.config(), Rc::new(FixedLayout::default()))?;
    let fresh: Vec<ItemRef> = items
        .iter()
        .map(|item| {
            let (id, (w, h)) = {
                let item = item.borrow();
                (item.item_id().0, item.size())
            };
            InventoryItem::shared(id, "reloaded", w, h) as ItemRef
        })
        .collect();
    let report = reloaded.restore(&snapshot, |id| {
        fresh.iter().find(|item| item.borrow().item_id() == id).cloned()
    })?;
    println!(
        "📋 Restored {} placement(s), complete={}, consistent={}",
        report.restored,
        report.is_complete(),
        reloaded.is_consistent()
    );
    print!("{}", reloaded.render_text());

    Ok(())
}
