// Display formatting utilities
// Text rendering of an occupancy store for logs, demos and test failures

use crate::display::CellDisplay;
use crate::grid::OccupancyStore;
use crate::item::ItemId;
use std::fmt::Write;

/// Format an item id for a grid cell (last 2 digits in hex)
pub fn format_item_display(id: ItemId) -> String {
    let display_val = (id.0 % 256) as u8;
    format!("{:2X}", display_val)
}

/// Column header line for a grid `cols` cells wide
pub fn column_headers(cols: u32) -> String {
    let mut line = String::from("    ");
    for col in 0..cols {
        let _ = write!(line, " {:2}", col % 100);
    }
    line
}

pub fn row_prefix(row: u32) -> String {
    format!("{:2}: ", row % 100)
}

/// One line describing the store: size, backing and fill
pub fn store_header(store: &dyn OccupancyStore) -> String {
    format!(
        "=== {}x{} GRID ({:?}) === items: {}, cells occupied: {}/{}",
        store.width(),
        store.height(),
        store.kind(),
        store.placed_count(),
        store.occupied_cell_count(),
        store.width() as usize * store.height() as usize
    )
}

/// Render every cell of the store, `.` for empty and the occupant's short
/// id otherwise
pub fn render_occupancy(store: &dyn OccupancyStore) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", store_header(store));
    let _ = writeln!(out, "{}", column_headers(store.width()));
    for y in 0..store.height() {
        out.push_str(&row_prefix(y));
        for x in 0..store.width() {
            let cell = store.occupant(x as i32, y as i32);
            let _ = write!(out, "{:>3}", cell.display_cell());
        }
        out.push('\n');
    }
    out
}

pub fn print_grid(store: &dyn OccupancyStore) {
    print!("{}", render_occupancy(store));
}
