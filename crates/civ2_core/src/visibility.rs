use log::trace;

use crate::buffer::SaveBuffer;
use crate::civ;
use crate::layout::Layout;
use crate::map::{self, CellField};

/// Ring-1 probe offsets around a center cell.
const RING1: [(i32, i32); 8] = [
    (-1, -1),
    (1, -1),
    (1, 1),
    (-1, 1),
    (0, -2),
    (0, 2),
    (2, 0),
    (-2, 0),
];

/// Ring-2 probe offsets.
const RING2: [(i32, i32); 12] = [
    (-1, -3),
    (1, -3),
    (-2, -2),
    (2, -2),
    (-3, -1),
    (3, -1),
    (-3, 1),
    (3, 1),
    (-2, 2),
    (2, 2),
    (-1, 3),
    (1, 3),
];

/// Mark the diamond footprint around (x, y) visible to `civ`.
///
/// Radius 0 marks only the center cell; radius 1 adds the 8 ring-1 cells;
/// any larger radius adds the 12 ring-2 cells as well. Every probe wraps
/// horizontally and is dropped when it falls off the top or bottom edge.
pub fn reveal(buffer: &mut SaveBuffer, layout: &Layout, x: i32, y: i32, civ: u8, radius: u32) {
    mark_visible(buffer, layout, x, y, civ);
    if radius < 1 {
        return;
    }
    for &(dx, dy) in &RING1 {
        mark_visible(buffer, layout, x + dx, y + dy, civ);
    }
    if radius < 2 {
        return;
    }
    for &(dx, dy) in &RING2 {
        mark_visible(buffer, layout, x + dx, y + dy, civ);
    }
}

fn mark_visible(buffer: &mut SaveBuffer, layout: &Layout, x: i32, y: i32, civ: u8) {
    let Some((x, y)) = map::normalize(layout, x, y) else {
        return;
    };
    trace!("cell ({x},{y}) visible to civ {civ}");
    let mask = map::cell_field(buffer, layout, x, y, CellField::Visibility);
    map::set_cell_field(
        buffer,
        layout,
        x,
        y,
        CellField::Visibility,
        civ::set_bit(mask, civ),
    );
}

// The whole-map passes below walk the attribute block in record strides
// rather than going through coordinate addressing.

/// For every cell `from` can see, let `to` see it too.
pub fn copy_civ_visibility(buffer: &mut SaveBuffer, layout: &Layout, to: u8, from: u8) {
    for cell in layout.cell_records() {
        let mask = buffer.u8_at(cell + CellField::Visibility as usize);
        if civ::test_bit(mask, from) {
            buffer.set_u8_at(cell + CellField::Visibility as usize, civ::set_bit(mask, to));
        }
    }
}

/// Make the entire map invisible to `civ`.
pub fn clear_civ_visibility(buffer: &mut SaveBuffer, layout: &Layout, civ: u8) {
    for cell in layout.cell_records() {
        let mask = buffer.u8_at(cell + CellField::Visibility as usize);
        buffer.set_u8_at(
            cell + CellField::Visibility as usize,
            civ::clear_bit(mask, civ),
        );
    }
}

/// Make the entire map visible to `civ`.
pub fn fill_civ_visibility(buffer: &mut SaveBuffer, layout: &Layout, civ: u8) {
    for cell in layout.cell_records() {
        let mask = buffer.u8_at(cell + CellField::Visibility as usize);
        buffer.set_u8_at(cell + CellField::Visibility as usize, civ::set_bit(mask, civ));
    }
}
