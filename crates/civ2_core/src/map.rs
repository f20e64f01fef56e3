use crate::buffer::SaveBuffer;
use crate::layout::{CELL_ATTR_SIZE, Layout};

/// Terrain type code for open water.
pub const TERRAIN_OCEAN: u8 = 10;

/// Per-cell attribute fields, identified by byte position within the 6-byte
/// cell record. The landmass id is precomputed by the game and treated here
/// as an opaque equality key; the owner field shares its byte with another
/// packed field and occupies only the high nibble.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellField {
    Terrain = 0,
    Landmass = 3,
    Visibility = 4,
    Owner = 5,
}

/// Attribute-block offset of the cell holding (x, y).
///
/// The map is diamond-tiled: the header width is doubled, horizontally
/// adjacent coordinates share a stored cell, so x is halved before indexing.
pub fn cell_offset(layout: &Layout, x: usize, y: usize) -> usize {
    layout.attr_start + ((y * layout.map_width) + x / 2) * CELL_ATTR_SIZE
}

pub fn cell_field(
    buffer: &SaveBuffer,
    layout: &Layout,
    x: usize,
    y: usize,
    field: CellField,
) -> u8 {
    buffer.u8_at(cell_offset(layout, x, y) + field as usize)
}

pub fn set_cell_field(
    buffer: &mut SaveBuffer,
    layout: &Layout,
    x: usize,
    y: usize,
    field: CellField,
    value: u8,
) {
    buffer.set_u8_at(cell_offset(layout, x, y) + field as usize, value);
}

/// Normalize a propagation probe coordinate: x wraps around the cylinder,
/// a y outside the map means the probe misses entirely (not an error —
/// ring footprints deliberately reach past the map edge).
pub fn normalize(layout: &Layout, x: i32, y: i32) -> Option<(usize, usize)> {
    let width2 = layout.map_width2 as i32;
    let mut x = x;
    if x < 0 {
        x += width2;
    }
    if x >= width2 {
        x -= width2;
    }
    if y < 0 || y >= layout.map_height as i32 {
        return None;
    }
    Some((x as usize, y as usize))
}
