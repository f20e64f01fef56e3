use std::io;

use log::debug;

use crate::buffer::SaveBuffer;

// Scalar header fields.
pub const PLAYER_CIV_OFFSET: usize = 41;
pub const DIFFICULTY_LEVEL_OFFSET: usize = 44;
pub const BARB_LEVEL_OFFSET: usize = 45;
pub const CIVS_ACTIVE_OFFSET: usize = 46;
pub const TOTAL_UNITS_OFFSET: usize = 58;
pub const TOTAL_CITIES_OFFSET: usize = 60;

// Map section. The map header carries the doubled width, the height, the
// cell count and the dimensions of the terrain-improvement sub-block that
// follows the attribute block.
pub const MAP_HEADER_OFFSET: usize = 13702;
pub const MAP_DATA_OFFSET: usize = 13716;
const TERRAIN_BLOCK_CELL_SIZE: usize = 7;
pub const CELL_ATTR_SIZE: usize = 6;
const IMPROVEMENT_PAD: usize = 1024;

pub const UNIT_RECORD_SIZE: usize = 32;
pub const CITY_RECORD_SIZE: usize = 88;

/// Section boundaries of one save image, derived once at load time.
///
/// Each offset equals the previous section's start plus count × item size;
/// the values are computed strictly left-to-right because every section's
/// count is read from data located before it. Immutable after `resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub cell_count: usize,
    /// Raw doubled width from the map header.
    pub map_width2: usize,
    pub map_width: usize,
    pub map_height: usize,
    pub attr_start: usize,
    pub attr_end: usize,
    pub unit_start: usize,
    pub city_start: usize,
    pub city_end: usize,
    pub unit_count: usize,
    pub city_count: usize,
}

impl Layout {
    pub fn resolve(buffer: &SaveBuffer) -> io::Result<Layout> {
        // The header scalars and the whole map header must be present
        // before anything can be derived.
        require(buffer, MAP_DATA_OFFSET)?;

        let map_width2 = buffer.u16_at(MAP_HEADER_OFFSET) as usize;
        let map_height = buffer.u16_at(MAP_HEADER_OFFSET + 2) as usize;
        let cell_count = buffer.u16_at(MAP_HEADER_OFFSET + 4) as usize;
        let map_width = map_width2 / 2;

        let attr_start = MAP_DATA_OFFSET + cell_count * TERRAIN_BLOCK_CELL_SIZE;
        let attr_end = attr_start + cell_count * CELL_ATTR_SIZE;

        let improvement_w = buffer.u16_at(MAP_HEADER_OFFSET + 10) as usize;
        let improvement_h = buffer.u16_at(MAP_HEADER_OFFSET + 12) as usize;
        let unit_start = attr_end + improvement_w * improvement_h * 2 + IMPROVEMENT_PAD;

        let unit_count = buffer.u16_at(TOTAL_UNITS_OFFSET) as usize;
        let city_start = unit_start + unit_count * UNIT_RECORD_SIZE;

        let city_count = buffer.u16_at(TOTAL_CITIES_OFFSET) as usize;
        let city_end = city_start + city_count * CITY_RECORD_SIZE;

        require(buffer, city_end)?;

        debug!("map {map_width2}x{map_height} ({cell_count} cells)");
        debug!("attribute block offset = {attr_start}..{attr_end}");
        debug!("unit section offset = {unit_start} ({unit_count} units)");
        debug!("city section offset = {city_start} ({city_count} cities)");
        debug!("after city section offset = {city_end}");

        Ok(Layout {
            cell_count,
            map_width2,
            map_width,
            map_height,
            attr_start,
            attr_end,
            unit_start,
            city_start,
            city_end,
            unit_count,
            city_count,
        })
    }

    /// Offsets of every 6-byte cell record in the attribute block.
    pub fn cell_records(&self) -> impl Iterator<Item = usize> {
        (self.attr_start..self.attr_end).step_by(CELL_ATTR_SIZE)
    }

    /// Offsets of every unit record.
    pub fn unit_records(&self) -> impl Iterator<Item = usize> {
        (self.unit_start..self.city_start).step_by(UNIT_RECORD_SIZE)
    }

    /// Offsets of every city record.
    pub fn city_records(&self) -> impl Iterator<Item = usize> {
        (self.city_start..self.city_end).step_by(CITY_RECORD_SIZE)
    }
}

fn require(buffer: &SaveBuffer, end: usize) -> io::Result<()> {
    if buffer.len() < end {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "save file truncated: layout requires {} bytes, file has {}",
                end,
                buffer.len()
            ),
        ));
    }
    Ok(())
}
