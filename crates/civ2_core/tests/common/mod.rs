#![allow(dead_code)]

use civ2_core::layout::{
    BARB_LEVEL_OFFSET, CELL_ATTR_SIZE, CITY_RECORD_SIZE, CIVS_ACTIVE_OFFSET,
    DIFFICULTY_LEVEL_OFFSET, MAP_DATA_OFFSET, MAP_HEADER_OFFSET, PLAYER_CIV_OFFSET,
    TOTAL_CITIES_OFFSET, TOTAL_UNITS_OFFSET, UNIT_RECORD_SIZE,
};

// Dimensions of the terrain-improvement sub-block the fixture declares in
// its map header; the layout resolver multiplies them to skip the block.
pub const IMPROVEMENT_W: u16 = 2;
pub const IMPROVEMENT_H: u16 = 3;

// Marker bytes appended past the city section; edits must never touch them.
pub const TAIL_LEN: usize = 16;
pub const TAIL_MARKER: u8 = 0xab;

/// Builds a minimal, layout-consistent save image in memory. There is no
/// redistributable Civ2 save to commit as a fixture, so the tests fabricate
/// one that satisfies exactly the offsets the layout resolver derives.
pub struct SaveBuilder {
    width2: u16,
    height: u16,
    player_civ: u8,
    difficulty: u8,
    barb_level: u8,
    active_mask: u8,
    default_terrain: u8,
    cells: Vec<(u16, u16, u8, u8)>,
    units: Vec<(u16, u16, u8, u8, u16)>,
    cities: Vec<(u16, u16, u8, &'static str)>,
}

impl SaveBuilder {
    pub fn new(width2: u16, height: u16) -> Self {
        Self {
            width2,
            height,
            player_civ: 1,
            difficulty: 2,
            barb_level: 1,
            active_mask: 0x03,
            default_terrain: 1,
            cells: Vec::new(),
            units: Vec::new(),
            cities: Vec::new(),
        }
    }

    pub fn player_civ(mut self, civ: u8) -> Self {
        self.player_civ = civ;
        self
    }

    pub fn difficulty(mut self, level: u8) -> Self {
        self.difficulty = level;
        self
    }

    pub fn barbarian_level(mut self, level: u8) -> Self {
        self.barb_level = level;
        self
    }

    pub fn active_mask(mut self, mask: u8) -> Self {
        self.active_mask = mask;
        self
    }

    pub fn default_terrain(mut self, terrain: u8) -> Self {
        self.default_terrain = terrain;
        self
    }

    /// Terrain type and landmass id for the cell holding (x, y).
    pub fn cell(mut self, x: u16, y: u16, terrain: u8, landmass: u8) -> Self {
        self.cells.push((x, y, terrain, landmass));
        self
    }

    pub fn unit(mut self, x: u16, y: u16, kind: u8, owner: u8, home_city: u16) -> Self {
        self.units.push((x, y, kind, owner, home_city));
        self
    }

    pub fn city(mut self, x: u16, y: u16, owner: u8, name: &'static str) -> Self {
        self.cities.push((x, y, owner, name));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let width = self.width2 as usize / 2;
        let cell_count = width * self.height as usize;
        let attr_start = MAP_DATA_OFFSET + cell_count * 7;
        let attr_end = attr_start + cell_count * CELL_ATTR_SIZE;
        let improvement_block = IMPROVEMENT_W as usize * IMPROVEMENT_H as usize * 2;
        let unit_start = attr_end + improvement_block + 1024;
        let city_start = unit_start + self.units.len() * UNIT_RECORD_SIZE;
        let city_end = city_start + self.cities.len() * CITY_RECORD_SIZE;

        let mut bytes = vec![0u8; city_end + TAIL_LEN];

        put_u16(&mut bytes, MAP_HEADER_OFFSET, self.width2);
        put_u16(&mut bytes, MAP_HEADER_OFFSET + 2, self.height);
        put_u16(&mut bytes, MAP_HEADER_OFFSET + 4, cell_count as u16);
        put_u16(&mut bytes, MAP_HEADER_OFFSET + 10, IMPROVEMENT_W);
        put_u16(&mut bytes, MAP_HEADER_OFFSET + 12, IMPROVEMENT_H);

        bytes[PLAYER_CIV_OFFSET] = self.player_civ;
        bytes[DIFFICULTY_LEVEL_OFFSET] = self.difficulty;
        bytes[BARB_LEVEL_OFFSET] = self.barb_level;
        bytes[CIVS_ACTIVE_OFFSET] = self.active_mask;
        put_u16(&mut bytes, TOTAL_UNITS_OFFSET, self.units.len() as u16);
        put_u16(&mut bytes, TOTAL_CITIES_OFFSET, self.cities.len() as u16);

        for index in 0..cell_count {
            bytes[attr_start + index * CELL_ATTR_SIZE] = self.default_terrain;
        }
        for &(x, y, terrain, landmass) in &self.cells {
            let offset =
                attr_start + ((y as usize * width) + x as usize / 2) * CELL_ATTR_SIZE;
            bytes[offset] = terrain;
            bytes[offset + 3] = landmass;
        }

        for (index, &(x, y, kind, owner, home_city)) in self.units.iter().enumerate() {
            let offset = unit_start + index * UNIT_RECORD_SIZE;
            put_u16(&mut bytes, offset, x);
            put_u16(&mut bytes, offset + 2, y);
            bytes[offset + 6] = kind;
            bytes[offset + 7] = owner;
            put_u16(&mut bytes, offset + 16, home_city);
        }

        for (index, &(x, y, owner, name)) in self.cities.iter().enumerate() {
            let offset = city_start + index * CITY_RECORD_SIZE;
            put_u16(&mut bytes, offset, x);
            put_u16(&mut bytes, offset + 2, y);
            bytes[offset + 8] = owner;
            let name = name.as_bytes();
            bytes[offset + 32..offset + 32 + name.len()].copy_from_slice(name);
        }

        for byte in &mut bytes[city_end..] {
            *byte = TAIL_MARKER;
        }

        bytes
    }
}

fn put_u16(bytes: &mut [u8], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}
