use serde::{Deserialize, Serialize};

/// Read-only summary of a loaded save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub player_civ: u8,
    pub player_civ_color: String,
    pub difficulty: u8,
    pub barbarian_level: u8,
    pub active_civ_mask: u8,
    pub map_width: usize,
    pub map_height: usize,
    pub map_cells: usize,
    pub unit_count: usize,
    pub city_count: usize,
    pub file_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CityEntry {
    pub id: u16,
    pub name: String,
    pub owner: u8,
    pub x: u16,
    pub y: u16,
}
