#![allow(dead_code)]

use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use civ2_core::layout::{
    BARB_LEVEL_OFFSET, CELL_ATTR_SIZE, CITY_RECORD_SIZE, CIVS_ACTIVE_OFFSET,
    DIFFICULTY_LEVEL_OFFSET, MAP_DATA_OFFSET, MAP_HEADER_OFFSET, PLAYER_CIV_OFFSET,
    TOTAL_CITIES_OFFSET, TOTAL_UNITS_OFFSET, UNIT_RECORD_SIZE,
};

/// A 10x6 save with Rome (civ 1) at (4,2), a garrison unit on the tile and
/// Veii (civ 2) at (8,4). Mirrors the core crate's fixture builder for the
/// handful of fields the CLI tests exercise.
pub fn fixture_bytes() -> Vec<u8> {
    let width = 5usize;
    let cell_count = width * 6;
    let attr_start = MAP_DATA_OFFSET + cell_count * 7;
    let attr_end = attr_start + cell_count * CELL_ATTR_SIZE;
    let unit_start = attr_end + 2 * 3 * 2 + 1024;
    let city_start = unit_start + UNIT_RECORD_SIZE;
    let city_end = city_start + 2 * CITY_RECORD_SIZE;

    let mut bytes = vec![0u8; city_end + 16];

    put_u16(&mut bytes, MAP_HEADER_OFFSET, 10);
    put_u16(&mut bytes, MAP_HEADER_OFFSET + 2, 6);
    put_u16(&mut bytes, MAP_HEADER_OFFSET + 4, cell_count as u16);
    put_u16(&mut bytes, MAP_HEADER_OFFSET + 10, 2);
    put_u16(&mut bytes, MAP_HEADER_OFFSET + 12, 3);

    bytes[PLAYER_CIV_OFFSET] = 1;
    bytes[DIFFICULTY_LEVEL_OFFSET] = 2;
    bytes[BARB_LEVEL_OFFSET] = 1;
    bytes[CIVS_ACTIVE_OFFSET] = 0x03;
    put_u16(&mut bytes, TOTAL_UNITS_OFFSET, 1);
    put_u16(&mut bytes, TOTAL_CITIES_OFFSET, 2);

    for index in 0..cell_count {
        bytes[attr_start + index * CELL_ATTR_SIZE] = 1;
    }

    // one unit on the Rome tile, homed to Rome
    put_u16(&mut bytes, unit_start, 4);
    put_u16(&mut bytes, unit_start + 2, 2);
    bytes[unit_start + 7] = 1;
    put_u16(&mut bytes, unit_start + 16, 0);

    write_city(&mut bytes, city_start, 4, 2, 1, "Rome");
    write_city(&mut bytes, city_start + CITY_RECORD_SIZE, 8, 4, 2, "Veii");

    bytes
}

fn write_city(bytes: &mut [u8], offset: usize, x: u16, y: u16, owner: u8, name: &str) {
    put_u16(bytes, offset, x);
    put_u16(bytes, offset + 2, y);
    bytes[offset + 8] = owner;
    let name = name.as_bytes();
    bytes[offset + 32..offset + 32 + name.len()].copy_from_slice(name);
}

fn put_u16(bytes: &mut [u8], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

pub fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_civ2mod"))
        .args(args)
        .output()
        .expect("failed to run civ2mod CLI")
}

pub fn temp_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{}_{}.sav", std::process::id(), nanos))
}

pub fn write_fixture(prefix: &str) -> PathBuf {
    let path = temp_path(prefix);
    std::fs::write(&path, fixture_bytes()).expect("failed to write fixture save");
    path
}
