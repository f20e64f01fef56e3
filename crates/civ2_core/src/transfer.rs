use std::io;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::buffer::SaveBuffer;
use crate::cities;
use crate::civ;
use crate::layout::Layout;
use crate::map::{self, CellField, TERRAIN_OCEAN};
use crate::units;
use crate::visibility;

// The footprint generator treats any radius past the second ring as the
// full diamond, so the city value stays at the original's 3.
const CITY_REVEAL_RADIUS: u32 = 3;
const UNIT_REVEAL_RADIUS: u32 = 1;

/// Which units follow a city to its new owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitScope {
    /// Units physically on the city tile, matched by comparing the unit's
    /// 4-byte position prefix against the city record's, plus home-based
    /// units currently at sea.
    Inside,
    /// Units whose stored home-city id points at the city, wherever they
    /// stand; each one is revealed at its own position.
    Owned,
}

/// What a completed transfer touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferReport {
    pub cities_reassigned: usize,
    pub units_reassigned: usize,
    pub cells_claimed: usize,
}

/// Hand the named city to `new_owner`, dragging units along per `scope`.
///
/// The only failure point is the name lookup, which happens before the
/// first write; a failed transfer leaves the buffer untouched.
pub fn transfer_city(
    buffer: &mut SaveBuffer,
    layout: &Layout,
    name: &str,
    new_owner: u8,
    scope: UnitScope,
) -> io::Result<TransferReport> {
    let city = cities::find_city(buffer, layout, name).ok_or_else(|| city_not_found(name))?;

    let mut report = TransferReport::default();
    cities::set_owner(buffer, city, new_owner);
    report.cities_reassigned = 1;

    let (x, y) = cities::position(buffer, city);
    visibility::reveal(buffer, layout, x as i32, y as i32, new_owner, CITY_REVEAL_RADIUS);

    let id = cities::city_id(layout, city);
    match scope {
        UnitScope::Inside => {
            report.units_reassigned += reassign_city_tile_units(buffer, layout, city, new_owner);
            report.units_reassigned += reassign_ocean_units(buffer, layout, id, new_owner);
        }
        UnitScope::Owned => {
            report.units_reassigned += reassign_home_units(buffer, layout, id, new_owner);
        }
    }

    Ok(report)
}

/// Hand every city, unit and land cell on the named city's landmass to
/// `new_owner`. The landmass id of the city's tile selects the membership;
/// all three passes are full linear scans because any number of entities
/// may share the landmass.
pub fn transfer_continent(
    buffer: &mut SaveBuffer,
    layout: &Layout,
    name: &str,
    new_owner: u8,
) -> io::Result<TransferReport> {
    let city = cities::find_city(buffer, layout, name).ok_or_else(|| city_not_found(name))?;
    let (x, y) = cities::position(buffer, city);
    let landmass = map::cell_field(buffer, layout, x as usize, y as usize, CellField::Landmass);

    let mut report = TransferReport::default();

    // Cell pass: claim visibility and ownership of every land cell on the
    // landmass. Ocean cells carry the landmass id of adjoining land but are
    // skipped here.
    for cell in layout.cell_records() {
        if buffer.u8_at(cell + CellField::Landmass as usize) != landmass {
            continue;
        }
        if buffer.u8_at(cell + CellField::Terrain as usize) == TERRAIN_OCEAN {
            continue;
        }

        let mask = buffer.u8_at(cell + CellField::Visibility as usize);
        buffer.set_u8_at(
            cell + CellField::Visibility as usize,
            civ::set_bit(mask, new_owner),
        );

        // Cell ownership lives in the high nibble of this byte, unlike the
        // full-byte unit/city owner fields; the low bits carry another
        // packed field and must survive.
        let owner_byte = buffer.u8_at(cell + CellField::Owner as usize);
        buffer.set_u8_at(
            cell + CellField::Owner as usize,
            (owner_byte & 0x0f) + new_owner * 16,
        );
        report.cells_claimed += 1;
    }

    // Unit pass: any unit whose tile shares the landmass id changes hands,
    // afloat or ashore.
    for unit in layout.unit_records() {
        let (ux, uy) = units::position(buffer, unit);
        let tile = map::cell_field(buffer, layout, ux as usize, uy as usize, CellField::Landmass);
        if tile != landmass {
            continue;
        }
        units::set_owner(buffer, unit, new_owner);
        report.units_reassigned += 1;
    }

    // City pass: owner byte, then the city's seagoing units, then the wide
    // reveal around the city tile.
    for record in layout.city_records() {
        let (cx, cy) = cities::position(buffer, record);
        let tile = map::cell_field(buffer, layout, cx as usize, cy as usize, CellField::Landmass);
        if tile != landmass {
            continue;
        }
        cities::set_owner(buffer, record, new_owner);
        report.units_reassigned +=
            reassign_ocean_units(buffer, layout, cities::city_id(layout, record), new_owner);
        visibility::reveal(
            buffer,
            layout,
            cx as i32,
            cy as i32,
            new_owner,
            CITY_REVEAL_RADIUS,
        );
        report.cities_reassigned += 1;
    }

    Ok(report)
}

/// Units sitting exactly on the city tile, matched byte-for-byte against
/// the city record's position prefix rather than the home-city id. This
/// membership test is deliberately distinct from `reassign_home_units`.
fn reassign_city_tile_units(
    buffer: &mut SaveBuffer,
    layout: &Layout,
    city_record: usize,
    new_owner: u8,
) -> usize {
    let mut reassigned = 0;
    for unit in layout.unit_records() {
        let on_tile = buffer.range(city_record, city_record + 4) == buffer.range(unit, unit + 4);
        if !on_tile {
            continue;
        }
        units::set_owner(buffer, unit, new_owner);
        debug!("unit type {} found in city", units::kind(buffer, unit));
        reassigned += 1;
    }
    reassigned
}

/// Units supported by the city, wherever they stand; each one becomes
/// visible to its new owner at the narrow footprint.
fn reassign_home_units(
    buffer: &mut SaveBuffer,
    layout: &Layout,
    city_id: u16,
    new_owner: u8,
) -> usize {
    let mut reassigned = 0;
    for unit in layout.unit_records() {
        if units::home_city(buffer, unit) != city_id {
            continue;
        }
        units::set_owner(buffer, unit, new_owner);
        debug!("city owned unit type {} found", units::kind(buffer, unit));
        let (x, y) = units::position(buffer, unit);
        visibility::reveal(buffer, layout, x as i32, y as i32, new_owner, UNIT_REVEAL_RADIUS);
        reassigned += 1;
    }
    reassigned
}

/// Ships and aircraft in open water keep following their home city when it
/// changes hands; units of the city on land are left to the caller's
/// membership rule.
fn reassign_ocean_units(
    buffer: &mut SaveBuffer,
    layout: &Layout,
    city_id: u16,
    new_owner: u8,
) -> usize {
    let mut reassigned = 0;
    for unit in layout.unit_records() {
        if units::home_city(buffer, unit) != city_id {
            continue;
        }
        let (x, y) = units::position(buffer, unit);
        let terrain = map::cell_field(buffer, layout, x as usize, y as usize, CellField::Terrain);
        if terrain != TERRAIN_OCEAN {
            continue;
        }
        units::set_owner(buffer, unit, new_owner);
        debug!("ocean unit type {} found", units::kind(buffer, unit));
        visibility::reveal(buffer, layout, x as i32, y as i32, new_owner, UNIT_REVEAL_RADIUS);
        reassigned += 1;
    }
    reassigned
}

fn city_not_found(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("city {name:?} not found"))
}
