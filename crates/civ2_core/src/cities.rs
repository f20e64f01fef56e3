use memchr::memmem;

use crate::buffer::SaveBuffer;
use crate::layout::{CITY_RECORD_SIZE, Layout};

// Field offsets within an 88-byte city record.
pub const CITY_X_OFFSET: usize = 0;
pub const CITY_Y_OFFSET: usize = 2;
pub const CITY_OWNER_OFFSET: usize = 8;
pub const CITY_NAME_OFFSET: usize = 32;
pub const CITY_NAME_LEN: usize = 16;

pub fn position(buffer: &SaveBuffer, record: usize) -> (u16, u16) {
    (
        buffer.u16_at(record + CITY_X_OFFSET),
        buffer.u16_at(record + CITY_Y_OFFSET),
    )
}

pub fn owner(buffer: &SaveBuffer, record: usize) -> u8 {
    buffer.u8_at(record + CITY_OWNER_OFFSET)
}

pub fn set_owner(buffer: &mut SaveBuffer, record: usize, civ: u8) {
    buffer.set_u8_at(record + CITY_OWNER_OFFSET, civ);
}

pub fn name(buffer: &SaveBuffer, record: usize) -> String {
    let field = buffer.range(
        record + CITY_NAME_OFFSET,
        record + CITY_NAME_OFFSET + CITY_NAME_LEN,
    );
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Find the record offset of the first city whose bytes contain `name`.
///
/// The search is a raw byte scan over the city section; it is not anchored
/// to record boundaries, so a name could in principle match inside the
/// adjacent bytes of a neighboring field. Inherited quirk, kept as-is.
pub fn find_city(buffer: &SaveBuffer, layout: &Layout, name: &str) -> Option<usize> {
    let section = buffer.range(layout.city_start, layout.city_end);
    let hit = memmem::find(section, name.as_bytes())?;
    Some(layout.city_start + hit - CITY_NAME_OFFSET)
}

/// A city's id is its ordinal index within the city section; units store
/// this id as their home-city reference.
pub fn city_id(layout: &Layout, record: usize) -> u16 {
    debug_assert!(
        record >= layout.city_start,
        "city record offset {record} before city section start {}",
        layout.city_start
    );
    ((record - layout.city_start) / CITY_RECORD_SIZE) as u16
}
