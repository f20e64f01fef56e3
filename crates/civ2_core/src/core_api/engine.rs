use std::io;

use crate::buffer::SaveBuffer;
use crate::cities;
use crate::civ;
use crate::layout::{
    BARB_LEVEL_OFFSET, CIVS_ACTIVE_OFFSET, DIFFICULTY_LEVEL_OFFSET, Layout, PLAYER_CIV_OFFSET,
};
use crate::transfer::{self, TransferReport, UnitScope};
use crate::visibility;

use super::error::{CoreError, CoreErrorCode};
use super::types::{CityEntry, Snapshot};

pub const MAX_BARB_LEVEL: u8 = 3;
pub const MAX_DIFFICULTY: u8 = 5;

/// One editing session over one loaded save file.
///
/// Owns the buffer and the layout resolved from it; every mutation goes
/// through here. The buffer length never changes after load, so the bytes
/// handed back by [`Session::to_bytes`] are always the loaded size.
#[derive(Debug)]
pub struct Session {
    buffer: SaveBuffer,
    layout: Layout,
}

impl Session {
    /// Load a save image and resolve its layout. Fails when the buffer is
    /// too short for the section offsets its own header describes.
    pub fn open_bytes<B: AsRef<[u8]>>(bytes: B) -> Result<Session, CoreError> {
        let buffer = SaveBuffer::new(bytes.as_ref().to_vec());
        let layout = Layout::resolve(&buffer).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Truncated,
                format!("not a recognized save file: {e}"),
            )
        })?;
        Ok(Session { buffer, layout })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.bytes().to_vec()
    }

    pub fn snapshot(&self) -> Snapshot {
        let player_civ = self.player_civ();
        Snapshot {
            player_civ,
            player_civ_color: civ::color_name(player_civ).to_string(),
            difficulty: self.difficulty(),
            barbarian_level: self.barbarian_level(),
            active_civ_mask: self.active_civ_mask(),
            map_width: self.layout.map_width2,
            map_height: self.layout.map_height,
            map_cells: self.layout.cell_count,
            unit_count: self.layout.unit_count,
            city_count: self.layout.city_count,
            file_len: self.buffer.len(),
        }
    }

    pub fn player_civ(&self) -> u8 {
        self.buffer.u8_at(PLAYER_CIV_OFFSET)
    }

    pub fn barbarian_level(&self) -> u8 {
        self.buffer.u8_at(BARB_LEVEL_OFFSET)
    }

    pub fn set_barbarian_level(&mut self, level: u8) -> Result<(), CoreError> {
        if level > MAX_BARB_LEVEL {
            return Err(CoreError::new(
                CoreErrorCode::InvalidInput,
                format!("invalid barbarian level {level}, expected 0-{MAX_BARB_LEVEL}"),
            ));
        }
        self.buffer.set_u8_at(BARB_LEVEL_OFFSET, level);
        Ok(())
    }

    pub fn difficulty(&self) -> u8 {
        self.buffer.u8_at(DIFFICULTY_LEVEL_OFFSET)
    }

    pub fn set_difficulty(&mut self, level: u8) -> Result<(), CoreError> {
        if level > MAX_DIFFICULTY {
            return Err(CoreError::new(
                CoreErrorCode::InvalidInput,
                format!("invalid difficulty level {level}, expected 0-{MAX_DIFFICULTY}"),
            ));
        }
        self.buffer.set_u8_at(DIFFICULTY_LEVEL_OFFSET, level);
        Ok(())
    }

    pub fn active_civ_mask(&self) -> u8 {
        self.buffer.u8_at(CIVS_ACTIVE_OFFSET)
    }

    /// The mask is one bit per civ, so any byte value is meaningful.
    pub fn set_active_civ_mask(&mut self, mask: u8) {
        self.buffer.set_u8_at(CIVS_ACTIVE_OFFSET, mask);
    }

    /// Switch one civilization on in the active mask.
    pub fn activate_civ(&mut self, civ_num: u8) -> Result<(), CoreError> {
        check_civ(civ_num)?;
        let mask = civ::set_bit(self.active_civ_mask(), civ_num);
        self.buffer.set_u8_at(CIVS_ACTIVE_OFFSET, mask);
        Ok(())
    }

    /// Every city record in section order; the index is the city id units
    /// reference as their home city.
    pub fn cities(&self) -> Vec<CityEntry> {
        self.layout
            .city_records()
            .map(|record| {
                let (x, y) = cities::position(&self.buffer, record);
                CityEntry {
                    id: cities::city_id(&self.layout, record),
                    name: cities::name(&self.buffer, record),
                    owner: cities::owner(&self.buffer, record),
                    x,
                    y,
                }
            })
            .collect()
    }

    pub fn transfer_city(
        &mut self,
        name: &str,
        new_owner: u8,
        scope: UnitScope,
    ) -> Result<TransferReport, CoreError> {
        check_civ(new_owner)?;
        transfer::transfer_city(&mut self.buffer, &self.layout, name, new_owner, scope)
            .map_err(transfer_error)
    }

    pub fn transfer_continent(
        &mut self,
        name: &str,
        new_owner: u8,
    ) -> Result<TransferReport, CoreError> {
        check_civ(new_owner)?;
        transfer::transfer_continent(&mut self.buffer, &self.layout, name, new_owner)
            .map_err(transfer_error)
    }

    /// Extend `to`'s visibility map with everything `from` can see.
    pub fn copy_visibility(&mut self, to: u8, from: u8) -> Result<(), CoreError> {
        check_civ(to)?;
        check_civ(from)?;
        visibility::copy_civ_visibility(&mut self.buffer, &self.layout, to, from);
        Ok(())
    }

    pub fn clear_visibility(&mut self, civ_num: u8) -> Result<(), CoreError> {
        check_civ(civ_num)?;
        visibility::clear_civ_visibility(&mut self.buffer, &self.layout, civ_num);
        Ok(())
    }

    pub fn fill_visibility(&mut self, civ_num: u8) -> Result<(), CoreError> {
        check_civ(civ_num)?;
        visibility::fill_civ_visibility(&mut self.buffer, &self.layout, civ_num);
        Ok(())
    }
}

fn check_civ(civ_num: u8) -> Result<(), CoreError> {
    if civ_num >= civ::CIV_COUNT {
        return Err(CoreError::new(
            CoreErrorCode::InvalidInput,
            format!("invalid civ number {civ_num}, expected 0-7"),
        ));
    }
    Ok(())
}

fn transfer_error(e: io::Error) -> CoreError {
    if e.kind() == io::ErrorKind::NotFound {
        CoreError::new(CoreErrorCode::CityNotFound, e.to_string())
    } else {
        CoreError::new(CoreErrorCode::Io, e.to_string())
    }
}
