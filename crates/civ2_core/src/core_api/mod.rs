mod engine;
mod error;
mod types;

pub use crate::transfer::{TransferReport, UnitScope};
pub use engine::Session;
pub use error::{CoreError, CoreErrorCode};
pub use types::{CityEntry, Snapshot};
