//! Save/Load of a mining session
//!
//! Uses bincode for compact binary snapshots. Only crystals and pets are
//! stored; claims are transient and rebuilt by the engine on load.

use crystalpets_logic::config::SessionConfig;
use crystalpets_logic::geometry::Point3;
use hecs::World;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use thiserror::Error;

use crate::components::{Crystal, Pet, Position, Wallet};
use crate::systems::Spawner;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a session
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    /// Session time in seconds
    pub elapsed: f64,
    pub config: SessionConfig,
    pub spawner: Spawner,
    pub crystals: Vec<CrystalRecord>,
    pub pets: Vec<PetRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrystalRecord {
    pub position: Point3,
    pub health: f32,
    pub max_health: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetRecord {
    pub name: String,
    pub position: Point3,
    pub gems: u64,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

pub fn save_session<W: Write>(
    writer: W,
    world: &World,
    elapsed: f64,
    config: &SessionConfig,
    spawner: &Spawner,
) -> Result<(), SaveError> {
    let crystals = world
        .query::<(&Crystal, &Position)>()
        .iter()
        .map(|(_, (crystal, pos))| CrystalRecord {
            position: pos.0,
            health: crystal.health(),
            max_health: crystal.max_health(),
        })
        .collect();

    let pets = world
        .query::<(&Pet, &Position, Option<&Wallet>)>()
        .iter()
        .map(|(_, (pet, pos, wallet))| PetRecord {
            name: pet.name.clone(),
            position: pos.0,
            gems: wallet.map(|w| w.gems).unwrap_or(0),
        })
        .collect();

    let data = SaveData {
        version: SAVE_VERSION,
        elapsed,
        config: config.clone(),
        spawner: spawner.clone(),
        crystals,
        pets,
    };

    bincode::serialize_into(writer, &data)?;
    Ok(())
}

pub fn load_session<R: Read>(reader: R) -> Result<SaveData, SaveError> {
    let data: SaveData = bincode::deserialize_from(reader)?;
    if data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }
    Ok(data)
}
