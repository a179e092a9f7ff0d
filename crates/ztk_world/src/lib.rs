//! Game worlds (`.ZEN`): the embedded world mesh and BSP tree, the vob
//! scene graph and the way-net, plus save-game metadata blocks.

mod bsp;
mod save;
mod way_net;
mod world;

pub mod vob;

pub use bsp::{BspNode, BspSector, BspTree, BspTreeMode};
pub use save::{LogTopic, SaveInfo, ScriptState, SymbolState, TopicSection, TopicStatus};
pub use vob::{read_vob_tree, Vob, VobData, VobType};
pub use way_net::{WayEdge, WayNet, WayPoint};
pub use world::{determine_world_version, GameVersion, World};

use ztk_archive::ArchiveError;
use ztk_io::BufferError;
use ztk_mesh::MeshError;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("malformed world: {0}")]
    Malformed(String),
    #[error("unexpected object class {found:?}, expected {expected:?}")]
    UnexpectedClass { expected: String, found: String },
    #[error("invalid {name} discriminant {value}")]
    InvalidEnum { name: &'static str, value: u32 },
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

pub type Result<T> = std::result::Result<T, WorldError>;
