//! The chunked mesh containers: world meshes (`.MSH`), multi-resolution
//! meshes (`.MRM`), model meshes (`.MDM`), morph meshes (`.MMB`), model
//! hierarchies (`.MDH`) and combined models (`.MDL`).
//!
//! All of them share one framing: a 16-bit chunk tag, a 32-bit length
//! and a bounded payload. Unknown tags are skipped; bytes left over
//! after decoding a known chunk are logged but tolerated.

mod hierarchy;
mod mesh;
mod model;
mod model_mesh;
mod morph;
mod proto;
mod softskin;

pub use hierarchy::{ModelHierarchy, ModelHierarchyNode};
pub use mesh::{LightMap, Mesh, PolygonFlags, PolygonList, VertexFeature};
pub use model::Model;
pub use model_mesh::ModelMesh;
pub use morph::{MorphAnimation, MorphMesh, MorphSource};
pub use proto::{MeshSection, MultiResolutionMesh, SubMesh, SubMeshSection, Wedge};
pub use softskin::{SoftSkinMesh, WedgeNormal, WeightEntry};

use ztk_archive::ArchiveError;
use ztk_io::BufferError;
use ztk_material::MaterialError;
use ztk_tex::TextureError;

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("malformed mesh container: {0}")]
    Malformed(String),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Material(#[from] MaterialError),
    #[error(transparent)]
    Texture(#[from] TextureError),
}

pub type Result<T> = std::result::Result<T, MeshError>;

pub(crate) fn warn_leftover(container: &str, leftover: usize, kind: u16) {
    if leftover > 0 {
        log::warn!("{container}: {leftover} bytes remaining in section 0x{kind:04X}");
    }
}
