use glam::Vec3;

use ztk_io::Buffer;
use ztk_primitives::Obb;

use crate::proto::{CHUNK_PROTO, CHUNK_PROTO_END};
use crate::{warn_leftover, MultiResolutionMesh, Result};

const CHUNK_HEADER: u16 = 0xE100;
const CHUNK_END: u16 = 0xE110;

/// One bone influence on a base vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightEntry {
    pub weight: f32,
    pub position: Vec3,
    pub node_index: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WedgeNormal {
    pub normal: Vec3,
    pub index: u32,
}

/// A skeletal mesh: an embedded proto-mesh plus per-vertex bone weights
/// and per-node bounding volumes.
#[derive(Debug, Clone, Default)]
pub struct SoftSkinMesh {
    pub mesh: MultiResolutionMesh,
    pub weights: Vec<Vec<WeightEntry>>,
    pub wedge_normals: Vec<WedgeNormal>,
    pub nodes: Vec<i32>,
    pub bboxes: Vec<Obb>,
}

impl SoftSkinMesh {
    pub fn parse(buf: &mut Buffer) -> Result<SoftSkinMesh> {
        let mut mesh = SoftSkinMesh::default();

        loop {
            let kind = buf.get_u16()?;
            let length = buf.get_u32()? as usize;
            let mut chunk = buf.extract(length)?;

            let leftover = match kind {
                CHUNK_HEADER => {
                    let _version = chunk.get_u32()?;
                    chunk.remaining()
                }
                CHUNK_PROTO => {
                    mesh.mesh = MultiResolutionMesh::parse_from_section(chunk)?;
                    0
                }
                CHUNK_PROTO_END => {
                    // weight list, bounded by its own byte size
                    let weight_size = chunk.get_u32()? as usize;
                    let weight_end = chunk.position() + weight_size;

                    mesh.weights.reserve(mesh.mesh.positions.len());
                    for _ in 0..mesh.mesh.positions.len() {
                        let count = chunk.get_u32()? as usize;
                        let mut entries = Vec::with_capacity(count);

                        for _ in 0..count {
                            entries.push(WeightEntry {
                                weight: chunk.get_f32()?,
                                position: chunk.get_vec3()?,
                                node_index: chunk.get_u8()?,
                            });
                        }

                        mesh.weights.push(entries);
                    }

                    if chunk.position() != weight_end {
                        log::warn!(
                            "softskin_mesh: {} bytes remaining in weight section",
                            weight_end.saturating_sub(chunk.position())
                        );
                        chunk.set_position(weight_end)?;
                    }

                    let normal_count = chunk.get_u32()? as usize;
                    mesh.wedge_normals.reserve(normal_count);
                    for _ in 0..normal_count {
                        mesh.wedge_normals.push(WedgeNormal {
                            normal: chunk.get_vec3()?,
                            index: chunk.get_u32()?,
                        });
                    }

                    let node_count = chunk.get_u16()? as usize;
                    mesh.nodes.reserve(node_count);
                    for _ in 0..node_count {
                        mesh.nodes.push(chunk.get_i32()?);
                    }

                    mesh.bboxes.reserve(node_count);
                    for _ in 0..node_count {
                        mesh.bboxes.push(chunk.get_obb()?);
                    }

                    chunk.remaining()
                }
                CHUNK_END => return Ok(mesh),
                _ => 0,
            };

            warn_leftover("softskin_mesh", leftover, kind);
        }
    }
}
