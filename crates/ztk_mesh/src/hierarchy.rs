use glam::{Mat4, Vec3};

use ztk_io::Buffer;
use ztk_primitives::Aabb;

use crate::{warn_leftover, Result};

const CHUNK_HIERARCHY: u16 = 0xD100;
const CHUNK_STATS: u16 = 0xD110;
const CHUNK_END: u16 = 0xD120;

#[derive(Debug, Clone)]
pub struct ModelHierarchyNode {
    pub name: String,
    pub parent_index: i16,
    pub transform: Mat4,
}

/// A model skeleton (`.MDH`).
///
/// The checksum binds a hierarchy to the softskin meshes of the same
/// model; the pair matches by checksum identity, not by file name.
#[derive(Debug, Clone, Default)]
pub struct ModelHierarchy {
    pub nodes: Vec<ModelHierarchyNode>,
    pub bbox: Aabb,
    pub collision_bbox: Aabb,
    pub root_translation: Vec3,
    pub checksum: u32,
}

impl ModelHierarchy {
    pub fn parse(buf: &mut Buffer) -> Result<ModelHierarchy> {
        let mut hierarchy = ModelHierarchy::default();

        loop {
            let kind = buf.get_u16()?;
            let length = buf.get_u32()? as usize;
            let mut chunk = buf.extract(length)?;

            let leftover = match kind {
                CHUNK_HIERARCHY => {
                    let _version = chunk.get_u32()?;
                    let node_count = chunk.get_u16()? as usize;

                    hierarchy.nodes.reserve(node_count);
                    for _ in 0..node_count {
                        hierarchy.nodes.push(ModelHierarchyNode {
                            name: chunk.get_line(false)?,
                            parent_index: chunk.get_i16()?,
                            transform: chunk.get_mat4x4()?,
                        });
                    }

                    hierarchy.bbox = chunk.get_bbox()?;
                    hierarchy.collision_bbox = chunk.get_bbox()?;
                    hierarchy.root_translation = chunk.get_vec3()?;
                    hierarchy.checksum = chunk.get_u32()?;
                    chunk.remaining()
                }
                CHUNK_STATS => {
                    // looks like a date plus the source path
                    chunk.skip(16)?;
                    let _path = chunk.get_line(false)?;
                    chunk.remaining()
                }
                CHUNK_END => return Ok(hierarchy),
                _ => 0,
            };

            warn_leftover("model_hierarchy", leftover, kind);
        }
    }
}
