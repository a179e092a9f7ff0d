use glam::Vec3;

use ztk_io::Buffer;
use ztk_primitives::FileDate;

use crate::proto::CHUNK_PROTO;
use crate::{warn_leftover, MultiResolutionMesh, Result};

const CHUNK_SOURCES: u16 = 0xE010;
const CHUNK_HEADER: u16 = 0xE020;
const CHUNK_ANIMATIONS: u16 = 0xE030;
const CHUNK_MORPH: u16 = 0xB1FF;

#[derive(Debug, Clone, Default)]
pub struct MorphSource {
    pub file_date: FileDate,
    pub file_name: String,
}

/// A named, time-sampled list of per-vertex displacements.
#[derive(Debug, Clone, Default)]
pub struct MorphAnimation {
    pub name: String,
    pub layer: i32,
    pub blend_in: f32,
    pub blend_out: f32,
    pub duration: f32,
    pub speed: f32,
    pub flags: u8,
    pub frame_count: u32,
    pub vertices: Vec<u32>,
    pub samples: Vec<Vec3>,
}

/// A morph mesh (`.MMB`): a proto-mesh base plus per-position deltas and
/// named animations.
#[derive(Debug, Clone, Default)]
pub struct MorphMesh {
    pub name: String,
    pub mesh: MultiResolutionMesh,
    pub morph_positions: Vec<Vec3>,
    pub animations: Vec<MorphAnimation>,
    pub sources: Vec<MorphSource>,
}

impl MorphMesh {
    pub fn parse(buf: &mut Buffer) -> Result<MorphMesh> {
        let mut mesh = MorphMesh::default();

        while buf.remaining() > 0 {
            let kind = buf.get_u16()?;
            let length = buf.get_u32()? as usize;
            let mut chunk = buf.extract(length)?;

            let leftover = match kind {
                CHUNK_SOURCES => {
                    let count = chunk.get_u16()? as usize;
                    mesh.sources.reserve(count);
                    for _ in 0..count {
                        mesh.sources.push(MorphSource {
                            file_date: chunk.get_date()?,
                            file_name: chunk.get_line(true)?,
                        });
                    }
                    chunk.remaining()
                }
                CHUNK_HEADER => {
                    let _version = chunk.get_u32()?;
                    mesh.name = chunk.get_line(true)?;
                    chunk.remaining()
                }
                CHUNK_PROTO => {
                    mesh.mesh = MultiResolutionMesh::parse_from_section(chunk)?;
                    0
                }
                CHUNK_MORPH => {
                    // one delta per base position
                    mesh.morph_positions.reserve(mesh.mesh.positions.len());
                    for _ in 0..mesh.mesh.positions.len() {
                        mesh.morph_positions.push(chunk.get_vec3()?);
                    }
                    chunk.remaining()
                }
                CHUNK_ANIMATIONS => {
                    let count = chunk.get_u16()? as usize;
                    mesh.animations.reserve(count);

                    for _ in 0..count {
                        let mut anim = MorphAnimation {
                            name: chunk.get_line(false)?,
                            blend_in: chunk.get_f32()?,
                            blend_out: chunk.get_f32()?,
                            duration: chunk.get_f32()?,
                            layer: chunk.get_i32()?,
                            speed: chunk.get_f32()?,
                            flags: chunk.get_u8()?,
                            ..MorphAnimation::default()
                        };

                        let vertex_count = chunk.get_u32()?;
                        anim.frame_count = chunk.get_u32()?;

                        anim.vertices.reserve(vertex_count as usize);
                        for _ in 0..vertex_count {
                            anim.vertices.push(chunk.get_u32()?);
                        }

                        let sample_count = (vertex_count * anim.frame_count) as usize;
                        anim.samples.reserve(sample_count);
                        for _ in 0..sample_count {
                            anim.samples.push(chunk.get_vec3()?);
                        }

                        mesh.animations.push(anim);
                    }
                    chunk.remaining()
                }
                _ => 0,
            };

            warn_leftover("morph_mesh", leftover, kind);
        }

        Ok(mesh)
    }
}
