use std::collections::HashMap;

use ztk_io::Buffer;

use crate::proto::CHUNK_PROTO;
use crate::{warn_leftover, MultiResolutionMesh, Result, SoftSkinMesh};

const CHUNK_HEADER: u16 = 0xD000;
const CHUNK_SOURCE: u16 = 0xD010;
const CHUNK_NODES: u16 = 0xD020;
const CHUNK_SOFTSKINS: u16 = 0xD030;
const CHUNK_END: u16 = 0xD040;

/// A model mesh (`.MDM`): skinned meshes plus rigid attachments bound to
/// hierarchy nodes by name.
#[derive(Debug, Clone, Default)]
pub struct ModelMesh {
    pub meshes: Vec<SoftSkinMesh>,
    pub attachments: HashMap<String, MultiResolutionMesh>,
    /// Must match the checksum of the model hierarchy this mesh is
    /// animated with.
    pub checksum: u32,
}

impl ModelMesh {
    pub fn parse(buf: &mut Buffer) -> Result<ModelMesh> {
        let mut mesh = ModelMesh::default();
        let mut attachment_names: Vec<String> = Vec::new();

        loop {
            let kind = buf.get_u16()?;
            let length = buf.get_u32()? as usize;
            let mut chunk = buf.extract(length)?;

            let leftover = match kind {
                CHUNK_HEADER => {
                    let _version = chunk.get_u32()?;
                    chunk.remaining()
                }
                CHUNK_SOURCE => {
                    // allegedly a date; the stored values are garbage
                    let _date = chunk.get_date()?;
                    let _source_file = chunk.get_line(false)?;
                    chunk.remaining()
                }
                CHUNK_NODES => {
                    let count = chunk.get_u16()? as usize;
                    attachment_names.reserve(count);
                    for _ in 0..count {
                        attachment_names.push(chunk.get_line(true)?);
                    }
                    chunk.remaining()
                }
                CHUNK_PROTO => {
                    // attachments bind to node names by positional order
                    let name = attachment_names
                        .get(mesh.attachments.len())
                        .cloned()
                        .unwrap_or_default();
                    mesh.attachments
                        .insert(name, MultiResolutionMesh::parse_from_section(chunk)?);
                    0
                }
                CHUNK_SOFTSKINS => {
                    mesh.checksum = chunk.get_u32()?;
                    let count = chunk.get_u16()?;
                    mesh.meshes.reserve(count as usize);

                    // Quirk of the format: the sub-meshes are NOT contained
                    // in this chunk's declared length. They follow it in the
                    // parent buffer and must be read from there.
                    for _ in 0..count {
                        mesh.meshes.push(SoftSkinMesh::parse(buf)?);
                    }

                    chunk.remaining()
                }
                CHUNK_END => return Ok(mesh),
                _ => 0,
            };

            warn_leftover("model_mesh", leftover, kind);
        }
    }
}
