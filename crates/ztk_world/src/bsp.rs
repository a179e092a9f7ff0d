use glam::{Vec3, Vec4};

use ztk_io::Buffer;
use ztk_primitives::Aabb;

use crate::{Result, WorldError};

pub(crate) const BSP_VERSION_G1: u32 = 0x2090000;
pub(crate) const BSP_VERSION_G2: u32 = 0x4090000;

const CHUNK_HEADER: u16 = 0xC000;
const CHUNK_POLYGONS: u16 = 0xC010;
const CHUNK_TREE: u16 = 0xC040;
const CHUNK_LIGHT: u16 = 0xC045;
const CHUNK_OUTDOORS: u16 = 0xC050;
const CHUNK_END: u16 = 0xC0FF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BspTreeMode {
    #[default]
    Indoor,
    Outdoor,
}

/// One node of the flattened BSP tree. Leaves own no plane and record
/// themselves in the tree's leaf index list instead.
#[derive(Debug, Clone, Copy)]
pub struct BspNode {
    pub bbox: Aabb,
    pub polygon_index: u32,
    pub polygon_count: u32,
    /// Plane as `(w, x, y, z)`: distance first, normal after.
    pub plane: Vec4,
    pub parent_index: i32,
    pub front_index: i32,
    pub back_index: i32,
}

/// A named outdoor sector referencing nodes and portal polygons.
#[derive(Debug, Clone, Default)]
pub struct BspSector {
    pub name: String,
    pub node_indices: Vec<u32>,
    pub portal_polygon_indices: Vec<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct BspTree {
    pub mode: BspTreeMode,
    pub polygon_indices: Vec<u32>,
    /// Sorted, de-duplicated set of polygon indices referenced by leaf
    /// nodes. Gothic 1 world meshes need this to identify their leaf
    /// polygons.
    pub leaf_polygons: Vec<u32>,
    pub nodes: Vec<BspNode>,
    pub leaf_node_indices: Vec<u32>,
    pub light_points: Vec<Vec3>,
    pub sectors: Vec<BspSector>,
    pub portal_polygon_indices: Vec<u32>,
}

fn parse_nodes(
    chunk: &mut Buffer,
    nodes: &mut Vec<BspNode>,
    indices: &mut Vec<u32>,
    version: u32,
    parent_index: i32,
    leaf: bool,
) -> Result<()> {
    let self_index = nodes.len();

    nodes.push(BspNode {
        bbox: chunk.get_bbox()?,
        polygon_index: chunk.get_u32()?,
        polygon_count: chunk.get_u32()?,
        plane: Vec4::ZERO,
        parent_index,
        front_index: -1,
        back_index: -1,
    });

    if leaf {
        indices.push(self_index as u32);
        return Ok(());
    }

    let flags = chunk.get_u8()?;

    let plane = Vec4::new(
        chunk.get_f32()?,
        chunk.get_f32()?,
        chunk.get_f32()?,
        chunk.get_f32()?,
    );
    nodes[self_index].plane = plane;

    if version == BSP_VERSION_G1 {
        // "lod-flag"; meaning unknown, absent from newer trees
        let _ = chunk.get_u8()?;
    }

    if flags & 0x01 != 0 {
        nodes[self_index].front_index = nodes.len() as i32;
        parse_nodes(
            chunk,
            nodes,
            indices,
            version,
            self_index as i32,
            flags & 0x04 != 0,
        )?;
    }

    if flags & 0x02 != 0 {
        nodes[self_index].back_index = nodes.len() as i32;
        parse_nodes(
            chunk,
            nodes,
            indices,
            version,
            self_index as i32,
            flags & 0x08 != 0,
        )?;
    }

    Ok(())
}

impl BspTree {
    pub fn parse(buf: &mut Buffer, version: u32) -> Result<BspTree> {
        let mut bsp = BspTree::default();

        loop {
            let kind = buf.get_u16()?;
            let length = buf.get_u32()? as usize;
            let mut chunk = buf.extract(length)?;

            let mut finished = false;
            match kind {
                CHUNK_HEADER => {
                    let _version = chunk.get_u16()?;
                    bsp.mode = match chunk.get_u32()? {
                        0 => BspTreeMode::Indoor,
                        1 => BspTreeMode::Outdoor,
                        value => {
                            return Err(WorldError::InvalidEnum {
                                name: "bsp tree mode",
                                value,
                            })
                        }
                    };
                }
                CHUNK_POLYGONS => {
                    let count = chunk.get_u32()? as usize;
                    bsp.polygon_indices.reserve(count);
                    for _ in 0..count {
                        bsp.polygon_indices.push(chunk.get_u32()?);
                    }
                }
                CHUNK_TREE => {
                    let node_count = chunk.get_u32()? as usize;
                    let leaf_count = chunk.get_u32()? as usize;

                    bsp.nodes.reserve(node_count);
                    bsp.leaf_node_indices.reserve(leaf_count);

                    parse_nodes(
                        &mut chunk,
                        &mut bsp.nodes,
                        &mut bsp.leaf_node_indices,
                        version,
                        -1,
                        false,
                    )?;

                    for &leaf in &bsp.leaf_node_indices {
                        let node = &bsp.nodes[leaf as usize];
                        for i in 0..node.polygon_count {
                            bsp.leaf_polygons
                                .push(bsp.polygon_indices[(node.polygon_index + i) as usize]);
                        }
                    }

                    bsp.leaf_polygons.sort_unstable();
                    bsp.leaf_polygons.dedup();
                }
                CHUNK_LIGHT => {
                    bsp.light_points.reserve(bsp.leaf_node_indices.len());
                    for _ in 0..bsp.leaf_node_indices.len() {
                        bsp.light_points.push(chunk.get_vec3()?);
                    }
                }
                CHUNK_OUTDOORS => {
                    let sector_count = chunk.get_u32()? as usize;
                    bsp.sectors.reserve(sector_count);

                    for _ in 0..sector_count {
                        let mut sector = BspSector {
                            name: chunk.get_line(false)?,
                            ..BspSector::default()
                        };

                        let node_count = chunk.get_u32()? as usize;
                        let polygon_count = chunk.get_u32()? as usize;

                        sector.node_indices.reserve(node_count);
                        for _ in 0..node_count {
                            sector.node_indices.push(chunk.get_u32()?);
                        }

                        sector.portal_polygon_indices.reserve(polygon_count);
                        for _ in 0..polygon_count {
                            sector.portal_polygon_indices.push(chunk.get_u32()?);
                        }

                        bsp.sectors.push(sector);
                    }

                    let portal_count = chunk.get_u32()? as usize;
                    bsp.portal_polygon_indices.reserve(portal_count);
                    for _ in 0..portal_count {
                        bsp.portal_polygon_indices.push(chunk.get_u32()?);
                    }
                }
                CHUNK_END => {
                    let _ = chunk.get_u8()?;
                    finished = true;
                }
                _ => {}
            }

            if chunk.remaining() != 0 {
                log::warn!(
                    "bsp_tree: {} bytes remaining in section 0x{kind:04X}",
                    chunk.remaining()
                );
            }

            if finished {
                return Ok(bsp);
            }
        }
    }
}
