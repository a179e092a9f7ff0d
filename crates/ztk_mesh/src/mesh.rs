use std::sync::Arc;

use glam::{Vec2, Vec3};

use ztk_io::Buffer;
use ztk_material::Material;
use ztk_primitives::{Aabb, FileDate, Obb};
use ztk_tex::Texture;

use crate::{warn_leftover, Result};

pub(crate) const MESH_VERSION_G2: u16 = 265;

const CHUNK_MESH: u16 = 0xB000;
const CHUNK_BBOX: u16 = 0xB010;
const CHUNK_MATERIAL: u16 = 0xB020;
const CHUNK_LIGHTMAPS: u16 = 0xB025;
const CHUNK_SHARED_LIGHTMAPS: u16 = 0xB026;
const CHUNK_VERTICES: u16 = 0xB030;
const CHUNK_FEATURES: u16 = 0xB040;
const CHUNK_POLYGONS: u16 = 0xB050;
pub(crate) const CHUNK_MESH_END: u16 = 0xB060;

/// Per-corner attributes referenced by polygon feature indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexFeature {
    pub texture: Vec2,
    pub light: u32,
    pub normal: Vec3,
}

/// Canonical polygon flags. Gothic 1 and Gothic II pack these
/// differently on disk; both layouts populate this one struct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolygonFlags {
    pub is_portal: u8,
    pub is_occluder: bool,
    pub is_sector: bool,
    pub should_relight: bool,
    pub is_outdoor: bool,
    pub is_ghost_occluder: bool,
    pub is_dynamically_lit: bool,
    pub sector_index: u16,
    pub is_lod: bool,
    pub normal_axis: u8,
}

/// Triangulated polygon data as parallel arrays. Every polygon
/// contributes exactly three vertex and feature indices.
#[derive(Debug, Clone, Default)]
pub struct PolygonList {
    pub material_indices: Vec<i16>,
    pub lightmap_indices: Vec<i16>,
    pub feature_indices: Vec<u32>,
    pub vertex_indices: Vec<u32>,
    pub flags: Vec<PolygonFlags>,
}

/// A static light map projected onto world geometry. Textures may be
/// shared between many lightmaps.
#[derive(Debug, Clone)]
pub struct LightMap {
    pub texture: Arc<Texture>,
    pub normals: [Vec3; 2],
    pub origin: Vec3,
}

/// A world mesh (`zCMesh`).
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub date: FileDate,
    pub bbox: Aabb,
    pub obb: Obb,
    pub materials: Vec<Material>,
    pub vertices: Vec<Vec3>,
    pub features: Vec<VertexFeature>,
    pub polygons: PolygonList,
    pub lightmaps: Vec<LightMap>,
}

impl Mesh {
    /// Parses a world mesh.
    ///
    /// `leaf_polygons` must be sorted. When non-empty (Gothic 1 worlds,
    /// where the flag bits cannot identify leaves), any polygon whose
    /// index is not in the set is dropped entirely.
    pub fn parse(buf: &mut Buffer, leaf_polygons: &[u32]) -> Result<Mesh> {
        let mut mesh = Mesh::default();
        let mut version = 0u16;

        loop {
            let kind = buf.get_u16()?;
            let length = buf.get_u32()? as usize;
            let mut chunk = buf.extract(length)?;

            let mut finished = false;
            let leftover = match kind {
                CHUNK_MESH => {
                    version = chunk.get_u16()?;
                    mesh.date = chunk.get_date()?;
                    mesh.name = chunk.get_line(false)?;
                    chunk.remaining()
                }
                CHUNK_BBOX => {
                    mesh.bbox = chunk.get_bbox()?;
                    mesh.obb = chunk.get_obb()?;
                    chunk.remaining()
                }
                CHUNK_MATERIAL => {
                    let mut archive = ztk_archive::open(chunk)?;
                    let count = archive.buffer().get_u32()?;
                    mesh.materials.reserve(count as usize);

                    for _ in 0..count {
                        mesh.materials.push(Material::parse(archive.as_mut())?);
                    }

                    archive.buffer().remaining()
                }
                CHUNK_VERTICES => {
                    let count = chunk.get_u32()? as usize;
                    mesh.vertices.reserve(count);
                    for _ in 0..count {
                        mesh.vertices.push(chunk.get_vec3()?);
                    }
                    chunk.remaining()
                }
                CHUNK_FEATURES => {
                    let count = chunk.get_u32()? as usize;
                    mesh.features.reserve(count);
                    for _ in 0..count {
                        mesh.features.push(VertexFeature {
                            texture: chunk.get_vec2()?,
                            light: chunk.get_u32()?,
                            normal: chunk.get_vec3()?,
                        });
                    }
                    chunk.remaining()
                }
                CHUNK_POLYGONS => {
                    mesh.polygons = parse_polygons(&mut chunk, version, leaf_polygons)?;
                    chunk.remaining()
                }
                CHUNK_SHARED_LIGHTMAPS => {
                    let texture_count = chunk.get_u32()? as usize;
                    let mut textures = Vec::with_capacity(texture_count);
                    for _ in 0..texture_count {
                        textures.push(Arc::new(Texture::parse(&mut chunk)?));
                    }

                    let lightmap_count = chunk.get_u32()? as usize;
                    for _ in 0..lightmap_count {
                        let origin = chunk.get_vec3()?;
                        let normals = [chunk.get_vec3()?, chunk.get_vec3()?];
                        let texture_index = chunk.get_u32()? as usize;

                        mesh.lightmaps.push(LightMap {
                            texture: Arc::clone(&textures[texture_index]),
                            normals,
                            origin,
                        });
                    }
                    chunk.remaining()
                }
                CHUNK_LIGHTMAPS => {
                    let lightmap_count = chunk.get_u32()? as usize;
                    for _ in 0..lightmap_count {
                        let origin = chunk.get_vec3()?;
                        let normals = [chunk.get_vec3()?, chunk.get_vec3()?];
                        let texture = Texture::parse(&mut chunk)?;

                        mesh.lightmaps.push(LightMap {
                            texture: Arc::new(texture),
                            normals,
                            origin,
                        });
                    }
                    chunk.remaining()
                }
                CHUNK_MESH_END => {
                    finished = true;
                    chunk.remaining()
                }
                _ => 0,
            };

            warn_leftover("mesh", leftover, kind);

            if finished {
                return Ok(mesh);
            }
        }
    }
}

fn parse_polygons(chunk: &mut Buffer, version: u16, leaf_polygons: &[u32]) -> Result<PolygonList> {
    let wide = version == MESH_VERSION_G2;
    let count = chunk.get_u32()?;

    let mut polygons = PolygonList::default();
    polygons.material_indices.reserve(count as usize);
    polygons.lightmap_indices.reserve(count as usize);
    polygons.feature_indices.reserve(count as usize * 3);
    polygons.vertex_indices.reserve(count as usize * 3);
    polygons.flags.reserve(count as usize);

    for i in 0..count {
        let material_index = chunk.get_i16()?;
        let lightmap_index = chunk.get_i16()?;

        // polygon plane, unused by the triangulated output
        let _distance = chunk.get_f32()?;
        let _normal = chunk.get_vec3()?;

        let flags = if wide {
            let bits = chunk.get_u8()?;
            PolygonFlags {
                is_portal: bits & 0b0000_0011,
                is_occluder: bits & 0b0000_0100 != 0,
                is_sector: bits & 0b0000_1000 != 0,
                should_relight: bits & 0b0001_0000 != 0,
                is_outdoor: bits & 0b0010_0000 != 0,
                is_ghost_occluder: bits & 0b0100_0000 != 0,
                is_dynamically_lit: bits & 0b1000_0000 != 0,
                sector_index: chunk.get_u16()?,
                ..PolygonFlags::default()
            }
        } else {
            let bits1 = chunk.get_u8()?;
            let bits2 = chunk.get_u8()?;
            PolygonFlags {
                is_portal: bits1 & 0b0000_0011,
                is_occluder: bits1 & 0b0000_0100 != 0,
                is_sector: bits1 & 0b0000_1000 != 0,
                is_lod: bits1 & 0b0001_0000 != 0,
                is_outdoor: bits1 & 0b0010_0000 != 0,
                is_ghost_occluder: bits1 & 0b0100_0000 != 0,
                normal_axis: ((bits1 & 0b1000_0000) >> 7) | (bits2 & 0b0000_0001),
                sector_index: chunk.get_u16()?,
                ..PolygonFlags::default()
            }
        };

        let vertex_count = chunk.get_u8()? as usize;
        let vertex_stride = if wide { 8 } else { 6 };

        let mut read_index = |chunk: &mut Buffer| -> Result<(u32, u32)> {
            let vertex = if wide {
                chunk.get_u32()?
            } else {
                chunk.get_u16()? as u32
            };
            Ok((vertex, chunk.get_u32()?))
        };

        if !leaf_polygons.is_empty() && leaf_polygons.binary_search(&i).is_err() {
            // not a leaf polygon: no geometry is emitted for it
            chunk.skip(vertex_stride * vertex_count)?;
        } else if vertex_count < 3
            || flags.is_portal != 0
            || flags.is_ghost_occluder
            || flags.is_outdoor
        {
            chunk.skip(vertex_stride * vertex_count)?;
        } else if vertex_count == 3 {
            for _ in 0..3 {
                let (vertex, feature) = read_index(chunk)?;
                polygons.vertex_indices.push(vertex);
                polygons.feature_indices.push(feature);
            }

            polygons.material_indices.push(material_index);
            polygons.lightmap_indices.push(lightmap_index);
            polygons.flags.push(flags);
        } else {
            // triangle fan around the first vertex
            let root = read_index(chunk)?;
            let mut previous = read_index(chunk)?;

            for _ in 0..vertex_count - 2 {
                let next = read_index(chunk)?;

                polygons.vertex_indices.push(root.0);
                polygons.vertex_indices.push(previous.0);
                polygons.vertex_indices.push(next.0);
                polygons.feature_indices.push(root.1);
                polygons.feature_indices.push(previous.1);
                polygons.feature_indices.push(next.1);

                polygons.material_indices.push(material_index);
                polygons.lightmap_indices.push(lightmap_index);
                polygons.flags.push(flags);

                previous = next;
            }
        }
    }

    Ok(polygons)
}
