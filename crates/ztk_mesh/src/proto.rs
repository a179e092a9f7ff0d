use glam::{Vec2, Vec3};

use ztk_io::Buffer;
use ztk_material::Material;
use ztk_primitives::{Aabb, Obb, Plane};

use crate::Result;

pub(crate) const CHUNK_PROTO: u16 = 0xB100;
pub(crate) const CHUNK_PROTO_END: u16 = 0xB1FF;

const PROTO_VERSION_G2: u16 = 0x905;

/// Offset/size pair addressing a block inside the proto-mesh content
/// sub-buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshSection {
    pub offset: u32,
    pub size: u32,
}

/// Data locations of one sub-mesh, in file order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubMeshSection {
    pub triangles: MeshSection,
    pub wedges: MeshSection,
    pub colors: MeshSection,
    pub triangle_plane_indices: MeshSection,
    pub triangle_planes: MeshSection,
    pub wedge_map: MeshSection,
    pub vertex_updates: MeshSection,
    pub triangle_edges: MeshSection,
    pub edges: MeshSection,
    pub edge_scores: MeshSection,
}

/// A corner-attribute tuple; the proto-mesh formats store these instead
/// of per-vertex attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wedge {
    pub normal: Vec3,
    pub texture: Vec2,
    pub index: u16,
}

#[derive(Debug, Clone, Default)]
pub struct SubMesh {
    pub material: Material,
    pub triangles: Vec<[u16; 3]>,
    pub wedges: Vec<Wedge>,
    pub colors: Vec<f32>,
    pub triangle_plane_indices: Vec<u16>,
    pub triangle_planes: Vec<Plane>,
    pub triangle_edges: Vec<[u16; 3]>,
    pub edges: Vec<[u16; 2]>,
    pub edge_scores: Vec<f32>,
    pub wedge_map: Vec<u16>,
}

/// A multi-resolution mesh (`.MRM`), the shared geometry core of the
/// model, morph and softskin formats.
#[derive(Debug, Clone, Default)]
pub struct MultiResolutionMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub sub_meshes: Vec<SubMesh>,
    pub materials: Vec<Material>,
    pub alpha_test: bool,
    pub bbox: Aabb,
    pub obbox: Obb,
}

impl MultiResolutionMesh {
    pub fn parse(buf: &mut Buffer) -> Result<MultiResolutionMesh> {
        let mut mesh = MultiResolutionMesh::default();

        loop {
            let kind = buf.get_u16()?;
            let length = buf.get_u32()? as usize;
            let chunk = buf.extract(length)?;

            match kind {
                CHUNK_PROTO => mesh = Self::parse_from_section(chunk)?,
                CHUNK_PROTO_END => return Ok(mesh),
                _ => {}
            }
        }
    }

    /// Decodes the proto-mesh payload itself. Separated from
    /// [`MultiResolutionMesh::parse`] because the morph, softskin and
    /// model mesh containers embed this payload under their own chunk
    /// tags.
    pub fn parse_from_section(mut chunk: Buffer) -> Result<MultiResolutionMesh> {
        let mut mesh = MultiResolutionMesh::default();

        let version = chunk.get_u16()?;
        let content_size = chunk.get_u32()? as usize;
        let mut content = chunk.extract(content_size)?;

        let submesh_count = chunk.get_u8()? as usize;
        let vertices = MeshSection {
            offset: chunk.get_u32()?,
            size: chunk.get_u32()?,
        };
        let normals = MeshSection {
            offset: chunk.get_u32()?,
            size: chunk.get_u32()?,
        };

        let mut sections = Vec::with_capacity(submesh_count);
        for _ in 0..submesh_count {
            let mut next = || -> Result<MeshSection> {
                Ok(MeshSection {
                    offset: chunk.get_u32()?,
                    size: chunk.get_u32()?,
                })
            };

            sections.push(SubMeshSection {
                triangles: next()?,
                wedges: next()?,
                colors: next()?,
                triangle_plane_indices: next()?,
                triangle_planes: next()?,
                wedge_map: next()?,
                vertex_updates: next()?,
                triangle_edges: next()?,
                edges: next()?,
                edge_scores: next()?,
            });
        }

        // materials live in an archive nested within this very chunk
        let mut archive = ztk_archive::open(chunk)?;
        for _ in 0..submesh_count {
            mesh.materials.push(Material::parse(archive.as_mut())?);
        }

        let tail = archive.buffer();
        if version == PROTO_VERSION_G2 {
            mesh.alpha_test = tail.get_u8()? != 0;
        }

        mesh.bbox = tail.get_bbox()?;

        mesh.positions.reserve(vertices.size as usize);
        let mut block = content.slice_at(vertices.offset as usize, vertices.size as usize * 12)?;
        for _ in 0..vertices.size {
            mesh.positions.push(block.get_vec3()?);
        }

        mesh.normals.reserve(normals.size as usize);
        let mut block = content.slice_at(normals.offset as usize, normals.size as usize * 12)?;
        for _ in 0..normals.size {
            mesh.normals.push(block.get_vec3()?);
        }

        mesh.sub_meshes.reserve(submesh_count);
        for (i, section) in sections.iter().enumerate() {
            let mut sub = SubMesh::parse(&mut content, section)?;
            sub.material = mesh.materials[i].clone();
            mesh.sub_meshes.push(sub);
        }

        mesh.obbox = tail.get_obb()?;

        // possibly a vec4, but the values observed make no sense
        tail.skip(0x10)?;

        Ok(mesh)
    }
}

impl SubMesh {
    fn parse(content: &mut Buffer, section: &SubMeshSection) -> Result<SubMesh> {
        let mut sub = SubMesh::default();

        content.set_position(section.triangles.offset as usize)?;
        for _ in 0..section.triangles.size {
            sub.triangles
                .push([content.get_u16()?, content.get_u16()?, content.get_u16()?]);
        }

        content.set_position(section.wedges.offset as usize)?;
        for _ in 0..section.wedges.size {
            let wedge = Wedge {
                normal: content.get_vec3()?,
                texture: content.get_vec2()?,
                index: content.get_u16()?,
            };
            // two bytes of struct padding dumped along with the wedge
            content.skip(2)?;
            sub.wedges.push(wedge);
        }

        content.set_position(section.colors.offset as usize)?;
        for _ in 0..section.colors.size {
            sub.colors.push(content.get_f32()?);
        }

        content.set_position(section.triangle_plane_indices.offset as usize)?;
        for _ in 0..section.triangle_plane_indices.size {
            sub.triangle_plane_indices.push(content.get_u16()?);
        }

        content.set_position(section.triangle_planes.offset as usize)?;
        for _ in 0..section.triangle_planes.size {
            sub.triangle_planes
                .push(Plane::new(content.get_f32()?, content.get_vec3()?));
        }

        content.set_position(section.triangle_edges.offset as usize)?;
        for _ in 0..section.triangle_edges.size {
            sub.triangle_edges
                .push([content.get_u16()?, content.get_u16()?, content.get_u16()?]);
        }

        content.set_position(section.edges.offset as usize)?;
        for _ in 0..section.edges.size {
            sub.edges.push([content.get_u16()?, content.get_u16()?]);
        }

        content.set_position(section.edge_scores.offset as usize)?;
        for _ in 0..section.edge_scores.size {
            sub.edge_scores.push(content.get_f32()?);
        }

        content.set_position(section.wedge_map.offset as usize)?;
        for _ in 0..section.wedge_map.size {
            sub.wedge_map.push(content.get_u16()?);
        }

        Ok(sub)
    }
}
