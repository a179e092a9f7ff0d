use ztk_io::{Buffer, WriteExt};
use ztk_mesh::Mesh;

fn chunk(out: &mut Vec<u8>, kind: u16, body: &[u8]) {
    out.put_u16(kind).unwrap();
    out.put_u32(body.len() as u32).unwrap();
    out.extend_from_slice(body);
}

fn mesh_header(version: u16) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u16(version).unwrap();
    // file date: u32 year + five u16 fields + padding
    body.put_u32(2002).unwrap();
    for v in [12u16, 27, 17, 13, 34, 0] {
        body.put_u16(v).unwrap();
    }
    body.put_string("WORLD.3DS\n").unwrap();
    body
}

fn vertices(count: u32) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u32(count).unwrap();
    for i in 0..count {
        body.put_vec3(glam::Vec3::new(i as f32, 0.0, 0.0)).unwrap();
    }
    body
}

fn features(count: u32) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u32(count).unwrap();
    for _ in 0..count {
        body.put_vec2(glam::Vec2::ZERO).unwrap();
        body.put_u32(0xFFFFFF).unwrap();
        body.put_vec3(glam::Vec3::Y).unwrap();
    }
    body
}

struct PolygonSpec {
    material: i16,
    flags: u8,
    vertices: Vec<(u32, u32)>,
}

fn polygons_g2(specs: &[PolygonSpec]) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u32(specs.len() as u32).unwrap();

    for spec in specs {
        body.put_i16(spec.material).unwrap();
        body.put_i16(-1).unwrap(); // lightmap
        body.put_f32(0.0).unwrap(); // plane distance
        body.put_vec3(glam::Vec3::Y).unwrap(); // plane normal
        body.put_u8(spec.flags).unwrap();
        body.put_u16(0).unwrap(); // sector
        body.put_u8(spec.vertices.len() as u8).unwrap();
        for &(vertex, feature) in &spec.vertices {
            body.put_u32(vertex).unwrap();
            body.put_u32(feature).unwrap();
        }
    }

    body
}

fn polygons_g1(specs: &[PolygonSpec]) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u32(specs.len() as u32).unwrap();

    for spec in specs {
        body.put_i16(spec.material).unwrap();
        body.put_i16(-1).unwrap();
        body.put_f32(0.0).unwrap();
        body.put_vec3(glam::Vec3::Y).unwrap();
        body.put_u8(spec.flags).unwrap();
        body.put_u8(0).unwrap(); // second flag byte
        body.put_u16(0).unwrap();
        body.put_u8(spec.vertices.len() as u8).unwrap();
        for &(vertex, feature) in &spec.vertices {
            body.put_u16(vertex as u16).unwrap();
            body.put_u32(feature).unwrap();
        }
    }

    body
}

#[test]
fn g2_polygons_triangulate_as_fans() {
    let specs = [
        PolygonSpec {
            material: 0,
            flags: 0,
            vertices: vec![(0, 0), (1, 1), (2, 2)],
        },
        // a quad fans into two triangles
        PolygonSpec {
            material: 1,
            flags: 0,
            vertices: vec![(0, 0), (1, 1), (2, 2), (3, 3)],
        },
        // portals carry no geometry
        PolygonSpec {
            material: 2,
            flags: 0b01,
            vertices: vec![(0, 0), (1, 1), (2, 2)],
        },
        // degenerate polygons are dropped
        PolygonSpec {
            material: 3,
            flags: 0,
            vertices: vec![(0, 0), (1, 1)],
        },
    ];

    let mut raw = Vec::new();
    chunk(&mut raw, 0xB000, &mesh_header(265));
    chunk(&mut raw, 0xB030, &vertices(4));
    chunk(&mut raw, 0xB040, &features(4));
    chunk(&mut raw, 0xB050, &polygons_g2(&specs));
    chunk(&mut raw, 0xB060, &[]);

    let mesh = Mesh::parse(&mut Buffer::from_vec(raw), &[]).unwrap();
    assert_eq!(mesh.name, "WORLD.3DS");
    assert_eq!(mesh.vertices.len(), 4);

    // 1 triangle + 2 fan triangles
    assert_eq!(mesh.polygons.material_indices, vec![0, 1, 1]);
    assert_eq!(
        mesh.polygons.vertex_indices,
        vec![0, 1, 2, 0, 1, 2, 0, 2, 3]
    );
    assert_eq!(
        mesh.polygons.feature_indices,
        vec![0, 1, 2, 0, 1, 2, 0, 2, 3]
    );

    // every emitted index addresses a real vertex and feature
    for &v in &mesh.polygons.vertex_indices {
        assert!((v as usize) < mesh.vertices.len());
    }
    for &f in &mesh.polygons.feature_indices {
        assert!((f as usize) < mesh.features.len());
    }
}

#[test]
fn g1_meshes_use_narrow_indices_and_leaf_sets() {
    let specs = [
        PolygonSpec {
            material: 0,
            flags: 0,
            vertices: vec![(0, 0), (1, 1), (2, 2)],
        },
        PolygonSpec {
            material: 1,
            flags: 0,
            vertices: vec![(1, 1), (2, 2), (3, 3)],
        },
    ];

    let mut raw = Vec::new();
    chunk(&mut raw, 0xB000, &mesh_header(9));
    chunk(&mut raw, 0xB030, &vertices(4));
    chunk(&mut raw, 0xB040, &features(4));
    chunk(&mut raw, 0xB050, &polygons_g1(&specs));
    chunk(&mut raw, 0xB060, &[]);

    // without a leaf set both polygons survive
    let mesh = Mesh::parse(&mut Buffer::from_vec(raw.clone()), &[]).unwrap();
    assert_eq!(mesh.polygons.material_indices, vec![0, 1]);

    // with a leaf set, polygon 0 is not a leaf and is dropped
    let mesh = Mesh::parse(&mut Buffer::from_vec(raw), &[1]).unwrap();
    assert_eq!(mesh.polygons.material_indices, vec![1]);
    assert_eq!(mesh.polygons.vertex_indices, vec![1, 2, 3]);
}
