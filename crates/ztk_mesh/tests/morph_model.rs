use ztk_io::{Buffer, WriteExt};
use ztk_mesh::{Model, MorphMesh};

const MATERIAL_ARCHIVE: &str = "\
ZenGin Archive
ver 1
zCArchiverGeneric
ASCII
saveGame 0
END
objects 1
END

\tslot=string:DEFAULT
[% zCMaterial 17408 0]
\tname=string:FACE
\tmatGroup=int:0
\tcolor=color:200 200 200 255
\tsmoothAngle=float:60
\ttexture=string:FACE.TGA
\ttexScale=string:1 1
\ttexAniFPS=float:0
\ttexAniMapMode=int:0
\ttexAniMapDir=string:0 0
\tnoCollDet=bool:0
\tnoLightmap=bool:0
\tlodDontCollapse=bool:0
\tdetailObject=string:
\tdefaultMapping=rawFloat:1 1
[]
";

fn chunk(out: &mut Vec<u8>, kind: u16, body: &[u8]) {
    out.put_u16(kind).unwrap();
    out.put_u32(body.len() as u32).unwrap();
    out.extend_from_slice(body);
}

/// Minimal proto-mesh payload with one position, one normal and a
/// single-triangle sub-mesh.
fn proto_section() -> Vec<u8> {
    let mut content = Vec::new();
    content.put_vec3(glam::Vec3::X).unwrap(); // position @ 0
    content.put_vec3(glam::Vec3::Y).unwrap(); // normal @ 12
    for index in [0u16, 0, 0] {
        content.put_u16(index).unwrap(); // triangle @ 24
    }

    let mut body = Vec::new();
    body.put_u16(0x905).unwrap();
    body.put_u32(content.len() as u32).unwrap();
    body.extend_from_slice(&content);

    body.put_u8(1).unwrap();
    body.put_u32(0).unwrap(); // positions offset
    body.put_u32(1).unwrap();
    body.put_u32(12).unwrap(); // normals offset
    body.put_u32(1).unwrap();

    let sections: [(u32, u32); 10] = [
        (24, 1),
        (0, 0),
        (0, 0),
        (0, 0),
        (0, 0),
        (0, 0),
        (0, 0),
        (0, 0),
        (0, 0),
        (0, 0),
    ];
    for (offset, size) in sections {
        body.put_u32(offset).unwrap();
        body.put_u32(size).unwrap();
    }

    body.put_string(MATERIAL_ARCHIVE).unwrap();
    body.put_u8(0).unwrap(); // alpha test

    body.put_vec3(glam::Vec3::splat(-1.0)).unwrap();
    body.put_vec3(glam::Vec3::splat(1.0)).unwrap();

    for _ in 0..15 {
        body.put_f32(0.0).unwrap();
    }
    body.put_u16(0).unwrap();
    body.extend_from_slice(&[0u8; 0x10]);

    body
}

#[test]
fn morph_meshes_carry_deltas_and_animations() {
    let mut raw = Vec::new();

    let mut header = Vec::new();
    header.put_u32(1).unwrap();
    header.put_string("HUM_HEAD.MMS\n").unwrap();
    chunk(&mut raw, 0xE020, &header);

    let mut sources = Vec::new();
    sources.put_u16(1).unwrap();
    sources.put_u32(2001).unwrap(); // file date
    for v in [5u16, 12, 9, 30, 0, 0] {
        sources.put_u16(v).unwrap();
    }
    sources.put_string("HUM_HEAD.ASC\n").unwrap();
    chunk(&mut raw, 0xE010, &sources);

    chunk(&mut raw, 0xB100, &proto_section());

    // one delta per base position
    let mut morph = Vec::new();
    morph.put_vec3(glam::Vec3::new(0.0, 0.5, 0.0)).unwrap();
    chunk(&mut raw, 0xB1FF, &morph);

    let mut animations = Vec::new();
    animations.put_u16(1).unwrap();
    animations.put_string("VISEME_A\n").unwrap();
    animations.put_f32(0.1).unwrap(); // blend in
    animations.put_f32(0.2).unwrap(); // blend out
    animations.put_f32(1.5).unwrap(); // duration
    animations.put_i32(0).unwrap(); // layer
    animations.put_f32(1.0).unwrap(); // speed
    animations.put_u8(0).unwrap(); // flags
    animations.put_u32(1).unwrap(); // vertex count
    animations.put_u32(2).unwrap(); // frame count
    animations.put_u32(0).unwrap(); // vertex index
    animations.put_vec3(glam::Vec3::ZERO).unwrap();
    animations.put_vec3(glam::Vec3::Y).unwrap();
    chunk(&mut raw, 0xE030, &animations);

    let mesh = MorphMesh::parse(&mut Buffer::from_vec(raw)).unwrap();

    assert_eq!(mesh.name, "HUM_HEAD.MMS");
    assert_eq!(mesh.sources.len(), 1);
    assert_eq!(mesh.sources[0].file_name, "HUM_HEAD.ASC");
    assert_eq!(mesh.mesh.positions.len(), 1);
    assert_eq!(mesh.morph_positions, vec![glam::Vec3::new(0.0, 0.5, 0.0)]);

    assert_eq!(mesh.animations.len(), 1);
    let anim = &mesh.animations[0];
    assert_eq!(anim.name, "VISEME_A");
    assert_eq!(anim.frame_count, 2);
    assert_eq!(anim.vertices, vec![0]);
    assert_eq!(anim.samples, vec![glam::Vec3::ZERO, glam::Vec3::Y]);
}

#[test]
fn combined_models_chain_hierarchy_and_mesh() {
    let mut raw = Vec::new();

    // hierarchy: one root node, then the container end
    let mut hierarchy = Vec::new();
    hierarchy.put_u32(3).unwrap();
    hierarchy.put_u16(1).unwrap();
    hierarchy.put_string("BIP01\n").unwrap();
    hierarchy.put_i16(-1).unwrap();
    for i in 0..16 {
        hierarchy.put_f32(if i % 5 == 0 { 1.0 } else { 0.0 }).unwrap();
    }
    for _ in 0..12 {
        hierarchy.put_f32(0.0).unwrap();
    }
    hierarchy.put_vec3(glam::Vec3::ZERO).unwrap();
    hierarchy.put_u32(0xFEED).unwrap(); // checksum
    chunk(&mut raw, 0xD100, &hierarchy);
    chunk(&mut raw, 0xD120, &[]);

    // model mesh: header, one attachment, no softskins
    let mut header = Vec::new();
    header.put_u32(4).unwrap();
    chunk(&mut raw, 0xD000, &header);

    let mut names = Vec::new();
    names.put_u16(1).unwrap();
    names.put_string("BIP01\n").unwrap();
    chunk(&mut raw, 0xD020, &names);

    chunk(&mut raw, 0xB100, &proto_section());

    let mut softskins = Vec::new();
    softskins.put_u32(0xFEED).unwrap();
    softskins.put_u16(0).unwrap();
    chunk(&mut raw, 0xD030, &softskins);
    chunk(&mut raw, 0xD040, &[]);

    let model = Model::parse(&mut Buffer::from_vec(raw)).unwrap();

    assert_eq!(model.hierarchy.nodes.len(), 1);
    assert_eq!(model.hierarchy.nodes[0].name, "BIP01");

    // hierarchy and mesh bind by checksum identity
    assert_eq!(model.hierarchy.checksum, model.mesh.checksum);
    assert!(model.mesh.attachments.contains_key("BIP01"));
    assert!(model.mesh.meshes.is_empty());
}
