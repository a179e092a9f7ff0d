use ztk_io::Buffer;
use ztk_world::{determine_world_version, GameVersion, VobType, World};

const IDENTITY_3X3: &str = "0000803f0000000000000000000000000000803f0000000000000000000000000000803f";

fn vob_subtree(name: &str) -> String {
    format!(
        "[% zCVob 52224 11]
\tpack=int:0
\tpresetName=string:
\tbbox3DWS=rawFloat:0 0 0 50 50 50
\ttrafoOSToWSRot=raw:{IDENTITY_3X3}
\ttrafoOSToWSPos=vec3:0 0 0
\tvobName=string:{name}
\tvisual=string:
\tshowVisual=bool:0
\tvisualCamAlign=enum:0
\tvisualAniMode=enum:0
\tvisualAniModeStrength=float:0
\tvobFarClipZScale=float:1
\tcdStatic=bool:0
\tcdDyn=bool:0
\tstaticVob=bool:0
\tdynShadow=enum:0
\tzbias=int:0
\tisAmbient=bool:0
[% zCMesh 0 12]
[]
[% % 0 0]
[]
[]
\tchilds=int:0
"
    )
}

fn ascii_archive(body: &[u8]) -> Buffer {
    let mut raw = Vec::new();
    raw.extend_from_slice(
        b"ZenGin Archive\nver 1\nzCArchiverGeneric\nASCII\nsaveGame 0\nEND\nobjects 1\nEND\n\n",
    );
    raw.extend_from_slice(body);
    Buffer::from_vec(raw)
}

#[test]
fn world_blocks_are_dispatched_by_name() {
    let mut body = Vec::new();
    body.extend_from_slice(b"[% oCWorld:zCWorld 64513 0]\n");

    body.extend_from_slice(b"[VobTree % 0 0]\n\tchilds=int:1\n");
    body.extend_from_slice(vob_subtree("GLUEVOB").as_bytes());
    body.extend_from_slice(b"[]\n");

    body.extend_from_slice(b"[WayNet % 0 0]\n");
    body.extend_from_slice(b"[% zCWayNet 1 0]\n");
    body.extend_from_slice(b"\twaynetVersion=int:1\n\tnumWaypoints=int:1\n");
    body.extend_from_slice(
        b"[% zCWaypoint 0 21]
\twpName=string:START
\twaterDepth=int:0
\tunderWater=bool:0
\tposition=vec3:1 2 3
\tdirection=vec3:0 0 1
[]
",
    );
    body.extend_from_slice(b"\tnumWays=int:1\n");
    // the first edge end is stored inline, the second as a reference to
    // waypoint object 21
    body.extend_from_slice(
        b"[% zCWaypoint 0 22]
\twpName=string:TARGET
\twaterDepth=int:0
\tunderWater=bool:0
\tposition=vec3:4 5 6
\tdirection=vec3:0 0 1
[]
",
    );
    body.extend_from_slice(b"[% \xA7 0 21]\n[]\n");
    body.extend_from_slice(b"[]\n"); // zCWayNet end
    body.extend_from_slice(b"[]\n"); // WayNet block end

    body.extend_from_slice(b"[EndMarker % 0 0]\n[]\n");
    body.extend_from_slice(b"[]\n"); // world end

    let mut buf = ascii_archive(&body);
    let world = World::parse_versioned(&mut buf, GameVersion::Gothic2).unwrap();

    assert_eq!(world.vobs.len(), 1);
    assert_eq!(world.vobs[0].vob_type, VobType::Vob);
    assert_eq!(world.vobs[0].vob_name, "GLUEVOB");

    let net = &world.way_net;
    assert_eq!(net.waypoints().len(), 2);
    assert!(net.waypoints()[0].free_point);
    assert!(!net.waypoints()[1].free_point);
    assert_eq!(net.edges().len(), 1);
    assert_eq!(net.edges()[0].a, 1); // the inline waypoint
    assert_eq!(net.edges()[0].b, 0); // the reference back to START

    let start = net.waypoint("START").unwrap();
    assert_eq!(start.position, glam::Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn version_detection_reads_the_bsp_version() {
    for (bsp_version, expected) in [
        (0x4090000u32, GameVersion::Gothic2),
        (0x2090000, GameVersion::Gothic1),
    ] {
        let mut body = Vec::new();
        body.extend_from_slice(b"[% oCWorld:zCWorld 64513 0]\n");
        body.extend_from_slice(b"[MeshAndBsp % 0 0]\n");
        body.extend_from_slice(&bsp_version.to_le_bytes());

        let buf = ascii_archive(&body);
        assert_eq!(determine_world_version(buf).unwrap(), expected);
    }
}
