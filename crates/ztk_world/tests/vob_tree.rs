use ztk_io::Buffer;
use ztk_world::vob::{SpriteAlignment, VisualType};
use ztk_world::{read_vob_tree, GameVersion, VobData, VobType};

// row-major identity, hex encoded for a raw archive entry
const IDENTITY_3X3: &str = "0000803f0000000000000000000000000000803f0000000000000000000000000000803f";

fn vob_fields(name: &str, visual_class: &str) -> String {
    format!(
        "\tpack=int:0
\tpresetName=string:
\tbbox3DWS=rawFloat:0 0 0 100 100 100
\ttrafoOSToWSRot=raw:{IDENTITY_3X3}
\ttrafoOSToWSPos=vec3:10 20 30
\tvobName=string:{name}
\tvisual=string:BARREL.3DS
\tshowVisual=bool:1
\tvisualCamAlign=enum:1
\tvisualAniMode=enum:0
\tvisualAniModeStrength=float:0
\tvobFarClipZScale=float:1
\tcdStatic=bool:1
\tcdDyn=bool:0
\tstaticVob=bool:1
\tdynShadow=enum:0
\tzbias=int:0
\tisAmbient=bool:0
[% {visual_class} 0 9]
[]
[% % 0 0]
[]
"
    )
}

fn archive_of(body: &str) -> Box<dyn ztk_archive::ArchiveRead> {
    let text = format!(
        "ZenGin Archive\nver 1\nzCArchiverGeneric\nASCII\nsaveGame 0\nEND\nobjects 1\nEND\n\n{body}"
    );
    ztk_archive::open(Buffer::from_vec(text.into_bytes())).unwrap()
}

#[test]
fn plain_vob_with_child_parses() {
    let body = format!(
        "[% zCVob 52224 1]\n{}[]\nchilds=int:1\n[% zCVobSpot:zCVob 52224 3]\n{}[]\nchilds=int:0\nsentinel=int:77\n",
        vob_fields("PARENT", "zCProgMeshProto"),
        vob_fields("SPOT", "zCModel"),
    );

    let mut archive = archive_of(&body);
    let vob = read_vob_tree(archive.as_mut(), GameVersion::Gothic2)
        .unwrap()
        .unwrap();

    assert_eq!(vob.vob_type, VobType::Vob);
    assert_eq!(vob.id, 1);
    assert_eq!(vob.vob_name, "PARENT");
    assert_eq!(vob.visual_name, "BARREL.3DS");
    assert_eq!(vob.position, glam::Vec3::new(10.0, 20.0, 30.0));
    assert_eq!(vob.rotation, glam::Mat3::IDENTITY);
    assert_eq!(vob.bbox.max, glam::Vec3::splat(100.0));
    assert!(vob.show_visual);
    assert_eq!(vob.sprite_camera_facing_mode, SpriteAlignment::Yaw);
    assert!(vob.cd_static);
    assert!(vob.vob_static);
    assert_eq!(vob.associated_visual_type, VisualType::MultiResolutionMesh);
    assert!(matches!(vob.data, VobData::Plain));

    assert_eq!(vob.children.len(), 1);
    let child = &vob.children[0];
    assert_eq!(child.vob_type, VobType::VobSpot);
    assert_eq!(child.vob_name, "SPOT");
    assert_eq!(child.associated_visual_type, VisualType::Model);
    assert!(child.children.is_empty());

    // the cursor continues cleanly after the subtree
    assert_eq!(archive.read_int().unwrap(), 77);
}

#[test]
fn unknown_classes_are_skipped_with_their_children() {
    let body = format!(
        "[% oCNpc:zCVob 52224 5]\n\tnpcInstance=string:PC_HERO\n[]\nchilds=int:1\n[% zCVob 52224 6]\n{}[]\nchilds=int:0\nsentinel=int:88\n",
        vob_fields("ORPHAN", "zCMesh"),
    );

    let mut archive = archive_of(&body);
    let vob = read_vob_tree(archive.as_mut(), GameVersion::Gothic2).unwrap();

    assert!(vob.is_none());
    assert_eq!(archive.read_int().unwrap(), 88);
}

#[test]
fn interactive_mobs_read_their_chain() {
    let mob_fields = "\tfocusName=string:CHEST
\thitpoints=int:10
\tdamage=int:0
\tmoveable=bool:0
\ttakeable=bool:0
\tfocusOverride=bool:0
\tsoundMaterial=enum:0
\tvisualDestroyed=string:
\towner=string:
\townerGuild=string:
\tisDestroyed=bool:0
\tstateNum=int:0
\ttriggerTarget=string:
\tuseWithItem=string:
\tconditionFunc=string:
\tonStateFunc=string:
\trewind=bool:0
\tlocked=bool:1
\tkeyInstance=string:ITKE_LOCKPICK
\tpickLockStr=string:LRLR
\tcontains=string:ITMI_GOLD:50
";
    let body = format!(
        "[% oCMobContainer:oCMobInter:oCMOB:zCVob 35585 7]\n{}{}[]\nchilds=int:0\n",
        vob_fields("CHEST", "zCModel"),
        mob_fields,
    );

    let mut archive = archive_of(&body);
    let vob = read_vob_tree(archive.as_mut(), GameVersion::Gothic2)
        .unwrap()
        .unwrap();

    assert_eq!(vob.vob_type, VobType::MobContainer);
    let VobData::MobContainer(container) = &vob.data else {
        panic!("expected a container payload");
    };

    assert_eq!(container.inter.mob.name, "CHEST");
    assert_eq!(container.inter.mob.hp, 10);
    assert!(container.locked);
    assert_eq!(container.key, "ITKE_LOCKPICK");
    assert_eq!(container.contents, "ITMI_GOLD:50");
}
