use ztk_io::Buffer;
use ztk_mesh::Mesh;

use crate::bsp::{BspTree, BSP_VERSION_G2};
use crate::vob::{read_vob_tree, Vob};
use crate::way_net::WayNet;
use crate::{Result, WorldError};

/// The two serialization generations of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameVersion {
    Gothic1,
    Gothic2,
}

/// A fully loaded game world.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub mesh: Mesh,
    pub bsp_tree: BspTree,
    pub vobs: Vec<Vob>,
    pub way_net: WayNet,
}

/// Determines the serialization version of a world archive.
///
/// Only the `MeshAndBsp` block identifies the version reliably, so any
/// block stored before it has to be skipped first. This can be slow.
pub fn determine_world_version(buf: Buffer) -> Result<GameVersion> {
    let mut archive = ztk_archive::open(buf)?;

    if archive.header().save {
        return Err(WorldError::Malformed(
            "cannot determine the world version of save-games".into(),
        ));
    }

    if archive.read_object_begin()?.is_none() {
        return Err(WorldError::Malformed("world root object missing".into()));
    }

    while !archive.read_object_end()? {
        let object = archive.read_object_begin()?;

        if object.is_some_and(|o| o.object_name == "MeshAndBsp") {
            let bsp_version = archive.buffer().get_u32()?;
            return Ok(if bsp_version == BSP_VERSION_G2 {
                GameVersion::Gothic2
            } else {
                GameVersion::Gothic1
            });
        }

        archive.skip_object(true)?;
    }

    log::error!("world: failed to determine world version, assuming Gothic 1");
    Ok(GameVersion::Gothic1)
}

impl World {
    /// Parses a world, auto-detecting the game version first.
    pub fn parse(buf: &mut Buffer) -> Result<World> {
        let version = determine_world_version(buf.clone())?;
        Self::parse_versioned(buf, version)
    }

    pub fn parse_versioned(buf: &mut Buffer, version: GameVersion) -> Result<World> {
        let mut world = World::default();
        let mut archive = ztk_archive::open(buf.clone())?;

        let Some(root) = archive.read_object_begin()? else {
            return Err(WorldError::Malformed("world root object missing".into()));
        };

        if root.class_name != "oCWorld:zCWorld" {
            return Err(WorldError::UnexpectedClass {
                expected: "oCWorld:zCWorld".into(),
                found: root.class_name,
            });
        }

        while !archive.read_object_end()? {
            let Some(object) = archive.read_object_begin()? else {
                return Err(WorldError::Malformed(
                    "expected a world block object".into(),
                ));
            };

            log::debug!(
                "world: parsing object [{} {} {} {}]",
                object.object_name,
                object.class_name,
                object.version,
                object.index
            );

            match object.object_name.as_str() {
                "MeshAndBsp" => {
                    let bsp_version = archive.buffer().get_u32()?;
                    let _size = archive.buffer().get_u32()?;

                    let mut mesh_data = archive.buffer().slice();

                    // the BSP tree sits after the mesh chunks; fast-forward
                    // to it, then revisit the mesh with the leaf set known
                    loop {
                        let chunk_type = archive.buffer().get_u16()?;
                        let chunk_size = archive.buffer().get_u32()? as usize;
                        archive.buffer().skip(chunk_size)?;

                        if chunk_type == 0xB060 {
                            break;
                        }
                    }

                    world.bsp_tree = BspTree::parse(archive.buffer(), bsp_version)?;
                    world.mesh = Mesh::parse(&mut mesh_data, &world.bsp_tree.leaf_polygons)?;
                }
                "VobTree" => {
                    let count = archive.read_int()?;
                    world.vobs.reserve(count.max(0) as usize);

                    for _ in 0..count {
                        if let Some(vob) = read_vob_tree(archive.as_mut(), version)? {
                            world.vobs.push(vob);
                        }
                    }
                }
                "WayNet" => {
                    world.way_net = WayNet::parse(archive.as_mut())?;
                }
                "CutscenePlayer" => {
                    // save-game only
                    if archive.read_object_begin()?.is_none() {
                        log::warn!("world: unable to parse CutscenePlayer block");
                        archive.skip_object(true)?;
                        continue;
                    }

                    let _last_process_day = archive.read_int()?;
                    let _last_process_hour = archive.read_int()?;
                    let _play_list_count = archive.read_int()?;

                    archive.read_object_end()?;
                }
                "SkyCtrl" => {
                    // save-game only
                    if archive.read_object_begin()?.is_none() {
                        log::warn!("world: unable to parse SkyCtrl block");
                        archive.skip_object(true)?;
                        continue;
                    }

                    let _master_time = archive.read_float()?;
                    let _rain_weight = archive.read_float()?;
                    let _rain_start = archive.read_float()?;
                    let _rain_stop = archive.read_float()?;
                    let _rain_sct_timer = archive.read_float()?;
                    let _rain_snd_vol = archive.read_float()?;
                    let _day_ctr = archive.read_float()?;

                    if version == GameVersion::Gothic2 {
                        let _fade_scale = archive.read_float()?;
                        let _render_lightning = archive.read_bool()?;
                        let _is_raining = archive.read_bool()?;
                        let _rain_ctr = archive.read_int()?;
                    }

                    archive.read_object_end()?;
                }
                "EndMarker" if archive.header().save => {
                    // a list of NPCs and their spawn locations follows the
                    // end marker in save-games
                    archive.read_object_end()?;

                    let npc_count = archive.read_int()?;
                    for _ in 0..npc_count {
                        archive.skip_object(false)?;
                    }

                    let spawn_count = archive.read_int()?;
                    for _ in 0..spawn_count {
                        archive.skip_object(false)?; // npc reference
                        let _spawn_pos = archive.read_vec3()?;
                        let _timer = archive.read_float()?;
                    }

                    let _spawning_enabled = archive.read_bool()?;

                    if version == GameVersion::Gothic2 {
                        let _spawn_flags = archive.read_int()?;
                    }

                    if !archive.read_object_end()? {
                        log::warn!("world: npc list not fully parsed");
                        archive.skip_object(true)?;
                    }

                    break;
                }
                _ => {}
            }

            if !archive.read_object_end()? {
                log::warn!(
                    "world: object [{} {} {} {}] not fully parsed",
                    object.object_name,
                    object.class_name,
                    object.version,
                    object.index
                );
                archive.skip_object(true)?;
            }
        }

        Ok(world)
    }
}
