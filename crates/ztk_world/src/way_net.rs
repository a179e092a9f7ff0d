use std::collections::HashMap;

use glam::Vec3;

use ztk_archive::{ArchiveRead, REFERENCE_CLASS};

use crate::{Result, WorldError};

/// A navigation node. Free points are standalone; the remainder appear
/// inline inside the edge list.
#[derive(Debug, Clone, Default)]
pub struct WayPoint {
    pub name: String,
    pub water_depth: i32,
    pub under_water: bool,
    pub position: Vec3,
    pub direction: Vec3,
    pub free_point: bool,
}

/// A connection between two waypoints, by index into the net.
#[derive(Debug, Clone, Copy, Default)]
pub struct WayEdge {
    pub a: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Default)]
pub struct WayNet {
    waypoints: Vec<WayPoint>,
    edges: Vec<WayEdge>,
    name_index: HashMap<String, usize>,
}

fn read_waypoint(archive: &mut dyn ArchiveRead, free_point: bool) -> Result<WayPoint> {
    Ok(WayPoint {
        name: archive.read_string()?,       // wpName
        water_depth: archive.read_int()?,   // waterDepth
        under_water: archive.read_bool()?,  // underWater
        position: archive.read_vec3()?,     // position
        direction: archive.read_vec3()?,    // direction
        free_point,
    })
}

impl WayNet {
    pub fn parse(archive: &mut dyn ArchiveRead) -> Result<WayNet> {
        let mut net = WayNet::default();

        if archive.read_object_begin()?.is_none() {
            return Err(WorldError::Malformed("way net root object missing".into()));
        }

        let _version = archive.read_int()?; // waynetVersion
        let count = archive.read_int()?; // numWaypoints
        net.waypoints.reserve(count.max(0) as usize);

        let mut index_by_object: HashMap<u32, u32> = HashMap::new();

        for i in 0..count {
            let object = archive.read_object_begin()?.filter(|o| o.class_name == "zCWaypoint");
            let Some(object) = object else {
                return Err(WorldError::Malformed(format!("missing waypoint object #{i}")));
            };

            let waypoint = read_waypoint(archive, true)?;
            net.name_index
                .insert(waypoint.name.clone(), net.waypoints.len());
            index_by_object.insert(object.index, net.waypoints.len() as u32);
            net.waypoints.push(waypoint);

            if !archive.read_object_end()? {
                log::warn!("way net: free point #{i} not fully parsed");
                archive.skip_object(true)?;
            }
        }

        let edge_count = archive.read_int()?; // numWays

        for i in 0..edge_count {
            let mut edge = WayEdge::default();

            for j in 0..2 {
                let Some(object) = archive.read_object_begin()? else {
                    return Err(WorldError::Malformed(format!("missing edge object #{i}")));
                };

                let waypoint = if object.class_name == REFERENCE_CLASS {
                    index_by_object.get(&object.index).copied().unwrap_or(0)
                } else if object.class_name == "zCWaypoint" {
                    let waypoint = read_waypoint(archive, false)?;
                    let index = net.waypoints.len() as u32;
                    net.name_index.insert(waypoint.name.clone(), index as usize);
                    index_by_object.insert(object.index, index);
                    net.waypoints.push(waypoint);
                    index
                } else {
                    return Err(WorldError::Malformed(format!(
                        "failed to parse edge #{i}: unknown class name {:?}",
                        object.class_name
                    )));
                };

                if j == 0 {
                    edge.a = waypoint;
                } else {
                    edge.b = waypoint;
                }

                if !archive.read_object_end()? {
                    log::warn!("way net: edge #{} not fully parsed", i * 2 + j);
                    archive.skip_object(true)?;
                }
            }

            net.edges.push(edge);
        }

        if !archive.read_object_end()? {
            log::warn!("way net: not fully parsed");
            archive.skip_object(true)?;
        }

        Ok(net)
    }

    pub fn waypoints(&self) -> &[WayPoint] {
        &self.waypoints
    }

    pub fn edges(&self) -> &[WayEdge] {
        &self.edges
    }

    /// Exact-name waypoint lookup.
    pub fn waypoint(&self, name: &str) -> Option<&WayPoint> {
        self.name_index.get(name).map(|&i| &self.waypoints[i])
    }
}
