use ztk_archive::ArchiveRead;
use ztk_primitives::Color;

use crate::vob::Vob;
use crate::world::GameVersion;
use crate::Result;

/// A music trigger region (`oCZoneMusic`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneMusic {
    pub enabled: bool,
    pub priority: i32,
    pub ellipsoid: bool,
    pub reverb: f32,
    pub volume: f32,
    pub loop_music: bool,
}

impl ZoneMusic {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<ZoneMusic> {
        vob.parse_base(archive, version)?;
        Ok(ZoneMusic {
            enabled: archive.read_bool()?,   // enabled
            priority: archive.read_int()?,   // priority
            ellipsoid: archive.read_bool()?, // ellipsoid
            reverb: archive.read_float()?,   // reverbLevel
            volume: archive.read_float()?,   // volumeLevel
            loop_music: archive.read_bool()?, // loop
        })
    }
}

/// A region overriding the far clipping plane.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneFarPlane {
    pub vob_far_plane_z: f32,
    pub inner_range_percentage: f32,
}

impl ZoneFarPlane {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<ZoneFarPlane> {
        vob.parse_base(archive, version)?;
        Ok(ZoneFarPlane {
            vob_far_plane_z: archive.read_float()?,        // vobFarPlaneZ
            inner_range_percentage: archive.read_float()?, // innerRangePerc
        })
    }
}

/// A fog region (`zCZoneZFog`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneFog {
    pub range_center: f32,
    pub inner_range_percentage: f32,
    pub color: Color,
    pub fade_out_sky: bool,
    pub override_color: bool,
}

impl ZoneFog {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<ZoneFog> {
        vob.parse_base(archive, version)?;
        let mut fog = ZoneFog {
            range_center: archive.read_float()?,           // fogRangeCenter
            inner_range_percentage: archive.read_float()?, // innerRangePerc
            color: archive.read_color()?,                  // fogColor
            ..ZoneFog::default()
        };

        if version == GameVersion::Gothic2 {
            fog.fade_out_sky = archive.read_bool()?;   // fadeOutSky
            fog.override_color = archive.read_bool()?; // overrideColor
        }

        Ok(fog)
    }
}
