use num_enum::TryFromPrimitive;

use ztk_archive::ArchiveRead;

use crate::vob::{decode_enum, Vob};
use crate::world::GameVersion;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum SoundMode {
    Loop = 0,
    Once = 1,
    Random = 2,
}

impl Default for SoundMode {
    fn default() -> Self {
        Self::Loop
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum SoundTriggerVolume {
    Spherical = 0,
    Ellipsoidal = 1,
}

impl Default for SoundTriggerVolume {
    fn default() -> Self {
        Self::Spherical
    }
}

/// A positional sound emitter (`zCVobSound`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sound {
    pub volume: f32,
    pub mode: SoundMode,
    pub random_delay: f32,
    pub random_delay_var: f32,
    pub initially_playing: bool,
    pub ambient3d: bool,
    pub obstruction: bool,
    pub cone_angle: f32,
    pub volume_type: SoundTriggerVolume,
    pub radius: f32,
    pub sound_name: String,
}

impl Sound {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<Sound> {
        vob.parse_base(archive, version)?;
        Ok(Sound {
            volume: archive.read_float()?,           // sndVolume
            mode: decode_enum("sound mode", archive.read_enum()?)?, // sndMode
            random_delay: archive.read_float()?,     // sndRandDelay
            random_delay_var: archive.read_float()?, // sndRandDelayVar
            initially_playing: archive.read_bool()?, // sndStartOn
            ambient3d: archive.read_bool()?,         // sndAmbient3D
            obstruction: archive.read_bool()?,       // sndObstruction
            cone_angle: archive.read_float()?,       // sndConeAngle
            volume_type: decode_enum("sound volume type", archive.read_enum()?)?, // sndVolType
            radius: archive.read_float()?,           // sndRadius
            sound_name: archive.read_string()?,      // sndName
        })
    }
}

/// A sound emitter switching sources by time of day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoundDaytime {
    pub sound: Sound,
    pub start_time: f32,
    pub end_time: f32,
    pub sound_name2: String,
}

impl SoundDaytime {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<SoundDaytime> {
        Ok(SoundDaytime {
            sound: Sound::parse(vob, archive, version)?,
            start_time: archive.read_float()?,   // sndStartTime
            end_time: archive.read_float()?,     // sndEndTime
            sound_name2: archive.read_string()?, // sndName2
        })
    }
}
