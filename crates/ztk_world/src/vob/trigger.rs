use glam::{Quat, Vec3};
use num_enum::TryFromPrimitive;

use ztk_archive::ArchiveRead;

use crate::vob::{decode_enum, Vob};
use crate::world::GameVersion;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum MoverBehavior {
    Toggle = 0,
    TriggerControl = 1,
    OpenTime = 2,
    Loop = 3,
    SingleKeys = 4,
}

impl Default for MoverBehavior {
    fn default() -> Self {
        Self::Toggle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum MoverLerpMode {
    Curve = 0,
    Linear = 1,
}

impl Default for MoverLerpMode {
    fn default() -> Self {
        Self::Curve
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum MoverSpeedMode {
    Constant = 0,
    SlowStartEnd = 1,
    SlowStart = 2,
    SlowEnd = 3,
}

impl Default for MoverSpeedMode {
    fn default() -> Self {
        Self::Constant
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum TriggerBatchMode {
    All = 0,
    Next = 1,
    Random = 2,
}

impl Default for TriggerBatchMode {
    fn default() -> Self {
        Self::All
    }
}

/// A generic trigger (`zCTrigger`), base of the whole trigger family.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trigger {
    pub target: String,
    pub flags: u8,
    pub filter_flags: u8,
    pub vob_target: String,
    pub max_activation_count: i32,
    pub retrigger_delay_sec: f32,
    pub damage_threshold: f32,
    pub fire_delay_sec: f32,
}

impl Trigger {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<Trigger> {
        vob.parse_base(archive, version)?;
        Ok(Trigger {
            target: archive.read_string()?,                 // triggerTarget
            flags: archive.read_raw_bytes(1)?.get_u8()?,    // flags
            filter_flags: archive.read_raw_bytes(1)?.get_u8()?, // filterFlags
            vob_target: archive.read_string()?,             // respondToVobName
            max_activation_count: archive.read_int()?,      // numCanBeActivated
            retrigger_delay_sec: archive.read_float()?,     // retriggerWaitSec
            damage_threshold: archive.read_float()?,        // damageThreshold
            fire_delay_sec: archive.read_float()?,          // fireDelaySec
        })
    }
}

/// One keyframe of a mover's path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoverKeyframe {
    pub position: Vec3,
    pub rotation: Quat,
}

/// A physically moving trigger (`zCMover`): doors, platforms, bridges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerMover {
    pub trigger: Trigger,
    pub behavior: MoverBehavior,
    pub touch_blocker_damage: f32,
    pub stay_open_time_sec: f32,
    pub locked: bool,
    pub auto_link: bool,
    pub auto_rotate: bool,
    pub speed: f32,
    pub lerp_mode: MoverLerpMode,
    pub speed_mode: MoverSpeedMode,
    pub keyframes: Vec<MoverKeyframe>,
    pub sfx_open_start: String,
    pub sfx_open_end: String,
    pub sfx_transitioning: String,
    pub sfx_close_start: String,
    pub sfx_close_end: String,
    pub sfx_lock: String,
    pub sfx_unlock: String,
    pub sfx_use_locked: String,
}

impl TriggerMover {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<TriggerMover> {
        let mut mover = TriggerMover {
            trigger: Trigger::parse(vob, archive, version)?,
            behavior: decode_enum("mover behavior", archive.read_enum()?)?, // moverBehavior
            touch_blocker_damage: archive.read_float()?, // touchBlockerDamage
            stay_open_time_sec: archive.read_float()?,   // stayOpenTimeSec
            locked: archive.read_bool()?,                // moverLocked
            auto_link: archive.read_bool()?,             // autoLinkEnabled
            ..TriggerMover::default()
        };

        if version == GameVersion::Gothic2 {
            mover.auto_rotate = archive.read_bool()?; // autoRotate
        }

        let keyframe_count = archive.read_word()?; // numKeyframes
        if keyframe_count > 0 {
            mover.speed = archive.read_float()?; // moveSpeed
            mover.lerp_mode = decode_enum("mover lerp mode", archive.read_enum()?)?; // posLerpType
            mover.speed_mode = decode_enum("mover speed mode", archive.read_enum()?)?; // speedType

            let mut samples = archive.read_raw_bytes(keyframe_count as usize * 7 * 4)?; // keyframes
            for _ in 0..keyframe_count {
                let position = samples.get_vec3()?;
                let rotation = samples.get_vec4()?;
                mover.keyframes.push(MoverKeyframe {
                    position,
                    rotation: Quat::from_vec4(rotation),
                });
            }
        }

        mover.sfx_open_start = archive.read_string()?; // sfxOpenStart
        mover.sfx_open_end = archive.read_string()?; // sfxOpenEnd
        mover.sfx_transitioning = archive.read_string()?; // sfxMoving
        mover.sfx_close_start = archive.read_string()?; // sfxCloseStart
        mover.sfx_close_end = archive.read_string()?; // sfxCloseEnd
        mover.sfx_lock = archive.read_string()?; // sfxLock
        mover.sfx_unlock = archive.read_string()?; // sfxUnlock
        mover.sfx_use_locked = archive.read_string()?; // sfxUseLocked

        Ok(mover)
    }
}

/// Fires a list of targets in one of three orders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerList {
    pub trigger: Trigger,
    pub mode: TriggerBatchMode,
    pub targets: Vec<(String, f32)>,
}

impl TriggerList {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<TriggerList> {
        let mut list = TriggerList {
            trigger: Trigger::parse(vob, archive, version)?,
            mode: decode_enum("trigger batch mode", archive.read_enum()?)?, // listProcess
            targets: Vec::new(),
        };

        let count = archive.read_byte()?; // numTarget
        for _ in 0..count {
            list.targets.push((
                archive.read_string()?, // triggerTarget
                archive.read_float()?,  // fireDelay
            ));
        }

        Ok(list)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerScript {
    pub trigger: Trigger,
    pub function: String,
}

impl TriggerScript {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<TriggerScript> {
        Ok(TriggerScript {
            trigger: Trigger::parse(vob, archive, version)?,
            function: archive.read_string()?, // scriptFunc
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerChangeLevel {
    pub trigger: Trigger,
    pub level_name: String,
    pub start_vob: String,
}

impl TriggerChangeLevel {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<TriggerChangeLevel> {
        Ok(TriggerChangeLevel {
            trigger: Trigger::parse(vob, archive, version)?,
            level_name: archive.read_string()?, // levelName
            start_vob: archive.read_string()?,  // startVobName
        })
    }
}

/// Fired once when the world finishes loading. Not a `zCTrigger`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerWorldStart {
    pub target: String,
    pub fire_once: bool,
}

impl TriggerWorldStart {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<TriggerWorldStart> {
        vob.parse_base(archive, version)?;
        Ok(TriggerWorldStart {
            target: archive.read_string()?,  // triggerTarget
            fire_once: archive.read_bool()?, // fireOnlyFirstTime
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerUntouch {
    pub target: String,
}

impl TriggerUntouch {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<TriggerUntouch> {
        vob.parse_base(archive, version)?;
        Ok(TriggerUntouch {
            target: archive.read_string()?, // triggerTarget
        })
    }
}
