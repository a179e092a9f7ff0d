use glam::Vec3;
use num_enum::TryFromPrimitive;

use ztk_archive::ArchiveRead;

use crate::vob::{decode_enum, Vob};
use crate::world::GameVersion;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum MessageFilterAction {
    None = 0,
    Trigger = 1,
    Untrigger = 2,
    Enable = 3,
    Disable = 4,
    Toggle = 5,
}

impl Default for MessageFilterAction {
    fn default() -> Self {
        Self::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum MoverMessageType {
    FixedDirect = 0,
    FixedOrder = 1,
    Next = 2,
    Previous = 3,
}

impl Default for MoverMessageType {
    fn default() -> Self {
        Self::FixedDirect
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum CollisionType {
    None = 1,
    Box = 2,
    Point = 4,
}

impl Default for CollisionType {
    fn default() -> Self {
        Self::None
    }
}

/// A vob whose visual plays its animation on its own (`zCVobAnimate`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animate {
    pub start_on: bool,
}

impl Animate {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<Animate> {
        vob.parse_base(archive, version)?;
        let animate = Animate {
            start_on: archive.read_bool()?, // startOn
        };

        if vob.saved.is_some() {
            let _is_running = archive.read_bool()?; // isRunning
        }

        Ok(animate)
    }
}

/// A script item placed in the world (`oCItem`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub instance: String,
}

impl Item {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<Item> {
        vob.parse_base(archive, version)?;
        let item = Item {
            instance: archive.read_string()?, // itemInstance
        };

        if vob.saved.is_some() {
            let _amount = archive.read_int()?; // amount
            let _flags = archive.read_int()?; // flags
        }

        Ok(item)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LensFlare {
    pub fx: String,
}

impl LensFlare {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<LensFlare> {
        vob.parse_base(archive, version)?;
        Ok(LensFlare {
            fx: archive.read_string()?, // lensflareFX
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PfxController {
    pub pfx_name: String,
    pub kill_when_done: bool,
    pub initially_running: bool,
}

impl PfxController {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<PfxController> {
        vob.parse_base(archive, version)?;
        Ok(PfxController {
            pfx_name: archive.read_string()?,        // pfxName
            kill_when_done: archive.read_bool()?,    // killVobWhenDone
            initially_running: archive.read_bool()?, // pfxStartOn
        })
    }
}

/// Translates incoming events into other events (`zCMessageFilter`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageFilter {
    pub target: String,
    pub on_trigger: MessageFilterAction,
    pub on_untrigger: MessageFilterAction,
}

impl MessageFilter {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<MessageFilter> {
        vob.parse_base(archive, version)?;
        Ok(MessageFilter {
            target: archive.read_string()?, // triggerTarget
            on_trigger: decode_enum("message filter action", archive.read_enum()?)?, // onTrigger
            on_untrigger: decode_enum("message filter action", archive.read_enum()?)?, // onUntrigger
        })
    }
}

/// Fires when its slave vobs fire in the right (or any) order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeMaster {
    pub target: String,
    pub ordered: bool,
    pub first_false_is_failure: bool,
    pub failure_target: String,
    pub untriggered_cancels: bool,
    pub slaves: Vec<String>,
}

impl CodeMaster {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<CodeMaster> {
        vob.parse_base(archive, version)?;
        let mut master = CodeMaster {
            target: archive.read_string()?,                // triggerTarget
            ordered: archive.read_bool()?,                 // orderRelevant
            first_false_is_failure: archive.read_bool()?,  // firstFalseIsFailure
            failure_target: archive.read_string()?,        // triggerTargetFailure
            untriggered_cancels: archive.read_bool()?,     // untriggerCancels
            slaves: Vec::new(),
        };

        let slave_count = archive.read_byte()?; // numSlaves
        for _ in 0..slave_count {
            master.slaves.push(archive.read_string()?); // slaveVobName
        }

        if vob.saved.is_some() && version == GameVersion::Gothic2 {
            let _triggered = archive.read_byte()?; // numSlavesTriggered
            for _ in 0..slave_count {
                archive.skip_object(false)?; // [slaveTriggered % 0 0]
            }
        }

        Ok(master)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoverController {
    pub target: String,
    pub message: MoverMessageType,
    pub key: i32,
}

impl MoverController {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<MoverController> {
        vob.parse_base(archive, version)?;
        let target = archive.read_string()?; // triggerTarget

        let message = if version == GameVersion::Gothic1 {
            decode_enum("mover message", archive.read_enum()?)? // moverMessage
        } else {
            decode_enum("mover message", archive.read_byte()? as u32)?
        };

        Ok(MoverController {
            target,
            message,
            key: archive.read_int()?, // gotoFixedKey
        })
    }
}

/// Deals damage on contact (`oCTouchDamage`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchDamage {
    pub damage: f32,
    pub barrier: bool,
    pub blunt: bool,
    pub edge: bool,
    pub fire: bool,
    pub fly: bool,
    pub magic: bool,
    pub point: bool,
    pub fall: bool,
    pub repeat_delay_sec: f32,
    pub volume_scale: f32,
    pub collision: CollisionType,
}

impl TouchDamage {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<TouchDamage> {
        vob.parse_base(archive, version)?;
        Ok(TouchDamage {
            damage: archive.read_float()?,          // damage
            barrier: archive.read_bool()?,          // Barrier
            blunt: archive.read_bool()?,            // Blunt
            edge: archive.read_bool()?,             // Edge
            fire: archive.read_bool()?,             // Fire
            fly: archive.read_bool()?,              // Fly
            magic: archive.read_bool()?,            // Magic
            point: archive.read_bool()?,            // Point
            fall: archive.read_bool()?,             // Fall
            repeat_delay_sec: archive.read_float()?, // damageRepeatDelaySec
            volume_scale: archive.read_float()?,    // damageVolDownScale
            collision: decode_enum("collision type", archive.read_enum()?)?, // damageCollType
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Earthquake {
    pub radius: f32,
    pub duration: f32,
    pub amplitude: Vec3,
}

impl Earthquake {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<Earthquake> {
        vob.parse_base(archive, version)?;
        Ok(Earthquake {
            radius: archive.read_float()?,   // radius
            duration: archive.read_float()?, // timeSec
            amplitude: archive.read_vec3()?, // amplitudeCM
        })
    }
}
