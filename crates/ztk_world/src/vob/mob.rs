use num_enum::TryFromPrimitive;

use ztk_archive::ArchiveRead;

use crate::vob::{decode_enum, Vob};
use crate::world::GameVersion;
use crate::Result;

/// Sound set played when interacting with an `oCMOB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum SoundMaterial {
    Wood = 0,
    Stone = 1,
    Metal = 2,
    Leather = 3,
    Clay = 4,
    Glass = 5,
}

impl Default for SoundMaterial {
    fn default() -> Self {
        Self::Wood
    }
}

/// A named interactive object (`oCMOB`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mob {
    pub name: String,
    pub hp: i32,
    pub damage: i32,
    pub movable: bool,
    pub takable: bool,
    pub focus_override: bool,
    pub material: SoundMaterial,
    pub visual_destroyed: String,
    pub owner: String,
    pub owner_guild: String,
    pub destroyed: bool,
}

impl Mob {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<Mob> {
        vob.parse_base(archive, version)?;
        Ok(Mob {
            name: archive.read_string()?,          // focusName
            hp: archive.read_int()?,               // hitpoints
            damage: archive.read_int()?,           // damage
            movable: archive.read_bool()?,         // moveable
            takable: archive.read_bool()?,         // takeable
            focus_override: archive.read_bool()?,  // focusOverride
            material: decode_enum("sound material", archive.read_enum()?)?, // soundMaterial
            visual_destroyed: archive.read_string()?, // visualDestroyed
            owner: archive.read_string()?,         // owner
            owner_guild: archive.read_string()?,   // ownerGuild
            destroyed: archive.read_bool()?,       // isDestroyed
        })
    }
}

/// An interactive mob (`oCMobInter`), also the base for beds, ladders,
/// switches and wheels which add no fields of their own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MobInter {
    pub mob: Mob,
    pub state: i32,
    pub target: String,
    pub item: String,
    pub condition_function: String,
    pub on_state_change_function: String,
    pub rewind: bool,
}

impl MobInter {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<MobInter> {
        Ok(MobInter {
            mob: Mob::parse(vob, archive, version)?,
            state: archive.read_int()?,                       // stateNum
            target: archive.read_string()?,                   // triggerTarget
            item: archive.read_string()?,                     // useWithItem
            condition_function: archive.read_string()?,       // conditionFunc
            on_state_change_function: archive.read_string()?, // onStateFunc
            rewind: archive.read_bool()?,                     // rewind
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MobContainer {
    pub inter: MobInter,
    pub locked: bool,
    pub key: String,
    pub pick_string: String,
    pub contents: String,
}

impl MobContainer {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<MobContainer> {
        Ok(MobContainer {
            inter: MobInter::parse(vob, archive, version)?,
            locked: archive.read_bool()?,       // locked
            key: archive.read_string()?,        // keyInstance
            pick_string: archive.read_string()?, // pickLockStr
            contents: archive.read_string()?,   // contains
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MobDoor {
    pub inter: MobInter,
    pub locked: bool,
    pub key: String,
    pub pick_string: String,
}

impl MobDoor {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<MobDoor> {
        Ok(MobDoor {
            inter: MobInter::parse(vob, archive, version)?,
            locked: archive.read_bool()?,        // locked
            key: archive.read_string()?,         // keyInstance
            pick_string: archive.read_string()?, // pickLockStr
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MobFire {
    pub inter: MobInter,
    pub slot: String,
    pub vob_tree: String,
}

impl MobFire {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<MobFire> {
        Ok(MobFire {
            inter: MobInter::parse(vob, archive, version)?,
            slot: archive.read_string()?,     // fireSlot
            vob_tree: archive.read_string()?, // fireVobtreeName
        })
    }
}
