//! The polymorphic vob scene graph.
//!
//! Every node's begin marker carries its full class chain
//! (`oCMobDoor:oCMobInter:oCMOB:zCVob`); dispatch maps the chain to a
//! concrete kind whose loader reads the base fields first and its own
//! fields after, exactly as the inheritance chain dictates.

mod camera;
mod light;
mod misc;
mod mob;
mod sound;
mod trigger;
mod zone;

pub use camera::{
    CameraLerpMode, CameraLoop, CameraMotion, CameraTrajectory, CameraTrajectoryFrame, CsCamera,
};
pub use light::{LightMode, LightPreset, LightQuality, VobLight};
pub use misc::{
    Animate, CodeMaster, CollisionType, Earthquake, Item, LensFlare, MessageFilter,
    MessageFilterAction, MoverController, MoverMessageType, PfxController, TouchDamage,
};
pub use mob::{Mob, MobContainer, MobDoor, MobFire, MobInter, SoundMaterial};
pub use sound::{Sound, SoundDaytime, SoundMode, SoundTriggerVolume};
pub use trigger::{
    MoverBehavior, MoverKeyframe, MoverLerpMode, MoverSpeedMode, Trigger, TriggerBatchMode,
    TriggerChangeLevel, TriggerList, TriggerMover, TriggerScript, TriggerUntouch,
    TriggerWorldStart,
};
pub use zone::{ZoneFarPlane, ZoneFog, ZoneMusic};

use glam::{Mat3, Vec2, Vec3};
use num_enum::TryFromPrimitive;

use ztk_archive::{ArchiveRead, REFERENCE_CLASS};
use ztk_material::AlphaFunction;
use ztk_primitives::Aabb;

use crate::world::GameVersion;
use crate::{Result, WorldError};

pub(crate) fn decode_enum<T>(name: &'static str, value: u32) -> Result<T>
where
    T: TryFromPrimitive<Primitive = u32>,
{
    T::try_from_primitive(value).map_err(|_| WorldError::InvalidEnum { name, value })
}

/// Every concrete vob class the engine archives into a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::enum_variant_names)]
pub enum VobType {
    Vob,
    VobLevelCompo,
    Item,
    Mob,
    MobInter,
    MobBed,
    MobFire,
    MobLadder,
    MobSwitch,
    MobWheel,
    MobContainer,
    MobDoor,
    PfxController,
    VobAnimate,
    VobLensFlare,
    VobLight,
    VobSpot,
    VobStartpoint,
    VobSound,
    VobSoundDaytime,
    ZoneMusic,
    ZoneMusicDefault,
    ZoneZFog,
    ZoneZFogDefault,
    ZoneVobFarPlane,
    ZoneVobFarPlaneDefault,
    MessageFilter,
    CodeMaster,
    Trigger,
    TriggerList,
    TriggerScript,
    TriggerMover,
    TriggerChangeLevel,
    TriggerWorldStart,
    TriggerUntouch,
    CsCamera,
    CamTrjKeyFrame,
    TouchDamage,
    Earthquake,
    MoverController,
    VobScreenFx,
    VobStair,
    CsTrigger,
}

fn vob_type_from_class(class_name: &str) -> Option<VobType> {
    Some(match class_name {
        "zCVob" => VobType::Vob,
        "zCVobLevelCompo:zCVob" => VobType::VobLevelCompo,
        "oCItem:zCVob" => VobType::Item,
        "oCMOB:zCVob" => VobType::Mob,
        "oCMobInter:oCMOB:zCVob" => VobType::MobInter,
        "oCMobBed:oCMobInter:oCMOB:zCVob" => VobType::MobBed,
        "oCMobFire:oCMobInter:oCMOB:zCVob" => VobType::MobFire,
        "oCMobLadder:oCMobInter:oCMOB:zCVob" => VobType::MobLadder,
        "oCMobSwitch:oCMobInter:oCMOB:zCVob" => VobType::MobSwitch,
        "oCMobWheel:oCMobInter:oCMOB:zCVob" => VobType::MobWheel,
        "oCMobContainer:oCMobInter:oCMOB:zCVob" => VobType::MobContainer,
        "oCMobDoor:oCMobInter:oCMOB:zCVob" => VobType::MobDoor,
        "zCPFXControler:zCVob" => VobType::PfxController,
        "zCVobAnimate:zCVob" => VobType::VobAnimate,
        "zCVobLensFlare:zCVob" => VobType::VobLensFlare,
        "zCVobLight:zCVob" => VobType::VobLight,
        "zCVobSpot:zCVob" => VobType::VobSpot,
        "zCVobStartpoint:zCVob" => VobType::VobStartpoint,
        "zCVobSound:zCVob" => VobType::VobSound,
        "zCVobSoundDaytime:zCVobSound:zCVob" => VobType::VobSoundDaytime,
        "oCZoneMusic:zCVob" => VobType::ZoneMusic,
        "oCZoneMusicDefault:oCZoneMusic:zCVob" => VobType::ZoneMusicDefault,
        "zCZoneZFog:zCVob" => VobType::ZoneZFog,
        "zCZoneZFogDefault:zCZoneZFog:zCVob" => VobType::ZoneZFogDefault,
        "zCZoneVobFarPlane:zCVob" => VobType::ZoneVobFarPlane,
        "zCZoneVobFarPlaneDefault:zCZoneVobFarPlane:zCVob" => VobType::ZoneVobFarPlaneDefault,
        "zCMessageFilter:zCVob" => VobType::MessageFilter,
        "zCCodeMaster:zCVob" => VobType::CodeMaster,
        "zCTrigger:zCVob" => VobType::Trigger,
        "zCTriggerList:zCTrigger:zCVob" => VobType::TriggerList,
        "oCTriggerScript:zCTrigger:zCVob" => VobType::TriggerScript,
        "zCMover:zCTrigger:zCVob" => VobType::TriggerMover,
        "oCTriggerChangeLevel:zCTrigger:zCVob" => VobType::TriggerChangeLevel,
        "zCTriggerWorldStart:zCVob" => VobType::TriggerWorldStart,
        "zCTriggerUntouch:zCVob" => VobType::TriggerUntouch,
        "zCCSCamera:zCVob" => VobType::CsCamera,
        "zCCamTrj_KeyFrame:zCVob" => VobType::CamTrjKeyFrame,
        "oCTouchDamage:zCTouchDamage:zCVob" => VobType::TouchDamage,
        "zCEarthquake:zCVob" => VobType::Earthquake,
        "zCMoverControler:zCVob" => VobType::MoverController,
        "zCVobScreenFX:zCVob" => VobType::VobScreenFx,
        "zCVobStair:zCVob" => VobType::VobStair,
        "oCCSTrigger:zCTrigger:zCVob" => VobType::CsTrigger,
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum SpriteAlignment {
    None = 0,
    Yaw = 1,
    Full = 2,
}

impl Default for SpriteAlignment {
    fn default() -> Self {
        Self::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum ShadowMode {
    None = 0,
    Blob = 1,
}

impl Default for ShadowMode {
    fn default() -> Self {
        Self::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum AnimationMode {
    None = 0,
    Wind = 1,
    Wind2 = 2,
}

impl Default for AnimationMode {
    fn default() -> Self {
        Self::None
    }
}

/// What kind of visual the `visual_name` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualType {
    Decal,
    Mesh,
    MultiResolutionMesh,
    ParticleEffect,
    Model,
    AiCamera,
    MorphMesh,
    #[default]
    Unknown,
}

fn visual_type_from_class(class_name: &str) -> VisualType {
    match class_name {
        "zCDecal" => VisualType::Decal,
        "zCMesh" => VisualType::Mesh,
        "zCProgMeshProto" => VisualType::MultiResolutionMesh,
        "zCParticleFX" => VisualType::ParticleEffect,
        "zCModel" => VisualType::Model,
        "zCAICamera" => VisualType::AiCamera,
        "zCMorphMesh" => VisualType::MorphMesh,
        _ => VisualType::Unknown,
    }
}

/// An on-geometry decal visual.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decal {
    pub name: String,
    pub dimension: Vec2,
    pub offset: Vec2,
    pub two_sided: bool,
    pub alpha_func: AlphaFunction,
    pub texture_anim_fps: f32,
    pub alpha_weight: u8,
    pub ignore_daylight: bool,
}

impl Decal {
    fn parse(archive: &mut dyn ArchiveRead, version: GameVersion) -> Result<Decal> {
        let mut decal = Decal {
            name: archive.read_string()?,          // name
            dimension: archive.read_vec2()?,       // decalDim
            offset: archive.read_vec2()?,          // decalOffset
            two_sided: archive.read_bool()?,       // decal2Sided
            alpha_func: AlphaFunction::from_raw(archive.read_enum()?), // decalAlphaFunc
            texture_anim_fps: archive.read_float()?, // decalTexAniFPS
            ..Decal::default()
        };

        if version == GameVersion::Gothic2 {
            decal.alpha_weight = archive.read_byte()?; // decalAlphaWeight
            decal.ignore_daylight = archive.read_bool()?; // ignoreDayLight
        }

        Ok(decal)
    }
}

/// Extra per-vob state stored only in save-game archives.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SaveState {
    pub sleep_mode: u8,
    pub next_on_timer: f32,
}

/// Kind-specific payloads. Trivial classes (spots, start points, level
/// compos, standalone camera keyframes) carry no fields of their own.
#[derive(Debug, Clone, Default)]
pub enum VobData {
    #[default]
    Plain,
    Animate(Animate),
    Item(Item),
    LensFlare(LensFlare),
    PfxController(PfxController),
    MessageFilter(MessageFilter),
    CodeMaster(CodeMaster),
    MoverController(MoverController),
    TouchDamage(TouchDamage),
    Earthquake(Earthquake),
    Mob(Mob),
    MobInter(MobInter),
    MobFire(MobFire),
    MobContainer(MobContainer),
    MobDoor(MobDoor),
    Light(VobLight),
    Sound(Sound),
    SoundDaytime(SoundDaytime),
    ZoneMusic(ZoneMusic),
    ZoneFog(ZoneFog),
    ZoneFarPlane(ZoneFarPlane),
    Trigger(Trigger),
    TriggerList(TriggerList),
    TriggerScript(TriggerScript),
    TriggerMover(TriggerMover),
    TriggerChangeLevel(TriggerChangeLevel),
    TriggerWorldStart(TriggerWorldStart),
    TriggerUntouch(TriggerUntouch),
    CsCamera(CsCamera),
}

/// One node of the scene graph: the shared `zCVob` fields, the
/// kind-specific payload and the child subtree.
#[derive(Debug, Clone, Default)]
pub struct Vob {
    pub vob_type: VobType,
    pub id: u32,
    pub bbox: Aabb,
    pub position: Vec3,
    pub rotation: Mat3,
    pub show_visual: bool,
    pub sprite_camera_facing_mode: SpriteAlignment,
    pub cd_static: bool,
    pub cd_dynamic: bool,
    pub vob_static: bool,
    pub dynamic_shadows: ShadowMode,
    pub physics_enabled: bool,
    pub anim_mode: AnimationMode,
    pub bias: i32,
    pub ambient: bool,
    pub anim_strength: f32,
    pub far_clip_scale: f32,
    pub preset_name: String,
    pub vob_name: String,
    pub visual_name: String,
    pub associated_visual_type: VisualType,
    pub visual_decal: Option<Decal>,
    pub saved: Option<SaveState>,
    pub data: VobData,
    pub children: Vec<Vob>,
}

impl Default for VobType {
    fn default() -> Self {
        VobType::Vob
    }
}

impl Vob {
    /// Reads the `zCVob` base fields shared by every kind.
    pub(crate) fn parse_base(
        &mut self,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<()> {
        let packed = archive.read_int()? != 0; // pack
        let mut has_visual_object = true;
        let mut has_ai_object = true;
        let mut has_event_manager_object = false;

        if packed {
            let mut bin =
                archive.read_raw_bytes(if version == GameVersion::Gothic1 { 74 } else { 83 })?;

            self.bbox = bin.get_bbox()?;
            self.position = bin.get_vec3()?;
            self.rotation = bin.get_mat3x3()?.transpose();

            let bit0 = bin.get_u8()?;
            let bit1 = if version == GameVersion::Gothic1 {
                bin.get_u8()? as u16
            } else {
                bin.get_u16()?
            };

            self.show_visual = bit0 & 0b0000_0001 != 0;
            self.sprite_camera_facing_mode =
                decode_enum("sprite alignment", ((bit0 & 0b0000_0110) >> 1) as u32)?;
            self.cd_static = bit0 & 0b0000_1000 != 0;
            self.cd_dynamic = bit0 & 0b0001_0000 != 0;
            self.vob_static = bit0 & 0b0010_0000 != 0;
            self.dynamic_shadows = decode_enum("shadow mode", ((bit0 & 0b1100_0000) >> 6) as u32)?;

            let has_preset_name = bit1 & (1 << 0) != 0;
            let has_vob_name = bit1 & (1 << 1) != 0;
            let has_visual_name = bit1 & (1 << 2) != 0;
            has_visual_object = bit1 & (1 << 3) != 0;
            has_ai_object = bit1 & (1 << 4) != 0;

            // bit 5 marks an event manager object, only ever present in
            // save-game archives
            has_event_manager_object = bit1 & (1 << 5) != 0 && archive.header().save;

            self.physics_enabled = bit1 & (1 << 6) != 0;

            if version == GameVersion::Gothic2 {
                self.anim_mode = decode_enum("animation mode", ((bit1 >> 7) & 0b11) as u32)?;
                self.bias = ((bit1 >> 9) & 0b1_1111) as i32;
                self.ambient = bit1 & (1 << 14) != 0;

                self.anim_strength = bin.get_f32()?;
                self.far_clip_scale = bin.get_f32()?;
            }

            if has_preset_name {
                self.preset_name = archive.read_string()?; // presetName
            }
            if has_vob_name {
                self.vob_name = archive.read_string()?; // vobName
            }
            if has_visual_name {
                self.visual_name = archive.read_string()?; // visual
            }
        } else {
            self.preset_name = archive.read_string()?;
            self.bbox = archive.read_bbox()?; // bbox3DWS

            self.rotation = archive.read_mat3x3()?; // trafoOSToWSRot
            self.position = archive.read_vec3()?; // trafoOSToWSPos

            self.vob_name = archive.read_string()?; // vobName
            self.visual_name = archive.read_string()?; // visual
            self.show_visual = archive.read_bool()?; // showVisual
            self.sprite_camera_facing_mode =
                decode_enum("sprite alignment", archive.read_enum()?)?; // visualCamAlign

            if version == GameVersion::Gothic1 {
                self.cd_static = archive.read_bool()?; // cdStatic
                self.cd_dynamic = archive.read_bool()?; // cdDyn
                self.vob_static = archive.read_bool()?; // staticVob
                self.dynamic_shadows = decode_enum("shadow mode", archive.read_enum()?)?; // dynShadow
            } else {
                self.anim_mode = decode_enum("animation mode", archive.read_enum()?)?; // visualAniMode
                self.anim_strength = archive.read_float()?; // visualAniModeStrength
                self.far_clip_scale = archive.read_float()?; // vobFarClipZScale
                self.cd_static = archive.read_bool()?; // cdStatic
                self.cd_dynamic = archive.read_bool()?; // cdDyn
                self.vob_static = archive.read_bool()?; // staticVob
                self.dynamic_shadows = decode_enum("shadow mode", archive.read_enum()?)?; // dynShadow
                self.bias = archive.read_int()?; // zbias
                self.ambient = archive.read_bool()?; // isAmbient
            }
        }

        if has_visual_object {
            if let Some(visual) = archive.read_object_begin()? {
                self.associated_visual_type = visual_type_from_class(&visual.class_name);

                if self.associated_visual_type == VisualType::Decal {
                    self.visual_decal = Some(Decal::parse(archive, version)?);
                }

                if !archive.read_object_end()? {
                    log::warn!("vob_tree: visual {:?} not fully parsed", visual.class_name);
                    archive.skip_object(true)?;
                }
            }
        }

        if has_ai_object {
            archive.skip_object(false)?;
        }

        if has_event_manager_object {
            archive.skip_object(false)?;
        }

        if archive.header().save {
            self.saved = Some(SaveState {
                sleep_mode: archive.read_byte()?,      // sleepMode
                next_on_timer: archive.read_float()?,  // nextOnTimer
            });
        }

        Ok(())
    }
}

/// Recursively skips an unreadable vob and all of its children.
fn skip_children(archive: &mut dyn ArchiveRead, count: i32) -> Result<()> {
    for _ in 0..count {
        archive.skip_object(false)?;
        let child_count = archive.read_int()?;
        skip_children(archive, child_count)?;
    }
    Ok(())
}

/// Reads one vob subtree. Unknown classes (including the `\xA7` padding
/// objects) are skipped entirely, children included, and yield `None`.
pub fn read_vob_tree(
    archive: &mut dyn ArchiveRead,
    version: GameVersion,
) -> Result<Option<Vob>> {
    let Some(object) = archive.read_object_begin()? else {
        return Err(WorldError::Malformed(
            "vob tree: expected object where there was none".into(),
        ));
    };

    let vob_type = if object.class_name == REFERENCE_CLASS {
        None
    } else {
        vob_type_from_class(&object.class_name)
    };

    let vob = match vob_type {
        None => None,
        Some(vob_type) => {
            let mut vob = Vob {
                vob_type,
                ..Vob::default()
            };

            vob.data = match vob_type {
                VobType::Vob
                | VobType::VobLevelCompo
                | VobType::VobSpot
                | VobType::VobStartpoint
                | VobType::VobScreenFx
                | VobType::VobStair
                | VobType::CamTrjKeyFrame => {
                    vob.parse_base(archive, version)?;
                    VobData::Plain
                }
                VobType::CsCamera => VobData::CsCamera(CsCamera::parse(&mut vob, archive, version)?),
                VobType::VobAnimate => VobData::Animate(Animate::parse(&mut vob, archive, version)?),
                VobType::ZoneVobFarPlane | VobType::ZoneVobFarPlaneDefault => {
                    VobData::ZoneFarPlane(ZoneFarPlane::parse(&mut vob, archive, version)?)
                }
                VobType::ZoneZFog | VobType::ZoneZFogDefault => {
                    VobData::ZoneFog(ZoneFog::parse(&mut vob, archive, version)?)
                }
                VobType::VobLensFlare => {
                    VobData::LensFlare(LensFlare::parse(&mut vob, archive, version)?)
                }
                VobType::Item => VobData::Item(Item::parse(&mut vob, archive, version)?),
                VobType::Trigger | VobType::CsTrigger => {
                    VobData::Trigger(Trigger::parse(&mut vob, archive, version)?)
                }
                VobType::Mob => VobData::Mob(Mob::parse(&mut vob, archive, version)?),
                VobType::MobInter
                | VobType::MobLadder
                | VobType::MobSwitch
                | VobType::MobWheel
                | VobType::MobBed => {
                    VobData::MobInter(MobInter::parse(&mut vob, archive, version)?)
                }
                VobType::MobFire => VobData::MobFire(MobFire::parse(&mut vob, archive, version)?),
                VobType::MobContainer => {
                    VobData::MobContainer(MobContainer::parse(&mut vob, archive, version)?)
                }
                VobType::MobDoor => VobData::MobDoor(MobDoor::parse(&mut vob, archive, version)?),
                VobType::PfxController => {
                    VobData::PfxController(PfxController::parse(&mut vob, archive, version)?)
                }
                VobType::VobLight => VobData::Light(VobLight::parse(&mut vob, archive, version)?),
                VobType::VobSound => VobData::Sound(Sound::parse(&mut vob, archive, version)?),
                VobType::VobSoundDaytime => {
                    VobData::SoundDaytime(SoundDaytime::parse(&mut vob, archive, version)?)
                }
                VobType::ZoneMusic | VobType::ZoneMusicDefault => {
                    VobData::ZoneMusic(ZoneMusic::parse(&mut vob, archive, version)?)
                }
                VobType::MessageFilter => {
                    VobData::MessageFilter(MessageFilter::parse(&mut vob, archive, version)?)
                }
                VobType::CodeMaster => {
                    VobData::CodeMaster(CodeMaster::parse(&mut vob, archive, version)?)
                }
                VobType::TriggerList => {
                    VobData::TriggerList(TriggerList::parse(&mut vob, archive, version)?)
                }
                VobType::TriggerScript => {
                    VobData::TriggerScript(TriggerScript::parse(&mut vob, archive, version)?)
                }
                VobType::TriggerMover => {
                    VobData::TriggerMover(TriggerMover::parse(&mut vob, archive, version)?)
                }
                VobType::TriggerChangeLevel => {
                    VobData::TriggerChangeLevel(TriggerChangeLevel::parse(&mut vob, archive, version)?)
                }
                VobType::TriggerWorldStart => {
                    VobData::TriggerWorldStart(TriggerWorldStart::parse(&mut vob, archive, version)?)
                }
                VobType::TouchDamage => {
                    VobData::TouchDamage(TouchDamage::parse(&mut vob, archive, version)?)
                }
                VobType::TriggerUntouch => {
                    VobData::TriggerUntouch(TriggerUntouch::parse(&mut vob, archive, version)?)
                }
                VobType::Earthquake => {
                    VobData::Earthquake(Earthquake::parse(&mut vob, archive, version)?)
                }
                VobType::MoverController => {
                    VobData::MoverController(MoverController::parse(&mut vob, archive, version)?)
                }
            };

            Some(vob)
        }
    };

    if !archive.read_object_end()? {
        log::warn!(
            "vob_tree: not all data consumed of vob {:?}",
            object.class_name
        );
        archive.skip_object(true)?;
    }

    let child_count = archive.read_int()?;

    let Some(mut vob) = vob else {
        skip_children(archive, child_count)?;
        return Ok(None);
    };

    vob.id = object.index;
    vob.children.reserve(child_count.max(0) as usize);

    for _ in 0..child_count {
        if let Some(child) = read_vob_tree(archive, version)? {
            vob.children.push(child);
        }
    }

    Ok(Some(vob))
}
