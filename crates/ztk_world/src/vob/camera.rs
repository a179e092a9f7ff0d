use glam::Mat4;
use num_enum::TryFromPrimitive;

use ztk_archive::ArchiveRead;

use crate::vob::{decode_enum, Vob, VobData, VobType};
use crate::world::GameVersion;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum CameraMotion {
    Undefined = 0,
    Smooth = 1,
    Linear = 2,
    Step = 3,
    Slow = 4,
    Fast = 5,
    Custom = 6,
}

impl Default for CameraMotion {
    fn default() -> Self {
        Self::Undefined
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum CameraTrajectory {
    World = 0,
    Object = 1,
}

impl Default for CameraTrajectory {
    fn default() -> Self {
        Self::World
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum CameraLoop {
    None = 0,
    Restart = 1,
    PingPong = 2,
}

impl Default for CameraLoop {
    fn default() -> Self {
        Self::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum CameraLerpMode {
    Undefined = 0,
    Path = 1,
    PathIgnoreRoll = 2,
    PathRotationSamples = 3,
}

impl Default for CameraLerpMode {
    fn default() -> Self {
        Self::Undefined
    }
}

/// One keyframe of a cutscene camera spline.
#[derive(Debug, Clone, Default)]
pub struct CameraTrajectoryFrame {
    pub vob: Vob,
    pub time: f32,
    pub roll_angle: f32,
    pub fov_scale: f32,
    pub motion_type: CameraMotion,
    pub motion_type_fov: CameraMotion,
    pub motion_type_roll: CameraMotion,
    pub motion_type_time_scale: CameraMotion,
    pub tension: f32,
    pub cam_bias: f32,
    pub continuity: f32,
    pub time_scale: f32,
    pub time_fixed: bool,
    pub original_pose: Mat4,
}

impl CameraTrajectoryFrame {
    fn parse(archive: &mut dyn ArchiveRead, version: GameVersion) -> Result<CameraTrajectoryFrame> {
        let mut frame = CameraTrajectoryFrame {
            vob: Vob {
                vob_type: VobType::CamTrjKeyFrame,
                data: VobData::Plain,
                ..Vob::default()
            },
            ..CameraTrajectoryFrame::default()
        };

        frame.vob.parse_base(archive, version)?;
        frame.time = archive.read_float()?; // time
        frame.roll_angle = archive.read_float()?; // angleRollDeg
        frame.fov_scale = archive.read_float()?; // camFOVScale
        frame.motion_type = decode_enum("camera motion", archive.read_enum()?)?; // motionType
        frame.motion_type_fov = decode_enum("camera motion", archive.read_enum()?)?; // motionTypeFOV
        frame.motion_type_roll = decode_enum("camera motion", archive.read_enum()?)?; // motionTypeRoll
        frame.motion_type_time_scale = decode_enum("camera motion", archive.read_enum()?)?; // motionTypeTimeScale
        frame.tension = archive.read_float()?; // tension
        frame.cam_bias = archive.read_float()?; // bias
        frame.continuity = archive.read_float()?; // continuity
        frame.time_scale = archive.read_float()?; // timeScale
        frame.time_fixed = archive.read_bool()?; // timeIsFixed

        let mut pose = archive.read_raw_bytes(16 * 4)?;
        frame.original_pose = pose.get_mat4x4()?.transpose(); // originalPose

        Ok(frame)
    }
}

/// A scripted cutscene camera (`zCCSCamera`) with its keyframes inlined
/// as child objects.
#[derive(Debug, Clone, Default)]
pub struct CsCamera {
    pub trajectory_for: CameraTrajectory,
    pub target_trajectory_for: CameraTrajectory,
    pub loop_mode: CameraLoop,
    pub lerp_mode: CameraLerpMode,
    pub ignore_for_vob_rotation: bool,
    pub ignore_for_vob_rotation_target: bool,
    pub adapt: bool,
    pub ease_first: bool,
    pub ease_last: bool,
    pub total_duration: f32,
    pub auto_focus_vob: String,
    pub auto_player_movable: bool,
    pub auto_untrigger_last: bool,
    pub auto_untrigger_last_delay: f32,
    pub position_count: i32,
    pub target_count: i32,
    pub frames: Vec<CameraTrajectoryFrame>,
}

impl CsCamera {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<CsCamera> {
        vob.parse_base(archive, version)?;

        let mut camera = CsCamera {
            trajectory_for: decode_enum("camera trajectory", archive.read_enum()?)?, // camTrjFOR
            target_trajectory_for: decode_enum("camera trajectory", archive.read_enum()?)?, // targetTrjFOR
            loop_mode: decode_enum("camera loop", archive.read_enum()?)?, // loopMode
            lerp_mode: decode_enum("camera lerp mode", archive.read_enum()?)?, // splLerpMode
            ignore_for_vob_rotation: archive.read_bool()?, // ignoreFORVobRotCam
            ignore_for_vob_rotation_target: archive.read_bool()?, // ignoreFORVobRotTarget
            adapt: archive.read_bool()?,                   // adaptToSurroundings
            ease_first: archive.read_bool()?,              // easeToFirstKey
            ease_last: archive.read_bool()?,               // easeFromLastKey
            total_duration: archive.read_float()?,         // totalTime
            auto_focus_vob: archive.read_string()?,        // autoCamFocusVobName
            auto_player_movable: archive.read_bool()?,     // autoCamPlayerMovable
            auto_untrigger_last: archive.read_bool()?,     // autoCamUntriggerOnLastKey
            auto_untrigger_last_delay: archive.read_float()?, // autoCamUntriggerOnLastKeyDelay
            position_count: archive.read_int()?,           // numPos
            target_count: archive.read_int()?,             // numTargets
            frames: Vec::new(),
        };

        while let Some(frame) = archive.read_object_begin()? {
            if frame.class_name != "zCCamTrj_KeyFrame:zCVob" {
                log::warn!(
                    "cs_camera: unexpected {:?} in zCCSCamera",
                    frame.class_name
                );
                archive.skip_object(true)?;
                continue;
            }

            camera
                .frames
                .push(CameraTrajectoryFrame::parse(archive, version)?);

            if !archive.read_object_end()? {
                log::warn!("cs_camera: camera keyframe not fully parsed");
                archive.skip_object(true)?;
            }
        }

        Ok(camera)
    }
}
