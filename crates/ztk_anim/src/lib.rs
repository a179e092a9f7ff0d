//! Model animations (`.MAN`).
//!
//! Samples are quantized on disk: rotations as three unsigned 16-bit
//! components with the fourth quaternion component reconstructed, and
//! positions as 16-bit values scaled into the range declared by the
//! header.

mod read;

use glam::{Quat, Vec3};
use num_enum::TryFromPrimitive;

use ztk_io::BufferError;
use ztk_primitives::Aabb;

#[derive(Debug, thiserror::Error)]
pub enum AnimationError {
    #[error("unknown animation event type {0}")]
    UnknownEventType(u32),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

pub type Result<T> = std::result::Result<T, AnimationError>;

/// One keyframe of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSample {
    pub position: Vec3,
    pub rotation: Quat,
}

/// Trigger kinds an animation can fire while playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum EventType {
    Tag = 0,
    Sound = 1,
    SoundGround = 2,
    AnimationBatch = 3,
    SwapMesh = 4,
    Heading = 5,
    Pfx = 6,
    PfxGround = 7,
    PfxStop = 8,
    SetMesh = 9,
    StartAnimation = 10,
    Tremor = 11,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationEvent {
    pub event_type: EventType,
    pub no: u32,
    pub tag: String,
    pub content: [String; 4],
    pub values: [f32; 4],
    pub probability: f32,
}

/// A parsed animation: header data plus `node_count * frame_count`
/// samples, stored row-major by frame then node.
#[derive(Debug, Clone, Default)]
pub struct Animation {
    pub name: String,
    pub next: String,
    pub layer: u32,
    pub frame_count: u32,
    pub node_count: u32,
    pub fps: f32,
    pub fps_source: f32,
    pub sample_position_min: f32,
    pub sample_position_scalar: f32,
    pub bbox: Aabb,
    pub checksum: u32,
    pub source_path: String,
    pub source_script: String,
    pub node_indices: Vec<u32>,
    pub samples: Vec<AnimationSample>,
    pub events: Vec<AnimationEvent>,
}
