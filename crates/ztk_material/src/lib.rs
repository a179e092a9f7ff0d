//! `zCMaterial` records as embedded in mesh and world archives.

use glam::Vec2;
use num_enum::{FromPrimitive, IntoPrimitive};

use ztk_archive::{ArchiveError, ArchiveRead};
use ztk_primitives::Color;

const MATERIAL_VERSION_G1: u16 = 17408;

#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    #[error("expected a zCMaterial object, got {0:?}")]
    UnexpectedClass(String),
    #[error("material object begin missing")]
    MissingObject,
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

pub type Result<T> = std::result::Result<T, MaterialError>;

/// Coarse physical category, driving footstep sounds and the like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum MaterialGroup {
    Undefined = 0,
    Metal = 1,
    Stone = 2,
    Wood = 3,
    Earth = 4,
    Water = 5,
    Snow = 6,
    #[num_enum(default)]
    None = 0xFF,
}

impl Default for MaterialGroup {
    fn default() -> Self {
        Self::Undefined
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaFunction {
    #[default]
    Test,
    Transparent,
    Additive,
    Multiply,
}

impl AlphaFunction {
    pub fn from_raw(value: u32) -> Self {
        match value {
            2 => Self::Transparent,
            3 => Self::Additive,
            4 | 5 => Self::Multiply,
            _ => Self::Test,
        }
    }
}

/// A surface material. The Gothic II schema is a strict superset of the
/// Gothic 1 one; fields absent from the older version keep their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub group: MaterialGroup,
    pub color: Color,
    pub smooth_angle: f32,
    pub texture: String,
    pub texture_scale: Vec2,
    pub texture_anim_fps: f32,
    pub texture_anim_map_mode: u8,
    pub texture_anim_map_dir: Vec2,
    pub disable_collision: bool,
    pub disable_lightmap: bool,
    pub dont_collapse: bool,
    pub detail_object: String,
    pub detail_texture_scale: f32,
    pub force_occluder: bool,
    pub environment_mapping: u8,
    pub environment_mapping_strength: f32,
    pub wave_mode: u8,
    pub wave_speed: u8,
    pub wave_max_amplitude: f32,
    pub wave_grid_size: f32,
    pub ignore_sun: bool,
    pub alpha_function: AlphaFunction,
    pub default_mapping: Vec2,
}

impl Material {
    pub fn parse(archive: &mut dyn ArchiveRead) -> Result<Material> {
        // the material's slot name precedes the object itself
        let _slot = archive.read_string()?;

        let object = archive
            .read_object_begin()?
            .ok_or(MaterialError::MissingObject)?;
        if object.class_name != "zCMaterial" {
            return Err(MaterialError::UnexpectedClass(object.class_name));
        }

        let mut mat = Material {
            name: archive.read_string()?,
            // not archived as an enum even in the tagged encodings
            group: MaterialGroup::from_primitive(archive.read_byte()?),
            color: archive.read_color()?,
            smooth_angle: archive.read_float()?,
            texture: archive.read_string()?,
            texture_scale: parse_vec2(&archive.read_string()?),
            texture_anim_fps: archive.read_float()?,
            texture_anim_map_mode: archive.read_byte()?,
            texture_anim_map_dir: parse_vec2(&archive.read_string()?),
            disable_collision: archive.read_bool()?,
            disable_lightmap: archive.read_bool()?,
            ..Material::default()
        };

        if object.version == MATERIAL_VERSION_G1 {
            mat.dont_collapse = archive.read_bool()?;
            mat.detail_object = archive.read_string()?;
            mat.default_mapping = archive.read_vec2()?;
            mat.alpha_function = AlphaFunction::Test;
        } else {
            mat.dont_collapse = archive.read_byte()? != 0;
            mat.detail_object = archive.read_string()?;
            mat.detail_texture_scale = archive.read_float()?;
            mat.force_occluder = archive.read_bool()?;
            mat.environment_mapping = archive.read_byte()?;
            mat.environment_mapping_strength = archive.read_float()?;
            mat.wave_mode = archive.read_byte()?;
            mat.wave_speed = archive.read_byte()?;
            mat.wave_max_amplitude = archive.read_float()?;
            mat.wave_grid_size = archive.read_float()?;
            mat.ignore_sun = archive.read_bool()?;
            mat.alpha_function = AlphaFunction::from_raw(archive.read_byte()? as u32);
            mat.default_mapping = archive.read_vec2()?;
        }

        if !archive.read_object_end()? {
            log::warn!("not all data consumed of material {:?}", mat.name);
            archive.skip_object(true)?;
        }

        Ok(mat)
    }
}

fn parse_vec2(value: &str) -> Vec2 {
    let mut parts = value.split_whitespace();
    let x = parts.next().and_then(|v| v.parse().ok()).unwrap_or(0.0);
    let y = parts.next().and_then(|v| v.parse().ok()).unwrap_or(0.0);
    Vec2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g1_material_archive() -> ztk_io::Buffer {
        let text = "\
ZenGin Archive
ver 1
zCArchiverGeneric
ASCII
saveGame 0
END
objects 1
END

\tslot=string:DEFAULT
[% zCMaterial 17408 0]
\tname=string:OWODWAPLANKS
\tmatGroup=int:3
\tcolor=color:110 90 70 255
\tsmoothAngle=float:60
\ttexture=string:OWODWAPLANKS.TGA
\ttexScale=string:256 256
\ttexAniFPS=float:0
\ttexAniMapMode=int:0
\ttexAniMapDir=string:9.9 0
\tnoCollDet=bool:0
\tnoLightmap=bool:0
\tlodDontCollapse=bool:1
\tdetailObject=string:
\tdefaultMapping=rawFloat:2.34 2.34
[]
";
        ztk_io::Buffer::from_vec(text.as_bytes().to_vec())
    }

    #[test]
    fn g1_schema_parses() {
        let mut archive = ztk_archive::open(g1_material_archive()).unwrap();
        let mat = Material::parse(archive.as_mut()).unwrap();

        assert_eq!(mat.name, "OWODWAPLANKS");
        assert_eq!(mat.group, MaterialGroup::Wood);
        assert_eq!(mat.texture, "OWODWAPLANKS.TGA");
        assert_eq!(mat.texture_scale, Vec2::splat(256.0));
        assert_eq!(mat.texture_anim_map_dir, Vec2::new(9.9, 0.0));
        assert!(mat.dont_collapse);
        assert_eq!(mat.default_mapping, Vec2::splat(2.34));
        assert_eq!(mat.alpha_function, AlphaFunction::Test);
    }

    #[test]
    fn out_of_range_groups_collapse_to_none() {
        assert_eq!(MaterialGroup::from_primitive(200), MaterialGroup::None);
        assert_eq!(MaterialGroup::from_primitive(5), MaterialGroup::Water);
    }
}
