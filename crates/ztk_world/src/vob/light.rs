use num_enum::TryFromPrimitive;

use ztk_archive::ArchiveRead;
use ztk_primitives::Color;

use crate::vob::{decode_enum, Vob};
use crate::world::GameVersion;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum LightMode {
    Point = 0,
    Spot = 1,
    Reserved0 = 2,
    Reserved1 = 3,
}

impl Default for LightMode {
    fn default() -> Self {
        Self::Point
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum LightQuality {
    High = 0,
    Medium = 1,
    Low = 2,
}

impl Default for LightQuality {
    fn default() -> Self {
        Self::Low
    }
}

/// The shared field block of light vobs and light presets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightPreset {
    pub preset: String,
    pub light_type: LightMode,
    pub range: f32,
    pub color: Color,
    pub cone_angle: f32,
    pub is_static: bool,
    pub quality: LightQuality,
    pub lensflare_fx: String,
    pub on: bool,
    pub range_animation_scale: Vec<f32>,
    pub range_animation_fps: f32,
    pub range_animation_smooth: bool,
    pub color_animation_list: Vec<Color>,
    pub color_animation_fps: f32,
    pub color_animation_smooth: bool,
    pub can_move: bool,
}

impl LightPreset {
    pub(crate) fn parse(
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<LightPreset> {
        let mut preset = LightPreset {
            preset: archive.read_string()?, // lightPresetInUse
            light_type: decode_enum("light type", archive.read_enum()?)?, // lightType
            range: archive.read_float()?,   // range
            color: archive.read_color()?,   // color
            cone_angle: archive.read_float()?, // spotConeAngle
            is_static: archive.read_bool()?, // lightStatic
            quality: decode_enum("light quality", archive.read_enum()?)?, // lightQuality
            lensflare_fx: archive.read_string()?, // lensflareFX
            ..LightPreset::default()
        };

        if !preset.is_static {
            preset.on = archive.read_bool()?; // turnedOn
            let range_animation_scale = archive.read_string()?; // rangeAniScale
            preset.range_animation_fps = archive.read_float()?; // rangeAniFPS
            preset.range_animation_smooth = archive.read_bool()?; // rangeAniSmooth
            let color_animation_list = archive.read_string()?; // colorAniList
            preset.color_animation_fps = archive.read_float()?; // colorAniFPS
            preset.color_animation_smooth = archive.read_bool()?; // colorAniSmooth

            preset.range_animation_scale = range_animation_scale
                .split_whitespace()
                .filter_map(|v| v.parse().ok())
                .collect();

            preset.color_animation_list = parse_color_animation(&color_animation_list);

            if version == GameVersion::Gothic2 {
                preset.can_move = archive.read_bool()?; // canMove
            }
        }

        Ok(preset)
    }
}

/// The color animation list is written as `(r g b) (r g b) …`.
fn parse_color_animation(list: &str) -> Vec<Color> {
    let mut colors = Vec::new();
    let mut channels = list
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .filter(|s| !s.is_empty())
        .filter_map(|v| v.parse::<u32>().ok());

    while let (Some(r), Some(g), Some(b)) = (channels.next(), channels.next(), channels.next()) {
        colors.push(Color::new(r as u8, g as u8, b as u8, 0));
    }

    colors
}

/// A light source vob (`zCVobLight`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VobLight {
    pub preset: LightPreset,
}

impl VobLight {
    pub(crate) fn parse(
        vob: &mut Vob,
        archive: &mut dyn ArchiveRead,
        version: GameVersion,
    ) -> Result<VobLight> {
        vob.parse_base(archive, version)?;
        Ok(VobLight {
            preset: LightPreset::parse(archive, version)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_animation_lists_parse_triples() {
        let colors = parse_color_animation("(255 0 0) (0 255 0) (0 0 255)");
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0], Color::new(255, 0, 0, 0));
        assert_eq!(colors[2], Color::new(0, 0, 255, 0));

        assert!(parse_color_animation("").is_empty());
    }
}
