//! Bitmap fonts (`.FNT`): a glyph atlas name plus per-glyph widths and
//! UV rectangles into it.

use glam::Vec2;

use ztk_io::{Buffer, BufferError};

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("version mismatch: expected version 1, got {0:?}")]
    VersionMismatch(String),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

pub type Result<T> = std::result::Result<T, FontError>;

/// One glyph: its advance width and the UV rectangle in the atlas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Glyph {
    pub width: u8,
    pub uv: [Vec2; 2],
}

#[derive(Debug, Clone, Default)]
pub struct Font {
    pub name: String,
    pub height: u32,
    pub glyphs: Vec<Glyph>,
}

impl Font {
    pub fn parse(buf: &mut Buffer) -> Result<Font> {
        let version = buf.get_line(true)?;
        if version != "1" {
            return Err(FontError::VersionMismatch(version));
        }

        let name = buf.get_line(false)?;
        let height = buf.get_u32()?;

        let mut glyphs = vec![Glyph::default(); buf.get_u32()? as usize];

        for glyph in &mut glyphs {
            glyph.width = buf.get_u8()?;
        }
        for glyph in &mut glyphs {
            glyph.uv[0] = buf.get_vec2()?;
        }
        for glyph in &mut glyphs {
            glyph.uv[1] = buf.get_vec2()?;
        }

        Ok(Font {
            name,
            height,
            glyphs,
        })
    }
}
