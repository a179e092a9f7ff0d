use ztk_io::Buffer;
use ztk_primitives::Color;

use crate::{dxt, Result, TextureError, TextureFormat};

pub(crate) const ZTEX_SIGNATURE: &str = "ZTEX";
const PALETTE_ENTRIES: usize = 256;

const FIVE_BIT_SCALE: f32 = 8.225_806_5;
const SIX_BIT_SCALE: f32 = 4.047_619;

/// A parsed ZTEX texture.
///
/// Mipmap payloads keep the on-disk order (smallest level first);
/// [`Texture::data`] and [`Texture::as_rgba8`] address them with level 0
/// being the full-size image.
#[derive(Debug, Clone)]
pub struct Texture {
    format: TextureFormat,
    width: u32,
    height: u32,
    reference_width: u32,
    reference_height: u32,
    mipmap_count: u32,
    average_color: u32,
    palette: Vec<Color>,
    levels: Vec<Vec<u8>>,
}

impl Texture {
    pub fn parse(buf: &mut Buffer) -> Result<Self> {
        if buf.get_string(4)? != ZTEX_SIGNATURE {
            return Err(TextureError::InvalidSignature);
        }

        let version = buf.get_u32()?;
        if version != 0 {
            return Err(TextureError::UnsupportedVersion(version));
        }

        let raw_format = buf.get_u32()?;
        let format = TextureFormat::try_from(raw_format)
            .map_err(|_| TextureError::UnknownFormat(raw_format))?;

        let width = buf.get_u32()?;
        let height = buf.get_u32()?;
        let mipmap_count = buf.get_u32()?.max(1);
        let reference_width = buf.get_u32()?;
        let reference_height = buf.get_u32()?;
        let average_color = buf.get_u32()?;

        let mut palette = Vec::new();
        if format == TextureFormat::P8 {
            palette.reserve(PALETTE_ENTRIES);
            for _ in 0..PALETTE_ENTRIES {
                let b = buf.get_u8()?;
                let g = buf.get_u8()?;
                let r = buf.get_u8()?;
                let a = buf.get_u8()?;
                palette.push(Color { r, g, b, a });
            }
        }

        // lowest mipmap level first
        let mut levels = Vec::with_capacity(mipmap_count as usize);
        for level in (0..mipmap_count).rev() {
            let size = format.mipmap_size(width, height, level);
            levels.push(buf.get_bytes(size)?);
        }

        Ok(Self {
            format,
            width,
            height,
            reference_width,
            reference_height,
            mipmap_count,
            average_color,
            palette,
            levels,
        })
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn reference_width(&self) -> u32 {
        self.reference_width
    }

    pub fn reference_height(&self) -> u32 {
        self.reference_height
    }

    pub fn mipmap_count(&self) -> u32 {
        self.mipmap_count
    }

    /// The precomputed average color in ARGB order.
    pub fn average_color(&self) -> u32 {
        self.average_color
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn mipmap_width(&self, level: u32) -> u32 {
        (self.width >> level).max(1)
    }

    pub fn mipmap_height(&self, level: u32) -> u32 {
        (self.height >> level).max(1)
    }

    /// Raw payload of a mipmap level, level 0 being the largest.
    pub fn data(&self, level: u32) -> Result<&[u8]> {
        let index = self
            .levels
            .len()
            .checked_sub(1 + level as usize)
            .ok_or(TextureError::NoSuchMipmap(level))?;
        Ok(&self.levels[index])
    }

    /// Converts a mipmap level to row-major RGBA8.
    pub fn as_rgba8(&self, level: u32) -> Result<Vec<u8>> {
        let map = self.data(level)?;
        let width = self.mipmap_width(level) as usize;
        let height = self.mipmap_height(level) as usize;

        let converted = match self.format {
            TextureFormat::Dxt1 => dxt::decode_dxt1(map, width, height),
            TextureFormat::Dxt2 | TextureFormat::Dxt3 => dxt::decode_dxt3(map, width, height),
            TextureFormat::Dxt4 | TextureFormat::Dxt5 => dxt::decode_dxt5(map, width, height),
            TextureFormat::R8G8B8A8 => map.to_vec(),
            TextureFormat::B8G8R8A8 => swizzle4(map, [2, 1, 0, 3]),
            TextureFormat::A8B8G8R8 => swizzle4(map, [3, 2, 1, 0]),
            TextureFormat::A8R8G8B8 => swizzle4(map, [1, 2, 3, 0]),
            TextureFormat::R8G8B8 => expand3(map, [0, 1, 2]),
            TextureFormat::B8G8R8 => expand3(map, [2, 1, 0]),
            TextureFormat::R5G6B5 => {
                let mut out = Vec::with_capacity(map.len() * 2);
                for pair in map.chunks_exact(2) {
                    let v = u16::from_le_bytes([pair[0], pair[1]]);
                    out.push((((v >> 11) & 0x1F) as f32 * FIVE_BIT_SCALE) as u8);
                    out.push((((v >> 5) & 0x3F) as f32 * SIX_BIT_SCALE) as u8);
                    out.push(((v & 0x1F) as f32 * FIVE_BIT_SCALE) as u8);
                    out.push(0xFF);
                }
                out
            }
            TextureFormat::A1R5G5B5 => {
                let mut out = Vec::with_capacity(map.len() * 2);
                for pair in map.chunks_exact(2) {
                    let v = u16::from_le_bytes([pair[0], pair[1]]);
                    out.push((((v >> 10) & 0x1F) as f32 * FIVE_BIT_SCALE) as u8);
                    out.push((((v >> 5) & 0x1F) as f32 * FIVE_BIT_SCALE) as u8);
                    out.push(((v & 0x1F) as f32 * FIVE_BIT_SCALE) as u8);
                    out.push(if v & 0x8000 != 0 { 0xFF } else { 0x00 });
                }
                out
            }
            TextureFormat::A4R4G4B4 => {
                let mut out = Vec::with_capacity(map.len() * 2);
                for pair in map.chunks_exact(2) {
                    let v = u16::from_le_bytes([pair[0], pair[1]]);
                    out.push((((v >> 8) & 0xF) * 0x11) as u8);
                    out.push((((v >> 4) & 0xF) * 0x11) as u8);
                    out.push(((v & 0xF) * 0x11) as u8);
                    out.push((((v >> 12) & 0xF) * 0x11) as u8);
                }
                out
            }
            TextureFormat::P8 => {
                let mut out = Vec::with_capacity(map.len() * 4);
                for &index in map {
                    let entry = self.palette[index as usize];
                    out.extend_from_slice(&[entry.r, entry.g, entry.b, entry.a]);
                }
                out
            }
        };

        Ok(converted)
    }
}

fn swizzle4(map: &[u8], order: [usize; 4]) -> Vec<u8> {
    let mut out = Vec::with_capacity(map.len());
    for px in map.chunks_exact(4) {
        out.extend_from_slice(&[px[order[0]], px[order[1]], px[order[2]], px[order[3]]]);
    }
    out
}

fn expand3(map: &[u8], order: [usize; 3]) -> Vec<u8> {
    let mut out = Vec::with_capacity(map.len() / 3 * 4);
    for px in map.chunks_exact(3) {
        out.extend_from_slice(&[px[order[0]], px[order[1]], px[order[2]], 0xFF]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ztk_io::WriteExt;

    fn ztex_header(out: &mut Vec<u8>, format: TextureFormat, w: u32, h: u32, mipmaps: u32) {
        out.put_string("ZTEX").unwrap();
        out.put_u32(0).unwrap(); // version
        out.put_u32(u32::from(format)).unwrap();
        out.put_u32(w).unwrap();
        out.put_u32(h).unwrap();
        out.put_u32(mipmaps).unwrap();
        out.put_u32(w).unwrap(); // reference size
        out.put_u32(h).unwrap();
        out.put_u32(0xFF112233).unwrap(); // average color
    }

    #[test]
    fn parses_rgba_with_mip_chain() {
        let mut raw = Vec::new();
        ztex_header(&mut raw, TextureFormat::R8G8B8A8, 4, 4, 2);
        raw.extend_from_slice(&[1u8; 2 * 2 * 4]); // level 1, stored first
        raw.extend_from_slice(&[2u8; 4 * 4 * 4]); // level 0

        let tex = Texture::parse(&mut Buffer::from_vec(raw)).unwrap();
        assert_eq!(tex.mipmap_count(), 2);
        assert_eq!(tex.average_color(), 0xFF112233);
        assert_eq!(tex.data(0).unwrap(), &[2u8; 64][..]);
        assert_eq!(tex.data(1).unwrap(), &[1u8; 16][..]);
        assert_eq!(tex.as_rgba8(0).unwrap().len(), 4 * 4 * 4);
        assert_eq!(tex.as_rgba8(1).unwrap().len(), 2 * 2 * 4);
    }

    #[test]
    fn palette_lookup_produces_rgba() {
        let mut raw = Vec::new();
        ztex_header(&mut raw, TextureFormat::P8, 2, 1, 1);

        // palette entry 0 stored as BGRA on disk
        raw.extend_from_slice(&[10, 20, 30, 40]);
        raw.extend_from_slice(&[0u8; 4 * 255]);
        raw.extend_from_slice(&[0, 0]); // two indexed texels

        let tex = Texture::parse(&mut Buffer::from_vec(raw)).unwrap();
        assert_eq!(
            tex.as_rgba8(0).unwrap(),
            vec![30, 20, 10, 40, 30, 20, 10, 40]
        );
    }

    #[test]
    fn r5g6b5_expansion_uses_channel_scales() {
        let mut raw = Vec::new();
        ztex_header(&mut raw, TextureFormat::R5G6B5, 1, 1, 1);
        raw.extend_from_slice(&0xFFFFu16.to_le_bytes());

        let tex = Texture::parse(&mut Buffer::from_vec(raw)).unwrap();
        assert_eq!(tex.as_rgba8(0).unwrap(), vec![255, 255, 255, 255]);
    }

    #[test]
    fn rejects_wrong_signature() {
        let mut raw = Vec::new();
        raw.put_string("NOPE").unwrap();
        raw.extend_from_slice(&[0u8; 32]);
        assert!(matches!(
            Texture::parse(&mut Buffer::from_vec(raw)),
            Err(TextureError::InvalidSignature)
        ));
    }

    #[test]
    fn dxt1_level_sizes() {
        let mut raw = Vec::new();
        ztex_header(&mut raw, TextureFormat::Dxt1, 8, 8, 2);
        raw.extend_from_slice(&[0u8; 8]); // 4x4 level: one block
        raw.extend_from_slice(&[0u8; 32]); // 8x8 level: four blocks

        let tex = Texture::parse(&mut Buffer::from_vec(raw)).unwrap();
        assert_eq!(tex.as_rgba8(0).unwrap().len(), 8 * 8 * 4);
        assert_eq!(tex.as_rgba8(1).unwrap().len(), 4 * 4 * 4);
    }
}
