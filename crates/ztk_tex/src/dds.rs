use ddsfile::{D3DFormat, Dds, NewD3dParams};

use crate::{Result, Texture, TextureFormat};

/// Packs a parsed ZTEX into a DDS container, largest mipmap level first.
///
/// Block-compressed and direct-mapped pixel formats keep their payload
/// bytes; everything else is converted to RGBA8 per level.
pub fn to_dds(tex: &Texture) -> Result<Vec<u8>> {
    let (format, passthrough) = match tex.format() {
        TextureFormat::Dxt1 => (D3DFormat::DXT1, true),
        TextureFormat::Dxt2 => (D3DFormat::DXT2, true),
        TextureFormat::Dxt3 => (D3DFormat::DXT3, true),
        TextureFormat::Dxt4 => (D3DFormat::DXT4, true),
        TextureFormat::Dxt5 => (D3DFormat::DXT5, true),
        TextureFormat::R5G6B5 => (D3DFormat::R5G6B5, true),
        TextureFormat::A1R5G5B5 => (D3DFormat::A1R5G5B5, true),
        TextureFormat::A4R4G4B4 => (D3DFormat::A4R4G4B4, true),
        TextureFormat::R8G8B8 => (D3DFormat::R8G8B8, true),
        TextureFormat::B8G8R8A8 => (D3DFormat::A8R8G8B8, true),
        TextureFormat::R8G8B8A8 => (D3DFormat::A8B8G8R8, true),
        // paletted and byte-swapped layouts go through the RGBA8 path
        _ => (D3DFormat::A8B8G8R8, false),
    };

    let mut dds = Dds::new_d3d(NewD3dParams {
        height: tex.height(),
        width: tex.width(),
        depth: None,
        format,
        mipmap_levels: (tex.mipmap_count() > 1).then_some(tex.mipmap_count()),
        caps2: None,
    })?;

    let mut data = Vec::new();
    for level in 0..tex.mipmap_count() {
        if passthrough {
            data.extend_from_slice(tex.data(level)?);
        } else {
            data.extend_from_slice(&tex.as_rgba8(level)?);
        }
    }
    dds.data = data;

    let mut out = Vec::new();
    dds.write(&mut out)?;
    Ok(out)
}
