//! ZTEX texture containers.
//!
//! Parses the `ZTEX` header, the optional 256-entry palette and the
//! smallest-first mipmap payloads, and converts every supported pixel
//! format to canonical row-major RGBA8.

mod dds;
mod dxt;
mod format;
mod texture;

pub use dds::to_dds;
pub use format::TextureFormat;
pub use texture::Texture;

use ztk_io::BufferError;

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("invalid ZTEX signature")]
    InvalidSignature,
    #[error("unsupported ZTEX version {0}")]
    UnsupportedVersion(u32),
    #[error("unknown texture format {0}")]
    UnknownFormat(u32),
    #[error("cannot convert {0:?} to RGBA8")]
    ConversionUnsupported(TextureFormat),
    #[error("no mipmap level {0}")]
    NoSuchMipmap(u32),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error("DDS assembly failed: {0}")]
    Dds(#[from] ddsfile::Error),
}

pub type Result<T> = std::result::Result<T, TextureError>;
