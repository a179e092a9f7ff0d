//! ZenGin object archives (`.ZEN`, `.MAT`, `.CSL`, …).
//!
//! An archive is a textual preamble followed by an object graph in one of
//! three encodings. [`open`] sniffs the preamble and returns a boxed
//! reader; all three encodings implement the same [`ArchiveRead`]
//! interface so consumers never branch on the format for structure —
//! only for the handful of documented field-level quirks.

mod ascii;
mod binary;
mod binsafe;
mod header;

pub use ascii::AsciiReader;
pub use binary::BinaryReader;
pub use binsafe::BinSafeReader;
pub use header::{ArchiveFormat, ArchiveHeader};

use glam::{Mat3, Vec2, Vec3};

use ztk_io::{Buffer, BufferError};
use ztk_primitives::{Aabb, Color};

/// Class name marking a back-reference to an earlier object by index.
pub const REFERENCE_CLASS: &str = "\u{A7}";
/// Class name of an intentionally empty slot.
pub const EMPTY_CLASS: &str = "%";

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("invalid archive header: {0}")]
    InvalidHeader(&'static str),
    #[error("unknown archive format {0:?}")]
    UnknownFormat(String),
    #[error("value type mismatch: expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("malformed archive entry: {0}")]
    InvalidEntry(String),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

impl From<std::num::ParseIntError> for ArchiveError {
    fn from(err: std::num::ParseIntError) -> Self {
        ArchiveError::InvalidEntry(err.to_string())
    }
}

impl From<std::num::ParseFloatError> for ArchiveError {
    fn from(err: std::num::ParseFloatError) -> Self {
        ArchiveError::InvalidEntry(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

/// The begin marker of one archived object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveObject {
    pub object_name: String,
    pub class_name: String,
    pub version: u16,
    pub index: u32,
}

impl ArchiveObject {
    pub fn is_reference(&self) -> bool {
        self.class_name == REFERENCE_CLASS
    }
}

/// The common interface of the three concrete archive readers.
pub trait ArchiveRead {
    fn header(&self) -> &ArchiveHeader;

    /// Direct access to the underlying cursor. World archives embed raw
    /// binary blocks (`MeshAndBsp`) between archived objects which must
    /// be read through this.
    fn buffer(&mut self) -> &mut Buffer;

    /// Tries to consume an object begin marker. On failure the cursor is
    /// restored and `None` is returned.
    fn read_object_begin(&mut self) -> Result<Option<ArchiveObject>>;

    /// Tries to consume an object end marker, restoring the cursor on
    /// failure.
    fn read_object_end(&mut self) -> Result<bool>;

    /// Skips a single value without interpreting it.
    fn skip_entry(&mut self) -> Result<()>;

    /// Consumes exactly one object subtree. With `skip_current` the begin
    /// marker is assumed to be consumed already and only the balance of
    /// the object is discarded.
    fn skip_object(&mut self, skip_current: bool) -> Result<()> {
        let mut level = if skip_current { 1i32 } else { 0 };

        loop {
            if self.read_object_begin()?.is_some() {
                level += 1;
            } else if self.read_object_end()? {
                level -= 1;
            } else {
                self.skip_entry()?;
            }

            if level <= 0 {
                return Ok(());
            }
        }
    }

    fn read_string(&mut self) -> Result<String>;
    fn read_int(&mut self) -> Result<i32>;
    fn read_float(&mut self) -> Result<f32>;
    fn read_byte(&mut self) -> Result<u8>;
    fn read_word(&mut self) -> Result<u16>;
    fn read_enum(&mut self) -> Result<u32>;
    fn read_bool(&mut self) -> Result<bool>;
    fn read_color(&mut self) -> Result<Color>;
    fn read_vec2(&mut self) -> Result<Vec2>;
    fn read_vec3(&mut self) -> Result<Vec3>;
    fn read_bbox(&mut self) -> Result<Aabb>;
    fn read_mat3x3(&mut self) -> Result<Mat3>;

    /// Reads an embedded binary blob as a bounded sub-buffer. `size` is
    /// the caller's expectation; the self-describing encodings use their
    /// own stored length instead.
    fn read_raw_bytes(&mut self, size: usize) -> Result<Buffer>;
}

/// Detects the archive encoding from the preamble and builds the
/// matching reader. The reader state is entirely local to `buf`, which
/// is what allows archives to be embedded inside other containers.
pub fn open(mut buf: Buffer) -> Result<Box<dyn ArchiveRead>> {
    let header = ArchiveHeader::read(&mut buf)?;

    Ok(match header.format {
        ArchiveFormat::Ascii => Box::new(AsciiReader::new(buf, header)?),
        ArchiveFormat::Binary => Box::new(BinaryReader::new(buf, header)?),
        ArchiveFormat::BinSafe => Box::new(BinSafeReader::new(buf, header)?),
    })
}

pub(crate) fn parse_object_marker(line: &str) -> Option<ArchiveObject> {
    let inner = line.trim().strip_prefix('[')?.strip_suffix(']')?;
    let mut parts = inner.split_whitespace();

    let object_name = parts.next()?.to_string();
    let class_name = parts.next()?.to_string();
    let version = parts.next()?.parse().ok()?;
    let index = parts.next()?.parse().ok()?;

    if parts.next().is_some() {
        return None;
    }

    Some(ArchiveObject {
        object_name,
        class_name,
        version,
        index,
    })
}
