//! The VDF virtual filesystem.
//!
//! VDF containers store a flat, depth-first catalog of entries; directory
//! entries point at the table index of their first child and the last
//! sibling of every run is tagged with a bit flag. Parsing rebuilds the
//! tree and hands out zero-copy [`ztk_io::Buffer`] views into the
//! container for every file entry.

mod entry;
mod time;
mod vdf;

pub use entry::{EntryFlags, VdfEntry};
pub use time::{dos_to_unix_time, unix_time_to_dos};
pub use vdf::{VdfFile, VdfHeader};

use ztk_io::BufferError;

#[derive(Debug, thiserror::Error)]
pub enum VdfsError {
    #[error("VDF signature not recognized: {0:?}")]
    UnknownSignature(String),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

pub type Result<T> = std::result::Result<T, VdfsError>;
