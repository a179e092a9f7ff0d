//! Byte-level input for every ZenGin parser.
//!
//! [`Buffer`] is a cursor over a shared, immutable byte backing. Sub-buffers
//! created through [`Buffer::slice`], [`Buffer::slice_at`] and
//! [`Buffer::extract`] share the backing and carry their own position, which
//! is what makes the chunked container formats cheap to walk.

pub mod buffer;
pub mod compat;
pub mod write;

pub use buffer::{Buffer, BufferError};
pub use write::WriteExt;

pub type BufferResult<T> = Result<T, BufferError>;
