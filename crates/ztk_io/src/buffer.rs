use std::io;
use std::path::Path;
use std::sync::Arc;

use byteorder::{ByteOrder, LE};
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use ztk_primitives::{Aabb, FileDate, Obb};

use crate::BufferResult;

#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("buffer underflow at byte {position} while reading {size} additional bytes")]
    Underflow { position: usize, size: usize },
    #[error("buffer overflow at byte {position} while writing {size} additional bytes")]
    Overflow { position: usize, size: usize },
}

/// A read cursor over a reference-counted byte backing.
///
/// Invariant: `0 <= position <= limit <= capacity`. All positions are
/// relative to the buffer's window into the backing; sub-buffers share the
/// backing allocation and never copy data.
#[derive(Debug, Clone)]
pub struct Buffer {
    backing: Arc<[u8]>,
    begin: usize,
    limit: usize,
    capacity: usize,
    position: usize,
    mark: Option<usize>,
}

impl Buffer {
    /// Wraps an owned byte vector.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let backing: Arc<[u8]> = data.into();
        let len = backing.len();
        Self {
            backing,
            begin: 0,
            limit: len,
            capacity: len,
            position: 0,
            mark: None,
        }
    }

    /// Reads the file at `path` fully into memory.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::from_vec(std::fs::read(path)?))
    }

    pub fn empty() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Bytes left between the position and the limit.
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) -> BufferResult<()> {
        if position > self.limit {
            return Err(BufferError::Underflow { position, size: 0 });
        }
        if self.mark.is_some_and(|m| m > position) {
            self.mark = None;
        }
        self.position = position;
        Ok(())
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Narrows the usable end of the buffer. The position is clamped and a
    /// mark beyond the new limit is discarded.
    pub fn set_limit(&mut self, limit: usize) -> BufferResult<()> {
        if limit > self.capacity {
            return Err(BufferError::Underflow {
                position: limit,
                size: 0,
            });
        }
        self.position = self.position.min(limit);
        self.limit = limit;
        if self.mark.is_some_and(|m| m > limit) {
            self.mark = None;
        }
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remembers the current position for a later [`Buffer::reset`].
    pub fn mark(&mut self) {
        self.mark = Some(self.position);
    }

    pub fn reset(&mut self) {
        if let Some(mark) = self.mark {
            self.position = mark;
        }
    }

    pub fn skip(&mut self, size: usize) -> BufferResult<()> {
        self.set_position(self.position + size)
    }

    /// The window between position 0 and the limit.
    pub fn as_bytes(&self) -> &[u8] {
        &self.backing[self.begin..self.begin + self.limit]
    }

    /// A sub-buffer spanning from the current position to the limit. The
    /// parent position does not move.
    pub fn slice(&self) -> Buffer {
        Buffer {
            backing: Arc::clone(&self.backing),
            begin: self.begin + self.position,
            limit: self.remaining(),
            capacity: self.remaining(),
            position: 0,
            mark: None,
        }
    }

    /// A sub-buffer of `size` bytes starting at `index`, independent of the
    /// current position.
    pub fn slice_at(&self, index: usize, size: usize) -> BufferResult<Buffer> {
        if index + size > self.limit {
            return Err(BufferError::Underflow {
                position: index,
                size,
            });
        }

        Ok(Buffer {
            backing: Arc::clone(&self.backing),
            begin: self.begin + index,
            limit: size,
            capacity: size,
            position: 0,
            mark: None,
        })
    }

    /// Slices `size` bytes at the current position and advances past them.
    /// This is the chunking primitive of every sectioned container.
    pub fn extract(&mut self, size: usize) -> BufferResult<Buffer> {
        let sub = self.slice_at(self.position, size)?;
        self.position += size;
        Ok(sub)
    }

    fn take(&mut self, size: usize) -> BufferResult<&[u8]> {
        if self.remaining() < size {
            return Err(BufferError::Underflow {
                position: self.position,
                size,
            });
        }

        let start = self.begin + self.position;
        self.position += size;
        Ok(&self.backing[start..start + size])
    }

    /// Copies `dst.len()` bytes into `dst` and advances.
    pub fn get(&mut self, dst: &mut [u8]) -> BufferResult<()> {
        let src = self.take(dst.len())?;
        dst.copy_from_slice(src);
        Ok(())
    }

    pub fn get_bytes(&mut self, size: usize) -> BufferResult<Vec<u8>> {
        Ok(self.take(size)?.to_vec())
    }

    pub fn get_u8(&mut self) -> BufferResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn get_i8(&mut self) -> BufferResult<i8> {
        Ok(self.get_u8()? as i8)
    }

    pub fn get_u16(&mut self) -> BufferResult<u16> {
        Ok(LE::read_u16(self.take(2)?))
    }

    pub fn get_i16(&mut self) -> BufferResult<i16> {
        Ok(LE::read_i16(self.take(2)?))
    }

    pub fn get_u32(&mut self) -> BufferResult<u32> {
        Ok(LE::read_u32(self.take(4)?))
    }

    pub fn get_i32(&mut self) -> BufferResult<i32> {
        Ok(LE::read_i32(self.take(4)?))
    }

    pub fn get_u64(&mut self) -> BufferResult<u64> {
        Ok(LE::read_u64(self.take(8)?))
    }

    pub fn get_i64(&mut self) -> BufferResult<i64> {
        Ok(LE::read_i64(self.take(8)?))
    }

    pub fn get_f32(&mut self) -> BufferResult<f32> {
        Ok(LE::read_f32(self.take(4)?))
    }

    pub fn get_f64(&mut self) -> BufferResult<f64> {
        Ok(LE::read_f64(self.take(8)?))
    }

    /// Reads exactly `size` bytes as text. Bytes above 0x7F are taken as
    /// Latin-1 so that the single-byte encodings used by the engine survive
    /// the conversion losslessly.
    pub fn get_string(&mut self, size: usize) -> BufferResult<String> {
        let bytes = self.take(size)?;
        Ok(latin1(bytes))
    }

    /// Reads a line terminated by CR, LF or NUL. The terminator itself is
    /// consumed exactly once; with `skip_whitespace` any directly following
    /// whitespace run is consumed as well.
    pub fn get_line(&mut self, skip_whitespace: bool) -> BufferResult<String> {
        let rest = &self.backing[self.begin + self.position..self.begin + self.limit];
        let end = match memchr::memchr3(b'\r', b'\n', b'\0', rest) {
            Some(i) => i,
            None => {
                return Err(BufferError::Underflow {
                    position: self.limit,
                    size: 1,
                })
            }
        };

        let line = latin1(&rest[..end]);
        self.position += end + 1;

        if skip_whitespace {
            while self.remaining() > 0 {
                let c = self.backing[self.begin + self.position];
                if !matches!(c, b' ' | b'\x0c' | b'\n' | b'\r' | b'\t' | b'\x0b') {
                    break;
                }
                self.position += 1;
            }
        }

        Ok(line)
    }

    /// Like [`Buffer::get_line`] but additionally resolves the `\n` and `\t`
    /// escapes used by compiled script string literals.
    pub fn get_line_escaped(&mut self, skip_whitespace: bool) -> BufferResult<String> {
        let line = self.get_line(skip_whitespace)?;
        let mut out = String::with_capacity(line.len());
        let mut chars = line.chars();

        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }

            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        }

        Ok(out)
    }

    pub fn get_vec2(&mut self) -> BufferResult<Vec2> {
        Ok(Vec2::new(self.get_f32()?, self.get_f32()?))
    }

    pub fn get_vec3(&mut self) -> BufferResult<Vec3> {
        Ok(Vec3::new(self.get_f32()?, self.get_f32()?, self.get_f32()?))
    }

    pub fn get_vec4(&mut self) -> BufferResult<Vec4> {
        Ok(Vec4::new(
            self.get_f32()?,
            self.get_f32()?,
            self.get_f32()?,
            self.get_f32()?,
        ))
    }

    /// Reads a row-major 3x3 matrix into glam's column-major layout.
    pub fn get_mat3x3(&mut self) -> BufferResult<Mat3> {
        let mut values = [0.0f32; 9];
        for value in &mut values {
            *value = self.get_f32()?;
        }
        Ok(Mat3::from_cols_array(&values).transpose())
    }

    /// Reads a row-major 4x4 matrix into glam's column-major layout.
    pub fn get_mat4x4(&mut self) -> BufferResult<Mat4> {
        let mut values = [0.0f32; 16];
        for value in &mut values {
            *value = self.get_f32()?;
        }
        Ok(Mat4::from_cols_array(&values).transpose())
    }

    pub fn get_bbox(&mut self) -> BufferResult<Aabb> {
        Ok(Aabb {
            min: self.get_vec3()?,
            max: self.get_vec3()?,
        })
    }

    pub fn get_obb(&mut self) -> BufferResult<Obb> {
        let mut obb = Obb {
            center: self.get_vec3()?,
            axes: [self.get_vec3()?, self.get_vec3()?, self.get_vec3()?],
            half_width: self.get_vec3()?,
            children: Vec::new(),
        };

        let child_count = self.get_u16()?;
        for _ in 0..child_count {
            obb.children.push(self.get_obb()?);
        }

        Ok(obb)
    }

    pub fn get_date(&mut self) -> BufferResult<FileDate> {
        let date = FileDate {
            year: self.get_u32()?,
            month: self.get_u16()?,
            day: self.get_u16()?,
            hour: self.get_u16()?,
            minute: self.get_u16()?,
            second: self.get_u16()?,
        };
        self.skip(2)?;
        Ok(date)
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(bytes: &[u8]) -> Buffer {
        Buffer::from_vec(bytes.to_vec())
    }

    #[test]
    fn scalars_are_little_endian() {
        let mut b = buf(&[0x01, 0x02, 0x03, 0x04, 0x2a, 0x00, 0x00, 0x00]);
        assert_eq!(b.get_u32().unwrap(), 0x04030201);
        assert_eq!(b.get_i32().unwrap(), 42);
        assert_eq!(b.remaining(), 0);
        assert!(matches!(
            b.get_u8(),
            Err(BufferError::Underflow { position: 8, size: 1 })
        ));
    }

    #[test]
    fn slice_shares_backing_without_moving_parent() {
        let b = buf(b"abcdefgh");
        let s = b.slice_at(2, 3).unwrap();
        assert_eq!(s.remaining(), 3);
        assert_eq!(s.as_bytes(), b"cde");
        assert_eq!(b.position(), 0);

        assert!(b.slice_at(6, 3).is_err());
    }

    #[test]
    fn extract_advances_parent() {
        let mut b = buf(b"abcdefgh");
        let mut chunk = b.extract(4).unwrap();
        assert_eq!(b.position(), 4);
        assert_eq!(chunk.get_string(4).unwrap(), "abcd");
        assert_eq!(chunk.remaining(), 0);
    }

    #[test]
    fn slice_matches_bulk_get() {
        let b = buf(b"0123456789");
        for (index, size) in [(0usize, 4usize), (3, 3), (9, 1), (2, 0)] {
            let sub = b.slice_at(index, size).unwrap();
            assert_eq!(sub.remaining(), size);
            assert_eq!(sub.as_bytes(), &b.as_bytes()[index..index + size]);
        }
    }

    #[test]
    fn limit_clamps_position_and_mark() {
        let mut b = buf(b"abcdefgh");
        b.set_position(6).unwrap();
        b.mark();
        b.set_limit(4).unwrap();
        assert_eq!(b.position(), 4);
        assert_eq!(b.remaining(), 0);

        // the old mark must not survive the narrowed window
        b.set_position(0).unwrap();
        b.reset();
        assert_eq!(b.position(), 0);

        assert!(b.set_limit(100).is_err());
    }

    #[test]
    fn lines_consume_one_terminator() {
        let mut b = buf(b"first\r\nsecond\nthird\0rest");
        assert_eq!(b.get_line(false).unwrap(), "first");
        // the \n of the CRLF pair is still there
        assert_eq!(b.get_line(false).unwrap(), "");
        assert_eq!(b.get_line(false).unwrap(), "second");
        assert_eq!(b.get_line(false).unwrap(), "third");
        assert_eq!(b.get_string(4).unwrap(), "rest");
    }

    #[test]
    fn line_whitespace_skipping_stops_at_content() {
        let mut b = buf(b"head\n   \t\r\nbody\n");
        assert_eq!(b.get_line(true).unwrap(), "head");
        assert_eq!(b.get_line(false).unwrap(), "body");
    }

    #[test]
    fn escaped_lines_unescape_in_place() {
        let mut b = buf(b"one\\ntwo\\tthree\n");
        assert_eq!(b.get_line_escaped(false).unwrap(), "one\ntwo\tthree");
    }

    #[test]
    fn mat3_is_transposed_from_row_major() {
        let mut bytes = Vec::new();
        for v in [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }

        let m = buf(&bytes).get_mat3x3().unwrap();
        // first disk row becomes the first matrix row
        assert_eq!(m.row(0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.col(0), Vec3::new(1.0, 4.0, 7.0));
    }

    #[test]
    fn obb_reads_children_recursively() {
        let mut bytes = Vec::new();
        let zeros = [0u8; 4 * 15];
        bytes.extend_from_slice(&zeros);
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&zeros);
        bytes.extend_from_slice(&0u16.to_le_bytes());

        let obb = buf(&bytes).get_obb().unwrap();
        assert_eq!(obb.children.len(), 1);
        assert!(obb.children[0].children.is_empty());
    }
}
