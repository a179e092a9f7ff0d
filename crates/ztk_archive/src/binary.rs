use glam::{Mat3, Vec2, Vec3};

use ztk_io::Buffer;
use ztk_primitives::{Aabb, Color};

use crate::header::read_object_count;
use crate::{ArchiveHeader, ArchiveObject, ArchiveRead, Result};

/// Fixed-width reader (`zCArchiverGeneric` in `BINARY` mode).
///
/// Values carry no type tags; the caller must know the class schema.
/// Object begin markers are length-prefixed, which lets this reader skip
/// whole subtrees by seeking.
pub struct BinaryReader {
    buf: Buffer,
    header: ArchiveHeader,
    objects: u32,
    object_end: Vec<usize>,
}

impl BinaryReader {
    pub(crate) fn new(mut buf: Buffer, header: ArchiveHeader) -> Result<Self> {
        let objects = read_object_count(&mut buf)?;
        Ok(Self {
            buf,
            header,
            objects,
            object_end: Vec::new(),
        })
    }

    /// The object count declared by the archive header.
    pub fn declared_objects(&self) -> u32 {
        self.objects
    }
}

impl ArchiveRead for BinaryReader {
    fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    fn buffer(&mut self) -> &mut Buffer {
        &mut self.buf
    }

    fn read_object_begin(&mut self) -> Result<Option<ArchiveObject>> {
        if self.buf.remaining() < 12 {
            return Ok(None);
        }

        let position = self.buf.position();
        let result = (|| -> Result<ArchiveObject> {
            let chunk_size = self.buf.get_u32()? as usize;
            let version = self.buf.get_u16()?;
            let index = self.buf.get_u32()?;
            let object_name = self.buf.get_line(false)?;
            let class_name = self.buf.get_line(false)?;

            self.object_end.push(position + chunk_size);
            Ok(ArchiveObject {
                object_name,
                class_name,
                version,
                index,
            })
        })();

        match result {
            Ok(object) => Ok(Some(object)),
            Err(_) => {
                self.buf.set_position(position)?;
                Ok(None)
            }
        }
    }

    fn read_object_end(&mut self) -> Result<bool> {
        if self.object_end.last() == Some(&self.buf.position()) {
            self.object_end.pop();
            return Ok(true);
        }

        Ok(self.buf.remaining() == 0)
    }

    fn skip_entry(&mut self) -> Result<()> {
        // untyped encoding: single values cannot be skipped blindly
        Err(crate::ArchiveError::InvalidEntry(
            "binary archives are skipped by object extent".to_string(),
        ))
    }

    fn skip_object(&mut self, skip_current: bool) -> Result<()> {
        if skip_current {
            if let Some(end) = self.object_end.pop() {
                self.buf.set_position(end)?;
            }
        } else {
            let size = self.buf.get_u32()? as usize;
            self.buf.skip(size - 4)?;
        }
        Ok(())
    }

    fn read_string(&mut self) -> Result<String> {
        Ok(self.buf.get_line(false)?)
    }

    fn read_int(&mut self) -> Result<i32> {
        Ok(self.buf.get_i32()?)
    }

    fn read_float(&mut self) -> Result<f32> {
        Ok(self.buf.get_f32()?)
    }

    fn read_byte(&mut self) -> Result<u8> {
        Ok(self.buf.get_u8()?)
    }

    fn read_word(&mut self) -> Result<u16> {
        Ok(self.buf.get_u16()?)
    }

    fn read_enum(&mut self) -> Result<u32> {
        Ok(self.buf.get_u32()?)
    }

    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.buf.get_u32()? != 0)
    }

    fn read_color(&mut self) -> Result<Color> {
        let b = self.buf.get_u8()?;
        let g = self.buf.get_u8()?;
        let r = self.buf.get_u8()?;
        let a = self.buf.get_u8()?;
        Ok(Color { r, g, b, a })
    }

    fn read_vec2(&mut self) -> Result<Vec2> {
        Ok(self.buf.get_vec2()?)
    }

    fn read_vec3(&mut self) -> Result<Vec3> {
        Ok(self.buf.get_vec3()?)
    }

    fn read_bbox(&mut self) -> Result<Aabb> {
        Ok(self.buf.get_bbox()?)
    }

    fn read_mat3x3(&mut self) -> Result<Mat3> {
        Ok(self.buf.get_mat3x3()?)
    }

    fn read_raw_bytes(&mut self, size: usize) -> Result<Buffer> {
        Ok(self.buf.extract(size)?)
    }
}
