use glam::{Mat3, Vec2, Vec3};

use ztk_io::Buffer;
use ztk_primitives::{Aabb, Color};

use crate::{parse_object_marker, ArchiveError, ArchiveHeader, ArchiveObject, ArchiveRead, Result};

const TYPE_STRING: u8 = 0x1;
const TYPE_INT: u8 = 0x2;
const TYPE_FLOAT: u8 = 0x3;
const TYPE_BYTE: u8 = 0x4;
const TYPE_WORD: u8 = 0x5;
const TYPE_BOOL: u8 = 0x6;
const TYPE_VEC3: u8 = 0x7;
const TYPE_COLOR: u8 = 0x8;
const TYPE_RAW: u8 = 0x9;
const TYPE_RAW_FLOAT: u8 = 0x10;
const TYPE_ENUM: u8 = 0x11;
const TYPE_HASH: u8 = 0x12;

fn type_name(code: u8) -> String {
    let name = match code {
        TYPE_STRING => "string",
        TYPE_INT => "int",
        TYPE_FLOAT => "float",
        TYPE_BYTE => "byte",
        TYPE_WORD => "word",
        TYPE_BOOL => "bool",
        TYPE_VEC3 => "vec3",
        TYPE_COLOR => "color",
        TYPE_RAW => "raw",
        TYPE_RAW_FLOAT => "rawFloat",
        TYPE_ENUM => "enum",
        TYPE_HASH => "hash",
        _ => return format!("unknown (0x{code:02X})"),
    };
    name.to_string()
}

/// Tagged binary reader (`zCArchiverBinSafe`).
///
/// Every value carries a hash of its field name plus a one-byte type
/// code, so shape mismatches are detected at read time instead of
/// silently desynchronizing the cursor.
pub struct BinSafeReader {
    buf: Buffer,
    header: ArchiveHeader,
    objects: u32,
}

impl BinSafeReader {
    pub(crate) fn new(mut buf: Buffer, header: ArchiveHeader) -> Result<Self> {
        let _bs_version = buf.get_u32()?;
        let objects = buf.get_u32()?;
        let hash_table_offset = buf.get_u32()? as usize;

        // The key table only maps hashes back to names; nothing past
        // header validation needs it, so it is read and dropped.
        let position = buf.position();
        buf.set_position(hash_table_offset)?;
        let table_size = buf.get_u32()?;
        for _ in 0..table_size {
            let key_length = buf.get_u16()?;
            let _insertion_index = buf.get_u16()?;
            let _hash = buf.get_u32()?;
            buf.skip(key_length as usize)?;
        }
        buf.set_position(position)?;

        Ok(Self {
            buf,
            header,
            objects,
        })
    }

    /// The object count declared by the archive header.
    pub fn declared_objects(&self) -> u32 {
        self.objects
    }

    /// Consumes a value's hash marker and type code, failing loudly on a
    /// mismatch. For length-prefixed types the stored length is returned.
    fn ensure_entry_meta(&mut self, expected: u8) -> Result<u16> {
        let mut code = self.buf.get_u8()?;
        if code == TYPE_HASH {
            self.buf.skip(4)?;
            code = self.buf.get_u8()?;
        }

        if code != expected {
            return Err(ArchiveError::TypeMismatch {
                expected: type_name(expected),
                found: type_name(code),
            });
        }

        match expected {
            TYPE_STRING | TYPE_RAW | TYPE_RAW_FLOAT => Ok(self.buf.get_u16()?),
            _ => Ok(0),
        }
    }
}

impl ArchiveRead for BinSafeReader {
    fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    fn buffer(&mut self) -> &mut Buffer {
        &mut self.buf
    }

    fn read_object_begin(&mut self) -> Result<Option<ArchiveObject>> {
        if self.buf.remaining() < 6 {
            return Ok(None);
        }

        let position = self.buf.position();
        let result = (|| -> Result<Option<ArchiveObject>> {
            if self.buf.get_u8()? != TYPE_STRING {
                return Ok(None);
            }
            let length = self.buf.get_u16()? as usize;
            let line = self.buf.get_string(length)?;
            Ok(parse_object_marker(&line))
        })();

        match result {
            Ok(Some(object)) => Ok(Some(object)),
            _ => {
                self.buf.set_position(position)?;
                Ok(None)
            }
        }
    }

    fn read_object_end(&mut self) -> Result<bool> {
        if self.buf.remaining() < 5 {
            return Ok(false);
        }

        let position = self.buf.position();
        let matched = (|| -> Result<bool> {
            if self.buf.get_u8()? != TYPE_STRING {
                return Ok(false);
            }
            if self.buf.get_u16()? != 2 {
                return Ok(false);
            }
            Ok(self.buf.get_string(2)? == "[]")
        })()
        .unwrap_or(false);

        if !matched {
            self.buf.set_position(position)?;
        }
        Ok(matched)
    }

    fn skip_entry(&mut self) -> Result<()> {
        let code = self.buf.get_u8()?;
        match code {
            TYPE_STRING | TYPE_RAW | TYPE_RAW_FLOAT => {
                let length = self.buf.get_u16()? as usize;
                self.buf.skip(length)?;
            }
            TYPE_INT | TYPE_FLOAT | TYPE_BOOL | TYPE_COLOR | TYPE_ENUM | TYPE_HASH => {
                self.buf.skip(4)?;
            }
            TYPE_BYTE => self.buf.skip(1)?,
            TYPE_WORD => self.buf.skip(2)?,
            TYPE_VEC3 => self.buf.skip(12)?,
            other => {
                return Err(ArchiveError::InvalidEntry(format!(
                    "cannot skip value of type 0x{other:02X}"
                )))
            }
        }
        Ok(())
    }

    fn read_string(&mut self) -> Result<String> {
        let length = self.ensure_entry_meta(TYPE_STRING)? as usize;
        Ok(self.buf.get_string(length)?)
    }

    fn read_int(&mut self) -> Result<i32> {
        self.ensure_entry_meta(TYPE_INT)?;
        Ok(self.buf.get_i32()?)
    }

    fn read_float(&mut self) -> Result<f32> {
        self.ensure_entry_meta(TYPE_FLOAT)?;
        Ok(self.buf.get_f32()?)
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.ensure_entry_meta(TYPE_BYTE)?;
        Ok(self.buf.get_u8()?)
    }

    fn read_word(&mut self) -> Result<u16> {
        self.ensure_entry_meta(TYPE_WORD)?;
        Ok(self.buf.get_u16()?)
    }

    fn read_enum(&mut self) -> Result<u32> {
        self.ensure_entry_meta(TYPE_ENUM)?;
        Ok(self.buf.get_u32()?)
    }

    fn read_bool(&mut self) -> Result<bool> {
        self.ensure_entry_meta(TYPE_BOOL)?;
        Ok(self.buf.get_u32()? != 0)
    }

    fn read_color(&mut self) -> Result<Color> {
        self.ensure_entry_meta(TYPE_COLOR)?;
        let b = self.buf.get_u8()?;
        let g = self.buf.get_u8()?;
        let r = self.buf.get_u8()?;
        let a = self.buf.get_u8()?;
        Ok(Color { r, g, b, a })
    }

    fn read_vec2(&mut self) -> Result<Vec2> {
        let length = self.ensure_entry_meta(TYPE_RAW_FLOAT)? as usize;
        let trailing = length
            .checked_sub(2 * 4)
            .ok_or_else(|| ArchiveError::InvalidEntry(format!("rawFloat of {length} bytes")))?;

        let value = self.buf.get_vec2()?;
        self.buf.skip(trailing)?;
        Ok(value)
    }

    fn read_vec3(&mut self) -> Result<Vec3> {
        self.ensure_entry_meta(TYPE_VEC3)?;
        Ok(self.buf.get_vec3()?)
    }

    fn read_bbox(&mut self) -> Result<Aabb> {
        let length = self.ensure_entry_meta(TYPE_RAW_FLOAT)? as usize;
        let trailing = length
            .checked_sub(6 * 4)
            .ok_or_else(|| ArchiveError::InvalidEntry(format!("rawFloat of {length} bytes")))?;

        let value = self.buf.get_bbox()?;
        self.buf.skip(trailing)?;
        Ok(value)
    }

    fn read_mat3x3(&mut self) -> Result<Mat3> {
        let length = self.ensure_entry_meta(TYPE_RAW)? as usize;
        let trailing = length
            .checked_sub(9 * 4)
            .ok_or_else(|| ArchiveError::InvalidEntry(format!("raw of {length} bytes")))?;

        let value = self.buf.get_mat3x3()?;
        self.buf.skip(trailing)?;
        Ok(value)
    }

    fn read_raw_bytes(&mut self, _size: usize) -> Result<Buffer> {
        let length = self.ensure_entry_meta(TYPE_RAW)? as usize;
        Ok(self.buf.extract(length)?)
    }
}
