use glam::{Mat3, Vec2, Vec3};

use ztk_io::Buffer;
use ztk_primitives::{Aabb, Color};

use crate::header::read_object_count;
use crate::{parse_object_marker, ArchiveError, ArchiveHeader, ArchiveObject, ArchiveRead, Result};

/// Line-oriented reader (`zCArchiverGeneric` in `ASCII` mode).
///
/// Every value is a `name=type:value` line; object begin markers are
/// `[name class version index]` and `[]` ends an object.
pub struct AsciiReader {
    buf: Buffer,
    header: ArchiveHeader,
    objects: u32,
}

impl AsciiReader {
    pub(crate) fn new(mut buf: Buffer, header: ArchiveHeader) -> Result<Self> {
        let objects = read_object_count(&mut buf)?;
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

    /// Reads one `name=type:value` line, validating the type tag.
    fn read_entry(&mut self, expected: &'static str) -> Result<String> {
        let line = self.buf.get_line(true)?;
        let value = line
            .split_once('=')
            .map(|(_, rest)| rest)
            .ok_or_else(|| ArchiveError::InvalidEntry(line.clone()))?;

        let (ty, value) = value
            .split_once(':')
            .ok_or_else(|| ArchiveError::InvalidEntry(line.clone()))?;

        if ty != expected {
            return Err(ArchiveError::TypeMismatch {
                expected: expected.to_string(),
                found: ty.to_string(),
            });
        }

        Ok(value.to_string())
    }

    fn read_floats(&mut self, expected: &'static str, out: &mut [f32]) -> Result<()> {
        let entry = self.read_entry(expected)?;
        let mut parts = entry.split_whitespace();

        for value in out.iter_mut() {
            *value = parts
                .next()
                .ok_or_else(|| ArchiveError::InvalidEntry(entry.clone()))?
                .parse()?;
        }

        Ok(())
    }
}

impl ArchiveRead for AsciiReader {
    fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    fn buffer(&mut self) -> &mut Buffer {
        &mut self.buf
    }

    fn read_object_begin(&mut self) -> Result<Option<ArchiveObject>> {
        if self.buf.remaining() < 3 {
            return Ok(None);
        }

        let position = self.buf.position();
        let Ok(line) = self.buf.get_line(true) else {
            self.buf.set_position(position)?;
            return Ok(None);
        };

        match parse_object_marker(&line) {
            Some(object) => Ok(Some(object)),
            None => {
                self.buf.set_position(position)?;
                Ok(None)
            }
        }
    }

    fn read_object_end(&mut self) -> Result<bool> {
        if self.buf.remaining() < 2 {
            return Ok(false);
        }

        let position = self.buf.position();
        let Ok(line) = self.buf.get_line(true) else {
            self.buf.set_position(position)?;
            return Ok(false);
        };

        if line.trim() == "[]" {
            Ok(true)
        } else {
            self.buf.set_position(position)?;
            Ok(false)
        }
    }

    fn skip_entry(&mut self) -> Result<()> {
        self.buf.get_line(true)?;
        Ok(())
    }

    fn read_string(&mut self) -> Result<String> {
        self.read_entry("string")
    }

    fn read_int(&mut self) -> Result<i32> {
        Ok(self.read_entry("int")?.trim().parse()?)
    }

    fn read_float(&mut self) -> Result<f32> {
        Ok(self.read_entry("float")?.trim().parse()?)
    }

    fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_entry("int")?.trim().parse::<u32>()? as u8)
    }

    fn read_word(&mut self) -> Result<u16> {
        Ok(self.read_entry("int")?.trim().parse::<u32>()? as u16)
    }

    fn read_enum(&mut self) -> Result<u32> {
        Ok(self.read_entry("enum")?.trim().parse()?)
    }

    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_entry("bool")?.trim().parse::<u32>()? != 0)
    }

    fn read_color(&mut self) -> Result<Color> {
        let entry = self.read_entry("color")?;
        let mut parts = entry.split_whitespace();
        let mut next = || -> Result<u8> {
            Ok(parts
                .next()
                .ok_or_else(|| ArchiveError::InvalidEntry(entry.clone()))?
                .parse::<u32>()? as u8)
        };

        Ok(Color {
            r: next()?,
            g: next()?,
            b: next()?,
            a: next()?,
        })
    }

    fn read_vec2(&mut self) -> Result<Vec2> {
        let mut values = [0.0f32; 2];
        self.read_floats("rawFloat", &mut values)?;
        Ok(Vec2::from_array(values))
    }

    fn read_vec3(&mut self) -> Result<Vec3> {
        let mut values = [0.0f32; 3];
        self.read_floats("vec3", &mut values)?;
        Ok(Vec3::from_array(values))
    }

    fn read_bbox(&mut self) -> Result<Aabb> {
        let mut values = [0.0f32; 6];
        self.read_floats("rawFloat", &mut values)?;
        Ok(Aabb::new(
            [values[0], values[1], values[2]],
            [values[3], values[4], values[5]],
        ))
    }

    fn read_mat3x3(&mut self) -> Result<Mat3> {
        let mut raw = self.read_raw_bytes(9 * 4)?;
        Ok(raw.get_mat3x3()?)
    }

    fn read_raw_bytes(&mut self, _size: usize) -> Result<Buffer> {
        let entry = self.read_entry("raw")?;
        let entry = entry.trim();

        if entry.len() % 2 != 0 {
            return Err(ArchiveError::InvalidEntry(entry.to_string()));
        }

        let mut bytes = Vec::with_capacity(entry.len() / 2);
        for pair in entry.as_bytes().chunks_exact(2) {
            let hex = std::str::from_utf8(pair)
                .map_err(|_| ArchiveError::InvalidEntry(entry.to_string()))?;
            bytes.push(u8::from_str_radix(hex, 16)?);
        }

        Ok(Buffer::from_vec(bytes))
    }
}
