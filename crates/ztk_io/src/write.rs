use std::io;

use byteorder::{WriteBytesExt, LE};
use glam::{Vec2, Vec3};

use ztk_primitives::Aabb;

/// Little-endian write helpers for the few write paths the toolkit has
/// (DDS assembly, VDF entry extraction) and for building test images.
pub trait WriteExt: io::Write {
    fn put_u8(&mut self, value: u8) -> io::Result<()> {
        self.write_u8(value)
    }

    fn put_u16(&mut self, value: u16) -> io::Result<()> {
        self.write_u16::<LE>(value)
    }

    fn put_i16(&mut self, value: i16) -> io::Result<()> {
        self.write_i16::<LE>(value)
    }

    fn put_u32(&mut self, value: u32) -> io::Result<()> {
        self.write_u32::<LE>(value)
    }

    fn put_i32(&mut self, value: i32) -> io::Result<()> {
        self.write_i32::<LE>(value)
    }

    fn put_f32(&mut self, value: f32) -> io::Result<()> {
        self.write_f32::<LE>(value)
    }

    fn put_string(&mut self, value: &str) -> io::Result<()> {
        self.write_all(value.as_bytes())
    }

    /// Writes `value` followed by a single LF.
    fn put_line(&mut self, value: &str) -> io::Result<()> {
        self.put_string(value)?;
        self.write_u8(b'\n')
    }

    fn put_vec2(&mut self, value: Vec2) -> io::Result<()> {
        self.put_f32(value.x)?;
        self.put_f32(value.y)
    }

    fn put_vec3(&mut self, value: Vec3) -> io::Result<()> {
        self.put_f32(value.x)?;
        self.put_f32(value.y)?;
        self.put_f32(value.z)
    }

    fn put_bbox(&mut self, value: &Aabb) -> io::Result<()> {
        self.put_vec3(value.min)?;
        self.put_vec3(value.max)
    }
}

impl<W: io::Write + ?Sized> WriteExt for W {}
