use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Pixel formats appearing in ZTEX containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum TextureFormat {
    B8G8R8A8 = 0,
    R8G8B8A8 = 1,
    A8B8G8R8 = 2,
    A8R8G8B8 = 3,
    B8G8R8 = 4,
    R8G8B8 = 5,
    A4R4G4B4 = 6,
    A1R5G5B5 = 7,
    R5G6B5 = 8,
    P8 = 9,
    Dxt1 = 10,
    Dxt2 = 11,
    Dxt3 = 12,
    Dxt4 = 13,
    Dxt5 = 14,
}

impl TextureFormat {
    /// The payload size in bytes of one mipmap level of this format.
    pub fn mipmap_size(self, width: u32, height: u32, level: u32) -> usize {
        let mut x = width.max(1);
        let mut y = height.max(1);

        for _ in 0..level {
            if x > 1 {
                x >>= 1;
            }
            if y > 1 {
                y >>= 1;
            }
        }

        let (x, y) = (x as usize, y as usize);
        match self {
            Self::B8G8R8A8 | Self::R8G8B8A8 | Self::A8B8G8R8 | Self::A8R8G8B8 => x * y * 4,
            Self::B8G8R8 | Self::R8G8B8 => x * y * 3,
            Self::A4R4G4B4 | Self::A1R5G5B5 | Self::R5G6B5 => x * y * 2,
            Self::P8 => x * y,
            Self::Dxt1 => (x / 4).max(1) * (y / 4).max(1) * 8,
            Self::Dxt2 | Self::Dxt3 | Self::Dxt4 | Self::Dxt5 => {
                (x / 4).max(1) * (y / 4).max(1) * 16
            }
        }
    }

    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            Self::Dxt1 | Self::Dxt2 | Self::Dxt3 | Self::Dxt4 | Self::Dxt5
        )
    }
}
