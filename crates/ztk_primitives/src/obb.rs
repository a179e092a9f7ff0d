use glam::Vec3;

use crate::Aabb;

/// An oriented bounding box with child boxes, as used by the mesh formats.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Obb {
    pub center: Vec3,
    pub axes: [Vec3; 3],
    pub half_width: Vec3,
    pub children: Vec<Obb>,
}

impl Obb {
    /// Collapses the oriented box into an axis-aligned one by taking the
    /// extremes of its eight corners.
    pub fn as_aabb(&self) -> Aabb {
        const SIGNS: [[f32; 3]; 8] = [
            [-1.0, -1.0, -1.0],
            [-1.0, -1.0, 1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, 1.0, 1.0],
            [1.0, -1.0, -1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, -1.0],
            [1.0, 1.0, 1.0],
        ];

        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);

        for sign in SIGNS {
            let point = self.center
                + self.axes[0] * self.half_width.x * sign[0]
                + self.axes[1] * self.half_width.y * sign[1]
                + self.axes[2] * self.half_width.z * sign[2];

            min = min.min(point);
            max = max.max(point);
        }

        Aabb { min, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_aligned_obb_collapses_to_its_extents() {
        let obb = Obb {
            center: Vec3::new(10.0, 0.0, 0.0),
            axes: [Vec3::X, Vec3::Y, Vec3::Z],
            half_width: Vec3::new(1.0, 2.0, 3.0),
            children: Vec::new(),
        };

        let aabb = obb.as_aabb();
        assert_eq!(aabb.min, Vec3::new(9.0, -2.0, -3.0));
        assert_eq!(aabb.max, Vec3::new(11.0, 2.0, 3.0));
    }

    #[test]
    fn rotated_obb_expands_the_box() {
        // rotated 90 degrees around Z: the X half-width maps onto Y
        let obb = Obb {
            center: Vec3::ZERO,
            axes: [Vec3::Y, Vec3::NEG_X, Vec3::Z],
            half_width: Vec3::new(4.0, 1.0, 1.0),
            children: Vec::new(),
        };

        let aabb = obb.as_aabb();
        assert_eq!(aabb.min, Vec3::new(-1.0, -4.0, -1.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 1.0));
    }
}
