use glam::{Mat4, Vec3};

use super::{check_point, SupportMap};
use crate::aabb::Aabb;
use crate::ecs::components::transform::GlobalTransform;
use crate::error::ShapeError;

/// Oriented box given by its local center and half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    center: Vec3,
    half_extents: Vec3,
}

impl Cuboid {
    pub fn new(center: Vec3, half_extents: Vec3) -> Result<Self, ShapeError> {
        check_point(center)?;
        check_point(half_extents)?;
        if half_extents.cmplt(Vec3::ZERO).any() {
            return Err(ShapeError::NegativeExtent(half_extents));
        }
        Ok(Self {
            center,
            half_extents,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }
}

impl SupportMap for Cuboid {
    #[inline]
    fn support(&self, direction: Vec3, transform: &GlobalTransform) -> Vec3 {
        let local_dir = transform.direction_to_local(direction);
        let h = self.half_extents;
        let corner = Vec3::new(
            if local_dir.x >= 0.0 { h.x } else { -h.x },
            if local_dir.y >= 0.0 { h.y } else { -h.y },
            if local_dir.z >= 0.0 { h.z } else { -h.z },
        );
        transform.transform_point(self.center + corner)
    }

    fn compute_aabb(&self, transform: &GlobalTransform) -> Aabb {
        aabb_from_extents(self.center, self.half_extents, transform.matrix())
    }
}

/// World-space AABB of a local box from its center, half-extents and matrix.
///
/// Projects the absolute matrix columns onto each world axis, which gives the
/// same bounds as transforming all 8 corners.
#[inline]
pub(crate) fn aabb_from_extents(center: Vec3, half_extents: Vec3, mat: Mat4) -> Aabb {
    let world_center = mat.transform_point3(center);

    let abs_col0 = mat.x_axis.truncate().abs();
    let abs_col1 = mat.y_axis.truncate().abs();
    let abs_col2 = mat.z_axis.truncate().abs();

    let extent = abs_col0 * half_extents.x + abs_col1 * half_extents.y + abs_col2 * half_extents.z;

    Aabb::new(world_center - extent, world_center + extent)
}
