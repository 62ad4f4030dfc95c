use glam::Vec3;

use super::{check_point, check_radius, SupportMap};
use crate::aabb::Aabb;
use crate::ecs::components::transform::GlobalTransform;
use crate::error::ShapeError;

/// Sphere in body-local space. Non-uniform scale is collapsed to the largest axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Result<Self, ShapeError> {
        check_point(center)?;
        check_radius(radius)?;
        Ok(Self { center, radius })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    fn world_radius(&self, transform: &GlobalTransform) -> f32 {
        self.radius * transform.max_scale()
    }
}

impl SupportMap for Sphere {
    #[inline]
    fn support(&self, direction: Vec3, transform: &GlobalTransform) -> Vec3 {
        let center = transform.transform_point(self.center);
        center + direction.normalize_or_zero() * self.world_radius(transform)
    }

    fn compute_aabb(&self, transform: &GlobalTransform) -> Aabb {
        let center = transform.transform_point(self.center);
        let r = Vec3::splat(self.world_radius(transform));
        Aabb::new(center - r, center + r)
    }
}
