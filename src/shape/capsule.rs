use glam::Vec3;

use super::{check_point, check_radius, SupportMap};
use crate::aabb::Aabb;
use crate::ecs::components::transform::GlobalTransform;
use crate::error::ShapeError;

/// Segment swept by a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    start: Vec3,
    end: Vec3,
    radius: f32,
}

impl Capsule {
    pub fn new(start: Vec3, end: Vec3, radius: f32) -> Result<Self, ShapeError> {
        check_point(start)?;
        check_point(end)?;
        check_radius(radius)?;
        Ok(Self { start, end, radius })
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl SupportMap for Capsule {
    #[inline]
    fn support(&self, direction: Vec3, transform: &GlobalTransform) -> Vec3 {
        let start = transform.transform_point(self.start);
        let end = transform.transform_point(self.end);
        let base = if start.dot(direction) >= end.dot(direction) {
            start
        } else {
            end
        };
        base + direction.normalize_or_zero() * (self.radius * transform.max_scale())
    }

    fn compute_aabb(&self, transform: &GlobalTransform) -> Aabb {
        let r = Vec3::splat(self.radius * transform.max_scale());
        let mut aabb = Aabb::from_point(transform.transform_point(self.start));
        aabb.include_point(transform.transform_point(self.end));
        Aabb::new(aabb.min - r, aabb.max + r)
    }
}
