use glam::Vec3;

use super::{check_point, SupportMap};
use crate::aabb::Aabb;
use crate::ecs::components::transform::GlobalTransform;
use crate::error::ShapeError;

/// Convex point cloud. Convexity is assumed, not checked; the support mapping
/// of a non-convex input is that of its convex hull.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexMesh {
    vertices: Vec<Vec3>,
}

impl ConvexMesh {
    pub fn new(vertices: Vec<Vec3>) -> Result<Self, ShapeError> {
        if vertices.is_empty() {
            return Err(ShapeError::EmptyMesh);
        }
        for v in &vertices {
            check_point(*v)?;
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Local-space vertex furthest along `local_dir`.
    fn furthest_vertex(&self, local_dir: Vec3) -> Vec3 {
        let mut best = self.vertices[0];
        let mut best_dot = best.dot(local_dir);
        for v in &self.vertices[1..] {
            let d = v.dot(local_dir);
            if d > best_dot {
                best_dot = d;
                best = *v;
            }
        }
        best
    }
}

impl SupportMap for ConvexMesh {
    #[inline]
    fn support(&self, direction: Vec3, transform: &GlobalTransform) -> Vec3 {
        let local_dir = transform.direction_to_local(direction);
        transform.transform_point(self.furthest_vertex(local_dir))
    }

    fn compute_aabb(&self, transform: &GlobalTransform) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| transform.transform_point(*v)))
    }
}
