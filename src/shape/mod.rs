//! Convex collision shapes and their support mappings.
//!
//! Every shape is defined in its body's local frame and evaluated in world
//! space through a [`GlobalTransform`]. The narrowphase only ever talks to a
//! shape through [`SupportMap`].

mod capsule;
mod convex_mesh;
mod cuboid;
mod sphere;

pub use capsule::Capsule;
pub use convex_mesh::ConvexMesh;
pub use cuboid::Cuboid;
pub use sphere::Sphere;

use glam::Vec3;

use crate::aabb::Aabb;
use crate::ecs::components::transform::GlobalTransform;
use crate::error::ShapeError;

/// Convex shapes representable by a support mapping function.
pub trait SupportMap {
    /// World-space point of the shape with the largest dot product with `direction`.
    fn support(&self, direction: Vec3, transform: &GlobalTransform) -> Vec3;

    /// Tight world-space bounds of the transformed shape.
    fn compute_aabb(&self, transform: &GlobalTransform) -> Aabb;
}

/// Closed set of collider shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Box(Cuboid),
    Capsule(Capsule),
    ConvexMesh(ConvexMesh),
}

impl Shape {
    /// Sphere centered on the body origin.
    pub fn sphere(radius: f32) -> Result<Self, ShapeError> {
        Sphere::new(Vec3::ZERO, radius).map(Shape::Sphere)
    }

    /// Box centered on the body origin.
    pub fn cuboid(half_extents: Vec3) -> Result<Self, ShapeError> {
        Cuboid::new(Vec3::ZERO, half_extents).map(Shape::Box)
    }

    /// Capsule around the segment `start..end`.
    pub fn capsule(start: Vec3, end: Vec3, radius: f32) -> Result<Self, ShapeError> {
        Capsule::new(start, end, radius).map(Shape::Capsule)
    }

    pub fn convex_mesh(vertices: Vec<Vec3>) -> Result<Self, ShapeError> {
        ConvexMesh::new(vertices).map(Shape::ConvexMesh)
    }
}

impl SupportMap for Shape {
    #[inline]
    fn support(&self, direction: Vec3, transform: &GlobalTransform) -> Vec3 {
        match self {
            Shape::Sphere(s) => s.support(direction, transform),
            Shape::Box(b) => b.support(direction, transform),
            Shape::Capsule(c) => c.support(direction, transform),
            Shape::ConvexMesh(m) => m.support(direction, transform),
        }
    }

    #[inline]
    fn compute_aabb(&self, transform: &GlobalTransform) -> Aabb {
        match self {
            Shape::Sphere(s) => s.compute_aabb(transform),
            Shape::Box(b) => b.compute_aabb(transform),
            Shape::Capsule(c) => c.compute_aabb(transform),
            Shape::ConvexMesh(m) => m.compute_aabb(transform),
        }
    }
}

impl From<Sphere> for Shape {
    fn from(s: Sphere) -> Self {
        Shape::Sphere(s)
    }
}

impl From<Cuboid> for Shape {
    fn from(b: Cuboid) -> Self {
        Shape::Box(b)
    }
}

impl From<Capsule> for Shape {
    fn from(c: Capsule) -> Self {
        Shape::Capsule(c)
    }
}

impl From<ConvexMesh> for Shape {
    fn from(m: ConvexMesh) -> Self {
        Shape::ConvexMesh(m)
    }
}

fn check_radius(radius: f32) -> Result<(), ShapeError> {
    if !radius.is_finite() {
        return Err(ShapeError::NonFinite);
    }
    if radius < 0.0 {
        return Err(ShapeError::NegativeRadius(radius));
    }
    Ok(())
}

fn check_point(point: Vec3) -> Result<(), ShapeError> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(ShapeError::NonFinite)
    }
}

/// Evenly spread unit directions for extremality checks in tests.
#[cfg(test)]
pub(crate) fn sample_directions() -> Vec<Vec3> {
    let mut dirs = vec![
        Vec3::X,
        -Vec3::X,
        Vec3::Y,
        -Vec3::Y,
        Vec3::Z,
        -Vec3::Z,
    ];
    // Fibonacci sphere.
    let n = 128;
    let golden = std::f32::consts::PI * (3.0 - 5.0f32.sqrt());
    for i in 0..n {
        let y = 1.0 - 2.0 * (i as f32 + 0.5) / n as f32;
        let r = (1.0 - y * y).sqrt();
        let theta = golden * i as f32;
        dirs.push(Vec3::new(r * theta.cos(), y, r * theta.sin()));
    }
    dirs
}
