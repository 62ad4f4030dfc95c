//! Narrowphase: GJK overlap test followed by EPA on overlap.

use glam::Vec3;

use super::epa::{epa_penetration, EpaResult, Penetration};
use super::gjk::gjk_intersection;
use super::CollisionConfig;
use crate::ecs::components::transform::GlobalTransform;
use crate::shape::SupportMap;

/// Support mapping of `A - B` with both shapes placed in world space.
pub struct MinkowskiDifference<'a, A: SupportMap + ?Sized, B: SupportMap + ?Sized> {
    shape_a: &'a A,
    transform_a: &'a GlobalTransform,
    shape_b: &'a B,
    transform_b: &'a GlobalTransform,
}

impl<'a, A: SupportMap + ?Sized, B: SupportMap + ?Sized> MinkowskiDifference<'a, A, B> {
    pub fn new(
        shape_a: &'a A,
        transform_a: &'a GlobalTransform,
        shape_b: &'a B,
        transform_b: &'a GlobalTransform,
    ) -> Self {
        Self {
            shape_a,
            transform_a,
            shape_b,
            transform_b,
        }
    }

    /// Furthest point of the difference along `direction`.
    #[inline]
    pub fn support(&self, direction: Vec3) -> Vec3 {
        self.shape_a.support(direction, self.transform_a)
            - self.shape_b.support(-direction, self.transform_b)
    }

    /// Offset between the body origins, from A to B.
    #[inline]
    pub fn center_offset(&self) -> Vec3 {
        self.transform_b.translation() - self.transform_a.translation()
    }
}

/// Outcome of testing one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NarrowphaseResult {
    Separated,
    Penetrating(Penetration),
    /// EPA ran out of iterations; the depth is a lower bound.
    Unconverged(Penetration),
    /// GJK reported overlap but EPA could not produce a normal.
    Degenerate,
}

impl NarrowphaseResult {
    /// The penetration to act on under `config`, if any.
    pub fn usable(&self, config: &CollisionConfig) -> Option<Penetration> {
        match self {
            NarrowphaseResult::Penetrating(p) => Some(*p),
            NarrowphaseResult::Unconverged(p) if config.accept_unconverged => Some(*p),
            _ => None,
        }
    }
}

/// Run GJK and, on overlap, EPA for a single pair.
///
/// The penetration normal points from A toward B.
pub fn collide<A, B>(
    shape_a: &A,
    transform_a: &GlobalTransform,
    shape_b: &B,
    transform_b: &GlobalTransform,
    config: &CollisionConfig,
) -> NarrowphaseResult
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let pair = MinkowskiDifference::new(shape_a, transform_a, shape_b, transform_b);

    let Some(simplex) = gjk_intersection(&pair, config.gjk_max_iterations) else {
        return NarrowphaseResult::Separated;
    };

    match epa_penetration(
        &simplex,
        &pair,
        config.epa_max_iterations,
        config.epa_tolerance,
    ) {
        EpaResult::Converged(p) => NarrowphaseResult::Penetrating(p),
        EpaResult::Unconverged(p) => NarrowphaseResult::Unconverged(p),
        EpaResult::Degenerate => NarrowphaseResult::Degenerate,
    }
}
