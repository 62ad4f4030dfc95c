//! Error types for shape construction and registry access.

use glam::Vec3;
use thiserror::Error;

use crate::physics::BodyHandle;

/// Rejected shape parameters. Raised by the shape constructors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("radius must be non-negative, got {0}")]
    NegativeRadius(f32),
    #[error("half extents must be non-negative, got {0}")]
    NegativeExtent(Vec3),
    #[error("convex mesh needs at least one vertex")]
    EmptyMesh,
    #[error("shape parameters must be finite")]
    NonFinite,
}

/// Errors from [`CollisionWorld`](crate::physics::CollisionWorld) registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollisionError {
    #[error("body {0:?} is not registered")]
    UnknownBody(BodyHandle),
    #[error("body {0:?} cannot be its own parent")]
    SelfParent(BodyHandle),
    #[error("parenting {child:?} to {parent:?} would create a cycle")]
    ParentCycle {
        child: BodyHandle,
        parent: BodyHandle,
    },
}
