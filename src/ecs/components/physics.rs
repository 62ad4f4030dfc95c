//! Collision body components for ECS entities.

use crate::aabb::Aabb;
use crate::shape::Shape;

/// How a body responds to contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// Immovable. Never corrected, AABB cached until the transform is replaced.
    Static,
    /// Pushed out of contacts every step.
    Dynamic,
}

/// Body component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub kind: BodyKind,
    /// Inactive bodies are skipped entirely by the solver.
    pub active: bool,
    /// Opaque value for the owner, e.g. a game object id.
    pub user_data: u64,
}

impl Body {
    pub fn new(kind: BodyKind) -> Self {
        Self {
            kind,
            active: true,
            user_data: 0,
        }
    }

    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }
}

/// Collider component.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub shape: Shape,
    /// Triggers report contacts but are never corrected and never push others.
    pub is_trigger: bool,
}

impl Collider {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            is_trigger: false,
        }
    }
}

/// Cached world-space bounds of a body's collider.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyAabb(pub Aabb);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_defaults() {
        let body = Body::new(BodyKind::Dynamic);
        assert!(body.active);
        assert!(!body.is_static());
        assert_eq!(body.user_data, 0);
        assert!(Body::new(BodyKind::Static).is_static());
    }

    #[test]
    fn test_collider_defaults_to_solid() {
        let shape = Shape::sphere(1.0).unwrap();
        assert!(!Collider::new(shape).is_trigger);
        assert!(BodyAabb::default().0.is_empty());
    }
}
