//! Positional contact correction.

use glam::Vec3;

use crate::ecs::components::physics::BodyKind;
use crate::ecs::components::transform::{GlobalTransform, Transform};
use crate::ecs::systems::transform::parent_matrix;

use super::epa::Penetration;

/// What the solver needs to know about one side of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mobility {
    pub kind: BodyKind,
    pub is_trigger: bool,
}

/// World-space displacements for the two bodies of a pair.
///
/// `penetration.normal` points from A to B, so A moves along `-normal` and B
/// along `+normal`. Static bodies never move; a dynamic body facing a static
/// one takes the full depth; two dynamic bodies split it evenly. Pairs
/// involving a trigger are not corrected.
pub fn split_correction(a: Mobility, b: Mobility, penetration: &Penetration) -> (Vec3, Vec3) {
    if a.is_trigger || b.is_trigger {
        return (Vec3::ZERO, Vec3::ZERO);
    }

    let (share_a, share_b) = match (a.kind, b.kind) {
        (BodyKind::Static, BodyKind::Static) => (0.0, 0.0),
        (BodyKind::Static, BodyKind::Dynamic) => (0.0, 1.0),
        (BodyKind::Dynamic, BodyKind::Static) => (1.0, 0.0),
        (BodyKind::Dynamic, BodyKind::Dynamic) => (0.5, 0.5),
    };

    let push = penetration.normal * penetration.depth;
    (-push * share_a, push * share_b)
}

/// Move a body by a world-space offset.
///
/// The offset is mapped into the parent frame before being added to the local
/// translation, and the cached world matrix is shifted in place so later pairs
/// in the same step see the new position. Children are left for the next
/// propagation pass.
pub fn apply_correction(world: &mut hecs::World, entity: hecs::Entity, offset: Vec3) {
    if offset == Vec3::ZERO {
        return;
    }

    let parent = parent_matrix(world, entity);
    let local_offset = parent.inverse().transform_vector3(offset);

    if let Ok(mut transform) = world.get::<&mut Transform>(entity) {
        transform.translation += local_offset;
    }
    if let Ok(mut global) = world.get::<&mut GlobalTransform>(entity) {
        global.translate(offset);
    }
}
