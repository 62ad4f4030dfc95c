//! Transform hierarchy propagation system.

use glam::Mat4;

use crate::ecs::components::transform::{Children, GlobalTransform, Parent, Transform};

/// Propagate transforms through the Parent/Children hierarchy.
///
/// Phase 1: Update root entities (no Parent) - GlobalTransform = Transform.to_matrix()
/// Phase 2: Walk each root's Children depth-first, parents before children.
pub fn transform_system(world: &mut hecs::World) {
    let roots: Vec<(hecs::Entity, Mat4)> = world
        .query_mut::<hecs::Without<(&Transform, &GlobalTransform), &Parent>>()
        .into_iter()
        .map(|(entity, (transform, _))| (entity, transform.to_matrix()))
        .collect();

    for (entity, matrix) in &roots {
        if let Ok(mut global) = world.get::<&mut GlobalTransform>(*entity) {
            *global = GlobalTransform::from_matrix(*matrix);
        }
    }

    // Explicit stack instead of recursion so deep chains cannot overflow.
    let mut stack: Vec<(hecs::Entity, Mat4)> = roots
        .into_iter()
        .filter(|(entity, _)| world.satisfies::<&Children>(*entity).unwrap_or(false))
        .collect();

    while let Some((parent, parent_global)) = stack.pop() {
        let children = match world.get::<&Children>(parent) {
            Ok(c) => c.0.clone(),
            Err(_) => continue,
        };

        for child in children {
            let child_global = match world.get::<&Transform>(child) {
                Ok(transform) => parent_global * transform.to_matrix(),
                Err(_) => parent_global,
            };

            if let Ok(mut global) = world.get::<&mut GlobalTransform>(child) {
                *global = GlobalTransform::from_matrix(child_global);
            }

            if world.satisfies::<&Children>(child).unwrap_or(false) {
                stack.push((child, child_global));
            }
        }
    }
}

/// World matrix of an entity's parent, or identity for roots.
pub fn parent_matrix(world: &hecs::World, entity: hecs::Entity) -> GlobalTransform {
    world
        .get::<&Parent>(entity)
        .ok()
        .and_then(|parent| world.get::<&GlobalTransform>(parent.0).ok().map(|g| *g))
        .unwrap_or_default()
}
