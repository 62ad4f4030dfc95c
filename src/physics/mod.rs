//! Convex collision detection and positional resolution.
//!
//! # Architecture
//!
//! Each call to [`CollisionWorld::solve`] runs one step:
//!
//! 1. Propagate world matrices through the transform hierarchy
//! 2. Refresh AABBs of active dynamic bodies
//! 3. Broadphase: all-pairs AABB overlap
//! 4. Narrowphase: GJK overlap test, EPA penetration on overlap
//! 5. Positional correction and contact callbacks
//! 6. Exit callbacks for pairs that stopped touching
//! 7. Re-propagate world matrices and refresh AABBs of moved bodies

pub mod broadphase;
pub mod contact;
pub mod epa;
pub mod gjk;
pub mod narrowphase;
pub mod solver;

use crate::aabb::Aabb;
use crate::debug::{push_aabb_wireframe, DebugVertex};
use crate::ecs::components::physics::{Body, BodyAabb, BodyKind, Collider};
use crate::ecs::components::transform::{Children, GlobalTransform, Parent, Transform};
use crate::ecs::systems::transform::transform_system;
use crate::error::CollisionError;
use crate::shape::{Shape, SupportMap};

use self::broadphase::AllPairs;
use self::contact::{ContactCallback, ContactInfo, ContactTracker, ExitCallback};
use self::narrowphase::{collide, NarrowphaseResult};
use self::solver::{apply_correction, split_correction, Mobility};

/// Stable reference to a registered body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(hecs::Entity);

impl BodyHandle {
    /// The underlying entity in [`CollisionWorld::world`].
    pub fn entity(self) -> hecs::Entity {
        self.0
    }
}

/// Configuration for the collision pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionConfig {
    /// GJK iteration cap. Hitting it reports no overlap. Default: 64.
    pub gjk_max_iterations: u32,
    /// EPA iteration cap. Default: 64.
    pub epa_max_iterations: u32,
    /// EPA convergence threshold, also added to converged depths so corrected
    /// bodies end up just apart. Default: 1e-4.
    pub epa_tolerance: f32,
    /// Whether to resolve contacts whose EPA run hit the iteration cap.
    /// Their depth underestimates the true penetration. Default: true.
    pub accept_unconverged: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            gjk_max_iterations: 64,
            epa_max_iterations: 64,
            epa_tolerance: 1e-4,
            accept_unconverged: true,
        }
    }
}

/// Counters from one [`CollisionWorld::solve`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    pub bodies: usize,
    /// Pairs that passed the broadphase.
    pub candidate_pairs: usize,
    /// Pairs that produced a usable penetration.
    pub contacts: usize,
}

/// Registry of collision bodies plus the per-step solver.
pub struct CollisionWorld {
    config: CollisionConfig,
    world: hecs::World,
    broadphase: AllPairs,
    contacts: ContactTracker,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new(CollisionConfig::default())
    }
}

impl CollisionWorld {
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            config,
            world: hecs::World::new(),
            broadphase: AllPairs::new(),
            contacts: ContactTracker::new(),
        }
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Read-only access to the underlying ECS world.
    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    /// Register a body. Its AABB is computed immediately.
    pub fn add_body(
        &mut self,
        shape: impl Into<Shape>,
        transform: Transform,
        kind: BodyKind,
    ) -> BodyHandle {
        let shape = shape.into();
        let global = GlobalTransform::from_matrix(transform.to_matrix());
        let aabb = shape.compute_aabb(&global);
        let entity = self.world.spawn((
            transform,
            global,
            Body::new(kind),
            Collider::new(shape),
            BodyAabb(aabb),
        ));
        tracing::trace!(?entity, ?kind, "body added");
        BodyHandle(entity)
    }

    /// Remove every body and forget all contacts. Existing handles become invalid.
    pub fn clear(&mut self) {
        // Despawn one by one: `hecs::World::clear` resets entity generations,
        // which would let old handles resolve to new bodies.
        let entities: Vec<hecs::Entity> = self.world.iter().map(|e| e.entity()).collect();
        for entity in entities {
            let _ = self.world.despawn(entity);
        }
        self.contacts.clear();
    }

    pub fn body_count(&self) -> usize {
        self.world.len() as usize
    }

    /// Handles of all registered bodies, in registration order.
    pub fn bodies(&self) -> Vec<BodyHandle> {
        let mut handles: Vec<BodyHandle> = self
            .world
            .query::<&Body>()
            .iter()
            .map(|(entity, _)| BodyHandle(entity))
            .collect();
        handles.sort_unstable();
        handles
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.world.satisfies::<&Body>(handle.0).unwrap_or(false)
    }

    fn check(&self, handle: BodyHandle) -> Result<(), CollisionError> {
        if self.contains(handle) {
            Ok(())
        } else {
            Err(CollisionError::UnknownBody(handle))
        }
    }

    /// Cached world-space bounds. Refreshed every step for dynamic bodies and
    /// on [`set_transform`](Self::set_transform) for static ones.
    pub fn aabb(&self, handle: BodyHandle) -> Result<Aabb, CollisionError> {
        self.world
            .get::<&BodyAabb>(handle.0)
            .map(|aabb| aabb.0)
            .map_err(|_| CollisionError::UnknownBody(handle))
    }

    /// Local transform, relative to the parent if the body has one.
    pub fn transform(&self, handle: BodyHandle) -> Result<Transform, CollisionError> {
        self.world
            .get::<&Transform>(handle.0)
            .map(|t| *t)
            .map_err(|_| CollisionError::UnknownBody(handle))
    }

    pub fn global_transform(&self, handle: BodyHandle) -> Result<GlobalTransform, CollisionError> {
        self.world
            .get::<&GlobalTransform>(handle.0)
            .map(|g| *g)
            .map_err(|_| CollisionError::UnknownBody(handle))
    }

    /// Replace a body's local transform. World matrices are re-propagated and
    /// the AABBs of the body and its descendants recomputed, static or not.
    pub fn set_transform(
        &mut self,
        handle: BodyHandle,
        transform: Transform,
    ) -> Result<(), CollisionError> {
        self.check(handle)?;
        if let Ok(mut t) = self.world.get::<&mut Transform>(handle.0) {
            *t = transform;
        }
        transform_system(&mut self.world);
        self.refresh_subtree_aabbs(handle.0);
        Ok(())
    }

    /// Attach `child` under `parent`, or detach it with `None`. The child's
    /// local transform is kept, so its world placement follows the new parent.
    pub fn set_parent(
        &mut self,
        child: BodyHandle,
        parent: Option<BodyHandle>,
    ) -> Result<(), CollisionError> {
        self.check(child)?;
        if let Some(parent) = parent {
            self.check(parent)?;
            if parent == child {
                return Err(CollisionError::SelfParent(child));
            }
            // Walk up from the new parent; reaching the child means a loop.
            let mut cursor = Some(parent.0);
            while let Some(entity) = cursor {
                if entity == child.0 {
                    return Err(CollisionError::ParentCycle { child, parent });
                }
                cursor = self.world.get::<&Parent>(entity).ok().map(|p| p.0);
            }
        }

        let old_parent = self.world.get::<&Parent>(child.0).ok().map(|p| p.0);
        if let Some(old) = old_parent {
            if let Ok(mut children) = self.world.get::<&mut Children>(old) {
                children.0.retain(|&e| e != child.0);
            }
        }

        match parent {
            Some(parent) => {
                let _ = self.world.insert_one(child.0, Parent(parent.0));
                let has_children = self.world.satisfies::<&Children>(parent.0).unwrap_or(false);
                if has_children {
                    if let Ok(mut children) = self.world.get::<&mut Children>(parent.0) {
                        children.0.push(child.0);
                    }
                } else {
                    let _ = self.world.insert_one(parent.0, Children(vec![child.0]));
                }
            }
            None => {
                let _ = self.world.remove_one::<Parent>(child.0);
            }
        }

        transform_system(&mut self.world);
        self.refresh_subtree_aabbs(child.0);
        Ok(())
    }

    pub fn parent(&self, handle: BodyHandle) -> Result<Option<BodyHandle>, CollisionError> {
        self.check(handle)?;
        Ok(self
            .world
            .get::<&Parent>(handle.0)
            .ok()
            .map(|p| BodyHandle(p.0)))
    }

    /// Inactive bodies are ignored by the broadphase. Pairs they were part of
    /// exit on the next step.
    pub fn set_active(&mut self, handle: BodyHandle, active: bool) -> Result<(), CollisionError> {
        self.body_mut(handle, |body| body.active = active)
    }

    pub fn set_trigger(&mut self, handle: BodyHandle, is_trigger: bool) -> Result<(), CollisionError> {
        let mut collider = self
            .world
            .get::<&mut Collider>(handle.0)
            .map_err(|_| CollisionError::UnknownBody(handle))?;
        collider.is_trigger = is_trigger;
        Ok(())
    }

    pub fn set_user_data(&mut self, handle: BodyHandle, user_data: u64) -> Result<(), CollisionError> {
        self.body_mut(handle, |body| body.user_data = user_data)
    }

    pub fn user_data(&self, handle: BodyHandle) -> Result<u64, CollisionError> {
        self.world
            .get::<&Body>(handle.0)
            .map(|body| body.user_data)
            .map_err(|_| CollisionError::UnknownBody(handle))
    }

    fn body_mut(
        &mut self,
        handle: BodyHandle,
        f: impl FnOnce(&mut Body),
    ) -> Result<(), CollisionError> {
        let mut body = self
            .world
            .get::<&mut Body>(handle.0)
            .map_err(|_| CollisionError::UnknownBody(handle))?;
        f(&mut *body);
        Ok(())
    }

    /// Called once per step for every contact the body takes part in.
    pub fn set_contact_callback(
        &mut self,
        handle: BodyHandle,
        callback: impl FnMut(&ContactInfo) + Send + Sync + 'static,
    ) -> Result<(), CollisionError> {
        self.check(handle)?;
        self.world
            .insert_one(handle.0, ContactCallback(Box::new(callback)))
            .map_err(|_| CollisionError::UnknownBody(handle))
    }

    /// Called with the other body when a contact from the previous step ends.
    pub fn set_exit_callback(
        &mut self,
        handle: BodyHandle,
        callback: impl FnMut(BodyHandle) + Send + Sync + 'static,
    ) -> Result<(), CollisionError> {
        self.check(handle)?;
        self.world
            .insert_one(handle.0, ExitCallback(Box::new(callback)))
            .map_err(|_| CollisionError::UnknownBody(handle))
    }

    /// Run the narrowphase on two bodies at their current placement without
    /// resolving anything. The normal points from `a` toward `b`.
    pub fn query_contact(
        &self,
        a: BodyHandle,
        b: BodyHandle,
    ) -> Result<NarrowphaseResult, CollisionError> {
        self.check(a)?;
        self.check(b)?;
        self.narrowphase(a, b)
            .map(|(result, _, _)| result)
            .ok_or(CollisionError::UnknownBody(a))
    }

    /// Line-list vertices outlining the AABB of every active body.
    pub fn debug_wireframes(&self, color: [f32; 4]) -> Vec<DebugVertex> {
        let mut out = Vec::new();
        for (_, (body, aabb)) in self.world.query::<(&Body, &BodyAabb)>().iter() {
            if body.active {
                push_aabb_wireframe(&mut out, &aabb.0, color);
            }
        }
        out
    }

    /// Detect and resolve all contacts for one step.
    pub fn solve(&mut self) -> SolveStats {
        transform_system(&mut self.world);
        self.refresh_dynamic_aabbs();

        let pairs = self.broadphase.find_pairs(&self.world);
        let mut stats = SolveStats {
            bodies: self.body_count(),
            candidate_pairs: pairs.len(),
            contacts: 0,
        };

        for (a, b) in pairs {
            let Some((result, mobility_a, mobility_b)) = self.narrowphase(a, b) else {
                continue;
            };

            let penetration = match result.usable(&self.config) {
                Some(p) => p,
                None => {
                    match result {
                        NarrowphaseResult::Degenerate => {
                            tracing::warn!(?a, ?b, "EPA degenerate for overlapping pair, skipped");
                        }
                        NarrowphaseResult::Unconverged(p) => {
                            tracing::trace!(?a, ?b, depth = p.depth, "unconverged contact dropped");
                        }
                        _ => {}
                    }
                    continue;
                }
            };

            let (offset_a, offset_b) = split_correction(mobility_a, mobility_b, &penetration);
            apply_correction(&mut self.world, a.0, offset_a);
            apply_correction(&mut self.world, b.0, offset_b);

            let phase = self.contacts.touch(a, b);
            stats.contacts += 1;
            tracing::trace!(
                ?a,
                ?b,
                normal = ?penetration.normal,
                depth = penetration.depth,
                ?phase,
                "contact"
            );

            let info_a = ContactInfo {
                other: b,
                normal: -penetration.normal,
                depth: penetration.depth,
                correction: offset_a,
                phase,
            };
            let info_b = ContactInfo {
                other: a,
                normal: penetration.normal,
                depth: penetration.depth,
                correction: offset_b,
                phase,
            };
            self.notify_contact(a, &info_a);
            self.notify_contact(b, &info_b);
        }

        for (a, b) in self.contacts.finish_step() {
            tracing::trace!(?a, ?b, "contact exit");
            self.notify_exit(a, b);
            self.notify_exit(b, a);
        }

        transform_system(&mut self.world);
        self.refresh_dynamic_aabbs();

        tracing::debug!(
            bodies = stats.bodies,
            candidate_pairs = stats.candidate_pairs,
            contacts = stats.contacts,
            "collision step"
        );
        stats
    }

    fn narrowphase(
        &self,
        a: BodyHandle,
        b: BodyHandle,
    ) -> Option<(NarrowphaseResult, Mobility, Mobility)> {
        let collider_a = self.world.get::<&Collider>(a.0).ok()?;
        let collider_b = self.world.get::<&Collider>(b.0).ok()?;
        let global_a = *self.world.get::<&GlobalTransform>(a.0).ok()?;
        let global_b = *self.world.get::<&GlobalTransform>(b.0).ok()?;
        let kind_a = self.world.get::<&Body>(a.0).ok()?.kind;
        let kind_b = self.world.get::<&Body>(b.0).ok()?.kind;

        let result = collide(
            &collider_a.shape,
            &global_a,
            &collider_b.shape,
            &global_b,
            &self.config,
        );
        let mobility_a = Mobility {
            kind: kind_a,
            is_trigger: collider_a.is_trigger,
        };
        let mobility_b = Mobility {
            kind: kind_b,
            is_trigger: collider_b.is_trigger,
        };
        Some((result, mobility_a, mobility_b))
    }

    fn notify_contact(&mut self, handle: BodyHandle, info: &ContactInfo) {
        if let Ok(mut callback) = self.world.get::<&mut ContactCallback>(handle.0) {
            (callback.0)(info);
        }
    }

    fn notify_exit(&mut self, handle: BodyHandle, other: BodyHandle) {
        if let Ok(mut callback) = self.world.get::<&mut ExitCallback>(handle.0) {
            (callback.0)(other);
        }
    }

    fn refresh_dynamic_aabbs(&mut self) {
        for (_, (body, collider, global, aabb)) in self
            .world
            .query_mut::<(&Body, &Collider, &GlobalTransform, &mut BodyAabb)>()
        {
            if body.active && !body.is_static() {
                aabb.0 = collider.shape.compute_aabb(global);
            }
        }
    }

    fn refresh_subtree_aabbs(&mut self, root: hecs::Entity) {
        let mut stack = vec![root];
        while let Some(entity) = stack.pop() {
            let aabb = match (
                self.world.get::<&Collider>(entity),
                self.world.get::<&GlobalTransform>(entity),
            ) {
                (Ok(collider), Ok(global)) => collider.shape.compute_aabb(&global),
                _ => continue,
            };
            if let Ok(mut cached) = self.world.get::<&mut BodyAabb>(entity) {
                cached.0 = aabb;
            }
            if let Ok(children) = self.world.get::<&Children>(entity) {
                stack.extend(children.0.iter().copied());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use glam::{Quat, Vec3};

    use super::contact::ContactPhase;
    use super::*;

    fn unit_box() -> Shape {
        Shape::cuboid(Vec3::splat(0.5)).unwrap()
    }

    fn at(x: f32, y: f32, z: f32) -> Transform {
        Transform::from_translation(Vec3::new(x, y, z))
    }

    fn position(world: &CollisionWorld, handle: BodyHandle) -> Vec3 {
        world.global_transform(handle).unwrap().translation()
    }

    fn record_contacts(
        world: &mut CollisionWorld,
        handle: BodyHandle,
    ) -> Arc<Mutex<Vec<ContactInfo>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        world
            .set_contact_callback(handle, move |info| sink.lock().unwrap().push(*info))
            .unwrap();
        log
    }

    #[test]
    fn test_collision_config_default() {
        let config = CollisionConfig::default();
        assert_eq!(config.gjk_max_iterations, 64);
        assert_eq!(config.epa_max_iterations, 64);
        assert!((config.epa_tolerance - 1e-4).abs() < 1e-9);
        assert!(config.accept_unconverged);
    }

    #[test]
    fn test_dynamic_boxes_pushed_apart_symmetrically() {
        let mut world = CollisionWorld::default();
        let a = world.add_body(unit_box(), at(0.0, 0.0, 0.0), BodyKind::Dynamic);
        let b = world.add_body(unit_box(), at(0.9, 0.0, 0.0), BodyKind::Dynamic);
        let log_a = record_contacts(&mut world, a);
        let log_b = record_contacts(&mut world, b);

        let stats = world.solve();
        assert_eq!(stats.bodies, 2);
        assert_eq!(stats.candidate_pairs, 1);
        assert_eq!(stats.contacts, 1);

        let pa = position(&world, a);
        let pb = position(&world, b);
        assert!((pa.x + 0.05).abs() < 1e-3, "a at {pa:?}");
        assert!((pb.x - 0.95).abs() < 1e-3, "b at {pb:?}");
        // Equal and opposite.
        assert!(((pa.x - 0.0) + (pb.x - 0.9)).abs() < 1e-5);

        let info_a = log_a.lock().unwrap()[0];
        let info_b = log_b.lock().unwrap()[0];
        assert_eq!(info_a.other, b);
        assert_eq!(info_b.other, a);
        assert!((info_a.normal + Vec3::X).length() < 1e-3);
        assert!((info_b.normal - Vec3::X).length() < 1e-3);
        assert!((info_a.normal + info_b.normal).length() < 1e-6);
        assert!((info_a.depth - 0.1).abs() < 1e-3);
        assert!((info_a.correction + info_b.correction).length() < 1e-6);
        assert_eq!(info_a.phase, ContactPhase::Enter);

        // Cached AABBs follow the corrected positions.
        let aabb_b = world.aabb(b).unwrap();
        assert!((aabb_b.min.x - 0.45).abs() < 1e-3);
    }

    #[test]
    fn test_sphere_resting_on_static_ground() {
        let mut world = CollisionWorld::default();
        let ground = world.add_body(
            Shape::cuboid(Vec3::new(5.0, 0.5, 5.0)).unwrap(),
            at(0.0, -0.5, 0.0),
            BodyKind::Static,
        );
        let sphere = world.add_body(
            Shape::sphere(0.5).unwrap(),
            at(0.0, 0.4, 0.0),
            BodyKind::Dynamic,
        );
        let log = record_contacts(&mut world, sphere);

        world.solve();

        assert_eq!(position(&world, ground), Vec3::new(0.0, -0.5, 0.0));
        let p = position(&world, sphere);
        assert!((p.y - 0.5).abs() < 1e-3, "sphere at {p:?}");
        assert!(p.x.abs() < 1e-4 && p.z.abs() < 1e-4);

        let info = log.lock().unwrap()[0];
        assert!(info.normal.dot(Vec3::Y) > 0.999, "normal {:?}", info.normal);
        assert!((info.depth - 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_dynamic_spheres_split_depth() {
        let mut world = CollisionWorld::default();
        let a = world.add_body(Shape::sphere(1.0).unwrap(), at(0.0, 0.0, 0.0), BodyKind::Dynamic);
        let b = world.add_body(Shape::sphere(1.0).unwrap(), at(1.5, 0.0, 0.0), BodyKind::Dynamic);

        world.solve();

        let pa = position(&world, a);
        let pb = position(&world, b);
        assert!((pa.x + 0.25).abs() < 0.01, "a at {pa:?}");
        assert!((pb.x - 1.75).abs() < 0.01, "b at {pb:?}");
        assert!(((pb - pa).length() - 2.0).abs() < 0.02);
    }

    #[test]
    fn test_separated_on_z_is_untouched() {
        let mut world = CollisionWorld::default();
        let a = world.add_body(unit_box(), at(0.0, 0.0, 0.0), BodyKind::Dynamic);
        let b = world.add_body(unit_box(), at(0.0, 0.0, 2.0), BodyKind::Dynamic);
        let log = record_contacts(&mut world, a);

        let stats = world.solve();
        assert_eq!(stats.candidate_pairs, 0);
        assert_eq!(stats.contacts, 0);
        assert_eq!(position(&world, a), Vec3::ZERO);
        assert_eq!(position(&world, b), Vec3::new(0.0, 0.0, 2.0));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_solve_is_idempotent_on_separated_scene() {
        let mut world = CollisionWorld::default();
        let shapes = [
            Shape::sphere(0.4).unwrap(),
            unit_box(),
            Shape::capsule(Vec3::new(0.0, -0.3, 0.0), Vec3::new(0.0, 0.3, 0.0), 0.2).unwrap(),
            Shape::convex_mesh(vec![Vec3::X, -Vec3::X, Vec3::Y, Vec3::Z * 0.5]).unwrap(),
        ];
        let handles: Vec<BodyHandle> = shapes
            .into_iter()
            .enumerate()
            .map(|(i, shape)| {
                let t = Transform::from_translation(Vec3::new(i as f32 * 2.5, 0.3 * i as f32, 0.0))
                    .with_rotation(Quat::from_rotation_y(i as f32));
                world.add_body(shape, t, BodyKind::Dynamic)
            })
            .collect();

        let before: Vec<Vec3> = handles.iter().map(|&h| position(&world, h)).collect();
        for _ in 0..2 {
            let stats = world.solve();
            assert_eq!(stats.contacts, 0);
        }
        let after: Vec<Vec3> = handles.iter().map(|&h| position(&world, h)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_static_body_never_moves() {
        let mut world = CollisionWorld::default();
        let wall = world.add_body(unit_box(), at(0.0, 0.0, 0.0), BodyKind::Static);
        let rotated = Transform::from_translation(Vec3::new(0.6, 0.3, 0.0))
            .with_rotation(Quat::from_rotation_z(0.5));
        let mover = world.add_body(unit_box(), rotated, BodyKind::Dynamic);

        let stats = world.solve();
        assert_eq!(stats.contacts, 1);
        assert_eq!(position(&world, wall), Vec3::ZERO);
        let moved = position(&world, mover) - Vec3::new(0.6, 0.3, 0.0);
        assert!(moved.length() > 0.01, "mover displaced by {moved:?}");
    }

    #[test]
    fn test_static_pair_never_tested() {
        let mut world = CollisionWorld::default();
        let a = world.add_body(unit_box(), at(0.0, 0.0, 0.0), BodyKind::Static);
        world.add_body(unit_box(), at(0.2, 0.0, 0.0), BodyKind::Static);
        let log = record_contacts(&mut world, a);

        let stats = world.solve();
        assert_eq!(stats.candidate_pairs, 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_trigger_reports_without_correction() {
        let mut world = CollisionWorld::default();
        let zone = world.add_body(unit_box(), at(0.0, 0.0, 0.0), BodyKind::Static);
        world.set_trigger(zone, true).unwrap();
        let visitor = world.add_body(unit_box(), at(0.5, 0.0, 0.0), BodyKind::Dynamic);
        let zone_log = record_contacts(&mut world, zone);
        let visitor_log = record_contacts(&mut world, visitor);

        world.solve();

        assert_eq!(position(&world, visitor), Vec3::new(0.5, 0.0, 0.0));
        let info = zone_log.lock().unwrap()[0];
        assert_eq!(info.other, visitor);
        assert_eq!(info.correction, Vec3::ZERO);
        assert!(info.depth > 0.0);
        assert_eq!(visitor_log.lock().unwrap()[0].correction, Vec3::ZERO);
    }

    #[test]
    fn test_enter_stay_exit_sequence() {
        let mut world = CollisionWorld::default();
        let zone = world.add_body(unit_box(), at(0.0, 0.0, 0.0), BodyKind::Dynamic);
        world.set_trigger(zone, true).unwrap();
        let visitor = world.add_body(unit_box(), at(0.5, 0.0, 0.0), BodyKind::Dynamic);

        let log = record_contacts(&mut world, visitor);
        let exits = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&exits);
        world
            .set_exit_callback(visitor, move |other| sink.lock().unwrap().push(other))
            .unwrap();

        world.solve();
        world.solve();
        world.set_transform(visitor, at(5.0, 0.0, 0.0)).unwrap();
        world.solve();
        world.solve();

        let phases: Vec<ContactPhase> = log.lock().unwrap().iter().map(|i| i.phase).collect();
        assert_eq!(phases, vec![ContactPhase::Enter, ContactPhase::Stay]);
        assert_eq!(*exits.lock().unwrap(), vec![zone]);
    }

    #[test]
    fn test_deactivated_body_exits_and_is_ignored() {
        let mut world = CollisionWorld::default();
        let a = world.add_body(unit_box(), at(0.0, 0.0, 0.0), BodyKind::Static);
        world.set_trigger(a, true).unwrap();
        let b = world.add_body(unit_box(), at(0.5, 0.0, 0.0), BodyKind::Dynamic);
        let exits = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&exits);
        world
            .set_exit_callback(a, move |other| sink.lock().unwrap().push(other))
            .unwrap();

        assert_eq!(world.solve().contacts, 1);
        world.set_active(b, false).unwrap();
        let stats = world.solve();
        assert_eq!(stats.candidate_pairs, 0);
        assert_eq!(*exits.lock().unwrap(), vec![b]);
    }

    #[test]
    fn test_child_corrected_in_parent_space() {
        let mut world = CollisionWorld::default();
        let ground = world.add_body(
            Shape::cuboid(Vec3::new(10.0, 0.5, 10.0)).unwrap(),
            at(0.0, -0.5, 0.0),
            BodyKind::Static,
        );
        // Carrier far above the ground, rotated and scaled.
        let carrier_t = Transform::from_translation(Vec3::new(0.0, 10.0, 0.0))
            .with_rotation(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2))
            .with_scale(Vec3::splat(2.0));
        let carrier = world.add_body(Shape::sphere(0.1).unwrap(), carrier_t, BodyKind::Static);
        // Local z maps to world -y under the carrier's rotation, scaled by 2.
        let child = world.add_body(
            Shape::sphere(0.25).unwrap(),
            at(0.0, 0.0, 4.9),
            BodyKind::Dynamic,
        );
        world.set_parent(child, Some(carrier)).unwrap();

        // Sphere of world radius 0.5 centred at y = 0.2 sinks 0.3 into the ground.
        let start = position(&world, child);
        assert!((start - Vec3::new(0.0, 0.2, 0.0)).length() < 1e-4, "{start:?}");

        world.solve();

        let end = position(&world, child);
        assert!((end.y - 0.5).abs() < 1e-3, "child at {end:?}");
        assert_eq!(position(&world, ground), Vec3::new(0.0, -0.5, 0.0));
        let local = world.transform(child).unwrap().translation;
        assert!((local.z - 4.75).abs() < 1e-3, "local {local:?}");
        assert_eq!(world.parent(child).unwrap(), Some(carrier));
    }

    #[test]
    fn test_set_transform_refreshes_static_aabb() {
        let mut world = CollisionWorld::default();
        let wall = world.add_body(unit_box(), at(0.0, 0.0, 0.0), BodyKind::Static);
        world.set_transform(wall, at(3.0, 0.0, 0.0)).unwrap();
        let aabb = world.aabb(wall).unwrap();
        assert_eq!(aabb.center(), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_parent_errors() {
        let mut world = CollisionWorld::default();
        let a = world.add_body(unit_box(), Transform::identity(), BodyKind::Dynamic);
        let b = world.add_body(unit_box(), Transform::identity(), BodyKind::Dynamic);
        let c = world.add_body(unit_box(), Transform::identity(), BodyKind::Dynamic);

        assert_eq!(world.set_parent(a, Some(a)), Err(CollisionError::SelfParent(a)));
        world.set_parent(b, Some(a)).unwrap();
        world.set_parent(c, Some(b)).unwrap();
        assert_eq!(
            world.set_parent(a, Some(c)),
            Err(CollisionError::ParentCycle { child: a, parent: c })
        );

        // Re-parenting removes the child from its old parent.
        world.set_parent(c, Some(a)).unwrap();
        let children = world.world().get::<&Children>(b.entity()).unwrap().0.clone();
        assert!(children.is_empty());
        world.set_parent(c, None).unwrap();
        assert_eq!(world.parent(c).unwrap(), None);
    }

    #[test]
    fn test_unknown_body_after_clear() {
        let mut world = CollisionWorld::default();
        let a = world.add_body(unit_box(), Transform::identity(), BodyKind::Dynamic);
        world.set_user_data(a, 42).unwrap();
        assert_eq!(world.user_data(a).unwrap(), 42);
        assert_eq!(world.bodies(), vec![a]);

        world.clear();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.aabb(a), Err(CollisionError::UnknownBody(a)));
        assert_eq!(world.user_data(a), Err(CollisionError::UnknownBody(a)));
        assert_eq!(
            world.set_transform(a, Transform::identity()),
            Err(CollisionError::UnknownBody(a))
        );
        assert!(world.set_contact_callback(a, |_| {}).is_err());
        assert_eq!(world.solve(), SolveStats::default());
    }

    #[test]
    fn test_stale_handle_after_clear_is_unknown() {
        let mut world = CollisionWorld::default();
        let old = world.add_body(unit_box(), Transform::identity(), BodyKind::Dynamic);
        world.clear();
        let new = world.add_body(unit_box(), at(5.0, 0.0, 0.0), BodyKind::Static);

        assert_ne!(old, new);
        assert!(!world.contains(old));
        assert!(world.contains(new));
        assert_eq!(world.aabb(old), Err(CollisionError::UnknownBody(old)));
        assert_eq!(world.set_active(old, false), Err(CollisionError::UnknownBody(old)));
        assert_eq!(world.bodies(), vec![new]);
    }

    #[test]
    fn test_deep_off_axis_sphere_pair_resolved() {
        let mut world = CollisionWorld::default();
        let a = world.add_body(Shape::sphere(1.0).unwrap(), at(0.0, 0.0, 0.0), BodyKind::Dynamic);
        let b = world.add_body(
            Shape::sphere(1.0).unwrap(),
            at(0.695, -0.412, 0.292),
            BodyKind::Dynamic,
        );
        let before = position(&world, b).length();

        let stats = world.solve();

        assert_eq!(stats.contacts, 1);
        let gap = (position(&world, b) - position(&world, a)).length();
        assert!(gap > before + 1.0, "centres {gap} apart after solve");
    }

    #[test]
    fn test_query_contact_does_not_move_bodies() {
        let mut world = CollisionWorld::default();
        let a = world.add_body(unit_box(), at(0.0, 0.0, 0.0), BodyKind::Dynamic);
        let b = world.add_body(unit_box(), at(0.9, 0.0, 0.0), BodyKind::Dynamic);

        match world.query_contact(a, b).unwrap() {
            NarrowphaseResult::Penetrating(p) => {
                assert!((p.normal - Vec3::X).length() < 1e-3);
            }
            other => panic!("expected penetration, got {other:?}"),
        }
        assert_eq!(position(&world, b), Vec3::new(0.9, 0.0, 0.0));
    }

    #[test]
    fn test_debug_wireframes_cover_active_bodies() {
        let mut world = CollisionWorld::default();
        world.add_body(unit_box(), at(0.0, 0.0, 0.0), BodyKind::Static);
        let b = world.add_body(unit_box(), at(3.0, 0.0, 0.0), BodyKind::Dynamic);
        assert_eq!(world.debug_wireframes([1.0; 4]).len(), 48);

        world.set_active(b, false).unwrap();
        assert_eq!(world.debug_wireframes([1.0; 4]).len(), 24);
    }
}
