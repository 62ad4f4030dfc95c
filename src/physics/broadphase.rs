//! Broadphase collision detection using AABB overlap tests.

use crate::ecs::components::physics::{Body, BodyAabb, Collider};

use super::BodyHandle;

/// All-pairs AABB broadphase.
///
/// Tests every unordered pair, so cost grows as O(n²) in the number of active
/// bodies. Fine for a few hundred bodies; larger scenes want a spatial
/// structure in front of the narrowphase.
#[derive(Debug, Default)]
pub struct AllPairs {
    entries: Vec<(BodyHandle, BodyAabb, bool)>,
}

impl AllPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find all pairs of active bodies whose cached AABBs overlap.
    ///
    /// Pairs where both bodies are static are never returned. Pairs are
    /// ordered by registration order of their first body.
    pub fn find_pairs(&mut self, world: &hecs::World) -> Vec<(BodyHandle, BodyHandle)> {
        self.entries.clear();
        for (entity, (body, aabb, _)) in world.query::<(&Body, &BodyAabb, &Collider)>().iter() {
            if !body.active {
                continue;
            }
            self.entries
                .push((BodyHandle(entity), *aabb, body.is_static()));
        }
        self.entries.sort_unstable_by_key(|(handle, _, _)| *handle);

        let mut pairs = Vec::new();
        for i in 0..self.entries.len() {
            let (handle_a, aabb_a, static_a) = self.entries[i];
            for &(handle_b, aabb_b, static_b) in &self.entries[i + 1..] {
                if static_a && static_b {
                    continue;
                }
                if aabb_a.0.intersects(&aabb_b.0) {
                    pairs.push((handle_a, handle_b));
                }
            }
        }

        tracing::trace!(
            bodies = self.entries.len(),
            pairs = pairs.len(),
            "broadphase"
        );
        pairs
    }
}
