//! Contact data delivered to callbacks, and pair tracking across steps.

use std::collections::HashSet;

use glam::Vec3;

use super::BodyHandle;

/// Whether a contact is new this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    /// The pair was not in contact on the previous step.
    Enter,
    /// The pair was already in contact on the previous step.
    Stay,
}

/// One body's view of a contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInfo {
    /// The body touched.
    pub other: BodyHandle,
    /// Unit direction pushing the receiving body out of `other`.
    pub normal: Vec3,
    /// Full penetration depth, `>= 0`.
    pub depth: f32,
    /// World-space displacement applied to the receiving body this step.
    pub correction: Vec3,
    pub phase: ContactPhase,
}

/// Contact callback component.
pub struct ContactCallback(pub Box<dyn FnMut(&ContactInfo) + Send + Sync>);

/// Exit callback component, called with the body that stopped touching.
pub struct ExitCallback(pub Box<dyn FnMut(BodyHandle) + Send + Sync>);

/// Pairs in contact on the previous and current step.
///
/// Pairs are stored under a canonical key so `(a, b)` and `(b, a)` match.
#[derive(Debug, Default)]
pub struct ContactTracker {
    previous: HashSet<(BodyHandle, BodyHandle)>,
    current: HashSet<(BodyHandle, BodyHandle)>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a contact this step and report whether it is new.
    pub fn touch(&mut self, a: BodyHandle, b: BodyHandle) -> ContactPhase {
        let key = Self::pair_key(a, b);
        self.current.insert(key);
        if self.previous.contains(&key) {
            ContactPhase::Stay
        } else {
            ContactPhase::Enter
        }
    }

    /// Close the step. Returns the pairs that were touching last step but not
    /// this one.
    pub fn finish_step(&mut self) -> Vec<(BodyHandle, BodyHandle)> {
        let mut exited: Vec<_> = self.previous.difference(&self.current).copied().collect();
        exited.sort_unstable();
        self.previous = std::mem::take(&mut self.current);
        exited
    }

    pub fn clear(&mut self) {
        self.previous.clear();
        self.current.clear();
    }

    fn pair_key(a: BodyHandle, b: BodyHandle) -> (BodyHandle, BodyHandle) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}
