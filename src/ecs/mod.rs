//! Entity Component System integration with hecs.
//!
//! Every collision body is a `hecs` entity carrying transform and body
//! components. [`CollisionWorld`](crate::physics::CollisionWorld) owns the
//! world; these modules are exposed for callers that want to inspect it.

pub mod components;
pub mod systems;
