//! Rein Collision
//!
//! Convex collision detection and positional resolution built on glam and hecs.
//!
//! # Architecture
//!
//! The library is organized leaf-first:
//!
//! 1. **aabb** - Axis-aligned bounding boxes
//! 2. **shape** - Sphere, box, capsule and convex mesh support mappings
//! 3. **ecs** - Transform hierarchy and body components on a hecs world
//! 4. **physics** - Broadphase, GJK, EPA, positional solver and [`CollisionWorld`]
//! 5. **debug** - AABB wireframe vertices for an external renderer
//!
//! ```
//! use rein_collision::glam::Vec3;
//! use rein_collision::{BodyKind, CollisionWorld, Shape, Transform};
//!
//! let mut world = CollisionWorld::default();
//! let ground = world.add_body(
//!     Shape::cuboid(Vec3::new(5.0, 0.5, 5.0)).unwrap(),
//!     Transform::from_translation(Vec3::new(0.0, -0.5, 0.0)),
//!     BodyKind::Static,
//! );
//! let ball = world.add_body(
//!     Shape::sphere(0.5).unwrap(),
//!     Transform::from_translation(Vec3::new(0.0, 0.4, 0.0)),
//!     BodyKind::Dynamic,
//! );
//!
//! let stats = world.solve();
//! assert_eq!(stats.contacts, 1);
//! assert!(world.global_transform(ball).unwrap().translation().y > 0.49);
//! assert_eq!(world.aabb(ground).unwrap().max.y, 0.0);
//! ```

pub mod aabb;
pub mod debug;
pub mod ecs;
pub mod error;
pub mod physics;
pub mod shape;

pub use aabb::Aabb;
pub use debug::{aabb_wireframe, DebugVertex};
pub use ecs::components::{Body, BodyAabb, BodyKind, Collider, GlobalTransform, Transform};
pub use error::{CollisionError, ShapeError};
pub use physics::contact::{ContactInfo, ContactPhase};
pub use physics::epa::{EpaResult, Penetration};
pub use physics::narrowphase::{collide, NarrowphaseResult};
pub use physics::{BodyHandle, CollisionConfig, CollisionWorld, SolveStats};
pub use shape::{Capsule, ConvexMesh, Cuboid, Shape, Sphere, SupportMap};

// Re-export glam and hecs for convenience
pub use glam;
pub use hecs;
