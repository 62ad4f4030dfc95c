//! ECS components (transform, collision bodies).

pub mod physics;
pub mod transform;

pub use physics::*;
pub use transform::*;
