//! ECS systems (transform propagation).

pub mod transform;

pub use transform::{parent_matrix, transform_system};
