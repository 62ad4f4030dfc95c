//! Transform components for collision bodies.

use glam::{Mat3, Mat4, Quat, Vec3};

/// Local-space transform, relative to the parent if the entity has one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Create an identity transform.
    pub fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Create a transform from a translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a 4x4 matrix (translation * rotation * scale).
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Decompose an affine matrix without shear.
    pub fn from_matrix(mat: Mat4) -> Self {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Cached world matrix and its inverse. Rebuilt by
/// [`transform_system`](crate::ecs::systems::transform_system).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalTransform {
    matrix: Mat4,
    inverse: Mat4,
}

impl GlobalTransform {
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            matrix,
            inverse: matrix.inverse(),
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            matrix: Mat4::from_translation(translation),
            inverse: Mat4::from_translation(-translation),
        }
    }

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    #[inline]
    pub fn inverse(&self) -> Mat4 {
        self.inverse
    }

    /// World-space origin of the local frame.
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.matrix.transform_point3(point)
    }

    /// Map a world-space direction into the local frame for support queries.
    ///
    /// Uses the transpose of the linear part: maximizing `dot(M p, d)` over
    /// local points `p` is maximizing `dot(p, Mᵀ d)`, which stays exact under
    /// non-uniform scale.
    #[inline]
    pub fn direction_to_local(&self, direction: Vec3) -> Vec3 {
        Mat3::from_mat4(self.matrix).transpose() * direction
    }

    /// Largest axis scale. Used to scale radii of round shapes.
    #[inline]
    pub fn max_scale(&self) -> f32 {
        self.matrix
            .x_axis
            .truncate()
            .length_squared()
            .max(self.matrix.y_axis.truncate().length_squared())
            .max(self.matrix.z_axis.truncate().length_squared())
            .sqrt()
    }

    /// Shift the world matrix by a world-space offset.
    pub fn translate(&mut self, offset: Vec3) {
        *self = Self::from_matrix(Mat4::from_translation(offset) * self.matrix);
    }
}

impl Default for GlobalTransform {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
            inverse: Mat4::IDENTITY,
        }
    }
}

/// Reference to a parent entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub hecs::Entity);

/// List of child entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Children(pub Vec<hecs::Entity>);
