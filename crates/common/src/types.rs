use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Where an object sits in the world: scale, Euler rotation in degrees, position.
///
/// Rotation is stored as three separate angles rather than a quaternion because
/// the composition order is part of the scene contract (see [`Placement::model_matrix`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub scale: Vec3,
    /// Rotation about the world X, Y and Z axes, in degrees.
    pub rotation_degrees: Vec3,
    pub position: Vec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation_degrees: Vec3::ZERO,
            position: Vec3::ZERO,
        }
    }
}

impl Placement {
    pub fn new(scale: Vec3, rotation_degrees: Vec3, position: Vec3) -> Self {
        Self {
            scale,
            rotation_degrees,
            position,
        }
    }

    /// Model matrix `T * Rx * Ry * Rz * S`.
    ///
    /// A local point is scaled first, then rotated about Z, then Y, then X,
    /// then translated.
    pub fn model_matrix(&self) -> Mat4 {
        model_matrix(self.scale, self.rotation_degrees, self.position)
    }
}

/// Compose a model matrix from scale, X/Y/Z rotation in degrees, and position.
pub fn model_matrix(scale: Vec3, rotation_degrees: Vec3, position: Vec3) -> Mat4 {
    let translation = Mat4::from_translation(position);
    let rotation_x = Mat4::from_rotation_x(rotation_degrees.x.to_radians());
    let rotation_y = Mat4::from_rotation_y(rotation_degrees.y.to_radians());
    let rotation_z = Mat4::from_rotation_z(rotation_degrees.z.to_radians());
    let scale = Mat4::from_scale(scale);
    translation * rotation_x * rotation_y * rotation_z * scale
}

/// Rotation of `degrees` about a vertical axis through `pivot`.
pub fn rotation_about_vertical(pivot: Vec3, degrees: f32) -> Mat4 {
    Mat4::from_translation(pivot)
        * Mat4::from_rotation_y(degrees.to_radians())
        * Mat4::from_translation(-pivot)
}
