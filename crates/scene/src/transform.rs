//! Model transforms.
//!
//! [`Transform`] accumulates translation, rotation and scale into a single
//! model matrix. Operations post-multiply, so they compose in local space:
//! a translate followed by a rotate spins the object around its moved
//! origin, matching how the scene script builds up each model.
//!
//! # Example
//!
//! ```
//! use prism_scene::Transform;
//! use glam::Vec3;
//!
//! let mut transform = Transform::new();
//! transform.translate(Vec3::new(3.0, 0.0, -1.0));
//! transform.rotate(10.0, 20.0, 40.0);
//! let model = transform.matrix();
//! ```

use glam::{Mat4, Vec3};

/// Accumulated model matrix for one scene object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }
}

impl Transform {
    /// Creates an identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transform translated to `position`.
    pub fn at(position: Vec3) -> Self {
        let mut transform = Self::new();
        transform.translate(position);
        transform
    }

    /// Appends a translation in local space.
    pub fn translate(&mut self, offset: Vec3) {
        self.matrix *= Mat4::from_translation(offset);
    }

    /// Appends rotations around the local X, then Y, then Z axes.
    ///
    /// Angles are in degrees.
    pub fn rotate(&mut self, x_deg: f32, y_deg: f32, z_deg: f32) {
        self.matrix *= Mat4::from_rotation_x(x_deg.to_radians());
        self.matrix *= Mat4::from_rotation_y(y_deg.to_radians());
        self.matrix *= Mat4::from_rotation_z(z_deg.to_radians());
    }

    /// Appends a non-uniform scale.
    ///
    /// Ignored entirely if any component is zero, which would collapse
    /// the object.
    pub fn scale(&mut self, factors: Vec3) {
        if factors.x != 0.0 && factors.y != 0.0 && factors.z != 0.0 {
            self.matrix *= Mat4::from_scale(factors);
        }
    }

    /// Appends a uniform scale. Ignored when `amount` is zero.
    pub fn scale_uniform(&mut self, amount: f32) {
        self.scale(Vec3::splat(amount));
    }

    /// Returns the accumulated model matrix.
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_identity_default() {
        assert_eq!(Transform::new().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_translate_moves_origin() {
        let mut t = Transform::new();
        t.translate(Vec3::new(1.0, 2.0, 3.0));
        let origin = t.matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_rotate_z_uses_z_angle() {
        let mut t = Transform::new();
        t.rotate(0.0, 0.0, 90.0);
        // Rotation of 90° around Z carries +X into +Y.
        let x = (t.matrix() * Vec4::new(1.0, 0.0, 0.0, 0.0)).truncate();
        assert!((x - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_rotate_order_x_then_y_then_z() {
        // With M = Rx·Ry·Rz, rotate(90, 90, 0) sends +X through
        // Ry to -Z and then through Rx to +Y. The reversed order
        // (Ry·Rx) would leave +X on -Z.
        let mut t = Transform::new();
        t.rotate(90.0, 90.0, 0.0);
        let x = (t.matrix() * Vec4::new(1.0, 0.0, 0.0, 0.0)).truncate();
        assert!((x - Vec3::Y).length() < 1e-5);

        // Likewise rotate(90, 0, 90) sends +X through Rz to +Y and
        // then through Rx to +Z; Rz after Rx would stop at +Y.
        let mut t = Transform::new();
        t.rotate(90.0, 0.0, 90.0);
        let x = (t.matrix() * Vec4::new(1.0, 0.0, 0.0, 0.0)).truncate();
        assert!((x - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_scale_applies() {
        let mut t = Transform::new();
        t.scale(Vec3::new(2.0, 3.0, 0.5));
        let p = (t.matrix() * Vec4::new(1.0, 1.0, 1.0, 1.0)).truncate();
        assert_eq!(p, Vec3::new(2.0, 3.0, 0.5));
    }

    #[test]
    fn test_zero_scale_component_ignored() {
        let mut t = Transform::new();
        t.scale(Vec3::new(2.0, 0.0, 1.0));
        assert_eq!(t.matrix(), Mat4::IDENTITY);

        t.scale_uniform(0.0);
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_operations_compose_in_local_space() {
        let mut t = Transform::at(Vec3::new(5.0, 0.0, 0.0));
        t.scale_uniform(2.0);
        let origin = (t.matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0)).truncate();
        // Scale after translate leaves the moved origin in place.
        assert_eq!(origin, Vec3::new(5.0, 0.0, 0.0));
        let unit = (t.matrix() * Vec4::new(1.0, 0.0, 0.0, 1.0)).truncate();
        assert_eq!(unit, Vec3::new(7.0, 0.0, 0.0));
    }
}
