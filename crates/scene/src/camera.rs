//! Free-flying camera.
//!
//! Orientation is stored as yaw/pitch/roll in degrees and rebuilt into a
//! look/up/right basis on every update. Movement accumulates into a
//! translation vector that is folded into the position when the basis is
//! recomputed, so a frame's walk/strafe/lift calls compose cleanly.

use glam::{Mat4, Vec3, Vec4};

/// Default vertical field of view in degrees.
const DEFAULT_FOV: f32 = 45.0;
/// Near clip distance.
const Z_NEAR: f32 = 0.1;
/// Far clip distance.
const Z_FAR: f32 = 1000.0;
/// Default movement speed in units per second.
const DEFAULT_SPEED: f32 = 2.0;
/// Pitch limit keeping the view away from the poles.
const PITCH_LIMIT: f32 = 89.0;

/// Projection-owning camera capability.
///
/// The renderer only needs matrices and projection state; how a camera
/// decides to move is up to the implementation. [`FreeCamera`] is the one
/// concrete implementation.
pub trait Camera {
    /// Recomputes matrices from the current state.
    fn update(&mut self);
    /// World-to-camera transform.
    fn view_matrix(&self) -> Mat4;
    /// Camera-to-clip transform, OpenGL conventions (no Vulkan Y-flip).
    fn projection_matrix(&self) -> Mat4;
    /// World position.
    fn position(&self) -> Vec3;
    /// Vertical field of view in degrees.
    fn fov(&self) -> f32;
    /// Adjusts the field of view by `delta` degrees, saturating at [1°, 180°].
    fn change_fov(&mut self, delta: f32);
    /// Sets the aspect ratio, typically after a window resize.
    fn set_aspect_ratio(&mut self, aspect_ratio: f32);
}

/// Free-flying perspective camera.
#[derive(Clone, Debug)]
pub struct FreeCamera {
    view: Mat4,
    projection: Mat4,
    fov: f32,
    aspect_ratio: f32,
    yaw: f32,
    pitch: f32,
    roll: f32,
    position: Vec3,
    translation: Vec3,
    look: Vec3,
    up: Vec3,
    right: Vec3,
    speed: f32,
}

impl Default for FreeCamera {
    fn default() -> Self {
        let mut camera = Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            fov: DEFAULT_FOV,
            aspect_ratio: 1.0,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            position: Vec3::ZERO,
            translation: Vec3::ZERO,
            look: Vec3::Z,
            up: Vec3::Y,
            right: Vec3::ZERO,
            speed: DEFAULT_SPEED,
        };
        camera.update();
        camera
    }
}

impl FreeCamera {
    /// Creates a camera at the origin looking down +Z.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a camera at the origin with the given aspect ratio.
    pub fn with_aspect(aspect_ratio: f32) -> Self {
        let mut camera = Self::default();
        camera.aspect_ratio = aspect_ratio;
        camera.update();
        camera
    }

    /// Creates a camera at the given position.
    pub fn at(position: Vec3) -> Self {
        let mut camera = Self::default();
        camera.position = position;
        camera.update();
        camera
    }

    /// Creates a camera at the given position and aspect ratio.
    pub fn at_with_aspect(position: Vec3, aspect_ratio: f32) -> Self {
        let mut camera = Self::at(position);
        camera.aspect_ratio = aspect_ratio;
        camera.update();
        camera
    }

    /// Recomputes the basis vectors and matrices from the current state.
    ///
    /// Applies pending translation, rebuilds look/up/right from the Euler
    /// angles (yaw around Y, then pitch around X, then roll around Z) and
    /// refreshes both matrices.
    pub fn update(&mut self) {
        let rotation = Mat4::from_rotation_y(self.yaw.to_radians())
            * Mat4::from_rotation_x(self.pitch.to_radians())
            * Mat4::from_rotation_z(self.roll.to_radians());

        self.position += self.translation;
        self.translation = Vec3::ZERO;

        self.look = (rotation * Vec4::new(0.0, 0.0, 1.0, 0.0)).truncate();
        self.up = (rotation * Vec4::new(0.0, 1.0, 0.0, 0.0)).truncate();
        self.right = self.look.cross(self.up);

        let target = self.position + self.look;
        self.view = Mat4::look_at_rh(self.position, target, self.up);
        self.projection = Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect_ratio,
            Z_NEAR,
            Z_FAR,
        );
    }

    /// Moves along the look vector by `amount` world units.
    pub fn walk(&mut self, amount: f32) {
        self.translation += amount * self.look;
        self.update();
    }

    /// Moves along the right vector by `amount` world units.
    pub fn strafe(&mut self, amount: f32) {
        self.translation += amount * self.right;
        self.update();
    }

    /// Moves along the up vector by `amount` world units.
    pub fn lift(&mut self, amount: f32) {
        self.translation += amount * self.up;
        self.update();
    }

    /// Adds a raw world-space offset to the pending translation.
    pub fn translate(&mut self, offset: Vec3) {
        self.translation += offset;
        self.update();
    }

    /// Adds yaw and pitch deltas in degrees, clamping pitch to ±89°.
    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update();
    }

    /// Sets the absolute orientation in degrees.
    pub fn set_rotation(&mut self, yaw: f32, pitch: f32, roll: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
        self.roll = roll;
        self.update();
    }

    /// Moves the camera to an absolute position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update();
    }

    /// Adjusts the field of view by `delta` degrees, clamped to [1°, 180°].
    pub fn change_fov(&mut self, delta: f32) {
        self.fov = (self.fov + delta).clamp(1.0, 180.0);
        self.update();
    }

    /// Sets the aspect ratio, typically after a window resize.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.update();
    }

    /// Sets the movement speed in units per second.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Returns the movement speed in units per second.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Returns the view matrix.
    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// Returns the projection matrix (without any Vulkan Y-flip).
    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Returns the world position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Returns the field of view in degrees.
    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Returns the normalized look direction.
    #[inline]
    pub fn look(&self) -> Vec3 {
        self.look
    }
}

impl Camera for FreeCamera {
    fn update(&mut self) {
        FreeCamera::update(self);
    }

    fn view_matrix(&self) -> Mat4 {
        FreeCamera::view_matrix(self)
    }

    fn projection_matrix(&self) -> Mat4 {
        FreeCamera::projection_matrix(self)
    }

    fn position(&self) -> Vec3 {
        FreeCamera::position(self)
    }

    fn fov(&self) -> f32 {
        FreeCamera::fov(self)
    }

    fn change_fov(&mut self, delta: f32) {
        FreeCamera::change_fov(self, delta);
    }

    fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        FreeCamera::set_aspect_ratio(self, aspect_ratio);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = FreeCamera::new();
        assert_eq!(camera.fov(), 45.0);
        assert_eq!(camera.speed(), 2.0);
        assert_eq!(camera.position(), Vec3::ZERO);
        // Identity orientation looks down +Z.
        assert!((camera.look() - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_default_view_is_origin_look_at() {
        let camera = FreeCamera::new();
        let expected = Mat4::look_at_rh(Vec3::ZERO, Vec3::Z, Vec3::Y);
        assert_eq!(camera.view_matrix(), expected);
    }

    #[test]
    fn test_walk_moves_along_look() {
        let mut camera = FreeCamera::new();
        camera.walk(3.0);
        assert!((camera.position() - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_strafe_is_perpendicular_to_look() {
        let mut camera = FreeCamera::new();
        let look = camera.look();
        camera.strafe(1.0);
        assert!(camera.position().dot(look).abs() < 1e-5);
        assert!(camera.position().length() > 0.9);
    }

    #[test]
    fn test_lift_moves_up() {
        let mut camera = FreeCamera::new();
        camera.lift(2.0);
        assert!((camera.position().y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut camera = FreeCamera::new();
        camera.rotate(0.0, 200.0);
        assert_eq!(camera.pitch, 89.0);
        camera.rotate(0.0, -500.0);
        assert_eq!(camera.pitch, -89.0);
    }

    #[test]
    fn test_yaw_turns_look() {
        let mut camera = FreeCamera::new();
        camera.rotate(90.0, 0.0);
        // Yaw 90° around Y carries +Z into +X.
        assert!((camera.look() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_fov_clamped() {
        let mut camera = FreeCamera::new();
        camera.change_fov(1000.0);
        assert_eq!(camera.fov(), 180.0);
        camera.change_fov(-1000.0);
        assert_eq!(camera.fov(), 1.0);
        camera.change_fov(44.0);
        assert_eq!(camera.fov(), 45.0);
    }

    #[test]
    fn test_projection_tracks_fov_and_aspect() {
        let mut camera = FreeCamera::with_aspect(2.0);
        let before = camera.projection_matrix();
        camera.change_fov(20.0);
        let after = camera.projection_matrix();
        assert_ne!(before, after);
    }

    #[test]
    fn test_translation_folds_once() {
        let mut camera = FreeCamera::new();
        camera.walk(1.0);
        let pos = camera.position();
        // A later unrelated update must not re-apply the walk.
        camera.update();
        assert_eq!(camera.position(), pos);
    }
}
