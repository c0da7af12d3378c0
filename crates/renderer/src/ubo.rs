//! Per-draw uniform data.
//!
//! One [`UniformBufferObject`] per model per swapchain image, rewritten on
//! the host every frame through the buffer's mapped pointer. The layout
//! matches the `UniformBufferObject` block at binding 0 of the vertex
//! shader: three column-major `mat4`s, std140-compatible without padding.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Degrees per second for models with animated rotation enabled.
const SPIN_DEGREES_PER_SECOND: f32 = 90.0;

/// Model, view, and projection matrices for one draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct UniformBufferObject {
    /// Object-to-world transform.
    pub model: Mat4,
    /// World-to-camera transform.
    pub view: Mat4,
    /// Camera-to-clip transform, Y flipped for Vulkan clip space.
    pub proj: Mat4,
}

impl UniformBufferObject {
    /// Size in bytes, the range bound at descriptor binding 0.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Assembles the block for one model.
    ///
    /// `projection` comes in with OpenGL conventions (Y up in clip space);
    /// the Y axis is negated here so geometry lands right side up. Models
    /// with `animated` set spin about their local Y axis at 90 degrees per
    /// second of `elapsed_seconds`.
    pub fn compose(
        model: Mat4,
        view: Mat4,
        projection: Mat4,
        animated: bool,
        elapsed_seconds: f32,
    ) -> Self {
        let model = if animated {
            model
                * Mat4::from_rotation_y(
                    (SPIN_DEGREES_PER_SECOND * elapsed_seconds).to_radians(),
                )
        } else {
            model
        };

        let mut proj = projection;
        proj.y_axis.y = -proj.y_axis.y;

        Self { model, view, proj }
    }

    /// Returns the block as bytes for a mapped-memory write.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_layout_is_three_mat4s() {
        assert_eq!(UniformBufferObject::SIZE, 3 * 64);
    }

    #[test]
    fn test_projection_y_flip() {
        let proj = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        let ubo = UniformBufferObject::compose(Mat4::IDENTITY, Mat4::IDENTITY, proj, false, 0.0);
        assert_eq!(ubo.proj.y_axis.y, -proj.y_axis.y);
    }

    #[test]
    fn test_static_model_matrix_passes_through() {
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let ubo =
            UniformBufferObject::compose(model, Mat4::IDENTITY, Mat4::IDENTITY, false, 5.0);
        assert_eq!(ubo.model, model);
    }

    #[test]
    fn test_animated_model_spins_quarter_turn_per_second() {
        // 90 deg/s for one second carries local +Z to +X under a Y rotation.
        let ubo = UniformBufferObject::compose(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            true,
            1.0,
        );
        let spun = ubo.model.transform_vector3(Vec3::Z);
        assert!((spun - Vec3::X).length() < 1e-5);
    }
}
