//! Scene models and their GPU-resident resources.
//!
//! [`Model`] is the CPU-side description: where the mesh comes from, which
//! texture to sample, the accumulated transform, and whether the instance
//! spins. [`GpuModel`] holds everything the GPU needs to draw it.
//!
//! Geometry and texture are uploaded once when the model enters the scene.
//! The uniform buffers and descriptor sets are per swapchain image and are
//! rebuilt on every swapchain recreation; replacing a texture rebuilds the
//! descriptor pool and sets for that one model.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ash::vk;
use glam::{Mat4, Vec3};
use tracing::{debug, info};

use prism_resources::{MeshData, MeshSource, TextureData};
use prism_rhi::RhiResult;
use prism_rhi::buffer::{Buffer, BufferUsage};
use prism_rhi::command::{CommandBuffer, CommandPool};
use prism_rhi::descriptor::{
    DescriptorPool, DescriptorSetLayout, buffer_info, image_info, update_descriptor_sets,
};
use prism_rhi::device::Device;
use prism_rhi::texture::Texture;
use prism_scene::Transform;

use crate::error::RendererResult;
use crate::ubo::UniformBufferObject;

/// CPU-side description of one scene instance.
#[derive(Clone, Debug)]
pub struct Model {
    source: MeshSource,
    texture_path: Option<PathBuf>,
    transform: Transform,
    animated: bool,
}

impl Model {
    fn new(source: MeshSource) -> Self {
        Self {
            source,
            texture_path: None,
            transform: Transform::new(),
            animated: false,
        }
    }

    /// A box primitive scaled to `width` x `height` x `depth`.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self::cuboid_at(width, height, depth, Vec3::ZERO)
    }

    /// A box primitive placed at `position` before scaling.
    pub fn cuboid_at(width: f32, height: f32, depth: f32, position: Vec3) -> Self {
        let mut model = Self::new(MeshSource::Box);
        model.transform = Transform::at(position);
        model.transform.scale(Vec3::new(width, height, depth));
        model
    }

    /// A sphere primitive of the given radius.
    pub fn sphere(radius: f32) -> Self {
        Self::sphere_at(radius, Vec3::ZERO)
    }

    /// A sphere primitive placed at `position` before scaling.
    pub fn sphere_at(radius: f32, position: Vec3) -> Self {
        let mut model = Self::new(MeshSource::Sphere);
        model.transform = Transform::at(position);
        model.transform.scale_uniform(radius);
        model
    }

    /// An XZ plane primitive of `width` x `depth`.
    pub fn plane(width: f32, depth: f32) -> Self {
        Self::plane_at(width, depth, Vec3::ZERO)
    }

    /// An XZ plane primitive placed at `position` before scaling.
    pub fn plane_at(width: f32, depth: f32, position: Vec3) -> Self {
        let mut model = Self::new(MeshSource::Plane);
        model.transform = Transform::at(position);
        model.transform.scale(Vec3::new(width, 1.0, depth));
        model
    }

    /// A mesh loaded from a Wavefront OBJ file.
    pub fn from_obj(path: impl Into<PathBuf>) -> Self {
        Self::new(MeshSource::ObjFile(path.into()))
    }

    /// An OBJ mesh placed at `position`.
    pub fn from_obj_at(path: impl Into<PathBuf>, position: Vec3) -> Self {
        let mut model = Self::new(MeshSource::ObjFile(path.into()));
        model.transform = Transform::at(position);
        model
    }

    /// Assigns the texture file sampled by the fragment stage.
    pub fn set_texture(&mut self, path: impl Into<PathBuf>) {
        self.texture_path = Some(path.into());
    }

    /// Moves the instance by a world-space offset.
    pub fn translate(&mut self, offset: Vec3) {
        self.transform.translate(offset);
    }

    /// Rotates the instance by Euler angles in degrees (X, then Y, then Z).
    pub fn rotate(&mut self, x_deg: f32, y_deg: f32, z_deg: f32) {
        self.transform.rotate(x_deg, y_deg, z_deg);
    }

    /// Scales the instance; zero components are ignored.
    pub fn scale(&mut self, factors: Vec3) {
        self.transform.scale(factors);
    }

    /// Toggles the 90°/s spin about the local Y axis.
    pub fn toggle_animated_rotation(&mut self) {
        self.animated = !self.animated;
    }

    /// Where the mesh data comes from.
    #[inline]
    pub fn source(&self) -> &MeshSource {
        &self.source
    }

    /// The assigned texture file, if any.
    #[inline]
    pub fn texture_path(&self) -> Option<&Path> {
        self.texture_path.as_deref()
    }

    /// The object-to-world matrix.
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        self.transform.matrix()
    }

    /// Whether the instance spins.
    #[inline]
    pub fn animated(&self) -> bool {
        self.animated
    }
}

/// GPU resources backing one [`Model`].
pub struct GpuModel {
    device: Arc<Device>,
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
    texture: Texture,
    uniform_buffers: Vec<Buffer>,
    descriptor_pool: DescriptorPool,
    descriptor_sets: Vec<vk::DescriptorSet>,
}

impl GpuModel {
    /// Uploads geometry and texture and builds the per-image resources.
    ///
    /// Models without an assigned texture get a generated checkerboard so
    /// the descriptor layout stays uniform across all draws.
    ///
    /// # Errors
    ///
    /// Returns an error if an asset fails to load or any GPU resource
    /// creation fails.
    pub fn new(
        device: Arc<Device>,
        pool: &CommandPool,
        instance: &ash::Instance,
        model: &Model,
        image_count: usize,
        layout: &DescriptorSetLayout,
    ) -> RendererResult<Self> {
        let mesh = MeshData::from_source(model.source())?;
        info!(
            source = ?model.source(),
            vertices = mesh.vertices.len(),
            triangles = mesh.triangle_count(),
            "Loaded mesh"
        );

        let vertex_buffer = upload_device_local(
            device.clone(),
            pool,
            BufferUsage::Vertex,
            bytemuck::cast_slice(&mesh.vertices),
        )?;
        let index_buffer = upload_device_local(
            device.clone(),
            pool,
            BufferUsage::Index,
            bytemuck::cast_slice(&mesh.indices),
        )?;

        let texture_data = match model.texture_path() {
            Some(path) => TextureData::load(path)?,
            None => TextureData::checkerboard(),
        };
        let texture = Texture::from_rgba8(
            device.clone(),
            pool,
            instance,
            texture_data.width,
            texture_data.height,
            &texture_data.pixels,
        )?;

        let (uniform_buffers, descriptor_pool, descriptor_sets) =
            create_per_image_resources(&device, image_count, layout)?;

        let gpu_model = Self {
            device,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            texture,
            uniform_buffers,
            descriptor_pool,
            descriptor_sets,
        };
        gpu_model.write_descriptor_sets();

        Ok(gpu_model)
    }

    /// Rebuilds the uniform buffers, descriptor pool, and descriptor sets
    /// for `image_count` swapchain images.
    ///
    /// Called at creation and after every swapchain recreation. No command
    /// buffer referencing the old sets may still be pending.
    ///
    /// # Errors
    ///
    /// Returns an error if buffer or descriptor creation fails.
    pub fn rebuild_per_image(
        &mut self,
        image_count: usize,
        layout: &DescriptorSetLayout,
    ) -> RendererResult<()> {
        let (uniform_buffers, descriptor_pool, descriptor_sets) =
            create_per_image_resources(&self.device, image_count, layout)?;

        self.uniform_buffers = uniform_buffers;
        self.descriptor_pool = descriptor_pool;
        self.descriptor_sets = descriptor_sets;
        self.write_descriptor_sets();

        debug!(images = image_count, "Rebuilt per-image model resources");
        Ok(())
    }

    /// Replaces the texture and rewrites the descriptor sets.
    ///
    /// The caller must have quiesced the command pool first: recorded
    /// command buffers reference the old descriptor sets.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload or descriptor update fails.
    pub fn replace_texture(
        &mut self,
        pool: &CommandPool,
        instance: &ash::Instance,
        data: &TextureData,
    ) -> RendererResult<()> {
        self.texture = Texture::from_rgba8(
            self.device.clone(),
            pool,
            instance,
            data.width,
            data.height,
            &data.pixels,
        )?;
        self.write_descriptor_sets();
        Ok(())
    }

    fn write_descriptor_sets(&self) {
        for (set, buffer) in self.descriptor_sets.iter().zip(&self.uniform_buffers) {
            let buffer_infos = [buffer_info(buffer.handle(), 0, UniformBufferObject::SIZE)];
            let image_infos = [image_info(
                self.texture.sampler(),
                self.texture.view(),
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            )];

            let writes = [
                vk::WriteDescriptorSet::default()
                    .dst_set(*set)
                    .dst_binding(0)
                    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                    .buffer_info(&buffer_infos),
                vk::WriteDescriptorSet::default()
                    .dst_set(*set)
                    .dst_binding(1)
                    .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                    .image_info(&image_infos),
            ];

            update_descriptor_sets(&self.device, &writes);
        }
    }

    /// Writes this frame's uniform block through the mapped pointer.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn update_uniform(
        &self,
        image_index: usize,
        ubo: &UniformBufferObject,
    ) -> RendererResult<()> {
        self.uniform_buffers[image_index].write_data(0, ubo.as_bytes())?;
        Ok(())
    }

    /// Records the bind-and-draw sequence for one swapchain image.
    pub fn record_draw(
        &self,
        cmd: &CommandBuffer,
        pipeline_layout: vk::PipelineLayout,
        image_index: usize,
    ) {
        cmd.bind_vertex_buffers(0, &[self.vertex_buffer.handle()], &[0]);
        cmd.bind_index_buffer(self.index_buffer.handle(), 0, vk::IndexType::UINT32);
        cmd.bind_descriptor_sets(
            vk::PipelineBindPoint::GRAPHICS,
            pipeline_layout,
            0,
            &[self.descriptor_sets[image_index]],
            &[],
        );
        cmd.draw_indexed(self.index_count, 1, 0, 0, 0);
    }

    /// Number of indices in the draw.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Builds the uniform buffers, descriptor pool, and descriptor sets for
/// one model across `image_count` swapchain images. The sets still need
/// their resource writes.
fn create_per_image_resources(
    device: &Arc<Device>,
    image_count: usize,
    layout: &DescriptorSetLayout,
) -> RendererResult<(Vec<Buffer>, DescriptorPool, Vec<vk::DescriptorSet>)> {
    let uniform_buffers = (0..image_count)
        .map(|_| {
            Buffer::new(
                device.clone(),
                BufferUsage::Uniform,
                UniformBufferObject::SIZE,
            )
        })
        .collect::<RhiResult<Vec<_>>>()?;

    let descriptor_pool = DescriptorPool::per_image(device.clone(), image_count as u32)?;
    let layouts = vec![layout.handle(); image_count];
    let descriptor_sets = descriptor_pool.allocate(&layouts)?;

    Ok((uniform_buffers, descriptor_pool, descriptor_sets))
}

/// Uploads `data` into a device-local buffer through a staging copy.
fn upload_device_local(
    device: Arc<Device>,
    pool: &CommandPool,
    usage: BufferUsage,
    data: &[u8],
) -> RhiResult<Buffer> {
    let staging = Buffer::new_with_data(device.clone(), BufferUsage::Staging, data)?;
    let buffer = Buffer::new(device, usage, data.len() as vk::DeviceSize)?;

    pool.submit_one_time(|cmd| {
        let region = vk::BufferCopy::default().size(data.len() as vk::DeviceSize);
        cmd.copy_buffer(staging.handle(), buffer.handle(), &[region]);
    })?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_bakes_extent_into_transform() {
        let model = Model::cuboid(2.0, 3.0, 0.5);
        let matrix = model.matrix();
        assert_eq!(matrix, Mat4::from_scale(Vec3::new(2.0, 3.0, 0.5)));
        assert!(!model.animated());
    }

    #[test]
    fn test_sphere_scales_uniformly() {
        let model = Model::sphere(5.0);
        assert_eq!(model.matrix(), Mat4::from_scale(Vec3::splat(5.0)));
    }

    #[test]
    fn test_positioned_primitive_translates_before_scaling() {
        let model = Model::plane_at(5.0, 5.0, Vec3::new(0.0, -4.0, 0.0));
        let origin = model.matrix().transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(0.0, -4.0, 0.0));
    }

    #[test]
    fn test_plane_keeps_unit_height() {
        let model = Model::plane(5.0, 5.0);
        assert_eq!(model.matrix(), Mat4::from_scale(Vec3::new(5.0, 1.0, 5.0)));
    }

    #[test]
    fn test_translate_after_scale_moves_in_world_space() {
        let mut model = Model::cuboid(2.0, 2.0, 2.0);
        model.translate(Vec3::new(1.0, 0.0, 0.0));
        let moved = model.matrix().transform_point3(Vec3::ZERO);
        // Post-multiplied translation is scaled by the existing transform.
        assert_eq!(moved, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_animation_toggle() {
        let mut model = Model::from_obj("meshes/thing.obj");
        assert!(!model.animated());
        model.toggle_animated_rotation();
        assert!(model.animated());
        model.toggle_animated_rotation();
        assert!(!model.animated());
    }

    #[test]
    fn test_texture_assignment() {
        let mut model = Model::sphere(1.0);
        assert!(model.texture_path().is_none());
        model.set_texture("tex/checker.png");
        assert_eq!(model.texture_path(), Some(Path::new("tex/checker.png")));
    }
}
