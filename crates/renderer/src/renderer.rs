//! Renderer orchestration.
//!
//! [`Renderer`] owns every GPU resource in dependency order and drives the
//! per-frame tick. Command buffers are recorded once per swapchain image
//! and replayed every frame; only the uniform buffers change per tick.
//! Anything derived from the swapchain (attachments, framebuffers, the
//! pipeline with its baked scissor, per-model descriptor resources, the
//! recorded command buffers) is torn down and rebuilt as a unit whenever
//! presentation goes stale or the window is resized.

use std::mem::ManuallyDrop;
use std::path::Path;
use std::sync::Arc;

use ash::vk;
use tracing::{debug, error, info};

use prism_platform::{Surface, Window};
use prism_resources::TextureData;
use prism_rhi::command::{CommandBuffer, CommandPool};
use prism_rhi::descriptor::DescriptorSetLayout;
use prism_rhi::device::Device;
use prism_rhi::framebuffer::Framebuffers;
use prism_rhi::instance::Instance;
use prism_rhi::physical_device::select_physical_device;
use prism_rhi::pipeline::{GraphicsPipelineBuilder, Pipeline, PipelineLayout, PolygonMode};
use prism_rhi::render_pass::{RenderPass, find_depth_format};
use prism_rhi::shader::{Shader, ShaderStage};
use prism_rhi::swapchain::Swapchain;
use prism_rhi::vertex::Vertex;
use prism_scene::{Camera, FreeCamera};

use crate::attachments::RenderTargets;
use crate::error::{RendererError, RendererResult};
use crate::frame::{AcquireResult, FrameManager};
use crate::model::{GpuModel, Model};
use crate::ubo::UniformBufferObject;

/// SPIR-V path of the shared vertex stage.
const VERT_SHADER_PATH: &str = "shaders/spirv/scene.vert.spv";
/// SPIR-V path of the textured fill fragment stage.
const FILL_FRAG_PATH: &str = "shaders/spirv/scene.frag.spv";
/// SPIR-V path of the flat-color fragment stage used in wireframe mode.
const WIREFRAME_FRAG_PATH: &str = "shaders/spirv/wireframe.frag.spv";

/// Rasterization line width, set as dynamic state during recording.
const LINE_WIDTH: f32 = 0.5;

/// Vulkan renderer driving the forward pass.
///
/// Fields are declared in reverse destruction order; [`Drop`] tears them
/// down explicitly front to back of the dependency chain.
pub struct Renderer {
    /// Vulkan instance (destroyed last).
    instance: ManuallyDrop<Instance>,
    /// Logical device, dropped after everything created from it.
    device: ManuallyDrop<Arc<Device>>,
    /// Window surface (destroyed after the device, before the instance).
    surface: ManuallyDrop<Surface>,
    /// Swapchain with its image views.
    swapchain: ManuallyDrop<Swapchain>,
    /// Forward render pass.
    render_pass: ManuallyDrop<RenderPass>,
    /// MSAA color and depth attachments.
    targets: ManuallyDrop<RenderTargets>,
    /// One framebuffer per swapchain image.
    framebuffers: ManuallyDrop<Framebuffers>,
    /// Layout of the per-model (uniform, sampler) descriptor pair.
    descriptor_set_layout: ManuallyDrop<DescriptorSetLayout>,
    /// Pipeline layout over that single set.
    pipeline_layout: ManuallyDrop<PipelineLayout>,
    /// Graphics pipeline for the current polygon mode.
    pipeline: ManuallyDrop<Pipeline>,
    /// Pool the pre-recorded command buffers come from.
    command_pool: ManuallyDrop<CommandPool>,
    /// One pre-recorded command buffer per swapchain image.
    command_buffers: Vec<vk::CommandBuffer>,
    /// GPU resources per scene model, same order as the scene list.
    models: ManuallyDrop<Vec<GpuModel>>,
    /// Frame-in-flight pacing.
    frames: ManuallyDrop<FrameManager>,

    /// Whether the wireframe pipeline is active.
    wireframe: bool,
    /// Flag set by resize events, honored on the next tick.
    framebuffer_resized: bool,
    /// Current framebuffer width.
    width: u32,
    /// Current framebuffer height.
    height: u32,
}

impl Renderer {
    /// Builds the full rendering stack for `window` and uploads every
    /// model in `scene_models`.
    ///
    /// # Errors
    ///
    /// Returns an error if any Vulkan setup step or asset upload fails;
    /// initialization failures are fatal to the run.
    pub fn new(window: &Window, scene_models: &[Model]) -> RendererResult<Self> {
        info!("Initializing renderer");

        let instance = Instance::new(cfg!(debug_assertions))?;
        let surface = window.create_surface(instance.entry(), instance.handle())?;

        let physical_device_info =
            select_physical_device(instance.handle(), surface.handle(), surface.loader())?;
        let device = Device::new(&instance, &physical_device_info)?;

        let (width, height) = window.framebuffer_size();
        let swapchain = Swapchain::new(&instance, device.clone(), surface.handle(), width, height)?;

        let depth_format = find_depth_format(instance.handle(), device.physical_device())?;
        let render_pass = RenderPass::forward(
            device.clone(),
            swapchain.format(),
            depth_format,
            device.msaa_samples(),
        )?;
        let targets = RenderTargets::new(
            device.clone(),
            swapchain.extent(),
            swapchain.format(),
            depth_format,
            device.msaa_samples(),
        )?;
        let framebuffers = Framebuffers::new(
            device.clone(),
            &render_pass,
            targets.color_view(),
            targets.depth_view(),
            swapchain.image_views(),
            swapchain.extent(),
        )?;

        let command_pool = CommandPool::new(
            device.clone(),
            device.queue_families().graphics_family.unwrap(),
        )?;

        let descriptor_set_layout = DescriptorSetLayout::for_forward_pass(device.clone())?;
        let pipeline_layout =
            PipelineLayout::new(device.clone(), &[descriptor_set_layout.handle()], &[])?;
        let pipeline = Self::create_pipeline(
            &device,
            render_pass.handle(),
            swapchain.extent(),
            &pipeline_layout,
            false,
        )?;

        let models = scene_models
            .iter()
            .map(|model| {
                GpuModel::new(
                    device.clone(),
                    &command_pool,
                    instance.handle(),
                    model,
                    swapchain.image_count(),
                    &descriptor_set_layout,
                )
            })
            .collect::<RendererResult<Vec<_>>>()?;

        let frames = FrameManager::new(device.clone(), swapchain.image_count())?;

        let command_buffers = command_pool.allocate_command_buffers(framebuffers.len() as u32)?;
        record_commands(
            &device,
            &command_buffers,
            &render_pass,
            &framebuffers,
            &pipeline,
            &pipeline_layout,
            &models,
        )?;

        info!(
            models = models.len(),
            images = swapchain.image_count(),
            "Renderer initialized"
        );

        Ok(Self {
            instance: ManuallyDrop::new(instance),
            device: ManuallyDrop::new(device),
            surface: ManuallyDrop::new(surface),
            swapchain: ManuallyDrop::new(swapchain),
            render_pass: ManuallyDrop::new(render_pass),
            targets: ManuallyDrop::new(targets),
            framebuffers: ManuallyDrop::new(framebuffers),
            descriptor_set_layout: ManuallyDrop::new(descriptor_set_layout),
            pipeline_layout: ManuallyDrop::new(pipeline_layout),
            pipeline: ManuallyDrop::new(pipeline),
            command_pool: ManuallyDrop::new(command_pool),
            command_buffers,
            models: ManuallyDrop::new(models),
            frames: ManuallyDrop::new(frames),
            wireframe: false,
            framebuffer_resized: false,
            width,
            height,
        })
    }

    /// Builds the graphics pipeline for the given polygon mode, loading
    /// the fragment bytecode file that matches it.
    fn create_pipeline(
        device: &Arc<Device>,
        render_pass: vk::RenderPass,
        extent: vk::Extent2D,
        layout: &PipelineLayout,
        wireframe: bool,
    ) -> RendererResult<Pipeline> {
        let (polygon_mode, frag_path) = fragment_stage_for(wireframe);

        let vertex_shader = Shader::from_spirv_file(
            device.clone(),
            Path::new(VERT_SHADER_PATH),
            ShaderStage::Vertex,
            "main",
        )?;
        let fragment_shader = Shader::from_spirv_file(
            device.clone(),
            Path::new(frag_path),
            ShaderStage::Fragment,
            "main",
        )?;

        let pipeline = GraphicsPipelineBuilder::new()
            .vertex_shader(&vertex_shader)
            .fragment_shader(&fragment_shader)
            .vertex_binding(Vertex::binding_description())
            .vertex_attributes(&Vertex::attribute_descriptions())
            .polygon_mode(polygon_mode)
            .line_width(LINE_WIDTH)
            .rasterization_samples(device.msaa_samples())
            .sample_shading(0.2)
            .render_pass(render_pass)
            .scissor_extent(extent)
            .build(device.clone(), layout)?;

        debug!(?polygon_mode, "Graphics pipeline created");
        Ok(pipeline)
    }

    /// Notifies the renderer that the framebuffer size changed.
    ///
    /// Zero-area sizes (minimized window) are remembered but trigger no
    /// recreation; the next nonzero resize does.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!("Ignoring resize to zero dimensions");
            return;
        }

        if width != self.width || height != self.height {
            debug!(
                "Resize: {}x{} -> {}x{}",
                self.width, self.height, width, height
            );
            self.width = width;
            self.height = height;
            self.framebuffer_resized = true;
        }
    }

    /// Renders one frame.
    ///
    /// Waits for the current slot, acquires an image, rewrites every
    /// model's uniform block for that image, submits the pre-recorded
    /// command buffer, and presents. Staleness from acquire, present, or
    /// a flagged resize funnels into [`Self::recreate_swapchain`]; all
    /// other failures propagate.
    ///
    /// # Errors
    ///
    /// Returns an error on any non-recoverable Vulkan failure.
    pub fn draw_frame(
        &mut self,
        scene_models: &[Model],
        cameras: &mut [FreeCamera],
        active_camera: usize,
        elapsed_seconds: f32,
    ) -> RendererResult<()> {
        if self.framebuffer_resized {
            self.recreate_swapchain(cameras)?;
        }

        let image_index = match self.frames.acquire(&self.swapchain)? {
            AcquireResult::Image(index) => index,
            AcquireResult::OutOfDate => {
                self.recreate_swapchain(cameras)?;
                return Ok(());
            }
        };

        self.update_uniforms(
            scene_models,
            &cameras[active_camera],
            image_index as usize,
            elapsed_seconds,
        )?;

        self.frames.submit(self.command_buffers[image_index as usize])?;

        let needs_recreate = self.frames.present(&self.swapchain, image_index)?;
        if needs_recreate || self.framebuffer_resized {
            self.recreate_swapchain(cameras)?;
        }

        self.frames.advance();
        Ok(())
    }

    fn update_uniforms(
        &self,
        scene_models: &[Model],
        camera: &impl Camera,
        image_index: usize,
        elapsed_seconds: f32,
    ) -> RendererResult<()> {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();

        for (model, gpu_model) in scene_models.iter().zip(self.models.iter()) {
            let ubo = UniformBufferObject::compose(
                model.matrix(),
                view,
                projection,
                model.animated(),
                elapsed_seconds,
            );
            gpu_model.update_uniform(image_index, &ubo)?;
        }
        Ok(())
    }

    /// Switches between fill and wireframe rendering.
    ///
    /// The next pipeline build loads the other fragment bytecode file and
    /// the matching polygon mode; everything swapchain-derived is rebuilt
    /// with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the rebuild fails.
    pub fn toggle_wireframe(&mut self, cameras: &mut [FreeCamera]) -> RendererResult<()> {
        self.wireframe = !self.wireframe;
        info!(wireframe = self.wireframe, "Toggled polygon mode");
        self.recreate_swapchain(cameras)
    }

    /// Whether the wireframe pipeline is active.
    #[inline]
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Current swapchain aspect ratio.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.swapchain.aspect_ratio()
    }

    /// Replaces one model's texture and re-records the command buffers.
    ///
    /// The recorded command buffers reference the model's descriptor sets,
    /// so the pool is quiesced before the descriptor rewrite.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or the rebuild fails.
    pub fn replace_texture(&mut self, index: usize, data: &TextureData) -> RendererResult<()> {
        if index >= self.models.len() {
            return Err(RendererError::InvalidIndex(format!(
                "model {index} of {}",
                self.models.len()
            )));
        }

        self.device.wait_idle()?;
        self.command_pool.free_command_buffers(&self.command_buffers);
        self.command_buffers.clear();

        self.models[index].replace_texture(&self.command_pool, self.instance.handle(), data)?;

        self.command_buffers = self
            .command_pool
            .allocate_command_buffers(self.framebuffers.len() as u32)?;
        record_commands(
            &self.device,
            &self.command_buffers,
            &self.render_pass,
            &self.framebuffers,
            &self.pipeline,
            &self.pipeline_layout,
            &self.models,
        )?;

        Ok(())
    }

    /// Tears down and rebuilds everything derived from the swapchain.
    ///
    /// Rebuild order: swapchain, camera aspect ratios, render pass,
    /// pipeline, color and depth attachments, framebuffers, per-model
    /// uniform and descriptor resources, command buffers.
    ///
    /// # Errors
    ///
    /// Returns an error if any rebuild step fails.
    fn recreate_swapchain(&mut self, cameras: &mut [FreeCamera]) -> RendererResult<()> {
        if self.width == 0 || self.height == 0 {
            // Minimized; keep the resize flag and try again later.
            return Ok(());
        }

        self.device.wait_idle()?;

        self.command_pool.free_command_buffers(&self.command_buffers);
        self.command_buffers.clear();

        self.swapchain
            .recreate(&self.instance, self.surface.handle(), self.width, self.height)?;

        for camera in cameras.iter_mut() {
            camera.set_aspect_ratio(self.swapchain.aspect_ratio());
        }

        let depth_format = find_depth_format(self.instance.handle(), self.device.physical_device())?;

        let render_pass = RenderPass::forward(
            Arc::clone(&self.device),
            self.swapchain.format(),
            depth_format,
            self.device.msaa_samples(),
        )?;
        unsafe { ManuallyDrop::drop(&mut self.render_pass) };
        self.render_pass = ManuallyDrop::new(render_pass);

        let pipeline = Self::create_pipeline(
            &self.device,
            self.render_pass.handle(),
            self.swapchain.extent(),
            &self.pipeline_layout,
            self.wireframe,
        )?;
        unsafe { ManuallyDrop::drop(&mut self.pipeline) };
        self.pipeline = ManuallyDrop::new(pipeline);

        let targets = RenderTargets::new(
            Arc::clone(&self.device),
            self.swapchain.extent(),
            self.swapchain.format(),
            depth_format,
            self.device.msaa_samples(),
        )?;
        unsafe { ManuallyDrop::drop(&mut self.targets) };
        self.targets = ManuallyDrop::new(targets);

        let framebuffers = Framebuffers::new(
            Arc::clone(&self.device),
            &self.render_pass,
            self.targets.color_view(),
            self.targets.depth_view(),
            self.swapchain.image_views(),
            self.swapchain.extent(),
        )?;
        unsafe { ManuallyDrop::drop(&mut self.framebuffers) };
        self.framebuffers = ManuallyDrop::new(framebuffers);

        let image_count = self.swapchain.image_count();
        for model in self.models.iter_mut() {
            model.rebuild_per_image(image_count, &self.descriptor_set_layout)?;
        }
        self.frames.reset_image_ownership(image_count);

        self.command_buffers = self
            .command_pool
            .allocate_command_buffers(self.framebuffers.len() as u32)?;
        record_commands(
            &self.device,
            &self.command_buffers,
            &self.render_pass,
            &self.framebuffers,
            &self.pipeline,
            &self.pipeline_layout,
            &self.models,
        )?;

        self.framebuffer_resized = false;
        info!(
            width = self.swapchain.extent().width,
            height = self.swapchain.extent().height,
            "Swapchain recreated"
        );
        Ok(())
    }
}

/// Polygon mode and fragment bytecode file for a fill or wireframe build.
fn fragment_stage_for(wireframe: bool) -> (PolygonMode, &'static str) {
    if wireframe {
        (PolygonMode::Line, WIREFRAME_FRAG_PATH)
    } else {
        (PolygonMode::Fill, FILL_FRAG_PATH)
    }
}

/// Records the forward pass into one command buffer per swapchain image.
///
/// Each buffer clears, binds the pipeline, sets the dynamic viewport and
/// line width, then draws every model with its per-image descriptor set.
fn record_commands(
    device: &Arc<Device>,
    command_buffers: &[vk::CommandBuffer],
    render_pass: &RenderPass,
    framebuffers: &Framebuffers,
    pipeline: &Pipeline,
    pipeline_layout: &PipelineLayout,
    models: &[GpuModel],
) -> RendererResult<()> {
    let extent = framebuffers.extent();
    let clear_values = [
        vk::ClearValue {
            color: vk::ClearColorValue {
                float32: [0.0, 0.0, 0.0, 1.0],
            },
        },
        vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue {
                depth: 1.0,
                stencil: 0,
            },
        },
    ];
    let viewport = vk::Viewport {
        x: 0.0,
        y: 0.0,
        width: extent.width as f32,
        height: extent.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    };

    for (i, &handle) in command_buffers.iter().enumerate() {
        let cmd = CommandBuffer::from_handle(device.clone(), handle);

        cmd.begin_reusable()?;
        cmd.begin_render_pass(
            render_pass.handle(),
            framebuffers.get(i),
            vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            },
            &clear_values,
        );

        cmd.bind_pipeline(vk::PipelineBindPoint::GRAPHICS, pipeline.handle());
        cmd.set_viewport(&viewport);
        cmd.set_line_width(LINE_WIDTH);

        for model in models {
            model.record_draw(&cmd, pipeline_layout.handle(), i);
        }

        cmd.end_render_pass();
        cmd.end()?;
    }

    debug!(count = command_buffers.len(), "Recorded command buffers");
    Ok(())
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            error!("Failed to wait for device idle during renderer drop: {e:?}");
        }

        self.command_pool.free_command_buffers(&self.command_buffers);

        // Explicit teardown in dependency order; the device goes down
        // after everything created from it, the instance after the
        // surface.
        unsafe {
            ManuallyDrop::drop(&mut self.frames);
            ManuallyDrop::drop(&mut self.models);
            ManuallyDrop::drop(&mut self.pipeline);
            ManuallyDrop::drop(&mut self.pipeline_layout);
            ManuallyDrop::drop(&mut self.descriptor_set_layout);
            ManuallyDrop::drop(&mut self.command_pool);
            ManuallyDrop::drop(&mut self.framebuffers);
            ManuallyDrop::drop(&mut self.targets);
            ManuallyDrop::drop(&mut self.render_pass);
            ManuallyDrop::drop(&mut self.swapchain);
            ManuallyDrop::drop(&mut self.device);
            ManuallyDrop::drop(&mut self.surface);
            ManuallyDrop::drop(&mut self.instance);
        }

        info!("Renderer destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wireframe_switches_fragment_bytecode_and_mode() {
        let (fill_mode, fill_path) = fragment_stage_for(false);
        let (line_mode, line_path) = fragment_stage_for(true);

        assert_eq!(fill_mode, PolygonMode::Fill);
        assert_eq!(line_mode, PolygonMode::Line);
        assert_eq!(fill_path, FILL_FRAG_PATH);
        assert_eq!(line_path, WIREFRAME_FRAG_PATH);
        assert_ne!(fill_path, line_path);
    }
}
