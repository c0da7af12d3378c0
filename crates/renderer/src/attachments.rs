//! Size-dependent render targets for the forward pass.
//!
//! The multisampled color and depth images live exactly as long as one
//! swapchain epoch: they are created right after the render pass and torn
//! down (and rebuilt at the new extent) on every swapchain recreation.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use prism_rhi::RhiResult;
use prism_rhi::device::Device;
use prism_rhi::image::Image;

/// The MSAA color and depth attachments shared by every framebuffer.
pub struct RenderTargets {
    color: Image,
    depth: Image,
}

impl RenderTargets {
    /// Creates both attachments at the swapchain extent and sample count.
    ///
    /// # Errors
    ///
    /// Returns an error if image or view creation fails.
    pub fn new(
        device: Arc<Device>,
        extent: vk::Extent2D,
        color_format: vk::Format,
        depth_format: vk::Format,
        samples: vk::SampleCountFlags,
    ) -> RhiResult<Self> {
        let color = Image::color_target(device.clone(), extent, color_format, samples)?;
        let depth = Image::depth_target(device, extent, depth_format, samples)?;

        debug!(
            width = extent.width,
            height = extent.height,
            ?samples,
            "Created render targets"
        );

        Ok(Self { color, depth })
    }

    /// View of the multisampled color attachment.
    #[inline]
    pub fn color_view(&self) -> vk::ImageView {
        self.color.view()
    }

    /// View of the multisampled depth attachment.
    #[inline]
    pub fn depth_view(&self) -> vk::ImageView {
        self.depth.view()
    }

    /// Format of the depth attachment.
    #[inline]
    pub fn depth_format(&self) -> vk::Format {
        self.depth.format()
    }
}
