//! Framebuffers for the forward pass.
//!
//! One framebuffer per swapchain image, each binding the shared multisampled
//! color and depth attachments plus that image's view as the resolve target.
//! The whole set is rebuilt whenever the swapchain is recreated.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::RhiResult;
use crate::render_pass::RenderPass;

/// Owned set of per-swapchain-image framebuffers.
pub struct Framebuffers {
    device: Arc<Device>,
    framebuffers: Vec<vk::Framebuffer>,
    extent: vk::Extent2D,
}

impl Framebuffers {
    /// Creates one framebuffer per swapchain image view.
    ///
    /// Attachment order must match the render pass: multisampled color,
    /// depth, then the swapchain view as resolve target.
    ///
    /// # Errors
    ///
    /// Returns an error if any framebuffer creation fails.
    pub fn new(
        device: Arc<Device>,
        render_pass: &RenderPass,
        color_view: vk::ImageView,
        depth_view: vk::ImageView,
        swapchain_views: &[vk::ImageView],
        extent: vk::Extent2D,
    ) -> RhiResult<Self> {
        let mut framebuffers = Vec::with_capacity(swapchain_views.len());

        for &swapchain_view in swapchain_views {
            let attachments = [color_view, depth_view, swapchain_view];
            let create_info = vk::FramebufferCreateInfo::default()
                .render_pass(render_pass.handle())
                .attachments(&attachments)
                .width(extent.width)
                .height(extent.height)
                .layers(1);

            let framebuffer = unsafe { device.handle().create_framebuffer(&create_info, None)? };
            framebuffers.push(framebuffer);
        }

        debug!(count = framebuffers.len(), "Created framebuffers");

        Ok(Self {
            device,
            framebuffers,
            extent,
        })
    }

    /// Returns the framebuffer for swapchain image `index`.
    #[inline]
    pub fn get(&self, index: usize) -> vk::Framebuffer {
        self.framebuffers[index]
    }

    /// Returns the number of framebuffers.
    #[inline]
    pub fn len(&self) -> usize {
        self.framebuffers.len()
    }

    /// Returns true if no framebuffers exist.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.framebuffers.is_empty()
    }

    /// Returns the extent the framebuffers were built for.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }
}

impl Drop for Framebuffers {
    fn drop(&mut self) {
        unsafe {
            for framebuffer in self.framebuffers.drain(..) {
                self.device.handle().destroy_framebuffer(framebuffer, None);
            }
        }
        debug!("Framebuffers destroyed");
    }
}
