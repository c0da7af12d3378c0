//! Frame pacing and submission.
//!
//! [`FrameManager`] owns the per-slot sync objects and the per-image fence
//! table that together bound GPU work to [`MAX_FRAMES_IN_FLIGHT`] frames.
//! Command buffers are recorded elsewhere, once per swapchain image; this
//! type only decides when a slot may be reused and which semaphores gate
//! each submit and present.
//!
//! Per tick the renderer calls, in order: [`FrameManager::acquire`],
//! a host-visible uniform update, [`FrameManager::submit`],
//! [`FrameManager::present`], [`FrameManager::advance`].

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use prism_rhi::RhiError;
use prism_rhi::device::Device;
use prism_rhi::swapchain::Swapchain;
use prism_rhi::sync::{FrameSync, MAX_FRAMES_IN_FLIGHT};

use crate::error::RendererResult;

/// Outcome of an acquire attempt.
pub enum AcquireResult {
    /// An image was acquired and its index can be rendered to.
    Image(u32),
    /// The swapchain is out of date; recreate before trying again.
    OutOfDate,
}

/// Ring of frame-in-flight slots plus per-image fence ownership.
pub struct FrameManager {
    device: Arc<Device>,
    frames: Vec<FrameSync>,
    /// Fence of the slot that last rendered to each swapchain image, null
    /// until the image has been used once.
    images_in_flight: Vec<vk::Fence>,
    current_frame: usize,
}

impl FrameManager {
    /// Creates the sync ring for `image_count` swapchain images.
    ///
    /// # Errors
    ///
    /// Returns an error if semaphore or fence creation fails.
    pub fn new(device: Arc<Device>, image_count: usize) -> RendererResult<Self> {
        let frames = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| FrameSync::new(device.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            slots = MAX_FRAMES_IN_FLIGHT,
            images = image_count,
            "Created frame manager"
        );

        Ok(Self {
            device,
            frames,
            images_in_flight: vec![vk::Fence::null(); image_count],
            current_frame: 0,
        })
    }

    /// Waits for the current slot, then acquires the next swapchain image.
    ///
    /// Blocks on the slot's in-flight fence, and additionally on the fence
    /// that last rendered to the acquired image if that was a different
    /// slot. On success the image is stamped with the current slot's fence
    /// and the fence is reset, ready for [`FrameManager::submit`].
    ///
    /// A suboptimal acquire still returns the image; the caller finishes
    /// the frame and recreates after present. `ERROR_OUT_OF_DATE_KHR`
    /// returns [`AcquireResult::OutOfDate`] without an image.
    ///
    /// # Errors
    ///
    /// Returns an error for any acquire failure other than out-of-date.
    pub fn acquire(&mut self, swapchain: &Swapchain) -> RendererResult<AcquireResult> {
        let frame = &self.frames[self.current_frame];
        frame.in_flight_fence().wait(u64::MAX)?;

        let image_index = match swapchain.acquire_next_image(frame.image_available()) {
            Ok((index, _suboptimal)) => index,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                debug!("Acquire reported out of date");
                return Ok(AcquireResult::OutOfDate);
            }
            Err(e) => return Err(RhiError::VulkanError(e).into()),
        };

        // The image may still be owned by another slot's submission.
        let image_fence = self.images_in_flight[image_index as usize];
        if image_fence != vk::Fence::null() {
            unsafe {
                self.device
                    .handle()
                    .wait_for_fences(&[image_fence], true, u64::MAX)?;
            }
        }
        self.images_in_flight[image_index as usize] = frame.in_flight_fence().handle();

        frame.in_flight_fence().reset()?;

        Ok(AcquireResult::Image(image_index))
    }

    /// Submits `command_buffer` for the current slot.
    ///
    /// The submission waits on the slot's image-available semaphore at the
    /// color-attachment-output stage and signals its render-finished
    /// semaphore together with the in-flight fence.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue submission fails.
    pub fn submit(&self, command_buffer: vk::CommandBuffer) -> RendererResult<()> {
        let frame = &self.frames[self.current_frame];

        let wait_semaphores = [frame.image_available()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [frame.render_finished()];
        let command_buffers = [command_buffer];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device.handle().queue_submit(
                self.device.graphics_queue(),
                &[submit_info],
                frame.in_flight_fence().handle(),
            )?;
        }

        Ok(())
    }

    /// Presents the image, waiting on the slot's render-finished semaphore.
    ///
    /// Returns true when the swapchain must be recreated (suboptimal or
    /// out of date).
    ///
    /// # Errors
    ///
    /// Returns an error for any present failure other than out-of-date.
    pub fn present(&self, swapchain: &Swapchain, image_index: u32) -> RendererResult<bool> {
        let frame = &self.frames[self.current_frame];

        match swapchain.present(
            self.device.present_queue(),
            image_index,
            frame.render_finished(),
        ) {
            Ok(suboptimal) => Ok(suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                debug!("Present reported out of date");
                Ok(true)
            }
            Err(e) => Err(RhiError::VulkanError(e).into()),
        }
    }

    /// Advances to the next frame slot.
    #[inline]
    pub fn advance(&mut self) {
        self.current_frame = (self.current_frame + 1) % MAX_FRAMES_IN_FLIGHT;
    }

    /// Returns the current slot index.
    #[inline]
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Clears fence ownership after a swapchain recreation.
    ///
    /// The old images are gone, so any recorded ownership is stale. The
    /// caller must have waited for the device to go idle.
    pub fn reset_image_ownership(&mut self, image_count: usize) {
        self.images_in_flight = vec![vk::Fence::null(); image_count];
    }
}
