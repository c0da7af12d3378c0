//! Vulkan synchronization primitives.
//!
//! - [`Semaphore`] orders GPU work against other GPU work (acquire before
//!   render, render before present).
//! - [`Fence`] lets the host wait on GPU work (frame-in-flight pacing).
//! - [`FrameSync`] groups the two semaphores and one fence a frame slot
//!   needs, with the fence starting signaled so the first wait returns
//!   immediately.
//!
//! The frame loop keeps [`MAX_FRAMES_IN_FLIGHT`] of these and additionally
//! tracks, per swapchain image, which slot's fence last rendered to it so
//! an image handed out twice in a row is never overwritten while still in
//! flight.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// Number of frames the CPU may record ahead of the GPU.
///
/// Two lets the CPU prepare a frame while the GPU renders the previous one
/// without letting latency grow unbounded.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Binary semaphore wrapper.
///
/// Created unsignaled. Signal and wait operations are recorded into queue
/// submissions rather than performed on the host.
pub struct Semaphore {
    device: Arc<Device>,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    /// Creates an unsignaled semaphore.
    ///
    /// # Errors
    ///
    /// Returns an error if semaphore creation fails.
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let create_info = vk::SemaphoreCreateInfo::default();
        let semaphore = unsafe { device.handle().create_semaphore(&create_info, None)? };
        Ok(Self { device, semaphore })
    }

    /// Returns the Vulkan semaphore handle.
    #[inline]
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_semaphore(self.semaphore, None);
        }
    }
}

/// Fence wrapper for host-side waits on GPU work.
pub struct Fence {
    device: Arc<Device>,
    fence: vk::Fence,
}

impl Fence {
    /// Creates a fence, optionally already signaled.
    ///
    /// A signaled fence is the right initial state for anything waited on
    /// before the first submission that would signal it.
    ///
    /// # Errors
    ///
    /// Returns an error if fence creation fails.
    pub fn new(device: Arc<Device>, signaled: bool) -> RhiResult<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let create_info = vk::FenceCreateInfo::default().flags(flags);
        let fence = unsafe { device.handle().create_fence(&create_info, None)? };
        Ok(Self { device, fence })
    }

    /// Returns the Vulkan fence handle.
    #[inline]
    pub fn handle(&self) -> vk::Fence {
        self.fence
    }

    /// Blocks until the fence is signaled or `timeout` nanoseconds pass.
    ///
    /// Use `u64::MAX` for an unbounded wait.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout or device loss.
    pub fn wait(&self, timeout: u64) -> Result<(), RhiError> {
        let fences = [self.fence];
        unsafe {
            self.device
                .handle()
                .wait_for_fences(&fences, true, timeout)?
        };
        Ok(())
    }

    /// Resets the fence to unsignaled.
    ///
    /// Must not be called while a queue submission still references the
    /// fence.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset fails.
    pub fn reset(&self) -> Result<(), RhiError> {
        let fences = [self.fence];
        unsafe { self.device.handle().reset_fences(&fences)? };
        Ok(())
    }

    /// Non-blocking check of the fence state.
    pub fn is_signaled(&self) -> bool {
        let result = unsafe { self.device.handle().get_fence_status(self.fence) };
        matches!(result, Ok(true))
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_fence(self.fence, None);
        }
    }
}

/// Synchronization objects for one frame-in-flight slot.
///
/// Per frame the loop:
/// 1. waits on `in_flight_fence`, then resets it,
/// 2. acquires a swapchain image, signaling `image_available`,
/// 3. submits the command buffer waiting on `image_available` and
///    signaling `render_finished` plus the fence,
/// 4. presents, waiting on `render_finished`.
pub struct FrameSync {
    image_available: Semaphore,
    render_finished: Semaphore,
    in_flight_fence: Fence,
}

impl FrameSync {
    /// Creates the semaphores and fence for one frame slot.
    ///
    /// The fence starts signaled so the first frame's wait falls through.
    ///
    /// # Errors
    ///
    /// Returns an error if any object creation fails.
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let image_available = Semaphore::new(device.clone())?;
        let render_finished = Semaphore::new(device.clone())?;
        let in_flight_fence = Fence::new(device, true)?;

        debug!("Created frame sync objects");

        Ok(Self {
            image_available,
            render_finished,
            in_flight_fence,
        })
    }

    /// Semaphore signaled when the acquired swapchain image is ready.
    #[inline]
    pub fn image_available(&self) -> vk::Semaphore {
        self.image_available.handle()
    }

    /// Semaphore signaled when rendering to the image has finished.
    #[inline]
    pub fn render_finished(&self) -> vk::Semaphore {
        self.render_finished.handle()
    }

    /// Fence signaled when this slot's command buffer completes.
    #[inline]
    pub fn in_flight_fence(&self) -> &Fence {
        &self.in_flight_fence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_in_flight_is_double_buffered() {
        assert_eq!(MAX_FRAMES_IN_FLIGHT, 2);
    }

    #[test]
    fn test_sync_objects_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Semaphore>();
        assert_send_sync::<Fence>();
        assert_send_sync::<FrameSync>();
    }
}
