//! Renderer-level error type.
//!
//! Wraps the failures that can surface while building or driving the
//! frame loop. Everything here is fatal to the run except swapchain
//! staleness, which the renderer handles internally by recreating and
//! never surfaces as an error.

use thiserror::Error;

use prism_resources::ResourceError;
use prism_rhi::RhiError;

/// Errors from renderer construction and the per-frame tick.
#[derive(Error, Debug)]
pub enum RendererError {
    /// A GPU-side operation failed.
    #[error(transparent)]
    Rhi(#[from] RhiError),

    /// A mesh or texture asset failed to load.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// A raw Vulkan call outside the RHI wrappers failed.
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] ash::vk::Result),

    /// Window or surface plumbing failed.
    #[error(transparent)]
    Platform(#[from] prism_core::Error),

    /// A scene index referred to a camera or model that does not exist.
    #[error("invalid scene index: {0}")]
    InvalidIndex(String),
}

/// Result type alias for renderer operations.
pub type RendererResult<T> = std::result::Result<T, RendererError>;
