//! Forward renderer and engine facade.
//!
//! This crate ties the lower layers together:
//! - Frame pacing with a fixed number of frames in flight
//! - Per-model GPU resources and uniform updates
//! - Swapchain-epoch rebuild of everything size-dependent
//! - The [`Engine`] scene API and window run loop

pub mod attachments;
pub mod engine;
pub mod error;
pub mod frame;
pub mod model;
pub mod renderer;
pub mod ubo;

pub use engine::Engine;
pub use error::{RendererError, RendererResult};
pub use frame::FrameManager;
pub use model::Model;
pub use renderer::Renderer;
pub use ubo::UniformBufferObject;
