//! Platform abstraction layer for the Vulkan demo.
//!
//! This crate provides platform-specific functionality:
//! - Window management via winit
//! - Keyboard input tracking
//! - A per-tick event queue replacing raw callbacks
//! - Raw window handles for Vulkan surface creation

mod events;
mod input;
mod window;

pub use events::{EventQueue, PlatformEvent};
pub use input::{InputState, KeyCode};
pub use window::{Surface, Window, WindowConfig};

// Re-export winit types that users might need
pub use winit::event::WindowEvent;
pub use winit::event_loop::EventLoop;
