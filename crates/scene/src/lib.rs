//! Scene components.
//!
//! This crate provides the CPU-side scene state:
//! - Free-flying camera with yaw/pitch/roll orientation
//! - Accumulated model transforms

pub mod camera;
pub mod transform;

pub use camera::{Camera, FreeCamera};
pub use transform::Transform;
