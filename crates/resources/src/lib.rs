//! Resource loading and management.
//!
//! This crate handles CPU-side assets:
//! - Wavefront OBJ mesh loading and procedural primitives
//! - Image decoding and the fallback checkerboard texture

mod error;

pub mod mesh;
pub mod texture;

pub use error::{ResourceError, ResourceResult};
pub use mesh::{MeshData, MeshSource};
pub use texture::TextureData;
