//! Glint engine crate.
//!
//! Owns the platform loop, the GPU context and the small amount of scene logic
//! the demos share: static geometry and the per-frame transform pipeline.

pub mod core;
pub mod device;
pub mod error;
pub mod input;
pub mod logging;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;

pub use error::{GfxError, ShaderStage};
