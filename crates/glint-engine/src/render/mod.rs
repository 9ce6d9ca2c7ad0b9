//! GPU rendering subsystem.
//!
//! Demos talk to a [`RenderBackend`]: compile a program, upload buffers once,
//! then per frame set uniforms and queue indexed draws. [`WgpuBackend`] encodes
//! the queued draws into a single render pass; [`RecordingBackend`] keeps them
//! in memory for headless checks.
//!
//! Convention: geometry is in model space, the vertex stage produces clip space
//! (directly for flat demos, through world/view/projection for the cube).

mod backend;
mod ctx;
pub mod mesh;
mod recording;
pub mod shader;
pub mod shaders;
mod wgpu_backend;

pub use backend::{
    BufferHandle, BufferKind, DrawIndexed, IndexType, Primitive, ProgramHandle, RenderBackend,
    RenderState, SurfaceInfo,
};
pub use ctx::{RenderCtx, RenderTarget};
pub use recording::{BackendCall, RecordingBackend};
pub use wgpu_backend::WgpuBackend;
