use glam::Mat4;

use crate::error::GfxError;

/// Opaque handle to a linked shader program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramHandle(pub(crate) usize);

/// Opaque handle to a GPU buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferHandle(pub(crate) usize);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Primitive assembly for a draw.
///
/// wgpu has no triangle fans; fans are triangulated when the geometry is built.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Primitive {
    Triangles,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    pub fn size_bytes(self) -> u64 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Drawable surface as seen when the context is acquired.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SurfaceInfo {
    pub width: u32,
    pub height: u32,
}

impl SurfaceInfo {
    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Fixed-function state a backend applies to every program it creates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderState {
    pub depth_test: bool,
    /// Cull clockwise (back) faces; counter-clockwise is front.
    pub cull_back_faces: bool,
    /// Linear RGBA the frame is cleared to before drawing.
    pub clear_color: [f64; 4],
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_test: false,
            cull_back_faces: false,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// One indexed draw submission.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawIndexed {
    pub program: ProgramHandle,
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub primitive: Primitive,
    pub index_count: u32,
    pub index_type: IndexType,
}

/// The rendering collaborator the demos are written against.
///
/// Every fallible operation belongs to initialization; per-frame operations
/// (`set_uniform_matrix4`, `draw_indexed`) cannot fail.
pub trait RenderBackend {
    /// Confirms the context is usable and reports the drawable size.
    fn acquire_context(&mut self) -> Result<SurfaceInfo, GfxError>;

    /// Compiles and links a vertex/fragment pair.
    fn compile_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramHandle, GfxError>;

    /// Creates a buffer initialised with `data`.
    fn upload_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BufferHandle;

    /// Replaces the contents of an existing buffer. `data` must fit.
    fn write_buffer(&mut self, buffer: BufferHandle, data: &[u8]);

    /// Sets the `mat4x4<f32>` uniform called `name`. Unknown names are ignored.
    fn set_uniform_matrix4(&mut self, program: ProgramHandle, name: &str, matrix: &Mat4);

    /// Queues an indexed draw for the current frame.
    fn draw_indexed(&mut self, draw: DrawIndexed);
}
