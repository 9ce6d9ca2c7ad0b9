use std::collections::HashMap;

use glam::Mat4;

use crate::error::GfxError;

use super::backend::{
    BufferHandle, BufferKind, DrawIndexed, ProgramHandle, RenderBackend, SurfaceInfo,
};
use super::mesh::Vertex;
use super::shader::{self, ShaderProgram};

/// A backend call as observed by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    AcquireContext,
    CompileProgram,
    UploadBuffer { kind: BufferKind, len: usize },
    WriteBuffer { buffer: BufferHandle, len: usize },
    SetUniformMatrix4 { program: ProgramHandle, name: String, matrix: Mat4 },
    DrawIndexed(DrawIndexed),
}

/// In-memory backend that records every call.
///
/// Programs go through the real compile/link path, so shader errors surface the
/// same way they would on the GPU backend. Buffers keep their bytes and uniforms
/// their last value.
#[derive(Debug)]
pub struct RecordingBackend {
    surface: Result<SurfaceInfo, String>,
    calls: Vec<BackendCall>,
    programs: Vec<ShaderProgram>,
    buffers: Vec<(BufferKind, Vec<u8>)>,
    uniforms: HashMap<(ProgramHandle, String), Mat4>,
}

impl RecordingBackend {
    /// Backend whose context reports a `width` x `height` surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_surface(Ok(SurfaceInfo { width, height }))
    }

    /// Backend whose context can never be acquired.
    pub fn without_context(reason: impl Into<String>) -> Self {
        Self::with_surface(Err(reason.into()))
    }

    fn with_surface(surface: Result<SurfaceInfo, String>) -> Self {
        Self {
            surface,
            calls: Vec::new(),
            programs: Vec::new(),
            buffers: Vec::new(),
            uniforms: HashMap::new(),
        }
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn buffer(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(handle.0).map(|(_, bytes)| bytes.as_slice())
    }

    /// Vertices currently stored in a vertex buffer.
    pub fn vertices(&self, handle: BufferHandle) -> Option<Vec<Vertex>> {
        match self.buffers.get(handle.0)? {
            (BufferKind::Vertex, bytes) => Some(
                bytes
                    .chunks_exact(std::mem::size_of::<Vertex>())
                    .map(bytemuck::pod_read_unaligned)
                    .collect(),
            ),
            (BufferKind::Index, _) => None,
        }
    }

    pub fn uniform(&self, program: ProgramHandle, name: &str) -> Option<Mat4> {
        self.uniforms.get(&(program, name.to_string())).copied()
    }

    pub fn program(&self, handle: ProgramHandle) -> Option<&ShaderProgram> {
        self.programs.get(handle.0)
    }

    pub fn draws(&self) -> impl Iterator<Item = &DrawIndexed> {
        self.calls.iter().filter_map(|c| match c {
            BackendCall::DrawIndexed(d) => Some(d),
            _ => None,
        })
    }
}

impl RenderBackend for RecordingBackend {
    fn acquire_context(&mut self) -> Result<SurfaceInfo, GfxError> {
        self.calls.push(BackendCall::AcquireContext);
        match &self.surface {
            Ok(info) if info.width > 0 && info.height > 0 => Ok(*info),
            Ok(_) => Err(GfxError::context_unavailable("surface has zero area")),
            Err(reason) => Err(GfxError::context_unavailable(reason.clone())),
        }
    }

    fn compile_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramHandle, GfxError> {
        self.calls.push(BackendCall::CompileProgram);
        let program = shader::compile_program(vertex_src, fragment_src)?;
        program.check_vertex_inputs(&Vertex::ATTRIBUTES)?;
        self.programs.push(program);
        Ok(ProgramHandle(self.programs.len() - 1))
    }

    fn upload_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BufferHandle {
        self.calls.push(BackendCall::UploadBuffer { kind, len: data.len() });
        self.buffers.push((kind, data.to_vec()));
        BufferHandle(self.buffers.len() - 1)
    }

    fn write_buffer(&mut self, buffer: BufferHandle, data: &[u8]) {
        self.calls.push(BackendCall::WriteBuffer { buffer, len: data.len() });
        let Some((_, bytes)) = self.buffers.get_mut(buffer.0) else { return };
        if data.len() > bytes.len() {
            log::warn!("write of {} bytes exceeds buffer of {} bytes; ignored", data.len(), bytes.len());
            return;
        }
        bytes[..data.len()].copy_from_slice(data);
    }

    fn set_uniform_matrix4(&mut self, program: ProgramHandle, name: &str, matrix: &Mat4) {
        self.calls.push(BackendCall::SetUniformMatrix4 {
            program,
            name: name.to_string(),
            matrix: *matrix,
        });
        let known = self
            .programs
            .get(program.0)
            .and_then(|p| p.uniforms())
            .is_some_and(|u| u.mat4_offset(name).is_some());
        if known {
            self.uniforms.insert((program, name.to_string()), *matrix);
        }
    }

    fn draw_indexed(&mut self, draw: DrawIndexed) {
        self.calls.push(BackendCall::DrawIndexed(draw));
    }
}
