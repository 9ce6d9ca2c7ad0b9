use std::collections::HashSet;

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::device::Gpu;
use crate::error::GfxError;

use super::backend::{
    BufferHandle, BufferKind, DrawIndexed, IndexType, Primitive, ProgramHandle, RenderBackend,
    RenderState, SurfaceInfo,
};
use super::ctx::{RenderCtx, RenderTarget};
use super::mesh::Vertex;
use super::shader::{self, ShaderProgram, UNIFORM_BINDING};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// [`RenderBackend`] on top of a wgpu device.
///
/// Programs become render pipelines at link time. Draws are queued and encoded
/// into one render pass per frame by [`WgpuBackend::encode`], which also clears
/// colour (and depth, when enabled).
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    size: (u32, u32),
    state: RenderState,

    programs: Vec<ProgramEntry>,
    buffers: Vec<BufferEntry>,
    pending: Vec<DrawIndexed>,

    depth: Option<DepthTarget>,
    warned_uniforms: HashSet<(usize, String)>,
}

struct ProgramEntry {
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
    uniforms: Option<UniformBinding>,
}

struct UniformBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct BufferEntry {
    buffer: wgpu::Buffer,
    kind: BufferKind,
}

struct DepthTarget {
    view: wgpu::TextureView,
    size: (u32, u32),
}

impl WgpuBackend {
    pub fn new(gpu: &Gpu<'_>, state: RenderState) -> Self {
        let size = gpu.size();
        Self {
            device: gpu.device().clone(),
            queue: gpu.queue().clone(),
            surface_format: gpu.surface_format(),
            size: (size.width, size.height),
            state,
            programs: Vec::new(),
            buffers: Vec::new(),
            pending: Vec::new(),
            depth: None,
            warned_uniforms: HashSet::new(),
        }
    }

    pub fn render_state(&self) -> RenderState {
        self.state
    }

    /// Records the new drawable size. The depth buffer follows on the next encode.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    /// Drops draws queued for a frame that could not be acquired.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }

    /// Encodes all queued draws into one render pass on `target`.
    pub fn encode(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if self.state.depth_test {
            self.ensure_depth(ctx);
        }

        let [r, g, b, a] = self.state.clear_color;
        let depth_attachment = self.depth.as_ref().filter(|_| self.state.depth_test).map(|d| {
            wgpu::RenderPassDepthStencilAttachment {
                view: &d.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }
        });

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("glint pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: depth_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        for draw in self.pending.drain(..) {
            let Some(program) = self.programs.get(draw.program.0) else { continue };
            let Some(vbo) = self.buffers.get(draw.vertex_buffer.0) else { continue };
            let Some(ibo) = self.buffers.get(draw.index_buffer.0) else { continue };
            if vbo.kind != BufferKind::Vertex || ibo.kind != BufferKind::Index {
                log::warn!("draw with mismatched buffer kinds skipped");
                continue;
            }

            let available = ibo.buffer.size() / draw.index_type.size_bytes();
            let count = u64::from(draw.index_count).min(available) as u32;

            rpass.set_pipeline(&program.pipeline);
            if let Some(u) = &program.uniforms {
                rpass.set_bind_group(0, &u.bind_group, &[]);
            }
            rpass.set_vertex_buffer(0, vbo.buffer.slice(..));
            rpass.set_index_buffer(ibo.buffer.slice(..), index_format(draw.index_type));
            rpass.draw_indexed(0..count, 0, 0..1);
        }
    }

    fn ensure_depth(&mut self, ctx: &RenderCtx<'_>) {
        let size = (ctx.size.0.max(1), ctx.size.1.max(1));
        if self.depth.as_ref().is_some_and(|d| d.size == size) {
            return;
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glint depth"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        self.depth = Some(DepthTarget {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            size,
        });
    }

    fn create_pipeline(
        &self,
        program: &ShaderProgram,
        bind_group_layout: Option<&wgpu::BindGroupLayout>,
    ) -> wgpu::RenderPipeline {
        let vs = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("glint vertex shader"),
            source: wgpu::ShaderSource::Wgsl(program.vertex_source().into()),
        });
        let fs = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("glint fragment shader"),
            source: wgpu::ShaderSource::Wgsl(program.fragment_source().into()),
        });

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layout.into_iter().collect();
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("glint pipeline layout"),
                bind_group_layouts: &bind_group_layouts,
                immediate_size: 0,
            });

        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("glint pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(program.vertex_entry_point()),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(program.fragment_entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: topology(Primitive::Triangles),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: self.state.cull_back_faces.then_some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: self.state.depth_test.then(|| wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        })
    }
}

impl RenderBackend for WgpuBackend {
    fn acquire_context(&mut self) -> Result<SurfaceInfo, GfxError> {
        let (width, height) = self.size;
        if width == 0 || height == 0 {
            return Err(GfxError::context_unavailable("surface has zero area"));
        }
        Ok(SurfaceInfo { width, height })
    }

    fn compile_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramHandle, GfxError> {
        let program = shader::compile_program(vertex_src, fragment_src)?;
        program.check_vertex_inputs(&Vertex::ATTRIBUTES)?;

        let uniform_layout = program.uniforms().map(|block| {
            let layout = self
                .device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("glint uniforms bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: UNIFORM_BINDING,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(block.size),
                        },
                        count: None,
                    }],
                });
            (layout, block.size)
        });

        let pipeline = self.create_pipeline(&program, uniform_layout.as_ref().map(|(l, _)| l));

        let uniforms = uniform_layout.map(|(layout, size)| {
            // Zeroed until the first matrix upload.
            let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("glint uniforms ubo"),
                size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("glint uniforms bind group"),
                layout: &layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: UNIFORM_BINDING,
                    resource: buffer.as_entire_binding(),
                }],
            });
            UniformBinding { buffer, bind_group }
        });

        log::debug!(
            "linked program {} (uniforms: {})",
            self.programs.len(),
            program.uniforms().is_some()
        );

        self.programs.push(ProgramEntry {
            program,
            pipeline,
            uniforms,
        });
        Ok(ProgramHandle(self.programs.len() - 1))
    }

    fn upload_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BufferHandle {
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };

        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(match kind {
                BufferKind::Vertex => "glint vbo",
                BufferKind::Index => "glint ibo",
            }),
            contents: data,
            usage: usage | wgpu::BufferUsages::COPY_DST,
        });

        self.buffers.push(BufferEntry { buffer, kind });
        BufferHandle(self.buffers.len() - 1)
    }

    fn write_buffer(&mut self, buffer: BufferHandle, data: &[u8]) {
        let Some(entry) = self.buffers.get(buffer.0) else { return };
        if data.len() as u64 > entry.buffer.size() {
            log::warn!(
                "write of {} bytes exceeds buffer of {} bytes; ignored",
                data.len(),
                entry.buffer.size()
            );
            return;
        }
        self.queue.write_buffer(&entry.buffer, 0, data);
    }

    fn set_uniform_matrix4(&mut self, program: ProgramHandle, name: &str, matrix: &Mat4) {
        let Some(entry) = self.programs.get(program.0) else { return };
        let target = entry
            .uniforms
            .as_ref()
            .zip(entry.program.uniforms().and_then(|b| b.mat4_offset(name)));

        let Some((binding, offset)) = target else {
            if self.warned_uniforms.insert((program.0, name.to_string())) {
                log::debug!("program {} has no mat4 uniform `{name}`; ignored", program.0);
            }
            return;
        };

        self.queue.write_buffer(
            &binding.buffer,
            u64::from(offset),
            bytemuck::bytes_of(matrix),
        );
    }

    fn draw_indexed(&mut self, draw: DrawIndexed) {
        self.pending.push(draw);
    }
}

fn index_format(t: IndexType) -> wgpu::IndexFormat {
    match t {
        IndexType::U16 => wgpu::IndexFormat::Uint16,
        IndexType::U32 => wgpu::IndexFormat::Uint32,
    }
}

fn topology(p: Primitive) -> wgpu::PrimitiveTopology {
    match p {
        Primitive::Triangles => wgpu::PrimitiveTopology::TriangleList,
    }
}
