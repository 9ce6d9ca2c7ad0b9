use glint_engine::error::GfxError;
use glint_engine::input::{InputFrame, Key, MouseButton};
use glint_engine::render::mesh::Mesh;
use glint_engine::render::shaders::{COLOR_FRAGMENT, FLAT_VERTEX};
use glint_engine::render::{
    BufferHandle, BufferKind, DrawIndexed, IndexType, Primitive, ProgramHandle, RenderBackend,
    RenderState,
};
use glint_engine::scene::{hexagon_mesh, triangle_mesh};

use crate::color_rng::ColorRng;
use crate::host::Demo;

/// Clear colour of the flat demos.
pub const FLAT_CLEAR_COLOR: [f64; 4] = [0.5, 0.9, 0.9, 1.0];

struct Handles {
    program: ProgramHandle,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
}

/// A 2D shape drawn straight in clip space.
///
/// A left click or Space recolours every vertex with one random colour. The
/// rewrite happens once per request, outside the per-frame draw.
pub struct FlatDemo {
    name: &'static str,
    mesh: Mesh,
    rng: ColorRng,
    handles: Option<Handles>,
}

impl FlatDemo {
    pub fn new(name: &'static str, mesh: Mesh, rng: ColorRng) -> Self {
        Self {
            name,
            mesh,
            rng,
            handles: None,
        }
    }

    /// The red/yellow square of the "triangle" demo.
    pub fn triangle() -> Self {
        Self::new("triangle", triangle_mesh(), ColorRng::from_time())
    }

    pub fn hexagon() -> Self {
        Self::new("hexagon", hexagon_mesh(), ColorRng::from_time())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn vertex_buffer(&self) -> Option<BufferHandle> {
        self.handles.as_ref().map(|h| h.vertex_buffer)
    }

    pub fn is_running(&self) -> bool {
        self.handles.is_some()
    }

    /// Paints every vertex `color` and rewrites the vertex buffer.
    ///
    /// Before initialization only the CPU copy changes; it is what gets uploaded.
    pub fn recolor<B: RenderBackend>(&mut self, backend: &mut B, color: [f32; 3]) {
        self.mesh.fill_color(color);
        if let Some(h) = &self.handles {
            backend.write_buffer(h.vertex_buffer, self.mesh.vertex_bytes());
        }
        log::debug!("{}: recolored to {color:?}", self.name);
    }

    /// [`recolor`](Self::recolor) with the next random colour.
    pub fn recolor_random<B: RenderBackend>(&mut self, backend: &mut B) {
        let color = self.rng.next_color();
        self.recolor(backend, color);
    }
}

impl Demo for FlatDemo {
    fn render_state(&self) -> RenderState {
        RenderState {
            clear_color: FLAT_CLEAR_COLOR,
            ..RenderState::default()
        }
    }

    fn initialize<B: RenderBackend>(&mut self, backend: &mut B) -> Result<(), GfxError> {
        backend.acquire_context()?;
        let program = backend.compile_program(FLAT_VERTEX, COLOR_FRAGMENT)?;
        let vertex_buffer = backend.upload_buffer(BufferKind::Vertex, self.mesh.vertex_bytes());
        let index_buffer = backend.upload_buffer(BufferKind::Index, self.mesh.index_bytes());

        self.handles = Some(Handles {
            program,
            vertex_buffer,
            index_buffer,
        });
        log::info!(
            "{}: {} vertices, {} indices",
            self.name,
            self.mesh.vertices.len(),
            self.mesh.index_count()
        );
        Ok(())
    }

    fn handle_input<B: RenderBackend>(&mut self, backend: &mut B, input: &InputFrame) {
        if input.button_pressed(MouseButton::Left) || input.key_pressed(Key::Space) {
            self.recolor_random(backend);
        }
    }

    fn frame<B: RenderBackend>(&mut self, backend: &mut B, _elapsed: f64) {
        let Some(h) = &self.handles else { return };
        backend.draw_indexed(DrawIndexed {
            program: h.program,
            vertex_buffer: h.vertex_buffer,
            index_buffer: h.index_buffer,
            primitive: Primitive::Triangles,
            index_count: self.mesh.index_count(),
            index_type: IndexType::U16,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_engine::input::{ButtonState, InputEvent, InputState};
    use glint_engine::render::{BackendCall, RecordingBackend};

    fn demo() -> FlatDemo {
        FlatDemo::new("hexagon", hexagon_mesh(), ColorRng::new(9))
    }

    fn click() -> InputFrame {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(
            &mut frame,
            InputEvent::PointerButton {
                button: MouseButton::Left,
                state: ButtonState::Pressed,
            },
        );
        frame
    }

    // ── initialization ────────────────────────────────────────────────────

    #[test]
    fn initialize_uploads_mesh_once() {
        let mut b = RecordingBackend::new(640, 480);
        let mut d = demo();
        d.initialize(&mut b).unwrap();

        assert_eq!(
            b.calls(),
            &[
                BackendCall::AcquireContext,
                BackendCall::CompileProgram,
                BackendCall::UploadBuffer { kind: BufferKind::Vertex, len: 6 * 24 },
                BackendCall::UploadBuffer { kind: BufferKind::Index, len: 12 * 2 },
            ]
        );
        assert!(d.is_running());
    }

    #[test]
    fn missing_context_leaves_demo_stopped() {
        let mut b = RecordingBackend::without_context("webgl disabled");
        let mut d = demo();
        let err = d.initialize(&mut b).unwrap_err();

        assert!(matches!(err, GfxError::ContextUnavailable { .. }));
        assert_eq!(b.calls(), &[BackendCall::AcquireContext]);
        assert!(!d.is_running());
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn each_frame_draws_full_mesh() {
        let mut b = RecordingBackend::new(640, 480);
        let mut d = demo();
        d.initialize(&mut b).unwrap();
        b.clear_calls();

        d.frame(&mut b, 0.0);
        d.frame(&mut b, 0.016);

        let draws: Vec<_> = b.draws().collect();
        assert_eq!(draws.len(), 2);
        assert!(draws.iter().all(|d| d.index_count == 12 && d.index_type == IndexType::U16));
    }

    #[test]
    fn frame_before_initialize_draws_nothing() {
        let mut b = RecordingBackend::new(640, 480);
        demo().frame(&mut b, 1.0);
        assert!(b.calls().is_empty());
    }

    // ── recolouring ───────────────────────────────────────────────────────

    #[test]
    fn click_rewrites_vertex_buffer_with_one_colour() {
        let mut b = RecordingBackend::new(640, 480);
        let mut d = demo();
        d.initialize(&mut b).unwrap();
        b.clear_calls();

        d.handle_input(&mut b, &click());

        let [BackendCall::WriteBuffer { buffer, len }] = b.calls() else {
            panic!("expected a single buffer write, got {:?}", b.calls());
        };
        assert_eq!(*len, 6 * 24);

        let vertices = b.vertices(*buffer).unwrap();
        let color = vertices[0].color;
        assert!(vertices.iter().all(|v| v.color == color));
        assert_eq!(vertices, d.mesh().vertices);

        let positions: Vec<_> = vertices.iter().map(|v| v.position).collect();
        let shape: Vec<_> = hexagon_mesh().vertices.iter().map(|v| v.position).collect();
        assert_eq!(positions, shape);
    }

    #[test]
    fn space_also_recolours() {
        let mut b = RecordingBackend::new(640, 480);
        let mut d = demo();
        d.initialize(&mut b).unwrap();
        b.clear_calls();

        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(
            &mut frame,
            InputEvent::Key { key: Key::Space, state: ButtonState::Pressed, repeat: false },
        );
        d.handle_input(&mut b, &frame);

        assert_eq!(b.calls().len(), 1);
    }

    #[test]
    fn idle_input_does_not_touch_buffers() {
        let mut b = RecordingBackend::new(640, 480);
        let mut d = demo();
        d.initialize(&mut b).unwrap();
        b.clear_calls();

        d.handle_input(&mut b, &InputFrame::default());
        assert!(b.calls().is_empty());
    }

    #[test]
    fn recolor_before_initialize_changes_upload() {
        let mut b = RecordingBackend::new(640, 480);
        let mut d = demo();
        d.recolor(&mut b, [0.1, 0.2, 0.3]);
        assert!(b.calls().is_empty());

        d.initialize(&mut b).unwrap();
        let vertices = b.vertices(d.vertex_buffer().unwrap()).unwrap();
        assert!(vertices.iter().all(|v| v.color == [0.1, 0.2, 0.3]));
    }
}
