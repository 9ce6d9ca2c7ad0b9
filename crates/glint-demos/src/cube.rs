use glam::Vec3;

use glint_engine::error::GfxError;
use glint_engine::render::shaders::{COLOR_FRAGMENT, TRANSFORM_VERTEX};
use glint_engine::render::{
    BufferHandle, BufferKind, DrawIndexed, IndexType, Primitive, ProgramHandle, RenderBackend,
    RenderState,
};
use glint_engine::scene::{
    CameraConfig, DEFAULT_FACE_COLORS, RotationSpeed, TransformConfig, TransformPipeline,
    cube_mesh,
};

use crate::host::Demo;

/// Clear colour of the cube demo.
pub const CUBE_CLEAR_COLOR: [f64; 4] = [0.5, 0.5, 0.9, 1.0];

pub const UNIFORM_WORLD: &str = "world";
pub const UNIFORM_VIEW: &str = "view";
pub const UNIFORM_PROJ: &str = "proj";

/// Cube demo settings.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CubeConfig {
    pub half_extent: f32,
    pub face_colors: [[f32; 3]; 6],
    pub speed: RotationSpeed,
    pub axis: Vec3,
    pub camera: CameraConfig,
    /// Rebuild the projection when the surface is resized. Off by default: the
    /// aspect is fixed when the demo starts.
    pub track_resize: bool,
}

impl Default for CubeConfig {
    fn default() -> Self {
        let transform = TransformConfig::default();
        Self {
            half_extent: 1.0,
            face_colors: DEFAULT_FACE_COLORS,
            speed: transform.speed,
            axis: transform.axis,
            camera: transform.camera,
            track_resize: false,
        }
    }
}

impl CubeConfig {
    pub fn with_speed(mut self, speed: RotationSpeed) -> Self {
        self.speed = speed;
        self
    }

    fn transform(&self) -> TransformConfig {
        TransformConfig {
            speed: self.speed,
            axis: self.axis,
            camera: self.camera,
        }
    }
}

enum Stage {
    Uninitialized,
    Running(Running),
}

struct Running {
    program: ProgramHandle,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    index_count: u32,
    transforms: TransformPipeline,
    projection_dirty: bool,
}

/// Face-coloured cube spinning about a fixed axis in front of a fixed camera.
pub struct CubeDemo {
    config: CubeConfig,
    stage: Stage,
}

impl CubeDemo {
    pub fn new(config: CubeConfig) -> Self {
        Self {
            config,
            stage: Stage::Uninitialized,
        }
    }

    pub fn config(&self) -> &CubeConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        matches!(self.stage, Stage::Running(_))
    }

    /// Transform state, once running.
    pub fn transforms(&self) -> Option<&TransformPipeline> {
        match &self.stage {
            Stage::Running(r) => Some(&r.transforms),
            Stage::Uninitialized => None,
        }
    }
}

impl Demo for CubeDemo {
    fn render_state(&self) -> RenderState {
        RenderState {
            depth_test: true,
            cull_back_faces: true,
            clear_color: CUBE_CLEAR_COLOR,
        }
    }

    /// Acquires the context, builds the program, uploads the cube and sets up
    /// the camera, stopping at the first failure. Runs at most once.
    fn initialize<B: RenderBackend>(&mut self, backend: &mut B) -> Result<(), GfxError> {
        if self.is_running() {
            return Ok(());
        }

        let surface = backend.acquire_context()?;
        let program = backend.compile_program(TRANSFORM_VERTEX, COLOR_FRAGMENT)?;

        let mesh = cube_mesh(self.config.half_extent, self.config.face_colors);
        let vertex_buffer = backend.upload_buffer(BufferKind::Vertex, mesh.vertex_bytes());
        let index_buffer = backend.upload_buffer(BufferKind::Index, mesh.index_bytes());

        let transforms = TransformPipeline::initialize(self.config.transform(), surface.aspect());
        backend.set_uniform_matrix4(program, UNIFORM_VIEW, &transforms.view());
        backend.set_uniform_matrix4(program, UNIFORM_PROJ, &transforms.projection());

        log::info!(
            "cube: {}x{} surface, one turn every {:.2}s",
            surface.width,
            surface.height,
            self.config.speed.period()
        );

        self.stage = Stage::Running(Running {
            program,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            transforms,
            projection_dirty: false,
        });
        Ok(())
    }

    /// Ticks the transforms, binds them and queues the draw, in that order.
    fn frame<B: RenderBackend>(&mut self, backend: &mut B, elapsed: f64) {
        let Stage::Running(run) = &mut self.stage else { return };

        let world = run.transforms.tick(elapsed);
        backend.set_uniform_matrix4(run.program, UNIFORM_WORLD, &world);
        if run.projection_dirty {
            backend.set_uniform_matrix4(run.program, UNIFORM_PROJ, &run.transforms.projection());
            run.projection_dirty = false;
        }

        backend.draw_indexed(DrawIndexed {
            program: run.program,
            vertex_buffer: run.vertex_buffer,
            index_buffer: run.index_buffer,
            primitive: Primitive::Triangles,
            index_count: run.index_count,
            index_type: IndexType::U16,
        });
    }

    fn resize(&mut self, width: u32, height: u32) {
        if !self.config.track_resize {
            return;
        }
        let Stage::Running(run) = &mut self.stage else { return };
        run.transforms.resize(width as f32 / height.max(1) as f32);
        run.projection_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use glint_engine::ShaderStage;
    use glint_engine::render::{BackendCall, RecordingBackend};

    fn started(config: CubeConfig) -> (CubeDemo, RecordingBackend) {
        let mut b = RecordingBackend::new(800, 600);
        let mut d = CubeDemo::new(config);
        d.initialize(&mut b).unwrap();
        (d, b)
    }

    fn program_of(b: &RecordingBackend) -> ProgramHandle {
        b.draws().next().map(|d| d.program).unwrap()
    }

    // ── initialization ────────────────────────────────────────────────────

    #[test]
    fn initialize_runs_steps_in_order() {
        let (d, b) = started(CubeConfig::default());
        assert!(d.is_running());

        let calls = b.calls();
        assert_eq!(calls[0], BackendCall::AcquireContext);
        assert_eq!(calls[1], BackendCall::CompileProgram);
        assert_eq!(calls[2], BackendCall::UploadBuffer { kind: BufferKind::Vertex, len: 24 * 24 });
        assert_eq!(calls[3], BackendCall::UploadBuffer { kind: BufferKind::Index, len: 36 * 2 });
        assert!(matches!(&calls[4], BackendCall::SetUniformMatrix4 { name, .. } if name == "view"));
        assert!(matches!(&calls[5], BackendCall::SetUniformMatrix4 { name, .. } if name == "proj"));
        assert_eq!(calls.len(), 6);
    }

    #[test]
    fn missing_context_has_no_side_effects() {
        let mut b = RecordingBackend::without_context("no webgl");
        let mut d = CubeDemo::new(CubeConfig::default());

        let err = d.initialize(&mut b).unwrap_err();
        assert!(matches!(err, GfxError::ContextUnavailable { .. }));
        assert_eq!(b.calls(), &[BackendCall::AcquireContext]);
        assert!(!d.is_running());
        assert!(d.transforms().is_none());

        d.frame(&mut b, 1.0);
        assert_eq!(b.calls().len(), 1);
    }

    #[test]
    fn shader_failure_stops_before_upload() {
        struct BrokenShaders(RecordingBackend);

        impl RenderBackend for BrokenShaders {
            fn acquire_context(&mut self) -> Result<glint_engine::render::SurfaceInfo, GfxError> {
                self.0.acquire_context()
            }
            fn compile_program(&mut self, vs: &str, _fs: &str) -> Result<ProgramHandle, GfxError> {
                self.0.compile_program(vs, "@fragment fn fs_main( -> {}")
            }
            fn upload_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BufferHandle {
                self.0.upload_buffer(kind, data)
            }
            fn write_buffer(&mut self, buffer: BufferHandle, data: &[u8]) {
                self.0.write_buffer(buffer, data)
            }
            fn set_uniform_matrix4(&mut self, program: ProgramHandle, name: &str, m: &Mat4) {
                self.0.set_uniform_matrix4(program, name, m)
            }
            fn draw_indexed(&mut self, draw: DrawIndexed) {
                self.0.draw_indexed(draw)
            }
        }

        let mut b = BrokenShaders(RecordingBackend::new(800, 600));
        let mut d = CubeDemo::new(CubeConfig::default());

        let err = d.initialize(&mut b).unwrap_err();
        assert!(matches!(err, GfxError::ShaderCompile { stage: ShaderStage::Fragment, .. }));
        assert!(err.diagnostic_log().is_some_and(|log| !log.is_empty()));
        assert_eq!(b.0.calls(), &[BackendCall::AcquireContext, BackendCall::CompileProgram]);
        assert!(!d.is_running());
    }

    #[test]
    fn second_initialize_is_a_no_op() {
        let (mut d, mut b) = started(CubeConfig::default());
        b.clear_calls();
        d.initialize(&mut b).unwrap();
        assert!(b.calls().is_empty());
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn world_is_bound_before_draw() {
        let (mut d, mut b) = started(CubeConfig::default());
        b.clear_calls();

        d.frame(&mut b, 0.5);

        let calls = b.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], BackendCall::SetUniformMatrix4 { name, .. } if name == "world"));
        let BackendCall::DrawIndexed(draw) = &calls[1] else {
            panic!("expected draw, got {:?}", calls[1]);
        };
        assert_eq!(draw.index_count, 36);
        assert_eq!(draw.index_type, IndexType::U16);
        assert_eq!(draw.primitive, Primitive::Triangles);
    }

    #[test]
    fn bound_world_matches_elapsed_time() {
        let (mut d, mut b) = started(CubeConfig::default());
        d.frame(&mut b, 0.0);
        let p = program_of(&b);
        assert_eq!(b.uniform(p, "world"), Some(Mat4::IDENTITY));

        let period = RotationSpeed::LEISURELY.period();
        d.frame(&mut b, period);
        assert!(b.uniform(p, "world").unwrap().abs_diff_eq(Mat4::IDENTITY, 1e-5));

        d.frame(&mut b, 1.0);
        let expected = d.transforms().unwrap().world();
        assert_eq!(b.uniform(p, "world"), Some(expected));
    }

    #[test]
    fn camera_uniforms_are_fixed() {
        let (mut d, mut b) = started(CubeConfig::default());
        d.frame(&mut b, 0.0);
        let p = program_of(&b);
        let view = b.uniform(p, "view").unwrap();
        let proj = b.uniform(p, "proj").unwrap();

        for i in 0..30 {
            d.frame(&mut b, i as f64 * 0.1);
        }
        assert_eq!(b.uniform(p, "view"), Some(view));
        assert_eq!(b.uniform(p, "proj"), Some(proj));
        assert_eq!(view, CameraConfig::default().view());
        assert_eq!(proj, CameraConfig::default().projection(800.0 / 600.0));
    }

    #[test]
    fn brisk_preset_turns_faster() {
        let (mut slow, mut b1) = started(CubeConfig::default());
        let (mut fast, mut b2) = started(CubeConfig::default().with_speed(RotationSpeed::BRISK));
        slow.frame(&mut b1, 1.0);
        fast.frame(&mut b2, 1.0);
        assert!(fast.transforms().unwrap().angle() > slow.transforms().unwrap().angle());
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_ignored_by_default() {
        let (mut d, mut b) = started(CubeConfig::default());
        d.frame(&mut b, 0.0);
        let p = program_of(&b);
        let proj = b.uniform(p, "proj");

        d.resize(1920, 600);
        b.clear_calls();
        d.frame(&mut b, 0.1);

        assert_eq!(b.calls().len(), 2);
        assert_eq!(b.uniform(p, "proj"), proj);
    }

    #[test]
    fn tracked_resize_rebinds_projection_once() {
        let config = CubeConfig { track_resize: true, ..CubeConfig::default() };
        let (mut d, mut b) = started(config);
        d.frame(&mut b, 0.0);
        let p = program_of(&b);

        d.resize(1600, 400);
        b.clear_calls();
        d.frame(&mut b, 0.1);
        d.frame(&mut b, 0.2);

        let proj_sets = b
            .calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::SetUniformMatrix4 { name, .. } if name == "proj"))
            .count();
        assert_eq!(proj_sets, 1);
        assert_eq!(b.uniform(p, "proj"), Some(CameraConfig::default().projection(4.0)));
    }
}
