use glint_engine::core::{App, AppControl, FrameCtx, StartCtx};
use glint_engine::device::GpuInit;
use glint_engine::error::GfxError;
use glint_engine::input::InputFrame;
use glint_engine::logging::{LoggingConfig, init_logging};
use glint_engine::render::{RenderBackend, RenderState, WgpuBackend};
use glint_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;

/// A demo written against a [`RenderBackend`].
///
/// `initialize` runs once and may fail; everything after it is infallible.
pub trait Demo {
    /// Fixed-function state the backend is created with.
    fn render_state(&self) -> RenderState;

    fn initialize<B: RenderBackend>(&mut self, backend: &mut B) -> Result<(), GfxError>;

    /// One-shot reactions to this frame's input, before [`Demo::frame`].
    fn handle_input<B: RenderBackend>(&mut self, backend: &mut B, input: &InputFrame) {
        let _ = (backend, input);
    }

    /// Per-frame update and draw submission. `elapsed` is seconds since start.
    fn frame<B: RenderBackend>(&mut self, backend: &mut B, elapsed: f64);

    fn resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }
}

/// Runs a [`Demo`] inside the engine runtime on a [`WgpuBackend`].
pub struct DemoHost<D: Demo> {
    demo: D,
    backend: Option<WgpuBackend>,
}

impl<D: Demo> DemoHost<D> {
    pub fn new(demo: D) -> Self {
        Self {
            demo,
            backend: None,
        }
    }

    pub fn demo(&self) -> &D {
        &self.demo
    }
}

impl<D: Demo> App for DemoHost<D> {
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> Result<(), GfxError> {
        let mut backend = WgpuBackend::new(ctx.gpu, self.demo.render_state());
        self.demo.initialize(&mut backend)?;
        self.backend = Some(backend);
        Ok(())
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(backend) = self.backend.as_mut() {
            backend.resize(width, height);
        }
        if width > 0 && height > 0 {
            self.demo.resize(width, height);
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(backend) = self.backend.as_mut() else {
            return AppControl::Continue;
        };

        self.demo.handle_input(backend, ctx.input_frame);
        self.demo.frame(backend, ctx.time.elapsed);

        let control = ctx.render(|rctx, target| backend.encode(rctx, target));
        backend.discard_pending();
        control
    }
}

/// Logs, opens a window titled `title` and runs `demo` until it is closed.
///
/// Colours are written to a linear (non-sRGB) surface so they match what a
/// 2D canvas shows for the same values.
pub fn run_demo<D: Demo + 'static>(title: &str, demo: D) -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: title.to_string(),
        initial_size: LogicalSize::new(800.0, 600.0),
    };
    let gpu_init = GpuInit {
        prefer_srgb: false,
        ..GpuInit::default()
    };

    Runtime::run(config, gpu_init, DemoHost::new(demo))
}
