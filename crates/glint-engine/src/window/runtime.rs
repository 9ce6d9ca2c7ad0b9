use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, StartCtx};
use crate::device::{Gpu, GpuInit};
use crate::error::GfxError;
use crate::input::platform::winit::translate_window_event;
use crate::input::{ButtonState, InputEvent, InputFrame, InputState, Key};
use crate::time::{FrameTimer, MonotonicClock};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "glint".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, initializes the GPU context and `app`, then drives one
    /// frame per display refresh until the window closes.
    ///
    /// Returns the initialization error (a [`GfxError`]) if the context could not
    /// be acquired or `App::on_start` failed.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    timer: FrameTimer<MonotonicClock>,

    entry: Option<WindowEntry>,
    started: bool,
    failure: Option<GfxError>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            timer: FrameTimer::new(MonotonicClock::new()),
            entry: None,
            started: false,
            failure: None,
            exit_requested: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: GfxError) {
        log::error!("{err}");
        self.failure = Some(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    /// Creates the window, the GPU context and runs `App::on_start`, in that order.
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), GfxError> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop.create_window(attrs).map_err(|e| {
            GfxError::context_unavailable(format!("failed to create window: {e}"))
        })?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()?;

        let app = &mut self.app;
        entry.with(|fields| {
            let mut ctx = StartCtx {
                window: fields.window,
                gpu: fields.gpu,
            };
            app.on_start(&mut ctx)
        })?;

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        self.started = true;
        Ok(())
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started || self.exit_requested {
            return;
        }

        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // FIFO presentation paces redraws to the display refresh.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, timer) = (&mut self.app, &mut self.timer);
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let mut control = AppControl::Continue;

        if let Some(ev) = translate_window_event(&event) {
            let escape = matches!(
                ev,
                InputEvent::Key { key: Key::Escape, state: ButtonState::Pressed, .. }
            );
            if escape {
                control = AppControl::Exit;
            } else if app.on_input(&ev) == AppControl::Exit {
                control = AppControl::Exit;
            }
            entry.with_mut(|fields| fields.input_state.apply_event(fields.input_frame, ev));
        }

        match &event {
            WindowEvent::CloseRequested => control = AppControl::Exit,

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                app.on_resize(new_size.width, new_size.height);
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                app.on_resize(new_size.width, new_size.height);
            }

            WindowEvent::RedrawRequested => {
                entry.with_mut(|fields| {
                    let size = fields.gpu.size();
                    if size.width == 0 || size.height == 0 {
                        // Minimized: nothing to present.
                        return;
                    }

                    let time = timer.tick();
                    {
                        let mut ctx = FrameCtx {
                            window: fields.window,
                            gpu: fields.gpu,
                            input: fields.input_state,
                            input_frame: fields.input_frame,
                            time,
                        };
                        if app.on_frame(&mut ctx) == AppControl::Exit {
                            control = AppControl::Exit;
                        }
                    }

                    // Clear per-frame deltas after the frame is consumed.
                    fields.input_frame.clear();
                });
            }

            _ => {}
        }

        if control == AppControl::Exit {
            self.exit_requested = true;
            self.entry = None;
            event_loop.exit();
        }
    }
}
