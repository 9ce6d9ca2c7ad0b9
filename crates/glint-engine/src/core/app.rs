use crate::error::GfxError;
use crate::input::InputEvent;

use super::ctx::{FrameCtx, StartCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the demos.
///
/// Lifecycle: `on_start` runs once after the GPU context exists, then `on_frame`
/// runs once per display refresh until the window closes. An error from
/// `on_start` is terminal.
pub trait App {
    /// One-time initialization against the freshly created GPU context.
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> Result<(), GfxError>;

    /// Called for every translated input event, before the next frame.
    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called after the drawable surface changed size (physical pixels).
    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
