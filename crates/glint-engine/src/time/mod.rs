//! Time subsystem.
//!
//! Provides stable, testable frame timing without coupling to the runtime.
//! Intended usage:
//! - one `FrameTimer` per render loop, backed by any `FrameClock`
//! - call `tick()` once per presented frame to obtain `FrameTime`

mod clock;
mod frame_timer;

pub use clock::{FrameClock, ManualClock, MonotonicClock};
pub use frame_timer::{FrameTime, FrameTimer};
