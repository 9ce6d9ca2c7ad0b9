use std::time::Duration;

use super::FrameClock;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the clock origin. Never clamped; drives absolute animation.
    pub elapsed: f64,

    /// Time since the previous tick in seconds, clamped.
    pub dt: f32,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Turns a `FrameClock` into per-frame `FrameTime` snapshots.
///
/// Use one timer per render loop so loops do not share delta-time state.
///
/// `dt` is clamped to avoid pathological values when the process is paused by a
/// debugger, minimized, or stalls. `elapsed` is passed through untouched.
#[derive(Debug, Clone)]
pub struct FrameTimer<C: FrameClock> {
    clock: C,
    last: f64,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl<C: FrameClock> FrameTimer<C> {
    /// Creates a timer with default clamps (100 µs .. 250 ms).
    pub fn new(clock: C) -> Self {
        Self::with_clamps(clock, Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a timer with custom delta-time clamps.
    pub fn with_clamps(clock: C, dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let last = clock.now();
        Self {
            clock,
            last,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Advances the timer and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let mut now = self.clock.now();
        if now < self.last {
            log::debug!("frame clock went backwards ({now} < {}); holding", self.last);
            now = self.last;
        }

        let dt = (now - self.last).clamp(self.dt_min.as_secs_f64(), self.dt_max.as_secs_f64());
        self.last = now;

        let ft = FrameTime {
            elapsed: now,
            dt: dt as f32,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;

    #[test]
    fn elapsed_follows_clock_and_frames_count_up() {
        let mut timer = FrameTimer::new(ManualClock::new());

        timer.clock_mut().set(0.5);
        let a = timer.tick();
        timer.clock_mut().set(0.6);
        let b = timer.tick();

        assert_eq!(a.elapsed, 0.5);
        assert_eq!(b.elapsed, 0.6);
        assert_eq!(a.frame_index, 0);
        assert_eq!(b.frame_index, 1);
    }

    #[test]
    fn dt_is_clamped_but_elapsed_is_not() {
        let mut timer = FrameTimer::new(ManualClock::new());

        timer.clock_mut().set(10.0);
        let ft = timer.tick();
        assert_eq!(ft.elapsed, 10.0);
        assert!((ft.dt - 0.25).abs() < 1e-6);

        // Same timestamp twice: dt hits the lower clamp.
        let ft = timer.tick();
        assert!((ft.dt - 0.0001).abs() < 1e-7);
    }

    #[test]
    fn custom_clamps_apply() {
        let mut timer = FrameTimer::with_clamps(
            ManualClock::new(),
            Duration::from_millis(1),
            Duration::from_millis(50),
        );
        timer.clock_mut().set(0.02);
        let ft = timer.tick();
        assert!((ft.dt - 0.02).abs() < 1e-6);
    }
}
