use std::time::Instant;

/// Source of elapsed time for the frame loop.
///
/// `now()` returns seconds since the clock's origin and must never decrease.
pub trait FrameClock {
    fn now(&self) -> f64;
}

/// Wall clock anchored at construction time.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }

    /// Clock anchored at an explicit instant (e.g. process start).
    pub fn starting_at(origin: Instant) -> Self {
        Self { origin }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for MonotonicClock {
    fn now(&self) -> f64 {
        Instant::now().saturating_duration_since(self.origin).as_secs_f64()
    }
}

/// Clock driven by hand. Used for deterministic playback and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current time. Values earlier than the current time are ignored.
    pub fn set(&mut self, seconds: f64) {
        if seconds > self.now {
            self.now = seconds;
        }
    }

    pub fn advance(&mut self, seconds: f64) {
        self.set(self.now + seconds.max(0.0));
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> f64 {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_starts_near_zero_and_grows() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(a >= 0.0);
        assert!(b >= a);
        assert!(a < 1.0);
    }

    #[test]
    fn manual_clock_never_goes_backwards() {
        let mut clock = ManualClock::new();
        clock.set(2.0);
        clock.set(1.0);
        assert_eq!(clock.now(), 2.0);

        clock.advance(-5.0);
        assert_eq!(clock.now(), 2.0);

        clock.advance(0.5);
        assert_eq!(clock.now(), 2.5);
    }
}
