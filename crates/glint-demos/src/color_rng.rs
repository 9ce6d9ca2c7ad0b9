use std::time::{SystemTime, UNIX_EPOCH};

/// Small linear congruential generator for demo colours.
///
/// Not suitable for anything but picking pleasant random colours.
#[derive(Debug, Clone)]
pub struct ColorRng {
    state: u32,
}

impl ColorRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seeded from the wall clock.
    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
            .unwrap_or(0x2545_f491);
        Self::new(nanos)
    }

    /// Next 15-bit value.
    pub fn next_u15(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (self.state >> 16) & 0x7fff
    }

    /// Uniform-ish value in `[0, 1]`.
    pub fn next_unit(&mut self) -> f32 {
        self.next_u15() as f32 / 0x7fff as f32
    }

    /// Random RGB, each channel in `[0, 1]`.
    pub fn next_color(&mut self) -> [f32; 3] {
        [self.next_unit(), self.next_unit(), self.next_unit()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = ColorRng::new(42);
        let mut b = ColorRng::new(42);
        for _ in 0..32 {
            assert_eq!(a.next_color(), b.next_color());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = ColorRng::new(1);
        let mut b = ColorRng::new(2);
        let sa: Vec<_> = (0..8).map(|_| a.next_u15()).collect();
        let sb: Vec<_> = (0..8).map(|_| b.next_u15()).collect();
        assert_ne!(sa, sb);
    }

    #[test]
    fn channels_stay_in_unit_range() {
        let mut rng = ColorRng::new(7);
        for _ in 0..1000 {
            let c = rng.next_color();
            assert!(c.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn sequence_is_not_constant() {
        let mut rng = ColorRng::new(0);
        let first = rng.next_color();
        assert!((0..16).any(|_| rng.next_color() != first));
    }
}
