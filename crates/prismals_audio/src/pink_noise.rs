//! Voss-McCartney pink noise.
//!
//! Row 0 is refreshed every sample; row `i` every `2^i` samples. The sum of
//! the rows approximates a 1/f spectrum. A one-pole low-pass follows, so an
//! occluded source sounds muffled.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::shared::SourceState;

/// Number of rows summed.
pub const PINK_NOISE_OCTAVES: usize = 7;

/// Low-pass coefficient with a clear line of sight (filter bypassed).
pub const ALPHA_OPEN: f32 = 1.0;

/// Low-pass coefficient when an occluder blocks the path.
pub const ALPHA_OCCLUDED: f32 = 0.15;

/// Filtered pink-noise generator.
#[derive(Debug, Clone)]
pub struct PinkNoise {
    rows: [f32; PINK_NOISE_OCTAVES],
    running_sum: f32,
    counter: u32,
    last_output: f32,
    rng: ChaCha8Rng,
}

impl PinkNoise {
    /// Creates a generator with a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rows: [0.0; PINK_NOISE_OCTAVES],
            running_sum: 0.0,
            counter: 0,
            last_output: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Unfiltered pink sample in `[-0.5, 0.5]`.
    #[inline]
    pub fn next_raw(&mut self) -> f32 {
        let white = self.rng.gen::<f32>() * 2.0 - 1.0;
        self.counter = self.counter.wrapping_add(1);

        self.refresh_row(0, white);
        for i in 1..PINK_NOISE_OCTAVES {
            if self.counter & ((1 << i) - 1) == 0 {
                self.refresh_row(i, white);
            }
        }
        self.running_sum / PINK_NOISE_OCTAVES as f32
    }

    #[inline]
    fn refresh_row(&mut self, row: usize, white: f32) {
        self.running_sum -= self.rows[row];
        self.rows[row] = white * 0.5;
        self.running_sum += self.rows[row];
    }

    /// Next output sample for a source, including filter and gains.
    #[inline]
    pub fn next_sample(&mut self, source: &SourceState, output_gain: f32) -> f32 {
        let raw = self.next_raw();
        let alpha = source.alpha();
        let filtered = alpha * raw + (1.0 - alpha) * self.last_output;
        self.last_output = filtered;
        filtered * output_gain * source.distance_gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_bounded() {
        let mut noise = PinkNoise::new(1);
        for _ in 0..10_000 {
            let s = noise.next_raw();
            assert!((-0.5..=0.5).contains(&s), "{s}");
        }
    }

    #[test]
    fn test_seeded_determinism() {
        let mut a = PinkNoise::new(42);
        let mut b = PinkNoise::new(42);
        for _ in 0..256 {
            assert_eq!(a.next_raw(), b.next_raw());
        }
    }

    #[test]
    fn test_occlusion_smooths_output() {
        // Total variation of the filtered signal drops when occluded.
        let variation = |occluded: bool| {
            let source = SourceState {
                occluded,
                distance_gain: 1.0,
            };
            let mut noise = PinkNoise::new(9);
            let mut prev = 0.0;
            let mut total = 0.0;
            for _ in 0..4096 {
                let s = noise.next_sample(&source, 1.0);
                total += (s - prev).abs();
                prev = s;
            }
            total
        };
        assert!(variation(true) < variation(false) * 0.5);
    }

    #[test]
    fn test_gains_scale_output() {
        let source = SourceState {
            occluded: false,
            distance_gain: 0.5,
        };
        let mut a = PinkNoise::new(3);
        let mut b = PinkNoise::new(3);
        for _ in 0..64 {
            let full = a.next_sample(&SourceState::default(), 1.0);
            let scaled = b.next_sample(&source, 0.8);
            assert!((scaled - full * 0.4).abs() < 1e-6);
        }
    }
}
