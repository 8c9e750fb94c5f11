//! The audio callback body.

use std::sync::Arc;

use tracing::warn;

use crate::pink_noise::PinkNoise;
use crate::shared::AudioShared;

/// Fills output blocks for a device layer.
///
/// Owned by the audio thread; talks to the game thread only through
/// [`AudioShared`].
#[derive(Debug)]
pub struct AudioRenderer {
    shared: Arc<AudioShared>,
    noise: PinkNoise,
    dropped: u64,
}

impl AudioRenderer {
    /// Creates a renderer with a seeded generator.
    #[must_use]
    pub fn new(shared: Arc<AudioShared>, seed: u64) -> Self {
        Self {
            shared,
            noise: PinkNoise::new(seed),
            dropped: 0,
        }
    }

    /// Writes one block of mono samples.
    ///
    /// Outputs silence when no generator is active. Otherwise the first
    /// sample of the block is offered to the visualizer ring.
    pub fn fill_block(&mut self, out: &mut [f32]) {
        let state = self.shared.snapshot();
        if state.active_generators == 0 {
            out.fill(0.0);
            return;
        }

        let gain = self.shared.output_gain();
        for sample in out.iter_mut() {
            *sample = self.noise.next_sample(&state.source, gain);
        }
        if let Some(&first) = out.first() {
            if !self.shared.push_sample(first) {
                self.dropped += 1;
                if self.dropped.is_power_of_two() {
                    warn!(dropped = self.dropped, "visualizer ring full, samples dropped");
                }
            }
        }
    }

    /// Ring samples dropped because the game thread fell behind.
    #[must_use]
    pub const fn dropped_samples(&self) -> u64 {
        self.dropped
    }

    /// The shared state.
    #[must_use]
    pub fn shared(&self) -> &Arc<AudioShared> {
        &self.shared
    }
}
