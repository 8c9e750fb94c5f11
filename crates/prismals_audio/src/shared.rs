//! State shared between the game thread and the audio callback.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use prismals_core::AudioConfig;

use crate::error::{AudioError, AudioResult};
use crate::pink_noise::{ALPHA_OCCLUDED, ALPHA_OPEN};

/// Propagation result for one source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceState {
    /// An occluder lies on the path.
    pub occluded: bool,
    /// `exp(-0.05 × damping)` along the path.
    pub distance_gain: f32,
}

impl Default for SourceState {
    fn default() -> Self {
        Self {
            occluded: false,
            distance_gain: 1.0,
        }
    }
}

impl SourceState {
    /// Low-pass coefficient for this state.
    #[must_use]
    pub const fn alpha(&self) -> f32 {
        if self.occluded {
            ALPHA_OCCLUDED
        } else {
            ALPHA_OPEN
        }
    }
}

/// Parameters the audio callback reads once per block.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeneratorState {
    /// Number of generators producing sound.
    pub active_generators: u32,
    /// The source being rendered.
    pub source: SourceState,
}

/// Cross-thread audio state.
///
/// Parameters live behind a mutex. Samples for the visualizer travel
/// through a bounded channel used as a single-producer ring.
#[derive(Debug)]
pub struct AudioShared {
    state: Mutex<GeneratorState>,
    ring_tx: Sender<f32>,
    ring_rx: Receiver<f32>,
    output_gain: f32,
}

impl AudioShared {
    /// Creates shared state from the audio settings.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::InvalidConfig`] for a zero ring capacity or a
    /// non-positive output gain.
    pub fn new(config: &AudioConfig) -> AudioResult<Self> {
        if config.ring_capacity == 0 {
            return Err(AudioError::InvalidConfig("ring_capacity must be > 0".into()));
        }
        if config.output_gain <= 0.0 || !config.output_gain.is_finite() {
            return Err(AudioError::InvalidConfig(format!(
                "output_gain must be positive, got {}",
                config.output_gain
            )));
        }
        let (ring_tx, ring_rx) = crossbeam_channel::bounded(config.ring_capacity);
        Ok(Self {
            state: Mutex::new(GeneratorState::default()),
            ring_tx,
            ring_rx,
            output_gain: config.output_gain,
        })
    }

    /// Master gain.
    #[must_use]
    pub const fn output_gain(&self) -> f32 {
        self.output_gain
    }

    /// Copy of the current parameters.
    #[must_use]
    pub fn snapshot(&self) -> GeneratorState {
        *self.state.lock()
    }

    /// Sets how many generators are active.
    pub fn set_active_generators(&self, count: u32) {
        self.state.lock().active_generators = count;
    }

    /// Current generator count.
    #[must_use]
    pub fn active_generators(&self) -> u32 {
        self.state.lock().active_generators
    }

    /// Publishes the source's propagation state.
    pub fn set_source(&self, source: SourceState) {
        self.state.lock().source = source;
    }

    /// Offers a sample to the visualizer ring.
    ///
    /// Returns false if the ring was full and the sample dropped.
    #[inline]
    pub fn push_sample(&self, sample: f32) -> bool {
        match self.ring_tx.try_send(sample) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => false,
        }
    }

    /// Drains the ring and returns the peak absolute amplitude, or zero if
    /// it was empty.
    #[must_use]
    pub fn drain_peak(&self) -> f32 {
        let mut peak = 0.0_f32;
        while let Ok(sample) = self.ring_rx.try_recv() {
            peak = peak.max(sample.abs());
        }
        peak
    }

    /// Discards every sample waiting in the ring.
    pub fn clear_ring(&self) {
        while self.ring_rx.try_recv().is_ok() {}
    }

    /// Samples waiting in the ring.
    #[must_use]
    pub fn pending_samples(&self) -> usize {
        self.ring_rx.len()
    }
}
