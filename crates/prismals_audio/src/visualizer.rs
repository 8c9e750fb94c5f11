//! # Pink Noise Visualizer
//!
//! The first `AudioVisualizer` instance in the active world is the sound
//! source. Each tick it publishes its propagation state to the audio
//! thread, drains the sample ring, and pulses its color between magenta
//! and white with the peak amplitude.

use prismals_core::{ColorLibrary, PrototypeId, PrototypeRegistry, Vec3, World};
use tracing::debug;

use crate::occlusion::OcclusionTracer;
use crate::shared::AudioShared;

/// Prototype name of the sound source entity.
pub const VISUALIZER_NAME: &str = "AudioVisualizer";

/// Peak-to-color amplification.
const PEAK_SCALE: f32 = 4.0;

const FALLBACK_QUIET: Vec3 = Vec3::new(1.0, 0.0, 1.0);
const FALLBACK_LOUD: Vec3 = Vec3::splat(1.0);

/// Drives the visualizer entity from the audio ring.
#[derive(Clone, Debug)]
pub struct AudioVisualizer {
    prototype: Option<PrototypeId>,
    quiet: Vec3,
    loud: Vec3,
}

impl AudioVisualizer {
    /// Resolves the visualizer prototype and its palette.
    #[must_use]
    pub fn new(registry: &PrototypeRegistry, colors: &ColorLibrary) -> Self {
        Self {
            prototype: registry.find(VISUALIZER_NAME),
            quiet: colors.get("Magenta").unwrap_or(FALLBACK_QUIET),
            loud: colors.get("White").unwrap_or(FALLBACK_LOUD),
        }
    }

    /// Color for a peak amplitude.
    #[must_use]
    pub fn color_for(&self, peak: f32, output_gain: f32) -> Vec3 {
        let level = if output_gain > 0.0 {
            (peak / output_gain * PEAK_SCALE).min(1.0)
        } else {
            0.0
        };
        self.quiet.lerp(self.loud, level)
    }

    /// Updates the shared state and recolors the source.
    ///
    /// Returns the drained peak, or `None` if the world has no visualizer,
    /// in which case the generators are switched off.
    pub fn update(&self, world: &mut World, tracer: &OcclusionTracer, shared: &AudioShared) -> Option<f32> {
        let source = self
            .prototype
            .and_then(|proto| world.instances.iter_mut().find(|i| i.prototype == proto));
        let Some(source) = source else {
            if shared.active_generators() != 0 {
                debug!("no audio visualizer in world '{}', silencing", world.name);
            }
            shared.set_active_generators(0);
            return None;
        };

        shared.set_active_generators(1);
        shared.set_source(tracer.source_state(source.id));

        let peak = shared.drain_peak();
        source.color = self.color_for(peak, shared.output_gain());
        Some(peak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prismals_core::{AudioConfig, InstanceFactory, Prototype, DEBUG_COLOR};

    fn setup() -> (PrototypeRegistry, PrototypeId, AudioShared) {
        let mut registry = PrototypeRegistry::new();
        let vis = registry.register(Prototype::new(VISUALIZER_NAME)).unwrap();
        let shared = AudioShared::new(&AudioConfig::default()).unwrap();
        (registry, vis, shared)
    }

    #[test]
    fn test_color_ramp() {
        let (registry, ..) = setup();
        let visualizer = AudioVisualizer::new(&registry, &ColorLibrary::new());
        assert_eq!(visualizer.color_for(0.0, 0.8), FALLBACK_QUIET);
        assert_eq!(visualizer.color_for(0.2, 0.8), FALLBACK_LOUD);
        assert_eq!(visualizer.color_for(5.0, 0.8), FALLBACK_LOUD);

        let half = visualizer.color_for(0.1, 0.8);
        assert!((half.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_palette_from_library() {
        let (registry, ..) = setup();
        let mut colors = ColorLibrary::new();
        colors.insert("Magenta", Vec3::new(0.5, 0.0, 0.5));
        let visualizer = AudioVisualizer::new(&registry, &colors);
        assert_eq!(visualizer.color_for(0.0, 1.0), Vec3::new(0.5, 0.0, 0.5));
    }

    #[test]
    fn test_update_recolors_first_source() {
        let (registry, vis, shared) = setup();
        let mut factory = InstanceFactory::new();
        let mut world = World::new("w");
        world.push(factory.create(vis, Vec3::ZERO, DEBUG_COLOR));
        world.push(factory.create(vis, Vec3::Y, DEBUG_COLOR));

        let visualizer = AudioVisualizer::new(&registry, &ColorLibrary::new());
        let tracer = OcclusionTracer::new(&registry);
        shared.push_sample(-0.1);

        let peak = visualizer.update(&mut world, &tracer, &shared).unwrap();
        assert!((peak - 0.1).abs() < f32::EPSILON);
        assert_eq!(shared.active_generators(), 1);
        assert_ne!(world.instances[0].color, DEBUG_COLOR);
        assert_eq!(world.instances[1].color, DEBUG_COLOR);
    }

    #[test]
    fn test_missing_source_silences() {
        let (registry, _, shared) = setup();
        shared.set_active_generators(1);
        let visualizer = AudioVisualizer::new(&registry, &ColorLibrary::new());
        let tracer = OcclusionTracer::new(&registry);
        let mut world = World::new("empty");
        assert!(visualizer.update(&mut world, &tracer, &shared).is_none());
        assert_eq!(shared.active_generators(), 0);
    }
}
