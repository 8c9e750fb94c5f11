//! Render pipeline orchestration.
//!
//! Ties the sky, the celestial bodies and the instance batcher into one
//! per-frame call sequence:
//!
//! 1. [`RenderPipeline::begin_frame`] with the clock
//! 2. [`RenderPipeline::update_camera`] with the viewer
//! 3. [`RenderPipeline::prepare_frame`] with the level and a backend

mod frame;
mod stats;

pub use frame::{FrameUniforms, RenderFrame};
pub use stats::RenderStats;

use prismals_core::{CameraState, Level, Mat4, PrototypeRegistry, Vec3};

use crate::atmosphere::{CelestialState, SkyColors, SkyGradient};
use crate::error::RenderResult;
use crate::instancing::{InstanceBackend, InstanceBatcher};

/// Complete render pipeline for PRISMALS.
#[derive(Debug, Default)]
pub struct RenderPipeline {
    batcher: InstanceBatcher,
    sky_gradient: SkyGradient,
    sky: SkyColors,
    celestial: CelestialState,
    view: Mat4,
    projection: Mat4,
    camera_pos: Vec3,
    time: f32,
    stats: RenderStats,
}

impl RenderPipeline {
    /// Creates a pipeline with the given sky.
    #[must_use]
    pub fn new(sky_gradient: SkyGradient) -> Self {
        Self {
            sky_gradient,
            ..Self::default()
        }
    }

    /// Advances the clock; recomputes sky colors and celestial bodies.
    pub fn begin_frame(&mut self, time: f32, day_fraction: f32) {
        self.time = time;
        self.sky_gradient.apply(day_fraction, &mut self.sky);
        self.celestial = CelestialState::from_day_fraction(day_fraction);
    }

    /// Updates view and projection from the camera.
    pub fn update_camera(&mut self, camera: &CameraState, aspect: f32) {
        self.view = camera.view_matrix();
        self.projection = camera.projection_matrix(aspect);
        self.camera_pos = camera.position;
    }

    /// Batches every world and submits the draws.
    ///
    /// # Errors
    ///
    /// Fails on unknown prototype ids or backend errors.
    pub fn prepare_frame<B: InstanceBackend + ?Sized>(
        &mut self,
        level: &Level,
        registry: &PrototypeRegistry,
        backend: &mut B,
    ) -> RenderResult<RenderFrame> {
        self.batcher.collect(level, registry)?;
        self.stats = self.batcher.submit(backend)?;

        Ok(RenderFrame {
            uniforms: self.uniforms(),
            sky: self.sky,
            celestial: self.celestial,
            stats: self.stats,
        })
    }

    /// Uniforms for the current camera and clock.
    #[must_use]
    pub fn uniforms(&self) -> FrameUniforms {
        FrameUniforms::new(
            &self.view,
            &self.projection,
            self.camera_pos,
            self.time,
            self.celestial.light_dir,
        )
    }

    /// Sky colors of the current frame.
    #[must_use]
    pub const fn sky(&self) -> SkyColors {
        self.sky
    }

    /// Sun and moon of the current frame.
    #[must_use]
    pub const fn celestial(&self) -> &CelestialState {
        &self.celestial
    }

    /// Returns rendering statistics.
    #[must_use]
    pub const fn stats(&self) -> RenderStats {
        self.stats
    }

    /// The instance batcher.
    #[must_use]
    pub fn batcher(&self) -> &InstanceBatcher {
        &self.batcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instancing::RecordingBackend;
    use prismals_core::{InstanceFactory, Prototype, World, DEBUG_COLOR};

    #[test]
    fn test_pipeline_creation() {
        let pipeline = RenderPipeline::new(SkyGradient::standard());
        assert_eq!(pipeline.stats().draw_calls, 0);
    }

    #[test]
    fn test_frame_carries_sky_and_light() {
        let mut registry = PrototypeRegistry::new();
        let stone = registry.register(Prototype::block("Stone")).unwrap();
        let mut factory = InstanceFactory::new();
        let mut world = World::new("w");
        world.push(factory.create(stone, Vec3::ZERO, DEBUG_COLOR));
        let level = Level::new(vec![world]);

        let mut pipeline = RenderPipeline::new(SkyGradient::standard());
        pipeline.begin_frame(1.5, 0.5);
        pipeline.update_camera(&CameraState::default(), 16.0 / 9.0);
        let frame = pipeline
            .prepare_frame(&level, &registry, &mut RecordingBackend::new())
            .unwrap();

        assert_eq!(frame.sky.bottom, Vec3::splat(1.0));
        assert_eq!(frame.uniforms.time, 1.5);
        assert!((frame.uniforms.light_dir[1] - 1.0).abs() < 1e-5);
        assert_eq!(frame.uniforms.camera_pos, CameraState::default().position.to_array());
        assert_eq!(frame.stats.instances, 1);
        assert_eq!(frame.billboards().count(), 1);
    }

    #[test]
    fn test_empty_sky_keeps_default_colors() {
        let mut pipeline = RenderPipeline::new(SkyGradient::default());
        pipeline.begin_frame(0.0, 0.5);
        assert_eq!(pipeline.sky(), SkyColors::default());
    }
}
