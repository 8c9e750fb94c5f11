//! # PRISMALS Game Loop
//!
//! ```text
//! Tick N (default update list):
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. INPUT                                                            │
//! │    ├─ keyboard_input   held keys → event instances (active world)   │
//! │    └─ mouse_input      yaw / pitch                                  │
//! │                                                                     │
//! │ 2. CONSUMERS (read events before they retire)                       │
//! │    ├─ uav_movement     gated UAV_* events move the camera           │
//! │    ├─ update_tesseract TESS_* events rotate the hypercube           │
//! │    ├─ ray_traced_audio listener → source occlusion                  │
//! │    └─ pink_noise_visualizer  ring peak → source color               │
//! │                                                                     │
//! │ 3. AUDICLES                                                         │
//! │    └─ process_audicles spawn payloads, retire triggers              │
//! │                                                                     │
//! │ 4. RENDER                                                           │
//! │    ├─ update_camera    view / projection                            │
//! │    ├─ update_sky       gradient + sun / moon                        │
//! │    ├─ render_worlds    every world → buckets → backend              │
//! │    └─ render_tesseract overlay vertices                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The step lists come from the scene and are resolved against the contexts
//! this host provides before the first tick.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use prismals_audio::{AudioRenderer, AudioShared, AudioVisualizer, OcclusionTracer};
use prismals_core::{
    AppConfig, AudicleProcessor, AudioConfig, CameraState, ColorLibrary, ContextKind, InputState, Key,
    InstanceFactory, KeyboardInput, Level, Mat4, PrototypeRegistry, Scene, Schedule, SpawnPolicy,
    SystemStep, Tesseract, UavMovement, Vec3,
};
use prismals_rendering::{day_fraction, InstanceBackend, RenderFrame, RenderPipeline, SkyGradient};
use tracing::{debug, info};

use crate::error::HostResult;
use crate::stats::{FrameStats, FrameStatsAccumulator};

/// Seconds in a simulated day at real-time speed.
const SECONDS_PER_DAY: f32 = 86_400.0;

/// Host settings that do not come from the scene.
#[derive(Clone, Copy, Debug)]
pub struct GameLoopOptions {
    /// Provide the audio contexts. Audio steps in the schedule fail to
    /// resolve without them.
    pub enable_audio: bool,
    /// Overlap handling for audicle payloads.
    pub spawn_policy: SpawnPolicy,
}

impl Default for GameLoopOptions {
    fn default() -> Self {
        Self {
            enable_audio: true,
            spawn_policy: SpawnPolicy::AllowOverlap,
        }
    }
}

/// The projected hypercube, pinned to the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TesseractOverlay {
    /// Overlay-to-world transform.
    pub model: Mat4,
    /// Projected vertices, indexed by `prismals_core::tesseract::EDGE_INDICES`.
    pub vertices: [Vec3; 16],
}

#[derive(Debug)]
struct AudioContext {
    shared: Arc<AudioShared>,
    tracer: OcclusionTracer,
    visualizer: AudioVisualizer,
    config: AudioConfig,
}

/// Owns every context and runs the schedule.
#[derive(Debug)]
pub struct GameLoop {
    registry: PrototypeRegistry,
    level: Level,
    factory: InstanceFactory,
    app: AppConfig,
    schedule: Schedule,
    camera: CameraState,
    keyboard: KeyboardInput,
    uav: UavMovement,
    audicles: AudicleProcessor,
    tesseract: Tesseract,
    tesseract_active: bool,
    overlay: Option<TesseractOverlay>,
    renderer: RenderPipeline,
    audio: Option<AudioContext>,
    last_frame: Option<RenderFrame>,
    elapsed: f32,
    frame_count: u64,
    initialized: bool,
    quit_requested: bool,
    stats_accumulator: FrameStatsAccumulator,
}

impl GameLoop {
    /// Builds every context from a loaded scene and resolves its schedule.
    ///
    /// # Errors
    ///
    /// Fails if a step depends on a context that is not provided, if the
    /// audio settings are invalid, or if a step list repeats a step.
    pub fn new(scene: Scene, options: GameLoopOptions) -> HostResult<Self> {
        let Scene {
            registry,
            level,
            factory,
            colors,
            sky_keys,
            systems,
            app,
            audio,
        } = scene;

        let mut available: HashSet<ContextKind> = [
            ContextKind::App,
            ContextKind::Level,
            ContextKind::Instance,
            ContextKind::Player,
            ContextKind::Renderer,
            ContextKind::Tesseract,
        ]
        .into_iter()
        .collect();
        if options.enable_audio {
            available.insert(ContextKind::Audio);
            available.insert(ContextKind::RayTracedAudio);
        }
        let schedule = Schedule::resolve(&systems.init, &systems.update, &systems.cleanup, &available)?;

        let audio = if options.enable_audio {
            Some(Self::audio_context(&registry, &colors, audio)?)
        } else {
            None
        };

        let sky = if sky_keys.len() >= 2 {
            SkyGradient::new(sky_keys)
        } else {
            SkyGradient::standard()
        };

        info!(
            prototypes = registry.len(),
            worlds = level.worlds().len(),
            instances = level.instance_count(),
            update_steps = schedule.update().len(),
            audio = options.enable_audio,
            "game loop ready"
        );

        Ok(Self {
            keyboard: KeyboardInput::new(&registry),
            registry,
            level,
            factory,
            app,
            schedule,
            camera: CameraState::default(),
            uav: UavMovement::new(),
            audicles: AudicleProcessor::new(options.spawn_policy),
            tesseract: Tesseract::new(),
            tesseract_active: false,
            overlay: None,
            renderer: RenderPipeline::new(sky),
            audio,
            last_frame: None,
            elapsed: 0.0,
            frame_count: 0,
            initialized: false,
            quit_requested: false,
            stats_accumulator: FrameStatsAccumulator::new(),
        })
    }

    fn audio_context(
        registry: &PrototypeRegistry,
        colors: &ColorLibrary,
        config: AudioConfig,
    ) -> HostResult<AudioContext> {
        Ok(AudioContext {
            shared: Arc::new(AudioShared::new(&config)?),
            tracer: OcclusionTracer::new(registry),
            visualizer: AudioVisualizer::new(registry, colors),
            config,
        })
    }

    /// Runs the init steps. Called by the first [`Self::tick`] if needed.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        for step in self.schedule.init().to_vec() {
            self.run_lifecycle_step(step);
        }
        self.initialized = true;
    }

    /// Runs the cleanup steps in reverse declaration order.
    pub fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        for step in self.schedule.cleanup().to_vec() {
            self.run_lifecycle_step(step);
        }
        self.initialized = false;
    }

    fn run_lifecycle_step(&mut self, step: SystemStep) {
        match step {
            SystemStep::InitializeRenderer => {
                info!(aspect = self.app.aspect(), "renderer initialized");
            }
            SystemStep::InitializeTesseract => self.tesseract = Tesseract::new(),
            SystemStep::InitializeAudio => {
                if let Some(audio) = &self.audio {
                    audio.shared.set_active_generators(0);
                    info!(
                        gain = audio.config.output_gain,
                        ring = audio.config.ring_capacity,
                        "audio initialized"
                    );
                }
            }
            SystemStep::CleanupAudio => {
                if let Some(audio) = &self.audio {
                    audio.shared.set_active_generators(0);
                    audio.shared.clear_ring();
                }
            }
            SystemStep::CleanupRenderer => {
                let stats = self.renderer.stats();
                info!(
                    frames = self.frame_count,
                    draw_calls = stats.draw_calls,
                    instances = stats.instances,
                    "renderer shut down"
                );
            }
            other => debug!(step = %other, "not a lifecycle step"),
        }
    }

    /// Runs every update step once.
    ///
    /// # Errors
    ///
    /// Referential errors (an instance with an unknown prototype id) and
    /// backend failures are fatal.
    pub fn tick<B: InstanceBackend + ?Sized>(
        &mut self,
        input: &InputState,
        dt: f32,
        backend: &mut B,
    ) -> HostResult<FrameStats> {
        self.initialize();

        let start = Instant::now();
        self.elapsed += dt;
        let mut stats = FrameStats {
            frame: self.frame_count,
            delta_time: dt,
            ..FrameStats::default()
        };

        let mut render_start = None;
        for step in self.schedule.update().to_vec() {
            if render_start.is_none() && is_render_step(step) {
                render_start = Some(Instant::now());
            }
            self.run_update_step(step, input, dt, backend, &mut stats)?;
        }

        let render_start = render_start.unwrap_or_else(Instant::now);
        stats.logic_us = render_start.duration_since(start).as_micros() as u64;
        stats.render_us = render_start.elapsed().as_micros() as u64;
        stats.total_us = start.elapsed().as_micros() as u64;

        if input.is_held(Key::Escape) && !self.quit_requested {
            info!(frame = self.frame_count, "quit requested");
            self.quit_requested = true;
        }

        self.frame_count += 1;
        self.stats_accumulator.record(&stats);
        Ok(stats)
    }

    fn run_update_step<B: InstanceBackend + ?Sized>(
        &mut self,
        step: SystemStep,
        input: &InputState,
        dt: f32,
        backend: &mut B,
        stats: &mut FrameStats,
    ) -> HostResult<()> {
        match step {
            SystemStep::KeyboardInput => {
                stats.events_emitted = self.keyboard.process(input, &mut self.level, &mut self.factory)?;
            }
            SystemStep::MouseInput => {
                let (dx, dy) = input.mouse_delta;
                self.camera.apply_mouse(dx, dy);
            }
            SystemStep::UavMovement => {
                let world = self.level.active_world()?;
                stats.camera_moved = self.uav.apply(world, &self.registry, &mut self.camera, dt)?;
            }
            SystemStep::UpdateTesseract => {
                let world = self.level.active_world()?;
                self.tesseract_active = Tesseract::is_present(world, &self.registry)?;
                if self.tesseract_active {
                    self.tesseract.update(world, &self.registry, dt)?;
                }
                stats.tesseract_active = self.tesseract_active;
            }
            SystemStep::RayTracedAudio => {
                if let Some(audio) = &mut self.audio {
                    let world = self.level.active_world()?;
                    stats.audio_sources = audio.tracer.update(world, &self.registry, self.camera.position)?;
                }
            }
            SystemStep::PinkNoiseVisualizer => {
                if let Some(audio) = &self.audio {
                    let world = self.level.active_world_mut()?;
                    stats.audio_peak = audio.visualizer.update(world, &audio.tracer, &audio.shared);
                }
            }
            SystemStep::ProcessAudicles => {
                let world = self.level.active_world_mut()?;
                stats.audicles = self.audicles.process(world, &mut self.registry, &mut self.factory)?;
            }
            SystemStep::UpdateCamera => self.renderer.update_camera(&self.camera, self.app.aspect()),
            SystemStep::UpdateSky => {
                let fraction = self.day_fraction();
                self.renderer.begin_frame(self.elapsed, fraction);
            }
            SystemStep::RenderWorlds => {
                let frame = self.renderer.prepare_frame(&self.level, &self.registry, backend)?;
                stats.render = frame.stats;
                self.last_frame = Some(frame);
            }
            SystemStep::RenderTesseract => {
                self.overlay = self.tesseract_active.then(|| TesseractOverlay {
                    model: Tesseract::model_matrix(&self.camera.view_matrix(), self.app.aspect()),
                    vertices: self.tesseract.project(),
                });
            }
            other => debug!(step = %other, "not an update step"),
        }
        Ok(())
    }

    /// Fraction of the simulated day, from the configured start hour and
    /// day length.
    #[must_use]
    pub fn day_fraction(&self) -> f32 {
        let speed = if self.app.day_length > 0.0 {
            SECONDS_PER_DAY / self.app.day_length
        } else {
            1.0
        };
        day_fraction(self.app.start_hour * 3600.0 + self.elapsed * speed)
    }

    /// A callback body for an audio device layer, if audio is enabled.
    #[must_use]
    pub fn audio_renderer(&self) -> Option<AudioRenderer> {
        self.audio
            .as_ref()
            .map(|audio| AudioRenderer::new(Arc::clone(&audio.shared), audio.config.seed))
    }

    /// Shared audio state, if audio is enabled.
    #[must_use]
    pub fn audio_shared(&self) -> Option<&Arc<AudioShared>> {
        self.audio.as_ref().map(|audio| &audio.shared)
    }

    /// True once a tick has seen Escape held. The caller ends its loop.
    #[inline]
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Returns the current frame count.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The level.
    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// The prototypes.
    #[must_use]
    pub fn registry(&self) -> &PrototypeRegistry {
        &self.registry
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    /// The resolved schedule.
    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// The last rendered frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<&RenderFrame> {
        self.last_frame.as_ref()
    }

    /// The tesseract overlay of the last frame, if one was drawn.
    #[must_use]
    pub fn tesseract_overlay(&self) -> Option<&TesseractOverlay> {
        self.overlay.as_ref()
    }

    /// Returns the accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats_accumulator
    }
}

const fn is_render_step(step: SystemStep) -> bool {
    matches!(
        step,
        SystemStep::UpdateCamera
            | SystemStep::UpdateSky
            | SystemStep::RenderWorlds
            | SystemStep::RenderTesseract
    )
}
