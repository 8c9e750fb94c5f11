//! # System Schedule
//!
//! The host runs three ordered step lists: init once, update every tick,
//! cleanup once at shutdown. Steps are a closed enum so a typo in the scene
//! file fails at parse time, and every step declares the contexts it needs
//! so a missing context fails at startup rather than silently skipping the
//! step each frame.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Shared state a step may require from the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// Window size and frame timing.
    App,
    /// Worlds and the active index.
    Level,
    /// Instance factory.
    Instance,
    /// Camera and mouse state.
    Player,
    /// Batcher, sky and GPU backend.
    Renderer,
    /// Pink-noise generator and shared audio state.
    Audio,
    /// Occlusion tracer.
    RayTracedAudio,
    /// Hypercube overlay.
    Tesseract,
}

/// Which list a step belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Runs once before the first tick.
    Init,
    /// Runs every tick.
    Update,
    /// Runs once at shutdown.
    Cleanup,
}

/// Every system step the host knows how to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStep {
    /// Create GPU buffers and pipelines.
    InitializeRenderer,
    /// Build the hypercube geometry.
    InitializeTesseract,
    /// Start the pink-noise generator.
    InitializeAudio,
    /// Emit event instances for held keys.
    KeyboardInput,
    /// Turn the camera from mouse deltas.
    MouseInput,
    /// Move the camera from gated UAV events.
    UavMovement,
    /// Apply tesseract events and ease its angles.
    UpdateTesseract,
    /// Trace listener-to-source occlusion.
    RayTracedAudio,
    /// Drain audio samples into visualizer colors.
    PinkNoiseVisualizer,
    /// Expand and retire audicles.
    ProcessAudicles,
    /// Rebuild view and projection matrices.
    UpdateCamera,
    /// Interpolate the sky and place the sun and moon.
    UpdateSky,
    /// Batch and draw every world.
    RenderWorlds,
    /// Project and draw the hypercube overlay.
    RenderTesseract,
    /// Stop the generator.
    CleanupAudio,
    /// Release GPU buffers.
    CleanupRenderer,
}

impl SystemStep {
    /// Contexts that must exist for this step to run.
    #[must_use]
    pub const fn dependencies(self) -> &'static [ContextKind] {
        use ContextKind as C;
        match self {
            Self::InitializeRenderer | Self::CleanupRenderer => &[C::Renderer],
            Self::InitializeTesseract => &[C::Tesseract],
            Self::InitializeAudio | Self::CleanupAudio => &[C::Audio],
            Self::KeyboardInput | Self::ProcessAudicles => &[C::Level, C::Instance],
            Self::MouseInput => &[C::Player],
            Self::UavMovement => &[C::Player, C::Level],
            Self::UpdateTesseract => &[C::Tesseract, C::Level],
            Self::RayTracedAudio => &[C::RayTracedAudio, C::Audio, C::Player, C::Level],
            Self::PinkNoiseVisualizer => &[C::Audio, C::Level],
            Self::UpdateCamera => &[C::Player, C::App],
            Self::UpdateSky => &[C::Renderer, C::App],
            Self::RenderWorlds => &[C::Renderer, C::Player, C::Level],
            Self::RenderTesseract => &[C::Renderer, C::Tesseract, C::Player, C::Level],
        }
    }

    /// The list this step may appear in.
    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            Self::InitializeRenderer | Self::InitializeTesseract | Self::InitializeAudio => Phase::Init,
            Self::CleanupAudio | Self::CleanupRenderer => Phase::Cleanup,
            _ => Phase::Update,
        }
    }
}

impl fmt::Display for SystemStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Validated step lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    init: Vec<SystemStep>,
    update: Vec<SystemStep>,
    /// Stored in execution order (reverse of declaration).
    cleanup: Vec<SystemStep>,
}

impl Schedule {
    /// Validates the declared lists against the contexts the host provides.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSchedule`] if a step appears in the wrong
    /// list, appears twice in one list, or needs a context that is not
    /// available.
    pub fn resolve(
        init: &[SystemStep],
        update: &[SystemStep],
        cleanup: &[SystemStep],
        available: &HashSet<ContextKind>,
    ) -> CoreResult<Self> {
        for (phase, steps) in [(Phase::Init, init), (Phase::Update, update), (Phase::Cleanup, cleanup)] {
            let mut seen = HashSet::new();
            for &step in steps {
                if step.phase() != phase {
                    return Err(CoreError::InvalidSchedule(format!(
                        "{step} belongs to {:?}, declared in {phase:?}",
                        step.phase()
                    )));
                }
                if !seen.insert(step) {
                    return Err(CoreError::InvalidSchedule(format!(
                        "{step} declared twice in {phase:?}"
                    )));
                }
                if let Some(missing) = step.dependencies().iter().find(|c| !available.contains(*c)) {
                    return Err(CoreError::InvalidSchedule(format!(
                        "{step} requires {missing:?}, which is not available"
                    )));
                }
            }
        }

        Ok(Self {
            init: init.to_vec(),
            update: update.to_vec(),
            cleanup: cleanup.iter().rev().copied().collect(),
        })
    }

    /// Init steps in execution order.
    #[must_use]
    pub fn init(&self) -> &[SystemStep] {
        &self.init
    }

    /// Update steps in execution order.
    #[must_use]
    pub fn update(&self) -> &[SystemStep] {
        &self.update
    }

    /// Cleanup steps in execution order.
    #[must_use]
    pub fn cleanup(&self) -> &[SystemStep] {
        &self.cleanup
    }

    /// Returns true if `step` is scheduled in any list.
    #[must_use]
    pub fn contains(&self, step: SystemStep) -> bool {
        self.init.contains(&step) || self.update.contains(&step) || self.cleanup.contains(&step)
    }
}
