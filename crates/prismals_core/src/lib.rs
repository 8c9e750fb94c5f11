//! # PRISMALS Core
//!
//! The entity/instance model of the block world and the audicle event
//! processor that turns spawner instances into concrete world content.
//!
//! ## Data Flow
//!
//! ```text
//! scene.toml ──> SceneLoader ──> PrototypeRegistry (append-only, id = position)
//!                     │                 │
//!                     ▼                 ▼
//!                   Level ──> active World ──> AudicleProcessor ──> World'
//!                     ▲                              │
//!      KeyboardInput ─┘ (gated events)               └─ InstanceFactory (ids)
//! ```
//!
//! ## Rules
//!
//! 1. **Prototype ids are positions** - the registry never reorders or removes
//! 2. **Instance ids are never reused** - one counter per process
//! 3. **Unknown ids are fatal** - every dereference goes through the registry

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod audicle;
pub mod camera;
pub mod config;
pub mod entity;
pub mod error;
pub mod input;
pub mod math;
pub mod registry;
pub mod schedule;
pub mod tesseract;
pub mod world;

pub use audicle::{AudicleProcessor, AudicleReport, SpawnPolicy};
pub use camera::{CameraState, UavMovement};
pub use config::{
    AppConfig, AudioConfig, ColorLibrary, ConfigError, Scene, SceneLoader, SkyKeyframe, SystemsConfig,
};
pub use entity::{
    AudicleKind, EntityInstance, InstanceFactory, InstanceId, InstanceTemplate, Prototype,
    PrototypeId, DEBUG_COLOR,
};
pub use error::{CoreError, CoreResult};
pub use input::{InputState, Key, KeyboardInput};
pub use math::{Mat4, Vec3, Vec4};
pub use registry::PrototypeRegistry;
pub use schedule::{ContextKind, Schedule, SystemStep};
pub use tesseract::Tesseract;
pub use world::{Level, StarField, VolumeFill, World};
