//! # Scene Loading
//!
//! A scene is a directory with a `scene.toml` at its root:
//!
//! ```toml
//! entity_files = ["entities/blocks.toml", "entities/events.toml"]
//! worlds = ["worlds/overworld.toml"]
//!
//! [colors]
//! grass = "#3a7d2c"
//! water = [0.1, 0.3, 0.8]
//!
//! [[sky]]
//! time = 0.0
//! top = "#000010"
//! bottom = "#101030"
//!
//! [systems]
//! update = ["keyboard_input", "uav_movement", "process_audicles", "render_worlds"]
//! ```
//!
//! Entity files hold `[[entity]]` tables. World files hold exactly one
//! `[[entity]]` with `is_world = true`; its `instances` become the world's
//! live instance list and its optional `fill` and `stars` tables generate
//! content at load.
//!
//! Loading is fail-fast: the first missing file, parse error, bad color or
//! unresolved name aborts with a [`ConfigError`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::entity::{AudicleKind, InstanceFactory, InstanceTemplate, Prototype, PrototypeId, DEBUG_COLOR};
use crate::error::CoreError;
use crate::math::Vec3;
use crate::registry::PrototypeRegistry;
use crate::schedule::SystemStep;
use crate::world::{Level, StarField, VolumeFill, World};

/// Name of the root file inside a scene directory.
pub const SCENE_FILE: &str = "scene.toml";

/// Errors raised while loading a scene.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A file is not valid TOML or does not match the expected shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },

    /// A color is neither a hex string, a library name nor an RGB triple.
    #[error("invalid color '{0}'")]
    InvalidColor(String),

    /// A name references no declared prototype.
    #[error("unknown prototype '{name}' referenced by {referenced_by}")]
    UnknownPrototype {
        /// The missing name.
        name: String,
        /// What referenced it.
        referenced_by: String,
    },

    /// A world file is malformed.
    #[error("invalid world file {path}: {reason}")]
    InvalidWorld {
        /// The file.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// Sky keyframes are out of range or out of order.
    #[error("invalid sky keys: {0}")]
    InvalidSkyKeys(String),

    /// A registry rule was violated (e.g. a duplicate name).
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for scene loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

// ============================================================================
// FILE SHAPES
// ============================================================================

/// A color as written in scene files.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorDecl {
    /// `"#rgb"`, `"#rrggbb"` or a color-library name.
    Named(String),
    /// Components in `[0, 1]`.
    Rgb([f32; 3]),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    #[serde(default)]
    entity_files: Vec<PathBuf>,
    worlds: Vec<PathBuf>,
    #[serde(default)]
    colors: HashMap<String, ColorDecl>,
    #[serde(default)]
    sky: Vec<SkyKeyDecl>,
    #[serde(default)]
    systems: SystemsConfig,
    #[serde(default)]
    app: AppConfig,
    #[serde(default)]
    audio: AudioConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SkyKeyDecl {
    time: f32,
    top: ColorDecl,
    bottom: ColorDecl,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityFile {
    #[serde(default, rename = "entity")]
    entities: Vec<EntityDecl>,
}

fn default_damping() -> f32 {
    Prototype::DEFAULT_DAMPING
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
struct EntityDecl {
    name: String,
    #[serde(default)]
    is_block: bool,
    is_renderable: Option<bool>,
    is_solid: Option<bool>,
    #[serde(default)]
    has_wireframe: bool,
    #[serde(default)]
    is_animated: bool,
    #[serde(default)]
    is_world: bool,
    #[serde(default)]
    is_star: bool,
    #[serde(default)]
    is_occluder: bool,
    #[serde(default)]
    is_tesseract: bool,
    #[serde(default)]
    audicle: AudicleKind,
    #[serde(default = "default_damping")]
    damping_factor: f32,
    #[serde(default)]
    instances: Vec<InstanceDecl>,
    fill: Option<FillDecl>,
    stars: Option<StarsDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InstanceDecl {
    prototype: String,
    #[serde(default)]
    position: Vec3,
    #[serde(default)]
    rotation: f32,
    color: Option<ColorDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FillDecl {
    origin: Vec3,
    dimensions: [u32; 3],
    block: String,
    color: Option<ColorDecl>,
}

fn default_star_distance() -> f32 {
    500.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StarsDecl {
    prototype: String,
    count: u32,
    #[serde(default = "default_star_distance")]
    distance: f32,
    #[serde(default)]
    seed: u64,
}

impl EntityDecl {
    /// `is_block` implies renderable and solid unless overridden explicitly.
    fn to_prototype(&self) -> Prototype {
        let mut proto = Prototype::new(self.name.clone());
        proto.is_block = self.is_block;
        proto.is_renderable = self.is_renderable.unwrap_or(self.is_block);
        proto.is_solid = self.is_solid.unwrap_or(self.is_block);
        proto.has_wireframe = self.has_wireframe;
        proto.is_animated = self.is_animated;
        proto.is_world = self.is_world;
        proto.is_star = self.is_star;
        proto.is_occluder = self.is_occluder;
        proto.is_tesseract = self.is_tesseract;
        proto.audicle = self.audicle;
        proto.damping_factor = self.damping_factor;
        proto
    }
}

// ============================================================================
// RESOLVED SETTINGS
// ============================================================================

/// Step lists as declared in `[systems]`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SystemsConfig {
    /// Run once before the first tick.
    pub init: Vec<SystemStep>,
    /// Run every tick, in order.
    pub update: Vec<SystemStep>,
    /// Run at shutdown, in reverse order.
    pub cleanup: Vec<SystemStep>,
}

impl Default for SystemsConfig {
    fn default() -> Self {
        use SystemStep as S;
        Self {
            init: vec![S::InitializeRenderer, S::InitializeTesseract, S::InitializeAudio],
            update: vec![
                S::KeyboardInput,
                S::MouseInput,
                S::UavMovement,
                S::UpdateTesseract,
                S::RayTracedAudio,
                S::PinkNoiseVisualizer,
                S::ProcessAudicles,
                S::UpdateCamera,
                S::UpdateSky,
                S::RenderWorlds,
                S::RenderTesseract,
            ],
            cleanup: vec![S::CleanupRenderer, S::CleanupAudio],
        }
    }
}

/// Window and clock settings.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AppConfig {
    /// Framebuffer width in pixels.
    pub width: u32,
    /// Framebuffer height in pixels.
    pub height: u32,
    /// Hour of day (0..24) at startup.
    pub start_hour: f32,
    /// Real seconds per simulated day.
    pub day_length: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            start_hour: 12.0,
            day_length: 86_400.0,
        }
    }
}

impl AppConfig {
    /// Width over height.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Pink-noise output settings.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AudioConfig {
    /// Master output gain.
    pub output_gain: f32,
    /// Samples the visualizer ring can hold.
    pub ring_capacity: usize,
    /// Samples per audio callback.
    pub block_size: usize,
    /// Generator seed.
    pub seed: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            output_gain: 0.8,
            ring_capacity: 2048,
            block_size: 256,
            seed: 0,
        }
    }
}

/// One sky keyframe with resolved colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyKeyframe {
    /// Day fraction in `[0, 1]`.
    pub time: f32,
    /// Zenith color.
    pub top: Vec3,
    /// Horizon color.
    pub bottom: Vec3,
}

// ============================================================================
// COLOR LIBRARY
// ============================================================================

/// Named colors used while authoring instance colors.
#[derive(Clone, Debug, Default)]
pub struct ColorLibrary {
    colors: HashMap<String, Vec3>,
}

impl ColorLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a named color.
    pub fn insert(&mut self, name: impl Into<String>, color: Vec3) {
        self.colors.insert(name.into(), color);
    }

    /// Looks up a named color.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Vec3> {
        self.colors.get(name).copied()
    }

    /// Number of named colors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns true if the library is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Parses `#rgb` or `#rrggbb`.
    #[must_use]
    pub fn parse_hex(hex: &str) -> Option<Vec3> {
        let digits = hex.strip_prefix('#')?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let full: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        let value = u32::from_str_radix(&full, 16).ok()?;
        let channel = |shift: u32| ((value >> shift) & 0xFF) as f32 / 255.0;
        Some(Vec3::new(channel(16), channel(8), channel(0)))
    }

    /// Resolves a declared color.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidColor`] for malformed hex or unknown names.
    pub fn resolve(&self, decl: &ColorDecl) -> ConfigResult<Vec3> {
        match decl {
            ColorDecl::Rgb(rgb) => Ok(Vec3::from_array(*rgb)),
            ColorDecl::Named(s) if s.starts_with('#') => {
                Self::parse_hex(s).ok_or_else(|| ConfigError::InvalidColor(s.clone()))
            }
            ColorDecl::Named(name) => self
                .get(name)
                .ok_or_else(|| ConfigError::InvalidColor(name.clone())),
        }
    }

    /// Resolves an optional color, falling back to [`DEBUG_COLOR`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve`].
    pub fn resolve_or_debug(&self, decl: Option<&ColorDecl>) -> ConfigResult<Vec3> {
        decl.map_or(Ok(DEBUG_COLOR), |d| self.resolve(d))
    }

    fn from_decls(decls: &HashMap<String, ColorDecl>) -> ConfigResult<Self> {
        let mut library = Self::new();
        for (name, decl) in decls {
            // Library entries are literal; they cannot reference each other.
            let color = match decl {
                ColorDecl::Rgb(rgb) => Vec3::from_array(*rgb),
                ColorDecl::Named(s) => {
                    Self::parse_hex(s).ok_or_else(|| ConfigError::InvalidColor(s.clone()))?
                }
            };
            library.insert(name.clone(), color);
        }
        Ok(library)
    }
}

// ============================================================================
// SCENE
// ============================================================================

/// Everything the host needs before the first frame.
#[derive(Debug)]
pub struct Scene {
    /// Prototypes in load order.
    pub registry: PrototypeRegistry,
    /// Worlds in declaration order; the first is active.
    pub level: Level,
    /// The factory that issued every instance so far.
    pub factory: InstanceFactory,
    /// Named colors.
    pub colors: ColorLibrary,
    /// Sky keyframes sorted by time.
    pub sky_keys: Vec<SkyKeyframe>,
    /// Declared step lists (not yet validated).
    pub systems: SystemsConfig,
    /// Window and clock.
    pub app: AppConfig,
    /// Audio output.
    pub audio: AudioConfig,
}

/// Reads a scene directory.
#[derive(Debug)]
pub struct SceneLoader {
    root: PathBuf,
}

fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> ConfigResult<T> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl SceneLoader {
    /// Creates a loader rooted at a scene directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Shorthand for `SceneLoader::new(dir).load_scene()`.
    ///
    /// # Errors
    ///
    /// See [`Self::load_scene`].
    pub fn load(dir: impl Into<PathBuf>) -> ConfigResult<Scene> {
        Self::new(dir).load_scene()
    }

    /// Loads prototypes, worlds, colors, sky and settings.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn load_scene(&self) -> ConfigResult<Scene> {
        let scene: SceneFile = read_toml(&self.root.join(SCENE_FILE))?;
        let colors = ColorLibrary::from_decls(&scene.colors)?;
        let sky_keys = resolve_sky(&scene.sky, &colors)?;

        let mut registry = PrototypeRegistry::new();
        let mut factory = InstanceFactory::new();

        // Register everything first so payloads may name later prototypes.
        let mut declared = Vec::new();
        for rel in &scene.entity_files {
            let file: EntityFile = read_toml(&self.root.join(rel))?;
            for decl in file.entities {
                let id = registry.register(decl.to_prototype())?;
                declared.push((id, decl));
            }
        }

        let mut world_decls = Vec::with_capacity(scene.worlds.len());
        for rel in &scene.worlds {
            let path = self.root.join(rel);
            let file: EntityFile = read_toml(&path)?;
            let decl = single_world(&path, file)?;
            registry.register(decl.to_prototype())?;
            world_decls.push(decl);
        }

        for (id, decl) in &declared {
            if decl.instances.is_empty() {
                continue;
            }
            let payload = decl
                .instances
                .iter()
                .map(|inst| resolve_instance(inst, &decl.name, &registry, &colors))
                .collect::<ConfigResult<Vec<_>>>()?;
            registry.set_payload(*id, payload)?;
        }

        let mut worlds = Vec::with_capacity(world_decls.len());
        for decl in &world_decls {
            worlds.push(build_world(decl, &registry, &colors, &mut factory)?);
        }

        let level = Level::new(worlds);
        tracing::info!(
            root = %self.root.display(),
            prototypes = registry.len(),
            worlds = level.worlds().len(),
            instances = level.instance_count(),
            sky_keys = sky_keys.len(),
            "scene loaded"
        );

        Ok(Scene {
            registry,
            level,
            factory,
            colors,
            sky_keys,
            systems: scene.systems,
            app: scene.app,
            audio: scene.audio,
        })
    }
}

fn single_world(path: &Path, file: EntityFile) -> ConfigResult<EntityDecl> {
    let invalid = |reason: &str| ConfigError::InvalidWorld {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    let mut entities = file.entities.into_iter();
    let decl = entities.next().ok_or_else(|| invalid("no entity declared"))?;
    if entities.next().is_some() {
        return Err(invalid("more than one entity declared"));
    }
    if !decl.is_world {
        return Err(invalid("entity is not flagged is_world"));
    }
    Ok(decl)
}

fn lookup(registry: &PrototypeRegistry, name: &str, referenced_by: &str) -> ConfigResult<PrototypeId> {
    registry.find(name).ok_or_else(|| ConfigError::UnknownPrototype {
        name: name.to_string(),
        referenced_by: referenced_by.to_string(),
    })
}

fn resolve_instance(
    decl: &InstanceDecl,
    owner: &str,
    registry: &PrototypeRegistry,
    colors: &ColorLibrary,
) -> ConfigResult<InstanceTemplate> {
    let prototype = lookup(registry, &decl.prototype, owner)?;
    let color = colors.resolve_or_debug(decl.color.as_ref())?;
    Ok(InstanceTemplate::new(prototype, decl.position, color).with_rotation(decl.rotation))
}

fn build_world(
    decl: &EntityDecl,
    registry: &PrototypeRegistry,
    colors: &ColorLibrary,
    factory: &mut InstanceFactory,
) -> ConfigResult<World> {
    let mut world = World::new(decl.name.clone());

    for inst in &decl.instances {
        let template = resolve_instance(inst, &decl.name, registry, colors)?;
        world.push(factory.create_from(&template));
    }

    if let Some(fill) = &decl.fill {
        VolumeFill {
            origin: fill.origin,
            dimensions: fill.dimensions,
            block: lookup(registry, &fill.block, &format!("fill of {}", decl.name))?,
            color: colors.resolve_or_debug(fill.color.as_ref())?,
        }
        .apply(&mut world, factory);
    }

    if let Some(stars) = &decl.stars {
        StarField {
            star: lookup(registry, &stars.prototype, &format!("stars of {}", decl.name))?,
            count: stars.count,
            distance: stars.distance,
            seed: stars.seed,
        }
        .apply(&mut world, factory);
    }

    Ok(world)
}

#[allow(clippy::float_cmp)]
fn resolve_sky(decls: &[SkyKeyDecl], colors: &ColorLibrary) -> ConfigResult<Vec<SkyKeyframe>> {
    let mut keys = Vec::with_capacity(decls.len());
    for decl in decls {
        if !(0.0..=1.0).contains(&decl.time) {
            return Err(ConfigError::InvalidSkyKeys(format!(
                "time {} outside [0, 1]",
                decl.time
            )));
        }
        keys.push(SkyKeyframe {
            time: decl.time,
            top: colors.resolve(&decl.top)?,
            bottom: colors.resolve(&decl.bottom)?,
        });
    }
    if keys.windows(2).any(|w| w[1].time < w[0].time) {
        return Err(ConfigError::InvalidSkyKeys("times must be ascending".into()));
    }
    if let (Some(first), Some(last)) = (keys.first(), keys.last()) {
        if keys.len() >= 2 && (first.time != 0.0 || last.time != 1.0) {
            return Err(ConfigError::InvalidSkyKeys(format!(
                "keys must span 0..1, got {}..{}",
                first.time, last.time
            )));
        }
    }
    Ok(keys)
}
