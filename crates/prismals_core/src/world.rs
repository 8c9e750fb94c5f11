//! # Worlds and the Level
//!
//! A world is a named instance list - the live scene graph that gets
//! simulated and drawn. The level owns an ordered list of worlds and an
//! active index. Every world is rendered; only the active one receives
//! input and audicle events.

use std::f32::consts::{FRAC_PI_2, TAU};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::entity::{EntityInstance, InstanceFactory, PrototypeId, DEBUG_COLOR};
use crate::error::{CoreError, CoreResult};
use crate::math::Vec3;

/// A container whose instance list is a live scene.
#[derive(Clone, Debug, Default)]
pub struct World {
    /// Name of the world declaration this came from.
    pub name: String,
    /// Live instances, in insertion order.
    pub instances: Vec<EntityInstance>,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instances: Vec::new(),
        }
    }

    /// Appends an instance.
    #[inline]
    pub fn push(&mut self, instance: EntityInstance) {
        self.instances.push(instance);
    }

    /// Number of live instances.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if the world holds no instances.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Counts instances of one prototype.
    #[must_use]
    pub fn count_of(&self, prototype: PrototypeId) -> usize {
        self.instances
            .iter()
            .filter(|inst| inst.prototype == prototype)
            .count()
    }
}

/// A dense box of blocks generated into a world at load time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeFill {
    /// Minimum corner.
    pub origin: Vec3,
    /// Block counts along each axis.
    pub dimensions: [u32; 3],
    /// Block prototype to place.
    pub block: PrototypeId,
    /// Color of every placed block.
    pub color: Vec3,
}

impl VolumeFill {
    /// Number of blocks this fill produces.
    #[must_use]
    pub fn volume(&self) -> usize {
        self.dimensions.iter().map(|&d| d as usize).product()
    }

    /// Appends `x * y * z` block instances to `world`, x outermost.
    pub fn apply(&self, world: &mut World, factory: &mut InstanceFactory) {
        let [dx, dy, dz] = self.dimensions;
        world.instances.reserve(self.volume());
        for x in 0..dx {
            for y in 0..dy {
                for z in 0..dz {
                    let offset = Vec3::new(x as f32, y as f32, z as f32);
                    world.push(factory.create(self.block, self.origin + offset, self.color));
                }
            }
        }
    }
}

/// Points scattered over the upper hemisphere of a sky dome.
///
/// Seeded, so the same scene file always produces the same sky.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarField {
    /// Star prototype to place.
    pub star: PrototypeId,
    /// Number of stars.
    pub count: u32,
    /// Dome radius.
    pub distance: f32,
    /// RNG seed.
    pub seed: u64,
}

impl StarField {
    /// Appends `count` star instances to `world`.
    pub fn apply(&self, world: &mut World, factory: &mut InstanceFactory) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        world.instances.reserve(self.count as usize);
        for _ in 0..self.count {
            let theta = rng.gen::<f32>() * TAU;
            let phi = rng.gen::<f32>() * FRAC_PI_2;
            let dir = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            world.push(factory.create(self.star, dir * self.distance, DEBUG_COLOR));
        }
    }
}

/// The ordered list of worlds with one active index.
#[derive(Clone, Debug, Default)]
pub struct Level {
    worlds: Vec<World>,
    active: usize,
}

impl Level {
    /// Creates a level from its worlds; the first world starts active.
    #[must_use]
    pub fn new(worlds: Vec<World>) -> Self {
        Self { worlds, active: 0 }
    }

    /// All worlds in order.
    #[inline]
    #[must_use]
    pub fn worlds(&self) -> &[World] {
        &self.worlds
    }

    /// Mutable access to all worlds.
    #[inline]
    pub fn worlds_mut(&mut self) -> &mut [World] {
        &mut self.worlds
    }

    /// Index of the active world.
    #[inline]
    #[must_use]
    pub const fn active_index(&self) -> usize {
        self.active
    }

    /// The world receiving events.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoActiveWorld`] if the level is empty.
    pub fn active_world(&self) -> CoreResult<&World> {
        self.worlds.get(self.active).ok_or(CoreError::NoActiveWorld)
    }

    /// Mutable access to the world receiving events.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoActiveWorld`] if the level is empty.
    pub fn active_world_mut(&mut self) -> CoreResult<&mut World> {
        self.worlds.get_mut(self.active).ok_or(CoreError::NoActiveWorld)
    }

    /// Makes the next world active, wrapping around.
    pub fn cycle_active(&mut self) {
        if !self.worlds.is_empty() {
            self.active = (self.active + 1) % self.worlds.len();
            tracing::info!(
                active = self.active,
                world = %self.worlds[self.active].name,
                "switched active world"
            );
        }
    }

    /// Every live instance across all worlds.
    pub fn instances(&self) -> impl Iterator<Item = &EntityInstance> {
        self.worlds.iter().flat_map(|w| w.instances.iter())
    }

    /// Total number of live instances across all worlds.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.worlds.iter().map(World::len).sum()
    }
}
