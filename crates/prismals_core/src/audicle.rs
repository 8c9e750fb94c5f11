//! # Audicle Event Processor
//!
//! Once per tick, turns spawner instances in the active world into concrete
//! instances and retires them.
//!
//! ```text
//! scan world ──┬─ OneShot audicle ─ take payload ─ spawn children ─ mark trigger
//!              ├─ Gated audicle ─────────────────────────────────── mark
//!              └─ anything else ─ untouched
//! append children ─> sweep marked ids (order of survivors preserved)
//! ```
//!
//! Children are placed at their own stored position, not at the trigger's,
//! so one audicle can lay out a whole structure. A payload is consumed by
//! the first trigger that sees it; later triggers of the same prototype find
//! it empty and simply retire.
//!
//! The pass must finish (sweep included) before the renderer reads the world
//! in the same tick.

use std::collections::HashSet;

use crate::entity::{AudicleKind, EntityInstance, InstanceFactory, InstanceId};
use crate::error::CoreResult;
use crate::math::Vec3;
use crate::registry::PrototypeRegistry;
use crate::world::World;

/// What to do when a spawned child would land on an existing instance.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum SpawnPolicy {
    /// Spawn unconditionally; overlapping instances are allowed.
    #[default]
    AllowOverlap,
    /// Skip a child if a non-audicle instance already sits within `radius`.
    Dedup {
        /// Distance under which two positions count as the same spot.
        radius: f32,
    },
}

/// Summary of one processing pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AudicleReport {
    /// Instances created from payloads.
    pub spawned: usize,
    /// Audicle instances removed from the world.
    pub retired: usize,
    /// Children skipped by [`SpawnPolicy::Dedup`].
    pub deduplicated: usize,
}

/// The per-tick audicle pass.
#[derive(Debug, Default)]
pub struct AudicleProcessor {
    policy: SpawnPolicy,
    /// Scratch set reused across ticks.
    finished: HashSet<InstanceId>,
    /// Scratch list reused across ticks.
    spawned: Vec<EntityInstance>,
}

impl AudicleProcessor {
    /// Creates a processor with the given overlap policy.
    #[must_use]
    pub fn new(policy: SpawnPolicy) -> Self {
        Self {
            policy,
            finished: HashSet::new(),
            spawned: Vec::new(),
        }
    }

    /// The overlap policy in force.
    #[must_use]
    pub const fn policy(&self) -> SpawnPolicy {
        self.policy
    }

    /// Runs one pass over `world`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::UnknownPrototype`] if a world instance or a
    /// payload entry references a prototype that was never registered. The
    /// world is left unmodified in that case.
    pub fn process(
        &mut self,
        world: &mut World,
        registry: &mut PrototypeRegistry,
        factory: &mut InstanceFactory,
    ) -> CoreResult<AudicleReport> {
        self.finished.clear();
        self.spawned.clear();
        let mut report = AudicleReport::default();

        // Validate up front so a bad reference never leaves a half-processed world.
        for inst in &world.instances {
            registry.validate(inst.prototype)?;
        }

        for index in 0..world.instances.len() {
            let trigger = world.instances[index];
            let kind = registry.get(trigger.prototype)?.audicle;

            match kind {
                AudicleKind::OneShot => {
                    if !registry.payload(trigger.prototype)?.is_empty() {
                        for child in registry.payload(trigger.prototype)? {
                            registry.validate(child.prototype)?;
                        }
                        let payload = registry.take_payload(trigger.prototype)?;
                        for child in &payload {
                            if self.is_duplicate(world, registry, child.position) {
                                report.deduplicated += 1;
                                continue;
                            }
                            let instance = factory.create_from(child);
                            tracing::trace!(
                                id = %instance.id,
                                prototype = %instance.prototype,
                                "audicle spawn"
                            );
                            self.spawned.push(instance);
                        }
                    }
                    self.finished.insert(trigger.id);
                }
                AudicleKind::Gated => {
                    self.finished.insert(trigger.id);
                }
                AudicleKind::None => {}
            }
        }

        report.spawned = self.spawned.len();
        world.instances.append(&mut self.spawned);

        if !self.finished.is_empty() {
            let before = world.instances.len();
            let finished = &self.finished;
            world.instances.retain(|inst| !finished.contains(&inst.id));
            report.retired = before - world.instances.len();
        }

        if report.spawned > 0 || report.retired > 0 {
            tracing::debug!(
                world = %world.name,
                spawned = report.spawned,
                retired = report.retired,
                deduplicated = report.deduplicated,
                "audicle pass"
            );
        }

        Ok(report)
    }

    fn is_duplicate(&self, world: &World, registry: &PrototypeRegistry, position: Vec3) -> bool {
        let SpawnPolicy::Dedup { radius } = self.policy else {
            return false;
        };
        world
            .instances
            .iter()
            .chain(self.spawned.iter())
            .filter(|inst| {
                registry
                    .get(inst.prototype)
                    .map(|p| !p.audicle.is_audicle())
                    .unwrap_or(false)
            })
            .any(|inst| inst.position.distance(position) < radius)
    }
}
