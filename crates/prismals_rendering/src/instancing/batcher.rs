//! Per-frame instance batching.
//!
//! `collect` rebuilds the buckets from the level, `submit` pushes them to a
//! backend. Nothing is cached on the GPU side between frames except buffer
//! capacity, which only grows.

use prismals_core::{CoreError, Level, PrototypeRegistry};
use tracing::{debug, trace};

use crate::error::RenderResult;
use crate::pipeline::RenderStats;

use super::backend::{DrawCall, DrawKind, InstanceBackend};
use super::behavior::{RenderBehavior, Visibility};
use super::buffer::{BehaviorBuckets, BufferSlot};
use super::CUBE_VERTEX_COUNT;

/// Sorts instances into behavior buckets and submits one draw per bucket.
#[derive(Debug, Default)]
pub struct InstanceBatcher {
    buckets: BehaviorBuckets,
    /// Bytes the backend currently holds for each slot.
    capacities: [u64; BufferSlot::COUNT],
    /// Visibility per prototype id of the registry passed to the last collect.
    visibility: Vec<Visibility>,
    stats: RenderStats,
}

impl InstanceBatcher {
    /// Creates an empty batcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds all buckets from every world of `level`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownPrototype`] if any instance references an
    /// unregistered prototype. The buckets are left empty in that case.
    pub fn collect(&mut self, level: &Level, registry: &PrototypeRegistry) -> RenderResult<()> {
        self.visibility.clear();
        self.visibility.extend(registry.iter().map(Visibility::of));

        self.buckets.clear();
        for instance in level.instances() {
            let Some(vis) = self.visibility.get(instance.prototype.index()) else {
                self.buckets.clear();
                return Err(CoreError::UnknownPrototype {
                    id: instance.prototype,
                    len: registry.len(),
                }
                .into());
            };
            match *vis {
                Visibility::Block(behavior) => self.buckets.push_block(behavior, instance),
                Visibility::Star => self.buckets.push_star(instance),
                Visibility::Hidden => {}
            }
        }

        trace!(
            blocks = self.buckets.block_count(),
            stars = self.buckets.len(BufferSlot::Stars),
            "buckets collected"
        );
        Ok(())
    }

    /// Uploads and draws every non-empty bucket, then the star list.
    ///
    /// A slot's buffer is grown to the exact bucket size whenever the bucket
    /// outgrows it.
    ///
    /// # Errors
    ///
    /// Propagates backend failures; later buckets are not submitted.
    pub fn submit<B: InstanceBackend + ?Sized>(&mut self, backend: &mut B) -> RenderResult<RenderStats> {
        let mut stats = RenderStats::default();

        for behavior in RenderBehavior::ALL {
            let slot = BufferSlot::Behavior(behavior);
            let count = self.buckets.len(slot);
            stats.bucket_sizes[behavior.index()] = count as u32;
            if count == 0 {
                continue;
            }
            self.submit_slot(backend, slot, DrawKind::Cubes, &mut stats)?;
            stats.instances += count as u32;
        }

        let stars = self.buckets.len(BufferSlot::Stars);
        if stars > 0 {
            self.submit_slot(backend, BufferSlot::Stars, DrawKind::Points, &mut stats)?;
            stats.stars = stars as u32;
        }

        debug!(
            draw_calls = stats.draw_calls,
            instances = stats.instances,
            stars = stats.stars,
            reallocations = stats.reallocations,
            "frame submitted"
        );
        self.stats = stats;
        Ok(stats)
    }

    fn submit_slot<B: InstanceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        slot: BufferSlot,
        kind: DrawKind,
        stats: &mut RenderStats,
    ) -> RenderResult<()> {
        let bytes = self.buckets.as_bytes(slot);
        let needed = bytes.len() as u64;
        let capacity = &mut self.capacities[slot.index()];
        if needed > *capacity {
            backend.ensure_capacity(slot, needed)?;
            debug!(%slot, from = *capacity, to = needed, "instance buffer grown");
            *capacity = needed;
            stats.reallocations += 1;
        }
        backend.upload(slot, bytes)?;

        let count = self.buckets.len(slot) as u32;
        let call = match kind {
            DrawKind::Cubes => DrawCall {
                slot,
                kind,
                vertex_count: CUBE_VERTEX_COUNT,
                instance_count: count,
            },
            DrawKind::Points => DrawCall {
                slot,
                kind,
                vertex_count: count,
                instance_count: 1,
            },
        };
        backend.draw(call)?;
        stats.draw_calls += 1;
        Ok(())
    }

    /// Staged records from the last `collect`.
    #[must_use]
    pub fn buckets(&self) -> &BehaviorBuckets {
        &self.buckets
    }

    /// Instances in one behavior bucket.
    #[must_use]
    pub fn bucket_len(&self, behavior: RenderBehavior) -> usize {
        self.buckets.len(BufferSlot::Behavior(behavior))
    }

    /// Stars staged by the last `collect`.
    #[must_use]
    pub fn star_count(&self) -> usize {
        self.buckets.len(BufferSlot::Stars)
    }

    /// Capacity in bytes last requested for a slot.
    #[must_use]
    pub fn capacity(&self, slot: BufferSlot) -> u64 {
        self.capacities[slot.index()]
    }

    /// Statistics of the last `submit`.
    #[must_use]
    pub const fn stats(&self) -> RenderStats {
        self.stats
    }
}
