//! CPU-side staging for instance records.
//!
//! Buckets keep their allocations between frames; only the lengths reset.

use std::fmt;

use prismals_core::EntityInstance;

use super::behavior::RenderBehavior;
use super::instance_data::{BranchInstanceRecord, InstanceRecord, StarRecord};

/// A GPU buffer owned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BufferSlot {
    /// Instance buffer of one behavior bucket.
    Behavior(RenderBehavior),
    /// Star point list.
    Stars,
}

impl BufferSlot {
    /// Number of distinct slots.
    pub const COUNT: usize = RenderBehavior::COUNT + 1;

    /// Dense index in `0..COUNT`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Behavior(b) => b.index(),
            Self::Stars => RenderBehavior::COUNT,
        }
    }
}

impl fmt::Display for BufferSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Behavior(b) => write!(f, "bucket {b}"),
            Self::Stars => f.write_str("stars"),
        }
    }
}

/// Staging storage for one frame's worth of records.
#[derive(Debug, Default)]
pub struct BehaviorBuckets {
    /// Indexed by [`RenderBehavior::index`]; the branch entry stays empty.
    plain: [Vec<InstanceRecord>; RenderBehavior::COUNT],
    branches: Vec<BranchInstanceRecord>,
    stars: Vec<StarRecord>,
}

impl BehaviorBuckets {
    /// Creates empty buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties every bucket, keeping allocations.
    pub fn clear(&mut self) {
        for bucket in &mut self.plain {
            bucket.clear();
        }
        self.branches.clear();
        self.stars.clear();
    }

    /// Appends a block instance to its bucket.
    #[inline]
    pub fn push_block(&mut self, behavior: RenderBehavior, instance: &EntityInstance) {
        if behavior.has_rotation() {
            self.branches.push(BranchInstanceRecord::from(instance));
        } else {
            self.plain[behavior.index()].push(InstanceRecord::from(instance));
        }
    }

    /// Appends a star.
    #[inline]
    pub fn push_star(&mut self, instance: &EntityInstance) {
        self.stars.push(StarRecord {
            position: instance.position.to_array(),
        });
    }

    /// Instances in a slot.
    #[must_use]
    pub fn len(&self, slot: BufferSlot) -> usize {
        match slot {
            BufferSlot::Behavior(b) if b.has_rotation() => self.branches.len(),
            BufferSlot::Behavior(b) => self.plain[b.index()].len(),
            BufferSlot::Stars => self.stars.len(),
        }
    }

    /// Total block instances across all behaviors.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.plain.iter().map(Vec::len).sum::<usize>() + self.branches.len()
    }

    /// Returns true if nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.block_count() == 0 && self.stars.is_empty()
    }

    /// Packed bytes of a slot for GPU upload.
    #[must_use]
    pub fn as_bytes(&self, slot: BufferSlot) -> &[u8] {
        match slot {
            BufferSlot::Behavior(b) if b.has_rotation() => bytemuck::cast_slice(&self.branches),
            BufferSlot::Behavior(b) => bytemuck::cast_slice(&self.plain[b.index()]),
            BufferSlot::Stars => bytemuck::cast_slice(&self.stars),
        }
    }

    /// Records of a non-rotated bucket.
    #[must_use]
    pub fn records(&self, behavior: RenderBehavior) -> &[InstanceRecord] {
        &self.plain[behavior.index()]
    }

    /// Branch records.
    #[must_use]
    pub fn branch_records(&self) -> &[BranchInstanceRecord] {
        &self.branches
    }

    /// Star records.
    #[must_use]
    pub fn star_records(&self) -> &[StarRecord] {
        &self.stars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prismals_core::{InstanceFactory, PrototypeId, Vec3};

    #[test]
    fn test_branch_goes_to_rotated_storage() {
        let mut factory = InstanceFactory::new();
        let mut inst = factory.create(PrototypeId(0), Vec3::new(1.0, 2.0, 3.0), Vec3::splat(0.5));
        inst.rotation = 0.75;

        let mut buckets = BehaviorBuckets::new();
        buckets.push_block(RenderBehavior::StaticBranch, &inst);
        buckets.push_block(RenderBehavior::StaticDefault, &inst);

        assert_eq!(buckets.branch_records()[0].rotation, 0.75);
        assert_eq!(buckets.len(BufferSlot::Behavior(RenderBehavior::StaticBranch)), 1);
        assert_eq!(
            buckets.as_bytes(BufferSlot::Behavior(RenderBehavior::StaticBranch)).len(),
            BranchInstanceRecord::SIZE
        );
        assert_eq!(buckets.records(RenderBehavior::StaticDefault)[0].position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut factory = InstanceFactory::new();
        let inst = factory.create(PrototypeId(0), Vec3::ZERO, Vec3::ZERO);

        let mut buckets = BehaviorBuckets::new();
        for _ in 0..100 {
            buckets.push_star(&inst);
        }
        buckets.clear();
        assert!(buckets.is_empty());
        assert!(buckets.stars.capacity() >= 100);
    }

    #[test]
    fn test_slot_indices_dense() {
        let mut seen = [false; BufferSlot::COUNT];
        for b in RenderBehavior::ALL {
            seen[BufferSlot::Behavior(b).index()] = true;
        }
        seen[BufferSlot::Stars.index()] = true;
        assert!(seen.iter().all(|s| *s));
    }
}
