//! Rendering statistics.

use crate::instancing::RenderBehavior;

/// Statistics from one submitted frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Number of draw calls.
    pub draw_calls: u32,
    /// Block instances drawn.
    pub instances: u32,
    /// Stars drawn.
    pub stars: u32,
    /// Instances per behavior, indexed by [`RenderBehavior::index`].
    pub bucket_sizes: [u32; RenderBehavior::COUNT],
    /// Buffers grown this frame.
    pub reallocations: u32,
}

impl RenderStats {
    /// Returns true if anything was drawn.
    #[must_use]
    pub const fn has_content(&self) -> bool {
        self.draw_calls > 0
    }

    /// Size of one behavior bucket.
    #[must_use]
    pub const fn bucket(&self, behavior: RenderBehavior) -> u32 {
        self.bucket_sizes[behavior.index()]
    }

    /// Draw calls can never exceed one per bucket plus one for stars.
    #[must_use]
    pub const fn draw_calls_ok(&self) -> bool {
        self.draw_calls as usize <= RenderBehavior::COUNT + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let stats = RenderStats::default();
        assert!(!stats.has_content());
        assert!(stats.draw_calls_ok());
        assert_eq!(stats.bucket(RenderBehavior::StaticBranch), 0);
    }
}
