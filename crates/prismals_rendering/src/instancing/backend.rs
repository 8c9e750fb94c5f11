//! The GPU seam.
//!
//! The batcher needs exactly three things from a graphics API. Anything that
//! can grow a buffer, copy bytes into it, and issue an instanced draw can
//! render PRISMALS.

use std::collections::HashMap;

use crate::error::{RenderError, RenderResult};

use super::buffer::BufferSlot;

/// Primitive topology of a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawKind {
    /// Instanced unit cubes (triangle list).
    Cubes,
    /// Non-instanced point list.
    Points,
}

/// One draw request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCall {
    /// Buffer holding the records.
    pub slot: BufferSlot,
    /// Topology.
    pub kind: DrawKind,
    /// Vertices per instance.
    pub vertex_count: u32,
    /// Number of instances.
    pub instance_count: u32,
}

/// Graphics operations used by [`crate::InstanceBatcher::submit`].
pub trait InstanceBackend {
    /// Grows the buffer for `slot` to hold at least `bytes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocation fails.
    fn ensure_capacity(&mut self, slot: BufferSlot, bytes: u64) -> RenderResult<()>;

    /// Copies `data` to the start of the buffer for `slot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot has no buffer large enough.
    fn upload(&mut self, slot: BufferSlot, data: &[u8]) -> RenderResult<()>;

    /// Issues a draw.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot has no buffer.
    fn draw(&mut self, call: DrawCall) -> RenderResult<()>;
}

/// A backend operation as seen by [`RecordingBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendCall {
    /// Buffer growth.
    EnsureCapacity {
        /// Target slot.
        slot: BufferSlot,
        /// Requested size.
        bytes: u64,
    },
    /// Byte upload.
    Upload {
        /// Target slot.
        slot: BufferSlot,
        /// Bytes copied.
        bytes: usize,
    },
    /// Draw.
    Draw(DrawCall),
}

/// In-memory backend for headless runs and tests.
///
/// Tracks buffer sizes so misuse (uploading past capacity, drawing from a
/// missing buffer) fails the same way a GPU backend would.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    capacities: HashMap<BufferSlot, u64>,
}

impl RecordingBackend {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call since the last [`Self::clear`].
    #[must_use]
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Draw calls only.
    pub fn draws(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter_map(|c| match c {
            BackendCall::Draw(d) => Some(d),
            _ => None,
        })
    }

    /// Number of buffer growths recorded.
    #[must_use]
    pub fn reallocation_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::EnsureCapacity { .. }))
            .count()
    }

    /// Current capacity of a slot.
    #[must_use]
    pub fn capacity(&self, slot: BufferSlot) -> u64 {
        self.capacities.get(&slot).copied().unwrap_or(0)
    }

    /// Forgets recorded calls; buffers are kept.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl InstanceBackend for RecordingBackend {
    fn ensure_capacity(&mut self, slot: BufferSlot, bytes: u64) -> RenderResult<()> {
        let cap = self.capacities.entry(slot).or_insert(0);
        *cap = (*cap).max(bytes);
        self.calls.push(BackendCall::EnsureCapacity { slot, bytes });
        Ok(())
    }

    fn upload(&mut self, slot: BufferSlot, data: &[u8]) -> RenderResult<()> {
        if data.len() as u64 > self.capacity(slot) {
            return Err(RenderError::Backend {
                slot: slot.to_string(),
                reason: format!("upload of {} bytes exceeds capacity {}", data.len(), self.capacity(slot)),
            });
        }
        self.calls.push(BackendCall::Upload {
            slot,
            bytes: data.len(),
        });
        Ok(())
    }

    fn draw(&mut self, call: DrawCall) -> RenderResult<()> {
        if !self.capacities.contains_key(&call.slot) {
            return Err(RenderError::MissingBuffer(call.slot.to_string()));
        }
        self.calls.push(BackendCall::Draw(call));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instancing::RenderBehavior;

    const SLOT: BufferSlot = BufferSlot::Behavior(RenderBehavior::StaticDefault);

    #[test]
    fn test_upload_past_capacity_fails() {
        let mut backend = RecordingBackend::new();
        backend.ensure_capacity(SLOT, 8).unwrap();
        assert!(backend.upload(SLOT, &[0u8; 8]).is_ok());
        assert!(backend.upload(SLOT, &[0u8; 9]).is_err());
    }

    #[test]
    fn test_draw_without_buffer_fails() {
        let mut backend = RecordingBackend::new();
        let err = backend
            .draw(DrawCall {
                slot: BufferSlot::Stars,
                kind: DrawKind::Points,
                vertex_count: 3,
                instance_count: 1,
            })
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingBuffer(_)));
    }

    #[test]
    fn test_capacity_never_shrinks() {
        let mut backend = RecordingBackend::new();
        backend.ensure_capacity(SLOT, 64).unwrap();
        backend.ensure_capacity(SLOT, 16).unwrap();
        assert_eq!(backend.capacity(SLOT), 64);
        assert_eq!(backend.reallocation_count(), 2);
    }
}
