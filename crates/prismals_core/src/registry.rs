//! # Prototype Registry
//!
//! Append-only table of prototypes.
//!
//! - A prototype's id is the position it was appended at
//! - Names are indexed once at registration; lookups are O(1)
//! - Payloads live beside the prototypes so consuming one never touches a
//!   prototype definition

use std::collections::HashMap;

use crate::entity::{InstanceTemplate, Prototype, PrototypeId};
use crate::error::{CoreError, CoreResult};

/// The prototype table shared (read-only) by every system.
#[derive(Debug, Default)]
pub struct PrototypeRegistry {
    prototypes: Vec<Prototype>,
    payloads: Vec<Vec<InstanceTemplate>>,
    by_name: HashMap<String, PrototypeId>,
}

impl PrototypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a prototype and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicatePrototypeName`] if the name is taken.
    pub fn register(&mut self, prototype: Prototype) -> CoreResult<PrototypeId> {
        self.register_with_payload(prototype, Vec::new())
    }

    /// Appends a prototype together with its spawn payload.
    ///
    /// Payload entries may reference prototypes registered later; they are
    /// validated when the payload is expanded.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicatePrototypeName`] if the name is taken.
    pub fn register_with_payload(
        &mut self,
        mut prototype: Prototype,
        payload: Vec<InstanceTemplate>,
    ) -> CoreResult<PrototypeId> {
        if self.by_name.contains_key(&prototype.name) {
            return Err(CoreError::DuplicatePrototypeName(prototype.name));
        }

        let id = PrototypeId(self.prototypes.len() as u32);
        prototype.id = id;
        self.by_name.insert(prototype.name.clone(), id);
        self.prototypes.push(prototype);
        self.payloads.push(payload);
        Ok(id)
    }

    /// Looks up a prototype by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownPrototype`] for ids that were never issued.
    #[inline]
    pub fn get(&self, id: PrototypeId) -> CoreResult<&Prototype> {
        self.prototypes.get(id.index()).ok_or(CoreError::UnknownPrototype {
            id,
            len: self.prototypes.len(),
        })
    }

    /// Checks that an id refers to a registered prototype.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownPrototype`] for ids that were never issued.
    #[inline]
    pub fn validate(&self, id: PrototypeId) -> CoreResult<()> {
        self.get(id).map(|_| ())
    }

    /// Finds a prototype id by name.
    #[inline]
    #[must_use]
    pub fn find(&self, name: &str) -> Option<PrototypeId> {
        self.by_name.get(name).copied()
    }

    /// Finds a prototype id by name, failing if absent.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownPrototypeName`] if no prototype has that name.
    pub fn require(&self, name: &str) -> CoreResult<PrototypeId> {
        self.find(name)
            .ok_or_else(|| CoreError::UnknownPrototypeName(name.to_string()))
    }

    /// The current payload of a prototype (empty once consumed).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownPrototype`] for unknown ids.
    pub fn payload(&self, id: PrototypeId) -> CoreResult<&[InstanceTemplate]> {
        self.validate(id)?;
        Ok(&self.payloads[id.index()])
    }

    /// Removes and returns a prototype's payload, leaving it empty.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownPrototype`] for unknown ids.
    pub fn take_payload(&mut self, id: PrototypeId) -> CoreResult<Vec<InstanceTemplate>> {
        self.validate(id)?;
        Ok(std::mem::take(&mut self.payloads[id.index()]))
    }

    /// Replaces a prototype's payload.
    ///
    /// Used by the scene loader once every name is registered, so payloads
    /// can reference prototypes declared later in load order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownPrototype`] for unknown ids.
    pub fn set_payload(&mut self, id: PrototypeId, payload: Vec<InstanceTemplate>) -> CoreResult<()> {
        self.validate(id)?;
        self.payloads[id.index()] = payload;
        Ok(())
    }

    /// Number of registered prototypes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    /// Returns true if nothing is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    /// Iterates prototypes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Prototype> {
        self.prototypes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AudicleKind, DEBUG_COLOR};
    use crate::math::Vec3;

    #[test]
    fn test_ids_follow_append_order() {
        let mut registry = PrototypeRegistry::new();
        let a = registry.register(Prototype::block("Block")).unwrap();
        let b = registry.register(Prototype::new("World").with_world()).unwrap();

        assert_eq!(a, PrototypeId(0));
        assert_eq!(b, PrototypeId(1));
        assert_eq!(registry.get(b).unwrap().id(), b);
        assert_eq!(registry.find("Block"), Some(a));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = PrototypeRegistry::new();
        registry.register(Prototype::block("Block")).unwrap();
        let err = registry.register(Prototype::block("Block")).unwrap_err();
        assert_eq!(err, CoreError::DuplicatePrototypeName("Block".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_id_is_error() {
        let registry = PrototypeRegistry::new();
        assert!(matches!(
            registry.get(PrototypeId(9)),
            Err(CoreError::UnknownPrototype { len: 0, .. })
        ));
        assert!(registry.require("Nope").is_err());
    }

    #[test]
    fn test_take_payload_empties_it() {
        let mut registry = PrototypeRegistry::new();
        let block = registry.register(Prototype::block("Block")).unwrap();
        let spawner = registry
            .register_with_payload(
                Prototype::audicle("Spawner", AudicleKind::OneShot),
                vec![InstanceTemplate::new(block, Vec3::ZERO, DEBUG_COLOR)],
            )
            .unwrap();

        assert_eq!(registry.payload(spawner).unwrap().len(), 1);
        assert_eq!(registry.take_payload(spawner).unwrap().len(), 1);
        assert!(registry.payload(spawner).unwrap().is_empty());
        // The definition itself is untouched.
        assert_eq!(registry.get(spawner).unwrap().audicle, AudicleKind::OneShot);
    }
}
