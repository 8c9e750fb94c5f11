//! Entity prototypes - the immutable templates every instance points at.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable identifier of a prototype.
///
/// Equal to the position at which the prototype was appended to the
/// registry. Instances reference prototypes only through this id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct PrototypeId(pub u32);

impl PrototypeId {
    /// Returns the id as a registry index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PrototypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The event role of a prototype.
///
/// Scene files spell these `"false"`, `"true"` and `"gated"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudicleKind {
    /// Not an audicle - a plain visual or container entity.
    #[default]
    #[serde(rename = "false")]
    None,
    /// Processed once: its payload is spawned, then the trigger retires.
    #[serde(rename = "true")]
    OneShot,
    /// A momentary event (e.g. a held key), retired every tick unconditionally.
    #[serde(rename = "gated")]
    Gated,
}

impl AudicleKind {
    /// Returns true for both audicle flavors.
    #[inline]
    #[must_use]
    pub const fn is_audicle(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl FromStr for AudicleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "false" => Ok(Self::None),
            "true" => Ok(Self::OneShot),
            "gated" => Ok(Self::Gated),
            other => Err(format!("unknown audicle kind '{other}'")),
        }
    }
}

/// A template describing one kind of world object.
#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Prototype {
    /// Assigned by the registry at registration time.
    pub(crate) id: PrototypeId,
    /// Human-readable identifier, unique within a registry.
    pub name: String,
    /// Drawn by the renderer (together with `is_block` or `is_star`).
    pub is_renderable: bool,
    /// Participates in collision.
    pub is_solid: bool,
    /// A cube-shaped block drawn through the behavior buckets.
    pub is_block: bool,
    /// Drawn with a wireframe overlay.
    pub has_wireframe: bool,
    /// Animated in the vertex shader.
    pub is_animated: bool,
    /// A world container.
    pub is_world: bool,
    /// Part of the star point cloud.
    pub is_star: bool,
    /// Blocks sound in the occlusion tracer.
    pub is_occluder: bool,
    /// Activates the tesseract visualization when present in the active world.
    pub is_tesseract: bool,
    /// Event role.
    pub audicle: AudicleKind,
    /// Sound attenuation per unit travelled through this block.
    pub damping_factor: f32,
}

impl Prototype {
    /// Default attenuation for blocks that don't specify one.
    pub const DEFAULT_DAMPING: f32 = 0.10;

    /// Creates a prototype with every flag cleared.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PrototypeId::default(),
            name: name.into(),
            is_renderable: false,
            is_solid: false,
            is_block: false,
            has_wireframe: false,
            is_animated: false,
            is_world: false,
            is_star: false,
            is_occluder: false,
            is_tesseract: false,
            audicle: AudicleKind::None,
            damping_factor: Self::DEFAULT_DAMPING,
        }
    }

    /// A renderable, solid block.
    #[must_use]
    pub fn block(name: impl Into<String>) -> Self {
        Self {
            is_block: true,
            is_renderable: true,
            is_solid: true,
            ..Self::new(name)
        }
    }

    /// An audicle of the given kind.
    #[must_use]
    pub fn audicle(name: impl Into<String>, kind: AudicleKind) -> Self {
        Self {
            audicle: kind,
            ..Self::new(name)
        }
    }

    /// Returns the registry-assigned id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> PrototypeId {
        self.id
    }

    /// Sets the wireframe flag.
    #[must_use]
    pub fn with_wireframe(mut self, on: bool) -> Self {
        self.has_wireframe = on;
        self
    }

    /// Sets the animated flag.
    #[must_use]
    pub fn with_animated(mut self, on: bool) -> Self {
        self.is_animated = on;
        self
    }

    /// Sets the star flag (stars are renderable).
    #[must_use]
    pub fn with_star(mut self) -> Self {
        self.is_star = true;
        self.is_renderable = true;
        self
    }

    /// Sets the world flag.
    #[must_use]
    pub fn with_world(mut self) -> Self {
        self.is_world = true;
        self
    }

    /// Marks the block as a sound occluder with the given damping.
    #[must_use]
    pub fn with_occluder(mut self, damping: f32) -> Self {
        self.is_occluder = true;
        self.damping_factor = damping;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audicle_kind_parse() {
        assert_eq!("false".parse::<AudicleKind>(), Ok(AudicleKind::None));
        assert_eq!("true".parse::<AudicleKind>(), Ok(AudicleKind::OneShot));
        assert_eq!("gated".parse::<AudicleKind>(), Ok(AudicleKind::Gated));
        assert!("sometimes".parse::<AudicleKind>().is_err());
    }

    #[test]
    fn test_block_implies_renderable_and_solid() {
        let proto = Prototype::block("Stone");
        assert!(proto.is_block && proto.is_renderable && proto.is_solid);
        assert!(!proto.audicle.is_audicle());
        assert!((proto.damping_factor - Prototype::DEFAULT_DAMPING).abs() < f32::EPSILON);
    }
}
