//! Render-behavior classification.
//!
//! Every visible block lands in exactly one of five buckets; the bucket
//! decides the shader path (animation, wireframe, per-instance rotation).

use std::fmt;

use prismals_core::Prototype;

/// The closed set of block render behaviors.
///
/// The discriminant is the shader's behavior index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum RenderBehavior {
    /// Plain lit cube.
    StaticDefault = 0,
    /// Vertex-animated water surface.
    AnimatedWater = 1,
    /// Animated cube with a wireframe overlay.
    AnimatedWireframe = 2,
    /// Y-rotated branch block; the only bucket carrying a rotation.
    StaticBranch = 3,
    /// Animated translucent wave.
    AnimatedTransparentWave = 4,
}

impl RenderBehavior {
    /// Number of behaviors.
    pub const COUNT: usize = 5;

    /// All behaviors in shader-index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::StaticDefault,
        Self::AnimatedWater,
        Self::AnimatedWireframe,
        Self::StaticBranch,
        Self::AnimatedTransparentWave,
    ];

    /// Shader behavior index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Classifies a block prototype. First match wins:
    ///
    /// 1. name `"Branch"` → [`Self::StaticBranch`]
    /// 2. name `"Water"` → [`Self::AnimatedWater`]
    /// 3. name `"TransparentWave"` → [`Self::AnimatedTransparentWave`]
    /// 4. wireframe and animated → [`Self::AnimatedWireframe`]
    /// 5. otherwise → [`Self::StaticDefault`]
    #[must_use]
    pub fn classify(prototype: &Prototype) -> Self {
        match prototype.name.as_str() {
            "Branch" => Self::StaticBranch,
            "Water" => Self::AnimatedWater,
            "TransparentWave" => Self::AnimatedTransparentWave,
            _ if prototype.has_wireframe && prototype.is_animated => Self::AnimatedWireframe,
            _ => Self::StaticDefault,
        }
    }

    /// True for the bucket with per-instance rotation.
    #[inline]
    #[must_use]
    pub const fn has_rotation(self) -> bool {
        matches!(self, Self::StaticBranch)
    }
}

impl fmt::Display for RenderBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How (or whether) an instance's prototype is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// Renderable block in a behavior bucket.
    Block(RenderBehavior),
    /// Point in the star cloud.
    Star,
    /// Worlds, audicles and anything else without a visual.
    Hidden,
}

impl Visibility {
    /// Visibility of instances of `prototype`.
    ///
    /// A renderable block takes precedence over the star flag, so no
    /// instance is ever counted twice.
    #[must_use]
    pub fn of(prototype: &Prototype) -> Self {
        if prototype.is_renderable && prototype.is_block {
            Self::Block(RenderBehavior::classify(prototype))
        } else if prototype.is_star {
            Self::Star
        } else {
            Self::Hidden
        }
    }
}
