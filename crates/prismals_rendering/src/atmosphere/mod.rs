//! Sky and celestial lighting.
//!
//! The sky gradient and the sun/moon are both functions of the day
//! fraction only, so the host can scrub time freely.

mod celestial;
mod sky;

pub use celestial::{
    day_fraction, CelestialBody, CelestialState, BILLBOARD_DISTANCE, SECONDS_PER_DAY,
    VISIBILITY_THRESHOLD,
};
pub use sky::{SkyColors, SkyGradient, SkyKey};
