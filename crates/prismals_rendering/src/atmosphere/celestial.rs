//! Sun and moon placement.
//!
//! The sun is up from 06:00 to 18:00 and the moon for the other twelve
//! hours. Each body travels a half circle in the Y/Z plane: it rises at -Z,
//! peaks overhead, and sets at +Z.

use std::f32::consts::PI;

use prismals_core::Vec3;

/// Seconds in a day.
pub const SECONDS_PER_DAY: f32 = 86_400.0;

/// Distance from the viewer at which billboards are placed.
pub const BILLBOARD_DISTANCE: f32 = 500.0;

/// Bodies dimmer than this are not drawn.
pub const VISIBILITY_THRESHOLD: f32 = 0.01;

/// Fraction of the day in `[0, 1)` for a wall-clock time.
///
/// `seconds_since_midnight` wraps, so any non-negative clock works.
#[must_use]
pub fn day_fraction(seconds_since_midnight: f32) -> f32 {
    seconds_since_midnight.rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_DAY
}

/// One celestial body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CelestialBody {
    /// Unit direction from the viewer.
    pub direction: Vec3,
    /// `sin(uπ)` along the arc; zero when below the horizon.
    pub brightness: f32,
    /// Billboard size.
    pub scale: f32,
    /// Billboard color.
    pub color: Vec3,
}

impl CelestialBody {
    const SUN_SCALE: f32 = 50.0;
    const MOON_SCALE: f32 = 40.0;

    fn sun() -> Self {
        Self {
            direction: Vec3::ZERO,
            brightness: 0.0,
            scale: Self::SUN_SCALE,
            color: Vec3::new(1.0, 1.0, 0.8),
        }
    }

    fn moon() -> Self {
        Self {
            direction: Vec3::ZERO,
            brightness: 0.0,
            scale: Self::MOON_SCALE,
            color: Vec3::new(0.9, 0.9, 1.0),
        }
    }

    /// Places the body at arc parameter `u` in `[0, 1)`.
    fn place(&mut self, u: f32) {
        let angle = u * PI;
        self.direction = Vec3::new(0.0, angle.sin(), -angle.cos()).normalize();
        self.brightness = angle.sin();
    }

    /// Whether the billboard should be drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.brightness > VISIBILITY_THRESHOLD
    }

    /// Billboard center for a viewer at `viewer`.
    #[must_use]
    pub fn billboard_position(&self, viewer: Vec3) -> Vec3 {
        viewer + self.direction * BILLBOARD_DISTANCE
    }
}

/// Sun, moon and the resulting key-light direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CelestialState {
    /// The sun.
    pub sun: CelestialBody,
    /// The moon.
    pub moon: CelestialBody,
    /// Direction towards the key light.
    pub light_dir: Vec3,
}

impl CelestialState {
    /// Computes positions for a day fraction in `[0, 1)`.
    #[must_use]
    pub fn from_day_fraction(t: f32) -> Self {
        let hour = t * 24.0;
        let mut sun = CelestialBody::sun();
        let mut moon = CelestialBody::moon();

        if (6.0..18.0).contains(&hour) {
            sun.place((hour - 6.0) / 12.0);
        } else {
            let adjusted = if hour < 6.0 { hour + 24.0 } else { hour };
            moon.place((adjusted - 18.0) / 12.0);
        }

        // At exactly 06:00 the sun sits on the horizon and the moon is unplaced.
        let light_dir = if sun.brightness > 0.0 || moon.direction == Vec3::ZERO {
            sun.direction
        } else {
            moon.direction
        };

        Self {
            sun,
            moon,
            light_dir,
        }
    }

    /// Bodies bright enough to draw.
    pub fn visible_bodies(&self) -> impl Iterator<Item = &CelestialBody> {
        [&self.sun, &self.moon].into_iter().filter(|b| b.is_visible())
    }
}

impl Default for CelestialState {
    /// Noon.
    fn default() -> Self {
        Self::from_day_fraction(0.5)
    }
}
