//! Day/night sky gradient.
//!
//! The skybox is a vertical blend between a zenith and a horizon color.
//! Both colors are piecewise-linear in the day fraction, defined by a sorted
//! list of keyframes.

use prismals_core::{SkyKeyframe, Vec3};

/// A sky keyframe: day fraction plus zenith and horizon colors.
pub type SkyKey = SkyKeyframe;

/// Zenith and horizon colors for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyColors {
    /// Zenith color.
    pub top: Vec3,
    /// Horizon color.
    pub bottom: Vec3,
}

impl Default for SkyColors {
    /// Midnight blue over black.
    fn default() -> Self {
        Self {
            top: Vec3::new(16.0 / 255.0, 16.0 / 255.0, 48.0 / 255.0),
            bottom: Vec3::ZERO,
        }
    }
}

/// Piecewise-linear sky over the day.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkyGradient {
    keys: Vec<SkyKey>,
}

impl SkyGradient {
    /// Creates a gradient from keys sorted by ascending time.
    #[must_use]
    pub fn new(keys: Vec<SkyKey>) -> Self {
        debug_assert!(keys.windows(2).all(|w| w[0].time <= w[1].time));
        Self { keys }
    }

    /// Night, dawn, noon, dusk, night.
    #[must_use]
    pub fn standard() -> Self {
        fn rgb(r: f32, g: f32, b: f32) -> Vec3 {
            Vec3::new(r / 255.0, g / 255.0, b / 255.0)
        }
        let night = SkyKey {
            time: 0.0,
            top: rgb(16.0, 16.0, 48.0),
            bottom: Vec3::ZERO,
        };
        Self::new(vec![
            night,
            SkyKey {
                time: 0.25,
                top: Vec3::new(0.0, 0.0, 1.0),
                bottom: rgb(128.0, 128.0, 255.0),
            },
            SkyKey {
                time: 0.5,
                top: rgb(135.0, 206.0, 235.0),
                bottom: Vec3::splat(1.0),
            },
            SkyKey {
                time: 0.75,
                top: rgb(0.0, 128.0, 128.0),
                bottom: rgb(255.0, 71.0, 0.0),
            },
            SkyKey { time: 1.0, ..night },
        ])
    }

    /// Keyframes in time order.
    #[must_use]
    pub fn keys(&self) -> &[SkyKey] {
        &self.keys
    }

    /// Colors at day fraction `t`.
    ///
    /// Uses the first segment `[k[i], k[i+1]]` containing `t`. Before the
    /// first key the first segment is used, past the last key the final
    /// one, and the blend factor is clamped so out-of-range times hold the
    /// end colors. Returns `None` with fewer than two keys or a non-finite
    /// `t`.
    #[must_use]
    pub fn sample(&self, t: f32) -> Option<SkyColors> {
        let n = self.keys.len();
        if n < 2 || !t.is_finite() {
            return None;
        }

        let i = if t < self.keys[0].time {
            0
        } else {
            self.keys
                .windows(2)
                .position(|w| w[0].time <= t && t <= w[1].time)
                .unwrap_or(n - 2)
        };
        let (a, b) = (&self.keys[i], &self.keys[i + 1]);

        let span = b.time - a.time;
        let u = if span > 0.0 {
            ((t - a.time) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Some(SkyColors {
            top: a.top.lerp(b.top, u),
            bottom: a.bottom.lerp(b.bottom, u),
        })
    }

    /// Writes the colors at `t` into `out`; leaves it unchanged when
    /// [`Self::sample`] yields nothing.
    pub fn apply(&self, t: f32, out: &mut SkyColors) {
        if let Some(colors) = self.sample(t) {
            *out = colors;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(time: f32, top: f32, bottom: f32) -> SkyKey {
        SkyKey {
            time,
            top: Vec3::splat(top),
            bottom: Vec3::splat(bottom),
        }
    }

    #[test]
    fn test_exact_at_keyframes() {
        let sky = SkyGradient::standard();
        for k in sky.keys() {
            let c = sky.sample(k.time).unwrap();
            assert_eq!(c.top, k.top, "top at {}", k.time);
            assert_eq!(c.bottom, k.bottom, "bottom at {}", k.time);
        }
    }

    #[test]
    fn test_midpoint_blend() {
        let sky = SkyGradient::new(vec![key(0.0, 0.0, 1.0), key(1.0, 1.0, 0.0)]);
        let c = sky.sample(0.25).unwrap();
        assert!((c.top.x - 0.25).abs() < 1e-6);
        assert!((c.bottom.x - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_holds_end_colors() {
        let sky = SkyGradient::new(vec![key(0.2, 0.2, 0.0), key(0.4, 0.4, 0.0), key(0.8, 0.8, 0.0)]);
        assert_eq!(sky.sample(0.0).unwrap().top, Vec3::splat(0.2));
        assert_eq!(sky.sample(1.0).unwrap().top, Vec3::splat(0.8));
    }

    #[test]
    fn test_too_few_keys_leaves_colors() {
        let mut colors = SkyColors {
            top: Vec3::splat(0.3),
            bottom: Vec3::splat(0.6),
        };
        let before = colors;

        SkyGradient::default().apply(0.5, &mut colors);
        assert_eq!(colors, before);

        SkyGradient::new(vec![key(0.5, 1.0, 1.0)]).apply(0.5, &mut colors);
        assert_eq!(colors, before);
    }

    #[test]
    fn test_non_finite_time_leaves_colors() {
        let sky = SkyGradient::standard();
        assert!(sky.sample(f32::NAN).is_none());
        assert!(sky.sample(f32::INFINITY).is_none());

        let mut colors = SkyColors {
            top: Vec3::splat(0.3),
            bottom: Vec3::splat(0.6),
        };
        let before = colors;
        sky.apply(f32::NAN, &mut colors);
        assert_eq!(colors, before);
    }

    #[test]
    fn test_zero_length_segment() {
        let sky = SkyGradient::new(vec![key(0.0, 0.0, 0.0), key(0.5, 0.5, 0.0), key(0.5, 0.9, 0.0), key(1.0, 1.0, 0.0)]);
        // The first containing segment wins.
        assert_eq!(sky.sample(0.5).unwrap().top, Vec3::splat(0.5));
        assert!(sky.sample(0.75).unwrap().top.x > 0.9);
    }

    #[test]
    fn test_standard_noon_and_midnight() {
        let sky = SkyGradient::standard();
        assert_eq!(sky.sample(0.5).unwrap().bottom, Vec3::splat(1.0));
        assert_eq!(sky.sample(0.0).unwrap(), SkyColors::default());
        assert_eq!(sky.sample(1.0).unwrap(), SkyColors::default());
    }
}
