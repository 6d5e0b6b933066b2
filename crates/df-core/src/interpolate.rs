use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::CoreError;
use crate::params::DotFilterParams;

/// Clamp `value` into `[min, max]`; `NaN` maps to `min`.
///
/// # Example
/// ```
/// use df_core::interpolate::clamp;
/// assert_eq!(clamp(f64::NAN, 0.0, 1.0), 0.0);
/// assert_eq!(clamp(3.0, 0.0, 1.0), 1.0);
/// ```
#[inline]
#[must_use]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Linear interpolation, exact at both ends (`t = 0` → `start`, `t = 1` → `end`).
///
/// # Example
/// ```
/// use df_core::interpolate::lerp;
/// assert_eq!(lerp(0.6, 1.0, 0.0), 0.6);
/// assert_eq!(lerp(0.6, 1.0, 1.0), 1.0);
/// ```
#[inline]
#[must_use]
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start * (1.0 - t) + end * t
}

/// Easing curve mapping normalized time onto normalized progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    /// `t`
    Linear,
    /// `t²`
    EaseInQuad,
    /// `1 - (1 - t)²`
    EaseOutQuad,
    /// `4t³` below one half, `1 - (-2t + 2)³ / 2` above.
    #[default]
    EaseInOutCubic,
}

impl Easing {
    /// Every curve, in menu order.
    pub const ALL: [Self; 4] = [
        Self::Linear,
        Self::EaseInOutCubic,
        Self::EaseInQuad,
        Self::EaseOutQuad,
    ];

    /// Evaluate the raw curve at `t` (no clamping).
    #[inline]
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::EaseInQuad => t * t,
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }

    /// `clamp(e(clamp(t, 0, 1)), 0, 1)`: the blend factor used for keyframes.
    ///
    /// # Example
    /// ```
    /// use df_core::interpolate::Easing;
    /// assert_eq!(Easing::EaseInQuad.eased(2.0), 1.0);
    /// assert_eq!(Easing::Linear.eased(f64::NAN), 0.0);
    /// ```
    #[inline]
    #[must_use]
    pub fn eased(self, t: f64) -> f64 {
        clamp(self.apply(clamp(t, 0.0, 1.0)), 0.0, 1.0)
    }

    /// Name as used in configuration files and menus.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseInQuad => "easeInQuad",
            Self::EaseOutQuad => "easeOutQuad",
            Self::EaseInOutCubic => "easeInOutCubic",
        }
    }
}

impl FromStr for Easing {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownEasing {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value that can be blended field by field with another of the same shape.
pub trait Interpolate: Sized {
    /// Blend `self` toward `end` by an already-eased factor in `[0, 1]`.
    #[must_use]
    fn blend(&self, end: &Self, eased: f64) -> Self;
}

impl Interpolate for f64 {
    fn blend(&self, end: &Self, eased: f64) -> Self {
        lerp(*self, *end, eased)
    }
}

/// Blended in RGB space, one channel at a time.
impl Interpolate for Rgb {
    fn blend(&self, end: &Self, eased: f64) -> Self {
        Rgb::from_channels(
            lerp(f64::from(self.r), f64::from(end.r), eased),
            lerp(f64::from(self.g), f64::from(end.g), eased),
            lerp(f64::from(self.b), f64::from(end.b), eased),
        )
    }
}

impl<const N: usize> Interpolate for [f64; N] {
    fn blend(&self, end: &Self, eased: f64) -> Self {
        std::array::from_fn(|i| lerp(self[i], end[i], eased))
    }
}

impl Interpolate for DotFilterParams {
    fn blend(&self, end: &Self, eased: f64) -> Self {
        Self {
            density: self.density.blend(&end.density, eased),
            size: self.size.blend(&end.size, eased),
            spacing: self.spacing.blend(&end.spacing, eased),
            color: self.color.blend(&end.color, eased),
        }
    }
}

/// Interpolate two same-shaped parameter sets at time `t` through `easing`.
///
/// # Example
/// ```
/// use df_core::interpolate::{interpolate_params, Easing};
/// use df_core::params::Keyframes;
/// let k = Keyframes::default();
/// assert_eq!(interpolate_params(&k.start, &k.end, 0.0, Easing::EaseInOutCubic), k.start);
/// assert_eq!(interpolate_params(&k.start, &k.end, 1.0, Easing::EaseInOutCubic), k.end);
/// ```
#[must_use]
pub fn interpolate_params<T: Interpolate>(start: &T, end: &T, t: f64, easing: Easing) -> T {
    start.blend(end, easing.eased(t))
}

/// Interpolate two colors in RGB space.
///
/// # Example
/// ```
/// use df_core::color::Rgb;
/// use df_core::interpolate::{interpolate_color, Easing};
/// let mid = interpolate_color(Rgb::BLACK, Rgb::WHITE, 0.5, Easing::Linear);
/// assert_eq!(mid, Rgb::new(128, 128, 128));
/// ```
#[must_use]
pub fn interpolate_color(start: Rgb, end: Rgb, t: f64, easing: Easing) -> Rgb {
    start.blend(&end, easing.eased(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Keyframes;

    const SAMPLES: [f64; 9] = [0.0, 0.1, 0.25, 0.4, 0.5, 0.6, 0.75, 0.9, 1.0];

    #[test]
    fn boundaries_are_exact_for_every_easing() {
        let pairs = [
            Keyframes::default(),
            Keyframes {
                start: DotFilterParams::new(0.1, 2.0, 5.0, Rgb::new(1, 2, 3)),
                end: DotFilterParams::new(0.7, 19.3, 47.1, Rgb::new(250, 7, 99)),
            },
        ];
        for k in pairs {
            for easing in Easing::ALL {
                assert_eq!(interpolate_params(&k.start, &k.end, 0.0, easing), k.start);
                assert_eq!(interpolate_params(&k.start, &k.end, 1.0, easing), k.end);
            }
        }
    }

    #[test]
    fn out_of_range_time_is_clamped() {
        let k = Keyframes::default();
        for easing in Easing::ALL {
            assert_eq!(interpolate_params(&k.start, &k.end, -3.0, easing), k.start);
            assert_eq!(interpolate_params(&k.start, &k.end, 7.5, easing), k.end);
            assert_eq!(
                interpolate_params(&k.start, &k.end, f64::NAN, easing),
                k.start
            );
        }
    }

    #[test]
    fn cubic_landmarks() {
        let e = Easing::EaseInOutCubic;
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(0.5), 0.5);
        assert_eq!(e.apply(1.0), 1.0);
        assert!((e.apply(0.25) - 0.0625).abs() < 1e-12);
        assert!((e.apply(0.75) - 0.9375).abs() < 1e-12);
    }

    #[test]
    fn linear_is_identity() {
        for t in SAMPLES {
            assert_eq!(Easing::Linear.apply(t), t);
        }
    }

    #[test]
    fn quads() {
        assert!((Easing::EaseInQuad.apply(0.5) - 0.25).abs() < 1e-12);
        assert!((Easing::EaseOutQuad.apply(0.5) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn every_curve_is_monotonic_on_samples() {
        for easing in Easing::ALL {
            for w in SAMPLES.windows(2) {
                assert!(easing.apply(w[0]) <= easing.apply(w[1]), "{easing}");
            }
        }
    }

    #[test]
    fn color_blends_per_channel() {
        let c = interpolate_color(
            Rgb::new(0x03, 0x54, 0x08),
            Rgb::new(0x5c, 0x36, 0x00),
            0.5,
            Easing::Linear,
        );
        // (3+92)/2 = 47.5, (84+54)/2 = 69, (8+0)/2 = 4
        assert_eq!(c, Rgb::new(48, 69, 4));
    }

    #[test]
    fn arrays_blend_like_named_fields() {
        let a = [0.6, 4.0, 15.0];
        let b = [1.0, 10.0, 30.0];
        let mid = interpolate_params(&a, &b, 0.5, Easing::Linear);
        assert!((mid[0] - 0.8).abs() < 1e-12);
        assert!((mid[1] - 7.0).abs() < 1e-12);
        assert!((mid[2] - 22.5).abs() < 1e-12);
    }

    #[test]
    fn easing_names_roundtrip() {
        for easing in Easing::ALL {
            assert_eq!(easing.name().parse::<Easing>().unwrap(), easing);
        }
        assert_eq!("EASEINQUAD".parse::<Easing>().unwrap(), Easing::EaseInQuad);
        assert!("bounce".parse::<Easing>().is_err());
    }
}
