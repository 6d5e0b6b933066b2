use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::interpolate::clamp;

/// Valid density range (fraction of the dot budget).
pub const DENSITY_RANGE: (f64, f64) = (0.0, 1.0);
/// Valid dot size range, in pixels.
pub const SIZE_RANGE: (f64, f64) = (2.0, 20.0);
/// Valid spacing range, in pixels.
pub const SPACING_RANGE: (f64, f64) = (5.0, 50.0);

/// Paramètres du filtre à points. Valeur immuable : chaque modification
/// produit une nouvelle instance.
///
/// `spacing` is carried through interpolation and configuration but does not
/// constrain dot placement.
///
/// # Example
/// ```
/// use df_core::params::DotFilterParams;
/// let p = DotFilterParams::default().with_size(40.0);
/// assert_eq!(p.size, 20.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DotFilterParams {
    /// Fraction of the 5000-dot budget to place [0.0, 1.0].
    pub density: f64,
    /// Nominal dot diameter in pixels [2.0, 20.0].
    pub size: f64,
    /// Nominal gap between dots in pixels [5.0, 50.0].
    pub spacing: f64,
    /// Dot color.
    pub color: Rgb,
}

impl Default for DotFilterParams {
    fn default() -> Self {
        Self {
            density: 0.8,
            size: 4.0,
            spacing: 15.0,
            color: Rgb::new(0x3b, 0x82, 0xf6),
        }
    }
}

impl DotFilterParams {
    /// Build a parameter set, clamping every numeric field into its range.
    #[must_use]
    pub fn new(density: f64, size: f64, spacing: f64, color: Rgb) -> Self {
        Self {
            density,
            size,
            spacing,
            color,
        }
        .clamped()
    }

    /// Copy with density/size/spacing clamped into their declared ranges.
    /// `NaN` fields fall to the lower bound.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            density: clamp(self.density, DENSITY_RANGE.0, DENSITY_RANGE.1),
            size: clamp(self.size, SIZE_RANGE.0, SIZE_RANGE.1),
            spacing: clamp(self.spacing, SPACING_RANGE.0, SPACING_RANGE.1),
            color: self.color,
        }
    }

    /// Copy with a new density.
    #[must_use]
    pub fn with_density(self, density: f64) -> Self {
        Self { density, ..self }.clamped()
    }

    /// Copy with a new size.
    #[must_use]
    pub fn with_size(self, size: f64) -> Self {
        Self { size, ..self }.clamped()
    }

    /// Copy with a new spacing.
    #[must_use]
    pub fn with_spacing(self, spacing: f64) -> Self {
        Self { spacing, ..self }.clamped()
    }

    /// Copy with a new color.
    #[must_use]
    pub fn with_color(self, color: Rgb) -> Self {
        Self { color, ..self }
    }

    /// Apply a partial update, returning the new value.
    ///
    /// # Example
    /// ```
    /// use df_core::params::{DotFilterParams, ParamsPatch};
    /// let p = DotFilterParams::default().apply(ParamsPatch { density: Some(0.2), ..Default::default() });
    /// assert_eq!(p.density, 0.2);
    /// assert_eq!(p.size, 4.0);
    /// ```
    #[must_use]
    pub fn apply(self, patch: ParamsPatch) -> Self {
        Self {
            density: patch.density.unwrap_or(self.density),
            size: patch.size.unwrap_or(self.size),
            spacing: patch.spacing.unwrap_or(self.spacing),
            color: patch.color.unwrap_or(self.color),
        }
        .clamped()
    }
}

/// Partial update of a [`DotFilterParams`], one field per control.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParamsPatch {
    /// New density, if changed.
    pub density: Option<f64>,
    /// New size, if changed.
    pub size: Option<f64>,
    /// New spacing, if changed.
    pub spacing: Option<f64>,
    /// New color, if changed.
    pub color: Option<Rgb>,
}

/// Start/end pair bounding an animated interpolation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframes {
    /// Parameters at progress 0.
    pub start: DotFilterParams,
    /// Parameters at progress 1.
    pub end: DotFilterParams,
}

impl Default for Keyframes {
    fn default() -> Self {
        Self {
            start: DotFilterParams {
                density: 0.6,
                size: 4.0,
                spacing: 15.0,
                color: Rgb::new(0x03, 0x54, 0x08),
            },
            end: DotFilterParams {
                density: 1.0,
                size: 10.0,
                spacing: 30.0,
                color: Rgb::new(0x5c, 0x36, 0x00),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_in_range() {
        let p = DotFilterParams::default();
        assert_eq!(p, p.clamped());
        let k = Keyframes::default();
        assert_eq!(k.start, k.start.clamped());
        assert_eq!(k.end, k.end.clamped());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let p = DotFilterParams::new(1.5, 0.0, 80.0, Rgb::BLACK);
        assert_eq!((p.density, p.size, p.spacing), (1.0, 2.0, 50.0));
        let p = DotFilterParams::new(f64::NAN, f64::NAN, f64::NAN, Rgb::BLACK);
        assert_eq!((p.density, p.size, p.spacing), (0.0, 2.0, 5.0));
    }

    #[test]
    fn patch_leaves_other_fields() {
        let base = DotFilterParams::default();
        let p = base.apply(ParamsPatch {
            color: Some(Rgb::WHITE),
            spacing: Some(3.0),
            ..ParamsPatch::default()
        });
        assert_eq!(p.color, Rgb::WHITE);
        assert_eq!(p.spacing, 5.0);
        assert_eq!(p.density, base.density);
        assert_eq!(p.size, base.size);
    }
}
