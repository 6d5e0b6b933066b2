use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Couleur RGB 8 bits, sérialisée en `#rrggbb`.
///
/// # Example
/// ```
/// use df_core::color::Rgb;
/// let blue: Rgb = "#3B82F6".parse().unwrap();
/// assert_eq!(blue, Rgb::new(0x3b, 0x82, 0xf6));
/// assert_eq!(blue.to_hex(), "#3b82f6");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Pure white, the surface background.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Pure black, the scratch buffer background for text.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Build a color from its three channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from floating-point channels, rounding and clamping each
    /// one into `[0, 255]`. `NaN` maps to 0.
    ///
    /// # Example
    /// ```
    /// use df_core::color::Rgb;
    /// assert_eq!(Rgb::from_channels(-4.0, 127.5, 300.0), Rgb::new(0, 128, 255));
    /// ```
    #[must_use]
    pub fn from_channels(r: f64, g: f64, b: f64) -> Self {
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Format as lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels as an `[r, g, b, 255]` pixel.
    #[inline]
    #[must_use]
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

#[inline]
fn channel(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Décode `#rgb`, `#rrggbb`, `rgb` ou `rrggbb` (insensible à la casse).
/// La forme courte est étendue (`#abc` → `#aabbcc`).
///
/// # Errors
/// Returns [`CoreError::InvalidColor`] for any other shape or non-hex digit.
///
/// # Example
/// ```
/// use df_core::color::{hex_to_rgb, Rgb};
/// assert_eq!(hex_to_rgb("#fff").unwrap(), Rgb::WHITE);
/// assert!(hex_to_rgb("#12345").is_err());
/// ```
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, CoreError> {
    let invalid = || CoreError::InvalidColor {
        value: hex.to_string(),
    };
    let digits = hex.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let full: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(invalid()),
    };
    let num = u32::from_str_radix(&full, 16).map_err(|_| invalid())?;
    Ok(Rgb::new(
        ((num >> 16) & 0xff) as u8,
        ((num >> 8) & 0xff) as u8,
        (num & 0xff) as u8,
    ))
}

/// Encode en `#rrggbb`.
#[must_use]
pub fn rgb_to_hex(color: Rgb) -> String {
    color.to_hex()
}

impl FromStr for Rgb {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex_to_rgb(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        hex_to_rgb(&value)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Convertit HSL → RGB. H en degrés, S et L ∈ [0.0, 1.0].
///
/// # Example
/// ```
/// use df_core::color::{hsl_to_rgb, Rgb};
/// assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), Rgb::new(0, 255, 0));
/// ```
#[must_use]
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb::from_channels((r + m) * 255.0, (g + m) * 255.0, (b + m) * 255.0)
}

/// Couleur déterministe dérivée d'un texte : teinte = |hash| mod 360,
/// saturation 70 %, luminosité 50 %.
///
/// The hash is the classic 32-bit `c + (hash << 5) - hash` over UTF-16 code
/// units, so a given text always maps to the same swatch.
///
/// # Example
/// ```
/// use df_core::color::color_from_text;
/// assert_eq!(color_from_text("Mycelium"), color_from_text("Mycelium"));
/// ```
#[must_use]
pub fn color_from_text(text: &str) -> Rgb {
    let mut hash = 0.0_f64;
    for unit in text.encode_utf16() {
        let shifted = f64::from(to_int32(hash).wrapping_shl(5));
        hash = f64::from(unit) + (shifted - hash);
    }
    hsl_to_rgb(hash.abs() % 360.0, 0.7, 0.5)
}

/// Wraps a finite double into the signed 32-bit range (truncation, then
/// modulo 2³²).
#[inline]
fn to_int32(v: f64) -> i32 {
    (v.trunc() as i64) as i32
}
