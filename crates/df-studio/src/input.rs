use std::fmt;
use std::str::FromStr;

use df_core::config::{MAX_CANVAS_EDGE, MIN_DURATION_MS};
use df_core::error::CoreError;

/// Largeur retenue quand la saisie est illisible.
pub const FALLBACK_WIDTH: u32 = 800;
/// Hauteur retenue quand la saisie est illisible.
pub const FALLBACK_HEIGHT: u32 = 600;
/// Durée retenue quand la saisie est illisible, avant le plancher de 500 ms.
pub const FALLBACK_DURATION_MS: u32 = 1000;

/// Leading integer of a form field: `" 640px"` → 640, `"3.9"` → 3.
fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|v| sign * v)
}

/// Surface edge from text. Unreadable or zero input gives `fallback`; the
/// result is kept within `1..=8192`.
///
/// # Example
/// ```
/// use df_studio::input::parse_dimension;
/// assert_eq!(parse_dimension("1024", 800), 1024);
/// assert_eq!(parse_dimension("abc", 800), 800);
/// assert_eq!(parse_dimension("", 600), 600);
/// ```
#[must_use]
pub fn parse_dimension(text: &str, fallback: u32) -> u32 {
    match leading_int(text) {
        Some(v) if v != 0 => v.clamp(1, i64::from(MAX_CANVAS_EDGE)) as u32,
        _ => fallback,
    }
}

/// Durée de boucle saisie : `max(500, valeur ou 1000)`.
///
/// # Example
/// ```
/// use df_studio::input::parse_duration;
/// assert_eq!(parse_duration("2500"), 2500);
/// assert_eq!(parse_duration("fast"), 1000);
/// assert_eq!(parse_duration("100"), 500);
/// ```
#[must_use]
pub fn parse_duration(text: &str) -> u32 {
    let ms = match leading_int(text) {
        Some(v) if v != 0 => v.clamp(0, i64::from(u32::MAX)) as u32,
        _ => FALLBACK_DURATION_MS,
    };
    ms.max(MIN_DURATION_MS)
}

/// Formats de surface proposés.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AspectPreset {
    /// 1:1, 600×600.
    Square,
    /// 16:9, 800×450.
    #[default]
    Landscape,
    /// 9:16, 450×800.
    Portrait,
    /// Keep the current size.
    Custom,
}

impl AspectPreset {
    /// Every preset, in menu order.
    pub const ALL: [Self; 4] = [Self::Square, Self::Landscape, Self::Portrait, Self::Custom];

    /// Fixed size of the preset; `None` for [`AspectPreset::Custom`].
    #[must_use]
    pub fn size(self) -> Option<(u32, u32)> {
        match self {
            Self::Square => Some((600, 600)),
            Self::Landscape => Some((800, 450)),
            Self::Portrait => Some((450, 800)),
            Self::Custom => None,
        }
    }

    /// Ratio label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for AspectPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AspectPreset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::Config(format!("Format inconnu : {s}")))
    }
}
