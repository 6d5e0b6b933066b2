use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};
use anyhow::{Context, Result};
use df_core::frame::FrameBuffer;

/// Interligne, en multiple de la taille du texte.
pub const LINE_LEADING: f32 = 1.25;

/// Police embarquée (DejaVu Sans, licence Bitstream Vera), utilisée quand
/// aucune police n'est configurée ni trouvée sur le système.
const BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Emplacements usuels d'une police sans-serif, essayés dans l'ordre.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// First system font found on disk, if any.
#[must_use]
pub fn discover_system_font() -> Option<PathBuf> {
    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Rasterise du texte en niveaux de gris dans un buffer d'échantillonnage.
///
/// Le texte est mis en page comme dans une boîte de la taille du buffer :
/// retours à la ligne explicites, césure gloutonne aux espaces, chaque
/// ligne centrée, le bloc centré verticalement.
pub struct GlyphPainter {
    font: FontVec,
}

impl GlyphPainter {
    /// Build a painter from raw TTF/OTF bytes.
    ///
    /// # Errors
    /// Retourne une erreur si la police fournie est invalide.
    ///
    /// # Example
    /// ```
    /// use df_render::glyph::GlyphPainter;
    /// assert!(GlyphPainter::from_bytes(b"not a font".to_vec()).is_err());
    /// ```
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(data)?;
        Ok(Self { font })
    }

    /// Load a font file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a font.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("Impossible de lire la police {}", path.display()))?;
        let painter = Self::from_bytes(data)
            .with_context(|| format!("Police invalide {}", path.display()))?;
        log::debug!("Police chargée : {}", path.display());
        Ok(painter)
    }

    /// Try the usual system font locations.
    #[must_use]
    pub fn discover() -> Option<Self> {
        let path = discover_system_font()?;
        match Self::load(&path) {
            Ok(painter) => Some(painter),
            Err(e) => {
                log::warn!("Police système ignorée : {e:#}");
                None
            }
        }
    }

    /// The font compiled into the binary.
    ///
    /// # Errors
    /// Retourne une erreur si la police embarquée est illisible.
    ///
    /// # Example
    /// ```
    /// use df_render::glyph::GlyphPainter;
    /// let painter = GlyphPainter::bundled().unwrap();
    /// assert_eq!(painter.layout_lines("Mycelium", 64.0, 800.0), vec!["Mycelium".to_string()]);
    /// ```
    pub fn bundled() -> Result<Self> {
        Self::from_bytes(BUNDLED_FONT.to_vec()).context("Police embarquée invalide")
    }

    /// A configured path must load. Without one, try the system fonts, then
    /// the bundled font.
    ///
    /// # Errors
    /// Returns an error when `font_path` is set and cannot be loaded.
    pub fn from_config(font_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = font_path {
            return Self::load(path);
        }
        if let Some(found) = Self::discover() {
            return Ok(found);
        }
        log::debug!("Aucune police système trouvée, police embarquée utilisée");
        Self::bundled()
    }

    /// `size` is an em size: 64 means the em square spans 64 px.
    fn scale(&self, size: f32) -> PxScale {
        let size = if size.is_finite() { size.max(1.0) } else { 1.0 };
        match self.font.units_per_em() {
            Some(upem) if upem > 0.0 => PxScale::from(size * self.font.height_unscaled() / upem),
            _ => PxScale::from(size),
        }
    }

    fn line_width(&self, scale: PxScale, line: &str) -> f32 {
        let scaled = self.font.as_scaled(scale);
        let mut width = 0.0;
        let mut prev: Option<GlyphId> = None;
        for ch in line.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    /// Break `text` into the lines that [`draw_text`](Self::draw_text) would
    /// draw in a box `max_width` px wide. A single word wider than the box
    /// stays on its own line.
    #[must_use]
    pub fn layout_lines(&self, text: &str, size: f32, max_width: f32) -> Vec<String> {
        let scale = self.scale(size);
        let mut lines = Vec::new();
        for paragraph in text.lines() {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                if current.is_empty() {
                    current.push_str(word);
                    continue;
                }
                let candidate = format!("{current} {word}");
                if self.line_width(scale, &candidate) <= max_width {
                    current = candidate;
                } else {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                }
            }
            lines.push(current);
        }
        lines
    }

    /// Dessine `text` en blanc sur `fb`, qui doit déjà porter son fond.
    ///
    /// Coverage is written as an opaque grey level and combined with what is
    /// already there by maximum, so only fully covered pixels reach 255.
    pub fn draw_text(&self, fb: &mut FrameBuffer, text: &str, size: f32) {
        if text.trim().is_empty() || fb.width == 0 || fb.height == 0 {
            return;
        }
        let size = if size.is_finite() { size.max(1.0) } else { 1.0 };
        let scale = self.scale(size);
        let scaled = self.font.as_scaled(scale);
        let box_w = fb.width as f32;
        let box_h = fb.height as f32;

        let lines = self.layout_lines(text, size, box_w);
        let line_height = size * LINE_LEADING;
        let top = (box_h - line_height * lines.len() as f32) / 2.0;
        let baseline_shift = (scaled.ascent() + scaled.descent()) / 2.0;

        for (i, line) in lines.iter().enumerate() {
            let middle = top + line_height * (i as f32 + 0.5);
            let baseline = middle + baseline_shift;
            let mut caret = (box_w - self.line_width(scale, line)) / 2.0;
            let mut prev: Option<GlyphId> = None;

            for ch in line.chars() {
                let id = scaled.glyph_id(ch);
                if let Some(p) = prev {
                    caret += scaled.kern(p, id);
                }
                let glyph = id.with_scale_and_position(scale, point(caret, baseline));
                caret += scaled.h_advance(id);
                prev = Some(id);

                let Some(outline) = self.font.outline_glyph(glyph) else {
                    continue;
                };
                let bounds = outline.px_bounds();
                #[allow(clippy::cast_possible_wrap)]
                outline.draw(|x, y, v| {
                    let px = x as i32 + bounds.min.x as i32;
                    let py = y as i32 + bounds.min.y as i32;
                    if px < 0 || py < 0 {
                        return;
                    }
                    let (px, py) = (px as u32, py as u32);
                    let level = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                    let current = fb.pixel(px, py)[0];
                    if level > current {
                        fb.set_pixel(px, py, [level, level, level, 255]);
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_core::color::Rgb;

    fn painter() -> GlyphPainter {
        GlyphPainter::bundled().unwrap()
    }

    #[test]
    fn garbage_font_is_rejected() {
        assert!(GlyphPainter::from_bytes(Vec::new()).is_err());
        assert!(GlyphPainter::load(Path::new("/nonexistent/font.ttf")).is_err());
    }

    #[test]
    fn configured_path_must_load() {
        assert!(GlyphPainter::from_config(Some(Path::new("/nonexistent/font.ttf"))).is_err());
    }

    #[test]
    fn unconfigured_font_always_resolves() {
        let p = GlyphPainter::from_config(None).unwrap();
        assert_eq!(p.layout_lines("a b", 64.0, 10_000.0), vec!["a b".to_string()]);
    }

    #[test]
    fn blank_text_draws_nothing() {
        let p = painter();
        let mut fb = FrameBuffer::filled(50, 20, Rgb::BLACK);
        p.draw_text(&mut fb, "  \n ", 64.0);
        assert_eq!(fb.distinct_colors(), vec![[0, 0, 0, 255]]);
    }

    #[test]
    fn text_is_centred_with_solid_interior() {
        let p = painter();
        let mut fb = FrameBuffer::filled(400, 200, Rgb::BLACK);
        p.draw_text(&mut fb, "HI", 64.0);

        let (mut min_x, mut max_x, mut min_y, mut max_y) = (u32::MAX, 0, u32::MAX, 0);
        let mut solid = 0;
        for y in 0..fb.height {
            for x in 0..fb.width {
                let px = fb.pixel(x, y);
                assert_eq!(px[3], 255);
                if px[0] > 0 {
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                    min_y = min_y.min(y);
                    max_y = max_y.max(y);
                }
                if px[0] == 255 {
                    solid += 1;
                }
            }
        }
        assert!(solid > 100, "glyph interiors should be fully covered");
        let cx = f64::from(min_x + max_x) / 2.0;
        let cy = f64::from(min_y + max_y) / 2.0;
        assert!((cx - 200.0).abs() < 10.0, "horizontal centre {cx}");
        assert!((cy - 100.0).abs() < 20.0, "vertical centre {cy}");
    }

    #[test]
    fn long_text_wraps_at_box_width() {
        let p = painter();
        let lines = p.layout_lines("spore cap gill stem", 64.0, 200.0);
        assert!(lines.len() > 1);
        let single = p.layout_lines("spore cap", 64.0, 10_000.0);
        assert_eq!(single, vec!["spore cap".to_string()]);
        let explicit = p.layout_lines("a\nb", 64.0, 10_000.0);
        assert_eq!(explicit, vec!["a".to_string(), "b".to_string()]);
    }
}
