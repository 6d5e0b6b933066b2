use std::sync::Arc;

use anyhow::{Context, Result};
use df_core::color::Rgb;
use df_core::frame::FrameBuffer;
use df_core::traits::DrawContext;
use df_source::resize::Stretcher;

use crate::glyph::GlyphPainter;

/// Surface visible en mémoire : implémentation logicielle de [`DrawContext`].
///
/// Les disques sont pleins et sans anticrénelage : un pixel est peint si son
/// centre tombe dans l'ellipse. Une image rendue ne contient donc que le fond
/// et la couleur des points.
///
/// # Example
/// ```
/// use df_core::color::Rgb;
/// use df_core::traits::DrawContext;
/// use df_render::canvas::RasterCanvas;
/// let mut canvas = RasterCanvas::new(20, 20, None);
/// canvas.clear(Rgb::WHITE);
/// canvas.set_fill(Rgb::BLACK);
/// canvas.fill_ellipse(10.0, 10.0, 6.0, 6.0);
/// assert_eq!(canvas.frame().pixel(10, 10), [0, 0, 0, 255]);
/// ```
pub struct RasterCanvas {
    frame: FrameBuffer,
    fill: Rgb,
    glyphs: Option<Arc<GlyphPainter>>,
    stretcher: Stretcher,
}

impl RasterCanvas {
    /// Transparent surface of `width`×`height`. Text scratch buffers need
    /// `glyphs`; image sources do not.
    #[must_use]
    pub fn new(width: u32, height: u32, glyphs: Option<Arc<GlyphPainter>>) -> Self {
        Self {
            frame: FrameBuffer::new(width, height),
            fill: Rgb::BLACK,
            glyphs,
            stretcher: Stretcher::new(),
        }
    }

    /// Pixels currently on the surface.
    #[must_use]
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Swap the font used for text scratch buffers.
    pub fn set_glyphs(&mut self, glyphs: Option<Arc<GlyphPainter>>) {
        self.glyphs = glyphs;
    }

    /// `true` when text sources can be rasterised.
    #[must_use]
    pub fn has_glyphs(&self) -> bool {
        self.glyphs.is_some()
    }
}

/// Pixel span `[lo, hi)` whose centres may fall in `[center - radius, center + radius]`.
fn span(center: f64, radius: f64, limit: u32) -> (u32, u32) {
    let max = f64::from(limit);
    let lo = (center - radius - 0.5).floor().clamp(0.0, max);
    let hi = (center + radius + 0.5).ceil().clamp(0.0, max);
    (lo as u32, hi as u32)
}

impl DrawContext for RasterCanvas {
    type Scratch = FrameBuffer;

    fn dimensions(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    fn clear(&mut self, color: Rgb) {
        self.frame.fill(color.to_rgba());
    }

    fn set_fill(&mut self, color: Rgb) {
        self.fill = color;
    }

    fn fill_ellipse(&mut self, cx: f64, cy: f64, w: f64, h: f64) {
        let rx = w / 2.0;
        let ry = h / 2.0;
        if !(rx > 0.0 && ry > 0.0 && cx.is_finite() && cy.is_finite()) {
            return;
        }
        let rgba = self.fill.to_rgba();
        let (x0, x1) = span(cx, rx, self.frame.width);
        let (y0, y1) = span(cy, ry, self.frame.height);
        for py in y0..y1 {
            let dy = (f64::from(py) + 0.5 - cy) / ry;
            for px in x0..x1 {
                let dx = (f64::from(px) + 0.5 - cx) / rx;
                if dx * dx + dy * dy <= 1.0 {
                    self.frame.set_pixel(px, py, rgba);
                }
            }
        }
    }

    fn text_scratch(&self, text: &str, size: f32) -> Result<FrameBuffer> {
        let mut scratch = FrameBuffer::filled(self.frame.width, self.frame.height, Rgb::BLACK);
        if text.trim().is_empty() {
            return Ok(scratch);
        }
        let glyphs = self
            .glyphs
            .as_ref()
            .context("Aucune police disponible pour rendre le texte")?;
        glyphs.draw_text(&mut scratch, text, size);
        Ok(scratch)
    }

    fn image_scratch(&mut self, image: &FrameBuffer) -> Result<FrameBuffer> {
        let (width, height) = (self.frame.width, self.frame.height);
        self.stretcher.stretch(image, width, height).with_context(|| {
            format!(
                "Image {}×{} non projetable sur {width}×{height}",
                image.width, image.height
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipse_is_hard_edged() {
        let mut c = RasterCanvas::new(32, 32, None);
        c.clear(Rgb::WHITE);
        c.set_fill(Rgb::new(59, 130, 246));
        c.fill_ellipse(16.0, 16.0, 9.5, 9.5);
        c.fill_ellipse(3.2, 28.7, 3.0, 3.0);
        assert_eq!(
            c.frame().distinct_colors(),
            vec![[59, 130, 246, 255], [255, 255, 255, 255]]
        );
    }

    #[test]
    fn ellipse_covers_pixel_centres_only() {
        let mut c = RasterCanvas::new(10, 10, None);
        c.clear(Rgb::WHITE);
        c.set_fill(Rgb::BLACK);
        // 2 px disc centred on a pixel corner: the four touching pixels.
        c.fill_ellipse(5.0, 5.0, 2.0, 2.0);
        let painted: Vec<(u32, u32)> = (0..10)
            .flat_map(|y| (0..10).map(move |x| (x, y)))
            .filter(|&(x, y)| c.frame().pixel(x, y) == [0, 0, 0, 255])
            .collect();
        assert_eq!(painted, vec![(4, 4), (5, 4), (4, 5), (5, 5)]);
    }

    #[test]
    fn ellipse_clips_at_edges_and_ignores_degenerate() {
        let mut c = RasterCanvas::new(8, 8, None);
        c.clear(Rgb::WHITE);
        c.set_fill(Rgb::BLACK);
        c.fill_ellipse(-1.0, -1.0, 6.0, 6.0);
        assert_eq!(c.frame().pixel(0, 0), [0, 0, 0, 255]);
        c.fill_ellipse(4.0, 4.0, 0.0, 3.0);
        c.fill_ellipse(f64::NAN, 4.0, 3.0, 3.0);
        assert_eq!(c.frame().pixel(4, 4), [255, 255, 255, 255]);
    }

    #[test]
    fn empty_text_needs_no_font() {
        let c = RasterCanvas::new(6, 4, None);
        let scratch = c.text_scratch("", 64.0).unwrap();
        assert_eq!(scratch.distinct_colors(), vec![[0, 0, 0, 255]]);
        assert!(c.text_scratch("Mycelium", 64.0).is_err());
    }

    #[test]
    fn image_scratch_fills_the_surface() {
        let mut c = RasterCanvas::new(12, 6, None);
        let src = FrameBuffer::filled(3, 3, Rgb::new(1, 2, 3));
        let scratch = c.image_scratch(&src).unwrap();
        assert_eq!((scratch.width, scratch.height), (12, 6));
        assert!(scratch.data.chunks_exact(4).all(|px| px[3] == 255));

        // Same canvas, different source: the stretcher is reused.
        let other = FrameBuffer::new(7, 2);
        let again = c.image_scratch(&other).unwrap();
        assert_eq!((again.width, again.height), (12, 6));
        assert!(again.data.chunks_exact(4).all(|px| px[3] == 0));
    }
}
