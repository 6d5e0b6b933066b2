use std::sync::Arc;

use anyhow::Result;
use df_core::config::StudioConfig;
use df_core::error::CoreError;
use df_core::frame::FrameBuffer;
use df_core::params::DotFilterParams;
use df_core::random::SeededRandom;
use df_core::source::RenderSource;
use df_core::traits::{DrawContext, RandomSource};

use crate::canvas::RasterCanvas;
use crate::dots::{RenderStats, TEXT_SIZE, render_dots};
use crate::glyph::GlyphPainter;

/// Une commande de rendu : quoi, à quelle taille, avec quels paramètres.
#[derive(Clone, Copy, Debug)]
pub struct RenderRequest<'a> {
    /// Text or image to stipple.
    pub source: &'a RenderSource,
    /// Surface width, must be > 0.
    pub width: u32,
    /// Surface height, must be > 0.
    pub height: u32,
    /// Parameters for this frame.
    pub params: DotFilterParams,
}

/// Possède la surface visible et la source de hasard ; rend sur commande.
///
/// La surface est recréée quand la taille demandée change. Un seul rendu
/// à la fois : `render` prend `&mut self`.
///
/// # Example
/// ```
/// use df_core::frame::FrameBuffer;
/// use df_core::params::DotFilterParams;
/// use df_core::source::RenderSource;
/// use df_render::renderer::{RenderRequest, Renderer};
/// let mut renderer = Renderer::new(None, Some(1));
/// assert!(renderer.capture().is_none());
/// let source = RenderSource::image(FrameBuffer::new(4, 4));
/// let frame = renderer
///     .render(&RenderRequest { source: &source, width: 8, height: 6, params: DotFilterParams::default() })
///     .unwrap();
/// assert_eq!((frame.width, frame.height), (8, 6));
/// ```
pub struct Renderer<R: RandomSource = SeededRandom> {
    canvas: Option<RasterCanvas>,
    glyphs: Option<Arc<GlyphPainter>>,
    rng: R,
    text_size: f32,
    last_stats: Option<RenderStats>,
    rendered: bool,
}

impl Renderer<SeededRandom> {
    /// Renderer seeded from `seed`, or from entropy when `None`.
    #[must_use]
    pub fn new(glyphs: Option<Arc<GlyphPainter>>, seed: Option<u64>) -> Self {
        Self::with_random(glyphs, SeededRandom::from_config(seed))
    }

    /// Font, seed and text size taken from the configuration.
    ///
    /// # Errors
    /// Returns an error if a configured font path cannot be loaded.
    pub fn from_config(config: &StudioConfig) -> Result<Self> {
        let glyphs = GlyphPainter::from_config(config.font_path.as_deref())?;
        let mut renderer = Self::new(Some(Arc::new(glyphs)), config.seed);
        renderer.set_text_size(config.text_size);
        Ok(renderer)
    }
}

impl<R: RandomSource> Renderer<R> {
    /// Renderer drawing its randomness from `rng`.
    pub fn with_random(glyphs: Option<Arc<GlyphPainter>>, rng: R) -> Self {
        Self {
            canvas: None,
            glyphs,
            rng,
            text_size: TEXT_SIZE,
            last_stats: None,
            rendered: false,
        }
    }

    /// Em size of text sources.
    pub fn set_text_size(&mut self, size: f32) {
        self.text_size = if size.is_finite() && size > 0.0 {
            size
        } else {
            TEXT_SIZE
        };
    }

    /// Replace the font; applies to the current surface too.
    pub fn set_glyphs(&mut self, glyphs: Option<Arc<GlyphPainter>>) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.set_glyphs(glyphs.clone());
        }
        self.glyphs = glyphs;
    }

    /// `true` when text sources can be rendered.
    #[must_use]
    pub fn has_glyphs(&self) -> bool {
        self.glyphs.is_some()
    }

    /// Rend la requête de façon synchrone et renvoie la surface.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] for a zero width or height, or the
    /// dot engine's error. After a failure, [`capture`](Self::capture)
    /// returns `None` until the next successful render.
    pub fn render(&mut self, request: &RenderRequest<'_>) -> Result<&FrameBuffer> {
        let (width, height) = (request.width, request.height);
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height }.into());
        }

        let canvas = match self.canvas.take() {
            Some(canvas) if canvas.dimensions() == (width, height) => self.canvas.insert(canvas),
            _ => {
                log::debug!("Nouvelle surface {width}×{height}");
                self.canvas
                    .insert(RasterCanvas::new(width, height, self.glyphs.clone()))
            }
        };

        match render_dots(
            canvas,
            request.source,
            &request.params,
            &mut self.rng,
            self.text_size,
        ) {
            Ok(stats) => {
                self.last_stats = Some(stats);
                self.rendered = true;
                Ok(canvas.frame())
            }
            Err(e) => {
                self.last_stats = None;
                self.rendered = false;
                Err(e)
            }
        }
    }

    /// Last successfully rendered surface; `None` before any render.
    #[must_use]
    pub fn capture(&self) -> Option<&FrameBuffer> {
        if !self.rendered {
            return None;
        }
        self.canvas.as_ref().map(RasterCanvas::frame)
    }

    /// Statistics of the last successful render.
    #[must_use]
    pub fn last_stats(&self) -> Option<RenderStats> {
        self.last_stats
    }

    /// Current surface size, if one exists.
    #[must_use]
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.canvas.as_ref().map(DrawContext::dimensions)
    }

    /// Drop the surface. The next render recreates it.
    pub fn release(&mut self) {
        self.canvas = None;
        self.rendered = false;
        self.last_stats = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_core::color::Rgb;

    fn request(source: &RenderSource, width: u32, height: u32) -> RenderRequest<'_> {
        RenderRequest {
            source,
            width,
            height,
            params: DotFilterParams::default(),
        }
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut r = Renderer::new(None, Some(1));
        let source = RenderSource::image(FrameBuffer::new(2, 2));
        let err = r.render(&request(&source, 0, 10)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CoreError>(),
            Some(&CoreError::InvalidDimensions {
                width: 0,
                height: 10
            })
        );
        assert!(r.capture().is_none());
    }

    #[test]
    fn surface_follows_requested_size() {
        let mut r = Renderer::new(None, Some(1));
        let source = RenderSource::image(FrameBuffer::filled(2, 2, Rgb::BLACK));
        r.render(&request(&source, 30, 20)).unwrap();
        assert_eq!(r.surface_size(), Some((30, 20)));
        let frame = r.render(&request(&source, 12, 40)).unwrap();
        assert_eq!((frame.width, frame.height), (12, 40));
        assert_eq!(r.last_stats().map(|s| s.budget), Some(4000));
        r.release();
        assert!(r.capture().is_none());
        assert_eq!(r.surface_size(), None);
    }

    #[test]
    fn failed_render_leaves_nothing_to_capture() {
        let mut r = Renderer::new(None, Some(1));
        let image = RenderSource::image(FrameBuffer::filled(2, 2, Rgb::BLACK));
        r.render(&request(&image, 10, 10)).unwrap();
        assert!(r.capture().is_some());

        let text = RenderSource::text("needs a font");
        assert!(r.render(&request(&text, 10, 10)).is_err());
        assert!(r.capture().is_none());
        assert!(r.last_stats().is_none());
    }

    #[test]
    fn default_config_renders_text() {
        let mut r = Renderer::from_config(&StudioConfig::default()).unwrap();
        assert!(r.has_glyphs());
        let source = RenderSource::text("Mycelium");
        r.render(&request(&source, 400, 200)).unwrap();
        assert!(r.capture().is_some());
        assert!(r.last_stats().unwrap().dots_drawn > 0);
    }

    #[test]
    fn mycelium_still_is_white_and_blue() {
        let _ = env_logger::builder().is_test(true).try_init();
        let painter = GlyphPainter::bundled().unwrap();
        let mut r = Renderer::new(Some(Arc::new(painter)), Some(42));
        let source = RenderSource::text("Mycelium");
        let params = DotFilterParams::new(0.8, 4.0, 15.0, Rgb::new(0x3b, 0x82, 0xf6));
        let frame = r
            .render(&RenderRequest {
                source: &source,
                width: 800,
                height: 600,
                params,
            })
            .unwrap();
        assert_eq!((frame.width, frame.height), (800, 600));
        assert_eq!(
            frame.distinct_colors(),
            vec![[0x3b, 0x82, 0xf6, 255], [255, 255, 255, 255]]
        );
        let stats = r.last_stats().unwrap();
        assert_eq!(stats.budget, 4000);
        assert!(stats.dots_drawn > 0);
        assert!(stats.attempts <= 80_000);
    }
}
