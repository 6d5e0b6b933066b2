/// Dot-filter rendering: glyph rasterisation, raster canvas and the
/// rejection-sampling dot engine.
///
/// [`Renderer`] is the explicit render command used by the studio and the
/// export pipeline.

pub mod canvas;
pub mod dots;
pub mod glyph;
pub mod renderer;

pub use canvas::RasterCanvas;
pub use dots::{RenderStats, render_dots};
pub use glyph::GlyphPainter;
pub use renderer::{RenderRequest, Renderer};
