use crate::color::Rgb;
use crate::frame::FrameBuffer;

/// Lecture pixel par pixel d'un buffer d'échantillonnage.
///
/// # Example
/// ```
/// use df_core::frame::FrameBuffer;
/// use df_core::traits::PixelSampler;
/// let fb = FrameBuffer::new(2, 2);
/// assert_eq!(fb.sample(1, 1), [0, 0, 0, 0]);
/// ```
pub trait PixelSampler {
    /// Buffer size in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// RGBA value at `(x, y)`; out-of-bounds reads return transparent black.
    fn sample(&self, x: u32, y: u32) -> [u8; 4];
}

/// Source de hasard injectable, pour des rendus reproductibles en test.
pub trait RandomSource {
    /// Uniform draw in `[min, max)`. Returns `min` when the range is empty.
    fn uniform(&mut self, min: f64, max: f64) -> f64;
}

/// Capacités de dessin consommées par le moteur de points.
///
/// Implémenté par : `RasterCanvas` (df-render). Les tests fournissent des
/// implémentations minimales.
///
/// The scratch buffer is returned by value so that each render builds a
/// fresh one and drops it when done; it is never displayed.
pub trait DrawContext {
    /// Off-screen sampling buffer type.
    type Scratch: PixelSampler;

    /// Visible surface size in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Paint the whole visible surface with `color`.
    fn clear(&mut self, color: Rgb);

    /// Color used by subsequent fills.
    fn set_fill(&mut self, color: Rgb);

    /// Fill an axis-aligned ellipse centred on `(cx, cy)` with diameters `w`, `h`.
    fn fill_ellipse(&mut self, cx: f64, cy: f64, w: f64, h: f64);

    /// Scratch buffer at surface size: black background, `text` in white,
    /// centred, at `size` px.
    ///
    /// # Errors
    /// Fails when glyphs are needed but cannot be rasterised.
    fn text_scratch(&self, text: &str, size: f32) -> anyhow::Result<Self::Scratch>;

    /// Scratch buffer at surface size holding `image` stretched to fill it,
    /// alpha preserved, transparent elsewhere.
    ///
    /// Takes `&mut self` so implementations can keep scaling state between
    /// frames.
    ///
    /// # Errors
    /// Fails when the image cannot be scaled.
    fn image_scratch(&mut self, image: &FrameBuffer) -> anyhow::Result<Self::Scratch>;
}
