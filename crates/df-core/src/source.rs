use std::sync::Arc;

use crate::frame::FrameBuffer;

/// Ce que le filtre échantillonne : un texte ou une image. Une seule source
/// est active par rendu.
///
/// # Example
/// ```
/// use df_core::source::RenderSource;
/// let src = RenderSource::text("Mycelium");
/// assert!(!src.is_image());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderSource {
    /// Text drawn white-on-black; samples inside glyphs are accepted.
    Text {
        /// The string to draw.
        content: String,
    },
    /// Image stretched to the surface; samples with alpha > 10 are accepted.
    Image {
        /// Decoded RGBA pixels.
        pixels: Arc<FrameBuffer>,
    },
}

impl RenderSource {
    /// Text source.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Image source.
    #[must_use]
    pub fn image(pixels: FrameBuffer) -> Self {
        Self::Image {
            pixels: Arc::new(pixels),
        }
    }

    /// `true` for [`RenderSource::Image`].
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }
}

impl Default for RenderSource {
    fn default() -> Self {
        Self::text("Mycelium")
    }
}
