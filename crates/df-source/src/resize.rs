use anyhow::{Context, Result};
use df_core::frame::FrameBuffer;
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};

/// Étire une image RGBA aux dimensions d'une surface, sans préserver le
/// ratio. L'alpha est prémultiplié pendant le filtrage, donc les bords
/// transparents ne bavent pas de couleur.
///
/// # Example
/// ```
/// use df_source::resize::Stretcher;
/// use df_core::frame::FrameBuffer;
/// let mut s = Stretcher::new();
/// let out = s.stretch(&FrameBuffer::new(100, 100), 40, 30).unwrap();
/// assert_eq!((out.width, out.height), (40, 30));
/// ```
pub struct Stretcher {
    inner: FirResizer,
    options: ResizeOptions,
    /// Owned copy of the source (fast_image_resize wants `&mut` on it).
    src_buf: Vec<u8>,
}

impl Stretcher {
    /// Bilinear stretcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
            src_buf: Vec::new(),
        }
    }

    /// Stretch `src` to `width`×`height` into a new buffer.
    ///
    /// # Errors
    /// Returns an error if either size is empty or the resize fails.
    pub fn stretch(&mut self, src: &FrameBuffer, width: u32, height: u32) -> Result<FrameBuffer> {
        if width == 0 || height == 0 || src.width == 0 || src.height == 0 {
            anyhow::bail!(
                "Étirement impossible {}×{} → {width}×{height}",
                src.width,
                src.height
            );
        }
        let mut dst = FrameBuffer::new(width, height);
        if src.width == width && src.height == height {
            dst.copy_from(src);
            return Ok(dst);
        }

        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image =
            Image::from_slice_u8(src.width, src.height, &mut self.src_buf, PixelType::U8x4)
                .with_context(|| format!("Source invalide {}×{}", src.width, src.height))?;
        let mut dst_image = Image::from_slice_u8(width, height, &mut dst.data, PixelType::U8x4)
            .with_context(|| format!("Destination invalide {width}×{height}"))?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Redimensionnement impossible")?;

        Ok(dst)
    }
}

impl Default for Stretcher {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot stretch.
///
/// # Errors
/// Same as [`Stretcher::stretch`].
pub fn stretch_to(src: &FrameBuffer, width: u32, height: u32) -> Result<FrameBuffer> {
    Stretcher::new().stretch(src, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_core::color::Rgb;

    #[test]
    fn same_size_is_a_copy() {
        let src = FrameBuffer::filled(5, 4, Rgb::new(9, 8, 7));
        assert_eq!(stretch_to(&src, 5, 4).unwrap(), src);
    }

    #[test]
    fn opaque_stays_opaque_and_transparent_stays_transparent() {
        let opaque = FrameBuffer::filled(8, 8, Rgb::new(200, 10, 10));
        let up = stretch_to(&opaque, 32, 20).unwrap();
        assert!(up.data.chunks_exact(4).all(|px| px[3] == 255));

        let clear = FrameBuffer::new(8, 8);
        let up = stretch_to(&clear, 17, 9).unwrap();
        assert!(up.data.chunks_exact(4).all(|px| px[3] == 0));
    }

    #[test]
    fn empty_target_is_an_error() {
        let src = FrameBuffer::filled(2, 2, Rgb::WHITE);
        assert!(stretch_to(&src, 0, 10).is_err());
    }
}
