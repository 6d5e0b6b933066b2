use crate::color::Rgb;
use crate::traits::PixelSampler;

/// Buffer de pixels RGBA, row-major, 4 octets par pixel.
///
/// Sert à la fois de surface visible et de buffer d'échantillonnage.
///
/// # Example
/// ```
/// use df_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Pixels RGBA, row-major, 4 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Crée un buffer transparent (tout à zéro) aux dimensions données.
    ///
    /// # Example
    /// ```
    /// use df_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(100, 50);
    /// assert_eq!(fb.width, 100);
    /// assert_eq!(fb.height, 50);
    /// assert_eq!(fb.data.len(), 100 * 50 * 4);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Buffer rempli d'une couleur opaque.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let mut fb = Self::new(width, height);
        fb.fill(color.to_rgba());
        fb
    }

    /// Wrap existing RGBA bytes. Returns `None` if the length does not match.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize * 4).then_some(Self {
            data,
            width,
            height,
        })
    }

    /// Overwrite every pixel.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Accès au pixel (x, y) → [r, g, b, a]. Hors bornes → transparent.
    ///
    /// # Example
    /// ```
    /// use df_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(10, 10);
    /// assert_eq!(fb.pixel(0, 0), [0, 0, 0, 0]);
    /// assert_eq!(fb.pixel(10, 0), [0, 0, 0, 0]);
    /// ```
    #[inline]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Écrit un pixel. Hors bornes → ignoré.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// Copy `other` into this buffer. No-op if dimensions differ.
    #[inline]
    pub fn copy_from(&mut self, other: &FrameBuffer) {
        if self.width == other.width && self.height == other.height {
            self.data.copy_from_slice(&other.data);
        }
    }

    /// Distinct RGBA values present, sorted. Meant for inspection in tests
    /// and diagnostics.
    #[must_use]
    pub fn distinct_colors(&self) -> Vec<[u8; 4]> {
        let mut colors: Vec<[u8; 4]> = self
            .data
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
            .collect();
        colors.sort_unstable();
        colors.dedup();
        colors
    }
}

impl PixelSampler for FrameBuffer {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn sample(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixel(x, y)
    }
}
