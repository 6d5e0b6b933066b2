use df_core::frame::FrameBuffer;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::ExportError;

/// Les deux encodages de sortie.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    /// Lossless still image.
    Png,
    /// Looping animated image.
    Gif,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    /// MIME type offered with the download.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }

    /// `dot-filter-{width}x{height}.{ext}`.
    ///
    /// # Example
    /// ```
    /// use df_export::still::ExportFormat;
    /// assert_eq!(ExportFormat::Gif.filename(800, 600), "dot-filter-800x600.gif");
    /// ```
    #[must_use]
    pub fn filename(self, width: u32, height: u32) -> String {
        format!("dot-filter-{width}x{height}.{}", self.extension())
    }
}

/// Fichier prêt à être proposé à l'utilisateur.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportBlob {
    /// Encoded file content.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime: &'static str,
    /// Suggested download name.
    pub filename: String,
}

impl ExportBlob {
    pub(crate) fn new(format: ExportFormat, width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: format.mime(),
            filename: format.filename(width, height),
        }
    }
}

/// Encode une surface RGBA en PNG.
///
/// # Errors
/// Returns [`ExportError::Encode`] if the PNG codec fails.
pub fn encode_png(frame: &FrameBuffer) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        &frame.data,
        frame.width,
        frame.height,
        ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// Export d'une image fixe à partir de la dernière surface rendue.
///
/// # Errors
/// [`ExportError::NothingToCapture`] when `capture` is `None`, or the
/// encoder's error.
///
/// # Example
/// ```
/// use df_core::frame::FrameBuffer;
/// use df_export::still::export_png;
/// let blob = export_png(Some(&FrameBuffer::new(4, 3))).unwrap();
/// assert_eq!(blob.filename, "dot-filter-4x3.png");
/// assert!(export_png(None).is_err());
/// ```
pub fn export_png(capture: Option<&FrameBuffer>) -> Result<ExportBlob, ExportError> {
    let frame = capture.ok_or(ExportError::NothingToCapture)?;
    let bytes = encode_png(frame)?;
    log::info!(
        "Export PNG {}×{} ({} octets)",
        frame.width,
        frame.height,
        bytes.len()
    );
    Ok(ExportBlob::new(
        ExportFormat::Png,
        frame.width,
        frame.height,
        bytes,
    ))
}
