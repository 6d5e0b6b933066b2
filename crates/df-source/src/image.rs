use std::path::Path;

use anyhow::{Context, Result};
use df_core::frame::FrameBuffer;
use df_core::source::RenderSource;

fn into_frame(img: &image::DynamicImage) -> Result<FrameBuffer> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        anyhow::bail!("Image vide ({width}×{height})");
    }
    FrameBuffer::from_rgba(width, height, rgba.into_raw()).context("Buffer RGBA incohérent")
}

/// Charge une image depuis le disque (PNG, JPEG, BMP, GIF) en RGBA.
///
/// # Errors
/// Returns an error if the image cannot be read or decoded, or is empty.
///
/// # Example
/// ```no_run
/// use df_source::image::load_image;
/// use std::path::Path;
/// let frame = load_image(Path::new("logo.png")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<FrameBuffer> {
    let img = image::open(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    let frame = into_frame(&img).with_context(|| path.display().to_string())?;
    log::debug!(
        "Image chargée {} ({}×{})",
        path.display(),
        frame.width,
        frame.height
    );
    Ok(frame)
}

/// Décode une image reçue en mémoire (fichier téléversé).
///
/// The format is guessed from the content.
///
/// # Errors
/// Returns an error if the bytes are not a supported image, or the image is empty.
pub fn decode_image(bytes: &[u8]) -> Result<FrameBuffer> {
    let img = image::load_from_memory(bytes).context("Image téléversée illisible")?;
    into_frame(&img)
}

/// Load `path` straight into an image [`RenderSource`].
///
/// # Errors
/// Same as [`load_image`].
pub fn load_source(path: &Path) -> Result<RenderSource> {
    load_image(path).map(RenderSource::image)
}
