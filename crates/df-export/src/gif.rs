use df_core::frame::FrameBuffer;

use crate::error::ExportError;

/// Vitesse du quantizer par défaut (1 = meilleure qualité, 30 = plus rapide).
pub const DEFAULT_GIF_SPEED: i32 = 10;

/// `true` when this build can encode animated exports.
pub const GIF_AVAILABLE: bool = cfg!(feature = "gif");

/// Résultat d'un encodage GIF.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedGif {
    /// GIF file content.
    pub bytes: Vec<u8>,
    /// Width of the first frame.
    pub width: u32,
    /// Height of the first frame.
    pub height: u32,
    /// Frames encoded.
    pub frames: usize,
}

/// Encode des frames RGBA en GIF bouclant à l'infini, au fil de l'eau.
///
/// Every frame gets the same `delay_ms`. Frames are consumed one by one so
/// the iterator may be a channel fed by a renderer.
///
/// # Errors
/// [`ExportError::NoFrames`] for an empty sequence,
/// [`ExportError::Unavailable`] without the `gif` feature, or the codec's
/// error.
///
/// # Example
/// ```
/// use df_core::frame::FrameBuffer;
/// use df_export::gif::encode_gif;
/// let frames = vec![FrameBuffer::new(4, 4), FrameBuffer::new(4, 4)];
/// let gif = encode_gif(frames, 50, 10).unwrap();
/// assert_eq!(gif.frames, 2);
/// ```
#[cfg(feature = "gif")]
pub fn encode_gif<I>(frames: I, delay_ms: u32, speed: i32) -> Result<EncodedGif, ExportError>
where
    I: IntoIterator<Item = FrameBuffer>,
{
    use anyhow::Context;
    use image::codecs::gif::{GifEncoder, Repeat};
    use image::{Delay, Frame, RgbaImage};

    let mut bytes = Vec::new();
    let mut size = None;
    let mut count = 0;
    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, speed.clamp(1, 30));
        encoder.set_repeat(Repeat::Infinite)?;
        for fb in frames {
            let (width, height) = (fb.width, fb.height);
            let image = RgbaImage::from_raw(width, height, fb.data)
                .with_context(|| format!("Frame RGBA incohérente {width}×{height}"))?;
            let delay = Delay::from_numer_denom_ms(delay_ms, 1);
            encoder.encode_frame(Frame::from_parts(image, 0, 0, delay))?;
            size.get_or_insert((width, height));
            count += 1;
        }
    }

    let (width, height) = size.ok_or(ExportError::NoFrames)?;
    Ok(EncodedGif {
        bytes,
        width,
        height,
        frames: count,
    })
}

/// Without the `gif` feature there is no encoder.
///
/// # Errors
/// Always [`ExportError::Unavailable`].
#[cfg(not(feature = "gif"))]
pub fn encode_gif<I>(_frames: I, _delay_ms: u32, _speed: i32) -> Result<EncodedGif, ExportError>
where
    I: IntoIterator<Item = FrameBuffer>,
{
    Err(ExportError::Unavailable)
}

#[cfg(all(test, feature = "gif"))]
mod tests {
    use super::*;
    use df_core::color::Rgb;
    use image::AnimationDecoder;
    use image::codecs::gif::GifDecoder;
    use std::io::Cursor;

    #[test]
    fn frames_and_delays_survive_decoding() {
        let frames = vec![
            FrameBuffer::filled(6, 5, Rgb::WHITE),
            FrameBuffer::filled(6, 5, Rgb::new(59, 130, 246)),
            FrameBuffer::filled(6, 5, Rgb::BLACK),
        ];
        let gif = encode_gif(frames, 50, DEFAULT_GIF_SPEED).unwrap();
        assert_eq!((gif.width, gif.height, gif.frames), (6, 5, 3));

        let decoded = GifDecoder::new(Cursor::new(gif.bytes))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap();
        assert_eq!(decoded.len(), 3);
        for frame in &decoded {
            let (numer, denom) = frame.delay().numer_denom_ms();
            assert_eq!(numer / denom, 50);
            assert_eq!(frame.buffer().dimensions(), (6, 5));
        }
    }

    #[test]
    fn empty_sequence_is_no_frames() {
        assert!(matches!(
            encode_gif(Vec::new(), 50, 10),
            Err(ExportError::NoFrames)
        ));
    }
}
