/// Visual source modules for dot-filter (image decoding and scaling).

pub mod image;
pub mod resize;

pub use crate::image::{decode_image, load_image, load_source};
pub use crate::resize::{Stretcher, stretch_to};
