/// Data model, interpolation, timing and configuration for dot-filter.
///
/// This crate contains all shared types, traits, and configuration logic
/// used across the dot-filter workspace. Everything here is pure or
/// driven by an injected clock, so it can be tested without a display.

pub mod chord;
pub mod clock;
pub mod color;
pub mod config;
pub mod debounce;
pub mod error;
pub mod frame;
pub mod interpolate;
pub mod params;
pub mod random;
pub mod source;
pub mod traits;

pub use clock::{AnimationClock, AnimationState, PlaybackState, progress_at};
pub use color::Rgb;
pub use config::StudioConfig;
pub use error::CoreError;
pub use frame::FrameBuffer;
pub use interpolate::{Easing, interpolate_color, interpolate_params};
pub use params::{DotFilterParams, Keyframes, ParamsPatch};
pub use source::RenderSource;
