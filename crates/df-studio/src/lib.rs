/// Orchestration layer for dot-filter.
///
/// [`Studio`] holds what a control panel edits (source, live parameters,
/// keyframes, playback, surface size) and turns it into explicit render and
/// export commands.

pub mod input;
pub mod studio;

pub use input::{AspectPreset, parse_dimension, parse_duration};
pub use studio::{KeyframeSlot, Studio};
