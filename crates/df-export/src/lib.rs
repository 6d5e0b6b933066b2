/// Export pipeline for dot-filter: PNG still capture and animated GIF.
///
/// Frames are rendered synchronously through [`sequence::FrameRenderer`];
/// the GIF encoder runs as a single background job.

pub mod error;
pub mod gif;
pub mod job;
pub mod sequence;
pub mod still;

pub use error::ExportError;
pub use job::{Exporter, PendingExport};
pub use sequence::{
    ExportReport, FramePlan, FrameRenderer, SceneRenderer, SequenceSettings, plan_frames,
    render_sequence,
};
pub use still::{ExportBlob, ExportFormat, encode_png, export_png};
