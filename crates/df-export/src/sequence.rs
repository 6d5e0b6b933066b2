use anyhow::Result;
use df_core::frame::FrameBuffer;
use df_core::interpolate::{Easing, interpolate_params};
use df_core::params::{DotFilterParams, Keyframes};
use df_core::source::RenderSource;
use df_core::traits::RandomSource;
use df_render::renderer::{RenderRequest, Renderer};

/// Cadence des exports animés.
pub const DEFAULT_EXPORT_FPS: u32 = 20;

/// Découpage d'une boucle en frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramePlan {
    /// `max(1, round(duration_s · fps))`.
    pub total_frames: usize,
    /// `round(1000 / fps)` milliseconds per frame.
    pub delay_ms: u32,
}

impl FramePlan {
    /// Normalised time of frame `index`: `index / total_frames`.
    #[must_use]
    pub fn time_of(&self, index: usize) -> f64 {
        index as f64 / self.total_frames as f64
    }
}

/// Plan for a loop of `duration_ms` at `fps` (0 is treated as 1).
///
/// # Example
/// ```
/// use df_export::sequence::plan_frames;
/// let plan = plan_frames(5000, 20);
/// assert_eq!((plan.total_frames, plan.delay_ms), (100, 50));
/// ```
#[must_use]
pub fn plan_frames(duration_ms: u32, fps: u32) -> FramePlan {
    let fps = f64::from(fps.max(1));
    let total = (f64::from(duration_ms) / 1000.0 * fps).round().max(1.0);
    FramePlan {
        total_frames: total as usize,
        delay_ms: (1000.0 / fps).round() as u32,
    }
}

/// Ce qu'il faut pour dérouler une animation : keyframes, easing, durée.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequenceSettings {
    /// Start/end parameter sets.
    pub keyframes: Keyframes,
    /// Easing between them.
    pub easing: Easing,
    /// Loop duration.
    pub duration_ms: u32,
}

impl SequenceSettings {
    /// Parameters of the frame at normalised time `t`.
    #[must_use]
    pub fn params_at(&self, t: f64) -> DotFilterParams {
        interpolate_params(&self.keyframes.start, &self.keyframes.end, t, self.easing)
    }
}

/// Rend une frame pour un jeu de paramètres donné.
///
/// Implémenté par : [`SceneRenderer`]. Les tests fournissent des
/// implémentations qui enregistrent les paramètres reçus.
pub trait FrameRenderer {
    /// Render synchronously and return the finished surface.
    ///
    /// # Errors
    /// Any render failure; the pipeline skips the frame and carries on.
    fn render_frame(&mut self, params: &DotFilterParams) -> Result<&FrameBuffer>;
}

/// A [`Renderer`] bound to one source and surface size.
pub struct SceneRenderer<'a, R: RandomSource> {
    /// Render command owner.
    pub renderer: &'a mut Renderer<R>,
    /// Source stippled on every frame.
    pub source: &'a RenderSource,
    /// Surface width.
    pub width: u32,
    /// Surface height.
    pub height: u32,
}

impl<R: RandomSource> FrameRenderer for SceneRenderer<'_, R> {
    fn render_frame(&mut self, params: &DotFilterParams) -> Result<&FrameBuffer> {
        self.renderer.render(&RenderRequest {
            source: self.source,
            width: self.width,
            height: self.height,
            params: *params,
        })
    }
}

/// Bilan d'un export animé.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Frames planned.
    pub total_frames: usize,
    /// Delay given to every frame.
    pub delay_ms: u32,
    /// Frames handed to the encoder.
    pub frames_written: usize,
    /// Indices of frames whose render failed.
    pub skipped: Vec<usize>,
}

/// Déroule le plan frame par frame, de façon synchrone.
///
/// For each index `i` the parameters are exactly `sequence.params_at(i / total)`;
/// the rendered surface is copied into a capture buffer and handed to
/// `append`. A frame whose render fails is skipped. `append` returning
/// `false` stops the loop (encoder gone). `progress` receives the fraction
/// of frames processed, in `(0, 1]`.
pub fn render_sequence<F, A, P>(
    renderer: &mut F,
    sequence: &SequenceSettings,
    plan: FramePlan,
    mut append: A,
    mut progress: P,
) -> ExportReport
where
    F: FrameRenderer + ?Sized,
    A: FnMut(FrameBuffer) -> bool,
    P: FnMut(f64),
{
    let mut report = ExportReport {
        total_frames: plan.total_frames,
        delay_ms: plan.delay_ms,
        ..ExportReport::default()
    };

    for index in 0..plan.total_frames {
        let params = sequence.params_at(plan.time_of(index));
        match renderer.render_frame(&params) {
            Ok(surface) => {
                let capture = surface.clone();
                if !append(capture) {
                    log::warn!("Encodeur fermé à la frame {index}, arrêt du rendu");
                    break;
                }
                report.frames_written += 1;
            }
            Err(e) => {
                log::warn!("Frame {index} ignorée : {e:#}");
                report.skipped.push(index);
            }
        }
        progress((index + 1) as f64 / plan.total_frames as f64);
    }
    report
}
