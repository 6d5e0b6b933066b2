use std::thread;

use anyhow::Context;
use df_core::config::StudioConfig;
use df_core::frame::FrameBuffer;
use flume::{Receiver, Sender, TryRecvError};

use crate::error::ExportError;
use crate::gif::{DEFAULT_GIF_SPEED, GIF_AVAILABLE, encode_gif};
use crate::sequence::{
    DEFAULT_EXPORT_FPS, ExportReport, FrameRenderer, SequenceSettings, plan_frames, render_sequence,
};
use crate::still::{ExportBlob, ExportFormat, export_png};

type JobResult = Result<ExportBlob, ExportError>;

/// Frames rendered ahead of the encoder. The render loop blocks when full.
pub const FRAME_QUEUE: usize = 4;

/// Export animé en cours d'encodage sur un thread dédié.
///
/// Toutes les frames ont déjà été rendues quand on obtient ce handle ;
/// seul l'encodage continue en arrière-plan.
pub struct PendingExport {
    result_rx: Receiver<JobResult>,
    report: ExportReport,
    handle: Option<thread::JoinHandle<()>>,
}

impl PendingExport {
    /// What the render loop did.
    #[must_use]
    pub fn report(&self) -> &ExportReport {
        &self.report
    }

    /// Non-blocking: `Some` once the encoder has finished.
    pub fn try_take(&mut self) -> Option<JobResult> {
        match self.result_rx.try_recv() {
            Ok(result) => {
                self.join();
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.join();
                Some(Err(ExportError::Interrupted))
            }
        }
    }

    /// Block until the encoder has finished.
    ///
    /// # Errors
    /// The encoder's error, or [`ExportError::Interrupted`] if its thread died.
    pub fn wait(mut self) -> JobResult {
        let result = self
            .result_rx
            .recv()
            .unwrap_or(Err(ExportError::Interrupted));
        self.join();
        result
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::error!("Thread d'encodage GIF paniqué");
        }
    }
}

/// Thread d'encodage : il consomme les frames au fil du rendu.
struct EncoderJob {
    frame_tx: Sender<FrameBuffer>,
    result_rx: Receiver<JobResult>,
    handle: thread::JoinHandle<()>,
}

impl EncoderJob {
    fn spawn(delay_ms: u32, speed: i32) -> Result<Self, ExportError> {
        let (frame_tx, frame_rx) = flume::bounded::<FrameBuffer>(FRAME_QUEUE);
        let (result_tx, result_rx) = flume::bounded::<JobResult>(1);

        let handle = thread::Builder::new()
            .name("df-gif-encode".to_string())
            .spawn(move || {
                let result = encode_gif(frame_rx, delay_ms, speed).map(|gif| {
                    log::info!(
                        "GIF encodé : {} frames {}×{} ({} octets)",
                        gif.frames,
                        gif.width,
                        gif.height,
                        gif.bytes.len()
                    );
                    ExportBlob::new(ExportFormat::Gif, gif.width, gif.height, gif.bytes)
                });
                let _ = result_tx.send(result);
            })
            .context("Impossible de lancer le thread d'encodage GIF")?;

        Ok(Self {
            frame_tx,
            result_rx,
            handle,
        })
    }
}

/// Point d'entrée des exports : image fixe, ou GIF avec un seul encodage
/// en vol à la fois.
///
/// A finished GIF stays pending until collected with [`poll`](Self::poll)
/// or [`wait`](Self::wait); until then new animated requests get
/// [`ExportError::Busy`].
pub struct Exporter {
    fps: u32,
    gif_speed: i32,
    pending: Option<PendingExport>,
}

impl Exporter {
    /// Exporter at `fps` with quantizer `gif_speed` (clamped to 1..=30).
    #[must_use]
    pub fn new(fps: u32, gif_speed: i32) -> Self {
        Self {
            fps: fps.max(1),
            gif_speed: gif_speed.clamp(1, 30),
            pending: None,
        }
    }

    /// Settings from the `[export]` section.
    #[must_use]
    pub fn from_config(config: &StudioConfig) -> Self {
        Self::new(config.export_fps, config.gif_speed)
    }

    /// Frames per second of animated exports.
    #[must_use]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// `true` while an animated export has not been collected.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Report of the export in flight.
    #[must_use]
    pub fn pending_report(&self) -> Option<&ExportReport> {
        self.pending.as_ref().map(PendingExport::report)
    }

    /// Still capture of the last rendered surface.
    ///
    /// # Errors
    /// See [`export_png`].
    pub fn export_still(&self, capture: Option<&FrameBuffer>) -> Result<ExportBlob, ExportError> {
        export_png(capture)
    }

    /// Rend toutes les frames de l'animation puis lance l'encodage GIF.
    ///
    /// Rendering is synchronous on the calling thread; encoding proceeds on
    /// a background thread as frames arrive. Returns the render report once
    /// every frame has been handed over.
    ///
    /// # Errors
    /// [`ExportError::Busy`] if an export is still pending,
    /// [`ExportError::Unavailable`] without GIF support,
    /// [`ExportError::NoFrames`] when every frame failed, or the encoder's
    /// error if it stopped early.
    pub fn start_gif<F, P>(
        &mut self,
        renderer: &mut F,
        sequence: &SequenceSettings,
        progress: P,
    ) -> Result<&ExportReport, ExportError>
    where
        F: FrameRenderer + ?Sized,
        P: FnMut(f64),
    {
        if self.pending.is_some() {
            return Err(ExportError::Busy);
        }
        if !GIF_AVAILABLE {
            return Err(ExportError::Unavailable);
        }

        let plan = plan_frames(sequence.duration_ms, self.fps);
        log::info!(
            "Export GIF : {} frames à {} ms ({} ms, {:?})",
            plan.total_frames,
            plan.delay_ms,
            sequence.duration_ms,
            sequence.easing
        );

        let job = EncoderJob::spawn(plan.delay_ms, self.gif_speed)?;
        let report = render_sequence(
            renderer,
            sequence,
            plan,
            |frame| job.frame_tx.send(frame).is_ok(),
            progress,
        );
        // Closing the channel lets the encoder finish the file.
        drop(job.frame_tx);

        let pending = PendingExport {
            result_rx: job.result_rx,
            report,
            handle: Some(job.handle),
        };
        if pending.report.frames_written == 0 {
            let _ = pending.wait();
            return Err(ExportError::NoFrames);
        }
        if pending.report.frames_written + pending.report.skipped.len() < plan.total_frames {
            // The encoder hung up mid-sequence: surface its error now.
            return Err(match pending.wait() {
                Err(e) => e,
                Ok(_) => ExportError::Interrupted,
            });
        }
        if !pending.report.skipped.is_empty() {
            log::warn!(
                "Export GIF partiel : {} frame(s) ignorée(s) sur {}",
                pending.report.skipped.len(),
                plan.total_frames
            );
        }

        Ok(&self.pending.insert(pending).report)
    }

    /// Non-blocking check on the pending export; frees the slot when done.
    pub fn poll(&mut self) -> Option<JobResult> {
        let result = self.pending.as_mut()?.try_take()?;
        self.pending = None;
        Some(result)
    }

    /// Block on the pending export, if any, and free the slot.
    pub fn wait(&mut self) -> Option<JobResult> {
        self.pending.take().map(PendingExport::wait)
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_FPS, DEFAULT_GIF_SPEED)
    }
}
