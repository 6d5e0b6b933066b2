use thiserror::Error;

/// Errors originating from the export pipeline.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Animated export was compiled out (feature `gif` disabled).
    #[error("Export animé indisponible : encodeur GIF absent de cette build")]
    Unavailable,

    /// Another export has not been collected yet.
    #[error("Un export est déjà en cours")]
    Busy,

    /// Every frame of the sequence failed to render.
    #[error("Aucune frame rendue : rien à encoder")]
    NoFrames,

    /// Still capture requested before any successful render.
    #[error("Rien à capturer : aucun rendu effectué")]
    NothingToCapture,

    /// The background encode job stopped without reporting.
    #[error("Tâche d'encodage interrompue")]
    Interrupted,

    /// Codec failure.
    #[error("Erreur d'encodage : {0}")]
    Encode(#[from] image::ImageError),

    /// Anything else (thread spawn, inconsistent buffer).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
