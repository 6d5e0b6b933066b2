use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// A color string that is neither `#rgb` nor `#rrggbb`.
    #[error("Couleur invalide : {value}")]
    InvalidColor {
        /// The rejected input.
        value: String,
    },

    /// Unknown easing name.
    #[error("Easing inconnu : {name}")]
    UnknownEasing {
        /// The rejected name.
        name: String,
    },

    /// Invalid width/height dimensions.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },
}
