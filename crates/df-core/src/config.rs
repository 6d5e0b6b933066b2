use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::interpolate::Easing;
use crate::params::{DotFilterParams, Keyframes};

/// Shortest loop the animation controls accept, in milliseconds.
pub const MIN_DURATION_MS: u32 = 500;
/// Largest surface edge accepted from configuration.
pub const MAX_CANVAS_EDGE: u32 = 8192;

/// Configuration complète du studio.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use df_core::config::StudioConfig;
/// let config = StudioConfig::default();
/// assert_eq!((config.canvas_width, config.canvas_height), (800, 600));
/// assert_eq!(config.export_fps, 20);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StudioConfig {
    // === Canvas ===
    /// Surface width in pixels.
    pub canvas_width: u32,
    /// Surface height in pixels.
    pub canvas_height: u32,
    /// Initial text source.
    pub text: String,

    // === Filtre ===
    /// Live (non-animated) parameters.
    pub params: DotFilterParams,

    // === Animation ===
    /// Start/end keyframes.
    pub keyframes: Keyframes,
    /// Easing applied between keyframes.
    pub easing: Easing,
    /// Loop duration in milliseconds.
    pub duration_ms: u32,

    // === Export ===
    /// Frames per second of animated exports.
    pub export_fps: u32,
    /// GIF quantizer speed, 1 (best) to 30 (fastest).
    pub gif_speed: i32,

    // === Rendu ===
    /// TrueType/OpenType font for text sources. `None` = system discovery,
    /// then the bundled font.
    pub font_path: Option<PathBuf>,
    /// Text size in pixels (em size).
    pub text_size: f32,
    /// Fixed RNG seed. `None` = entropy.
    pub seed: Option<u64>,

    // === UI ===
    /// Coalescing window for parameter edits, in ms.
    pub debounce_ms: f64,
    /// Chord window for the panel toggle, in ms.
    pub chord_window_ms: f64,
    /// Require the marker key before the panel toggle key.
    pub require_chord: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 600,
            text: "Mycelium".to_string(),
            params: DotFilterParams::default(),
            keyframes: Keyframes::default(),
            easing: Easing::EaseInOutCubic,
            duration_ms: 5000,
            export_fps: 20,
            gif_speed: 10,
            font_path: None,
            text_size: 64.0,
            seed: None,
            debounce_ms: crate::debounce::DEBOUNCE_MS,
            chord_window_ms: crate::chord::CHORD_WINDOW_MS,
            require_chord: false,
        }
    }
}

impl StudioConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.canvas_width = self.canvas_width.clamp(1, MAX_CANVAS_EDGE);
        self.canvas_height = self.canvas_height.clamp(1, MAX_CANVAS_EDGE);
        self.params = self.params.clamped();
        self.keyframes.start = self.keyframes.start.clamped();
        self.keyframes.end = self.keyframes.end.clamped();
        self.duration_ms = self.duration_ms.max(MIN_DURATION_MS);
        self.export_fps = self.export_fps.clamp(1, 60);
        self.gif_speed = self.gif_speed.clamp(1, 30);
        self.text_size = if self.text_size.is_finite() {
            self.text_size.clamp(4.0, 512.0)
        } else {
            64.0
        };
        self.debounce_ms = crate::interpolate::clamp(self.debounce_ms, 0.0, 2000.0);
        self.chord_window_ms = crate::interpolate::clamp(self.chord_window_ms, 0.0, 10_000.0);
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    canvas: Option<CanvasSection>,
    params: Option<ParamsSection>,
    animation: Option<AnimationSection>,
    export: Option<ExportSection>,
    render: Option<RenderSection>,
}

#[derive(Deserialize)]
struct CanvasSection {
    width: Option<u32>,
    height: Option<u32>,
    text: Option<String>,
}

/// Partial parameter set, used for `[params]` and both keyframes.
#[derive(Deserialize)]
struct ParamsSection {
    density: Option<f64>,
    size: Option<f64>,
    spacing: Option<f64>,
    color: Option<Rgb>,
}

impl ParamsSection {
    fn merge_into(self, base: DotFilterParams) -> DotFilterParams {
        DotFilterParams {
            density: self.density.unwrap_or(base.density),
            size: self.size.unwrap_or(base.size),
            spacing: self.spacing.unwrap_or(base.spacing),
            color: self.color.unwrap_or(base.color),
        }
    }
}

#[derive(Deserialize)]
struct AnimationSection {
    duration_ms: Option<u32>,
    easing: Option<Easing>,
    start: Option<ParamsSection>,
    end: Option<ParamsSection>,
}

#[derive(Deserialize)]
struct ExportSection {
    fps: Option<u32>,
    gif_speed: Option<i32>,
}

#[derive(Deserialize)]
struct RenderSection {
    font_path: Option<PathBuf>,
    text_size: Option<f32>,
    seed: Option<u64>,
    debounce_ms: Option<f64>,
    chord_window_ms: Option<f64>,
    require_chord: Option<bool>,
}

/// Parse a TOML document and merge it over the defaults.
///
/// # Errors
/// Returns an error if the TOML is malformed or has unknown sections.
///
/// # Example
/// ```
/// use df_core::config::parse_config;
/// let config = parse_config("[canvas]\nwidth = 600\nheight = 600").unwrap();
/// assert_eq!(config.canvas_width, 600);
/// assert_eq!(config.duration_ms, 5000);
/// ```
pub fn parse_config(content: &str) -> Result<StudioConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut config = StudioConfig::default();

    if let Some(c) = file.canvas {
        if let Some(v) = c.width {
            config.canvas_width = v;
        }
        if let Some(v) = c.height {
            config.canvas_height = v;
        }
        if let Some(v) = c.text {
            config.text = v;
        }
    }

    if let Some(p) = file.params {
        config.params = p.merge_into(config.params);
    }

    if let Some(a) = file.animation {
        if let Some(v) = a.duration_ms {
            config.duration_ms = v;
        }
        if let Some(v) = a.easing {
            config.easing = v;
        }
        if let Some(v) = a.start {
            config.keyframes.start = v.merge_into(config.keyframes.start);
        }
        if let Some(v) = a.end {
            config.keyframes.end = v.merge_into(config.keyframes.end);
        }
    }

    if let Some(e) = file.export {
        if let Some(v) = e.fps {
            config.export_fps = v;
        }
        if let Some(v) = e.gif_speed {
            config.gif_speed = v;
        }
    }

    if let Some(r) = file.render {
        if let Some(v) = r.font_path {
            config.font_path = Some(v);
        }
        if let Some(v) = r.text_size {
            config.text_size = v;
        }
        if let Some(v) = r.seed {
            config.seed = Some(v);
        }
        if let Some(v) = r.debounce_ms {
            config.debounce_ms = v;
        }
        if let Some(v) = r.chord_window_ms {
            config.chord_window_ms = v;
        }
        if let Some(v) = r.require_chord {
            config.require_chord = v;
        }
    }

    config.clamp_all();
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use df_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<StudioConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config =
        parse_config(&content).with_context(|| format!("Configuration {}", path.display()))?;
    log::debug!("Configuration chargée depuis {}", path.display());
    Ok(config)
}

/// Load `path` when given, falling back to defaults (with a warning) when it
/// cannot be read or parsed.
#[must_use]
pub fn load_config_or_default(path: Option<&Path>) -> StudioConfig {
    let Some(path) = path else {
        return StudioConfig::default();
    };
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Configuration ignorée ({e:#}), valeurs par défaut utilisées.");
            StudioConfig::default()
        }
    }
}
