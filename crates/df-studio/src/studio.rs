use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use df_core::chord::{PanelKey, PanelToggle};
use df_core::clock::{AnimationClock, AnimationState, MonotonicTime, TimeSource};
use df_core::color::hex_to_rgb;
use df_core::config::{MAX_CANVAS_EDGE, MIN_DURATION_MS, StudioConfig};
use df_core::debounce::Debouncer;
use df_core::error::CoreError;
use df_core::frame::FrameBuffer;
use df_core::interpolate::{Easing, interpolate_params};
use df_core::params::{DotFilterParams, Keyframes, ParamsPatch};
use df_core::source::RenderSource;
use df_export::error::ExportError;
use df_export::job::Exporter;
use df_export::sequence::{ExportReport, SceneRenderer, SequenceSettings};
use df_export::still::ExportBlob;
use df_render::renderer::{RenderRequest, Renderer};

use crate::input::{AspectPreset, FALLBACK_HEIGHT, FALLBACK_WIDTH, parse_dimension, parse_duration};

/// Which keyframe an edit targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyframeSlot {
    /// Parameters at progress 0.
    Start,
    /// Parameters at progress 1.
    End,
}

/// Couche d'orchestration : tient l'état de l'atelier et décide quand rendre.
///
/// The hosting UI calls the setters as the user edits controls, then
/// [`frame`](Self::frame) once per display frame. Rendering only happens
/// there (or on export), never as a side effect of a setter.
///
/// Parameter edits are coalesced by a debouncer; source, size, keyframe and
/// playback changes take effect on the next frame.
pub struct Studio<T: TimeSource + Clone = MonotonicTime> {
    text: String,
    image: Option<Arc<FrameBuffer>>,
    width: u32,
    height: u32,
    params: DotFilterParams,
    edits: Debouncer<DotFilterParams>,
    keyframes: Keyframes,
    easing: Easing,
    clock: AnimationClock<T>,
    time: T,
    panel: PanelToggle,
    renderer: Renderer,
    exporter: Exporter,
    dirty: bool,
}

impl Studio<MonotonicTime> {
    /// Studio on wall-clock time.
    ///
    /// # Errors
    /// Returns an error if a configured font cannot be loaded.
    pub fn new(config: &StudioConfig) -> Result<Self> {
        Self::with_time_source(config, MonotonicTime::new())
    }
}

impl<T: TimeSource + Clone> Studio<T> {
    /// Studio reading time from `time`.
    ///
    /// # Errors
    /// Returns an error if a configured font cannot be loaded.
    pub fn with_time_source(config: &StudioConfig, time: T) -> Result<Self> {
        let renderer = Renderer::from_config(config).context("Initialisation du rendu")?;
        Ok(Self::with_renderer(config, renderer, time))
    }

    /// Studio around an already built renderer.
    pub fn with_renderer(config: &StudioConfig, renderer: Renderer, time: T) -> Self {
        let mut config = config.clone();
        config.clamp_all();
        let panel = if config.require_chord {
            PanelToggle::chorded(config.chord_window_ms)
        } else {
            PanelToggle::plain()
        };
        Self {
            text: config.text.clone(),
            image: None,
            width: config.canvas_width,
            height: config.canvas_height,
            params: config.params,
            edits: Debouncer::new(config.debounce_ms),
            keyframes: config.keyframes,
            easing: config.easing,
            clock: AnimationClock::with_time_source(config.duration_ms, time.clone()),
            time,
            panel,
            renderer,
            exporter: Exporter::from_config(&config),
            dirty: true,
        }
    }

    // === Source ===

    /// Active source: the image when one is loaded, the text otherwise.
    #[must_use]
    pub fn source(&self) -> RenderSource {
        match &self.image {
            Some(pixels) => RenderSource::Image {
                pixels: Arc::clone(pixels),
            },
            None => RenderSource::text(self.text.clone()),
        }
    }

    /// Current text (kept while an image is active).
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text source.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.dirty |= self.image.is_none();
    }

    /// Load an image file as the active source.
    ///
    /// # Errors
    /// Returns an error if the file cannot be decoded; the previous source stays.
    pub fn load_image(&mut self, path: &Path) -> Result<()> {
        let frame = df_source::image::load_image(path)?;
        self.set_image(frame);
        Ok(())
    }

    /// Use uploaded bytes as the active source.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a supported image.
    pub fn set_image_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let frame = df_source::image::decode_image(bytes)?;
        self.set_image(frame);
        Ok(())
    }

    /// Use decoded pixels as the active source.
    pub fn set_image(&mut self, frame: FrameBuffer) {
        log::info!("Source image {}×{}", frame.width, frame.height);
        self.image = Some(Arc::new(frame));
        self.dirty = true;
    }

    /// Back to the text source.
    pub fn clear_image(&mut self) {
        if self.image.take().is_some() {
            self.dirty = true;
        }
    }

    /// `true` while an image is the active source.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    // === Paramètres ===

    /// Committed live parameters. An edit inside its debounce window is not
    /// reflected yet.
    #[must_use]
    pub fn params(&self) -> DotFilterParams {
        self.params
    }

    /// Merge `patch` over the latest parameters; committed after the
    /// debounce window.
    pub fn update_params(&mut self, patch: ParamsPatch) {
        let base = self.edits.flush().unwrap_or(self.params);
        let next = base.apply(patch);
        self.edits.submit(next, self.time.now_ms());
    }

    /// Color edit from text (`#rgb`, `#rrggbb`).
    ///
    /// # Errors
    /// [`CoreError::InvalidColor`]; the current color stays.
    pub fn set_color_hex(&mut self, hex: &str) -> Result<(), CoreError> {
        let color = hex_to_rgb(hex)?;
        self.update_params(ParamsPatch {
            color: Some(color),
            ..ParamsPatch::default()
        });
        Ok(())
    }

    /// Restore the default live parameters, dropping pending edits.
    pub fn reset_params(&mut self) {
        let _ = self.edits.flush();
        self.params = DotFilterParams::default();
        self.dirty = true;
    }

    /// Start/end keyframes.
    #[must_use]
    pub fn keyframes(&self) -> Keyframes {
        self.keyframes
    }

    /// Replace one keyframe.
    pub fn set_keyframe(&mut self, slot: KeyframeSlot, params: DotFilterParams) {
        let params = params.clamped();
        match slot {
            KeyframeSlot::Start => self.keyframes.start = params,
            KeyframeSlot::End => self.keyframes.end = params,
        }
        self.dirty |= self.clock.is_playing();
    }

    /// Merge `patch` into one keyframe.
    pub fn update_keyframe(&mut self, slot: KeyframeSlot, patch: ParamsPatch) {
        let current = match slot {
            KeyframeSlot::Start => self.keyframes.start,
            KeyframeSlot::End => self.keyframes.end,
        };
        self.set_keyframe(slot, current.apply(patch));
    }

    /// Easing between keyframes.
    #[must_use]
    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Select the easing.
    pub fn set_easing(&mut self, easing: Easing) {
        self.easing = easing;
        self.dirty |= self.clock.is_playing();
    }

    /// Select the easing by name (`linear`, `easeInOutCubic`, ...).
    ///
    /// # Errors
    /// [`CoreError::UnknownEasing`]; the current easing stays.
    pub fn set_easing_name(&mut self, name: &str) -> Result<(), CoreError> {
        self.set_easing(name.parse()?);
        Ok(())
    }

    /// Parameters the next render uses: interpolated while playing, live
    /// otherwise.
    #[must_use]
    pub fn active_params(&self) -> DotFilterParams {
        if self.clock.is_playing() {
            interpolate_params(
                &self.keyframes.start,
                &self.keyframes.end,
                self.clock.progress(),
                self.easing,
            )
        } else {
            self.params
        }
    }

    // === Surface ===

    /// Surface size in pixels.
    #[must_use]
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Resize the surface, each edge kept within `1..=8192`.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        let width = width.clamp(1, MAX_CANVAS_EDGE);
        let height = height.clamp(1, MAX_CANVAS_EDGE);
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.dirty = true;
        }
    }

    /// Resize from form fields; unreadable input falls back to 800×600.
    pub fn set_canvas_size_text(&mut self, width: &str, height: &str) {
        self.set_canvas_size(
            parse_dimension(width, FALLBACK_WIDTH),
            parse_dimension(height, FALLBACK_HEIGHT),
        );
    }

    /// Apply an aspect preset; `Custom` keeps the current size.
    pub fn apply_aspect(&mut self, preset: AspectPreset) {
        if let Some((width, height)) = preset.size() {
            self.set_canvas_size(width, height);
        }
    }

    // === Animation ===

    /// Loop duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> u32 {
        self.clock.duration_ms()
    }

    /// Set the loop duration (at least 500 ms).
    pub fn set_duration_ms(&mut self, duration_ms: u32) {
        self.clock.set_duration_ms(duration_ms.max(MIN_DURATION_MS));
    }

    /// Duration from a form field: `max(500, value or 1000)`.
    pub fn set_duration_text(&mut self, text: &str) {
        self.set_duration_ms(parse_duration(text));
    }

    /// Start or resume playback.
    pub fn play(&mut self) {
        self.clock.play();
        self.dirty = true;
    }

    /// Freeze playback. The surface switches back to live parameters.
    pub fn pause(&mut self) {
        if self.clock.is_playing() {
            self.clock.pause();
            self.dirty = true;
        }
    }

    /// Play/pause button.
    pub fn toggle_play(&mut self) {
        if self.clock.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Stop and rewind to progress 0.
    pub fn stop(&mut self) {
        self.dirty |= self.clock.is_playing();
        self.clock.stop();
    }

    /// Scrub to `progress` (clamped to `[0, 1]`).
    pub fn seek(&mut self, progress: f64) {
        self.clock.seek(progress);
        self.dirty |= self.clock.is_playing();
    }

    /// Playback snapshot.
    #[must_use]
    pub fn animation_state(&self) -> AnimationState {
        self.clock.state()
    }

    // === Rendu ===

    /// Rappel par frame d'affichage : avance l'horloge, valide les éditions
    /// dont la fenêtre est écoulée, et rend si quelque chose a changé.
    ///
    /// Returns the new surface when a render happened, `None` when the
    /// previous one is still current.
    ///
    /// # Errors
    /// The render error (e.g. text without a font). The studio does not
    /// retry until something changes.
    pub fn frame(&mut self) -> Result<Option<&FrameBuffer>> {
        if self.clock.tick().is_some() {
            self.dirty = true;
        }
        if let Some(params) = self.edits.poll(self.time.now_ms()) {
            self.params = params;
            self.dirty |= !self.clock.is_playing();
        }
        if !self.dirty {
            return Ok(None);
        }
        self.dirty = false;
        self.render_active().map(Some)
    }

    /// Commit pending edits and render right away.
    ///
    /// # Errors
    /// The render error.
    pub fn render_now(&mut self) -> Result<&FrameBuffer> {
        if let Some(params) = self.edits.flush() {
            self.params = params;
        }
        self.dirty = false;
        self.render_active()
    }

    fn render_active(&mut self) -> Result<&FrameBuffer> {
        let source = self.source();
        let params = self.active_params();
        self.renderer.render(&RenderRequest {
            source: &source,
            width: self.width,
            height: self.height,
            params,
        })
    }

    /// Last rendered surface, `None` before the first successful render.
    #[must_use]
    pub fn capture(&self) -> Option<&FrameBuffer> {
        self.renderer.capture()
    }

    // === Export ===

    /// PNG of the surface, re-rendered with the active parameters first.
    ///
    /// # Errors
    /// [`ExportError::NothingToCapture`] when rendering is impossible and
    /// nothing was rendered before, or the encoder's error.
    pub fn export_png(&mut self) -> Result<ExportBlob, ExportError> {
        if let Err(e) = self.render_now() {
            log::warn!("Rendu avant capture impossible : {e:#}");
        }
        self.exporter.export_still(self.renderer.capture())
    }

    /// Render the keyframe animation and start encoding it as a GIF.
    ///
    /// `progress` receives the rendered fraction. Collect the file with
    /// [`poll_export`](Self::poll_export) or [`wait_export`](Self::wait_export).
    ///
    /// # Errors
    /// See [`Exporter::start_gif`].
    pub fn start_gif_export<P>(&mut self, progress: P) -> Result<ExportReport, ExportError>
    where
        P: FnMut(f64),
    {
        let source = self.source();
        let sequence = SequenceSettings {
            keyframes: self.keyframes,
            easing: self.easing,
            duration_ms: self.clock.duration_ms(),
        };
        let mut scene = SceneRenderer {
            renderer: &mut self.renderer,
            source: &source,
            width: self.width,
            height: self.height,
        };
        // The export leaves its last frame on the surface.
        self.dirty = true;
        self.exporter
            .start_gif(&mut scene, &sequence, progress)
            .cloned()
    }

    /// `true` while a GIF has not been collected.
    #[must_use]
    pub fn export_busy(&self) -> bool {
        self.exporter.is_busy()
    }

    /// Non-blocking check on the GIF export.
    pub fn poll_export(&mut self) -> Option<Result<ExportBlob, ExportError>> {
        self.exporter.poll()
    }

    /// Block until the GIF export finishes.
    pub fn wait_export(&mut self) -> Option<Result<ExportBlob, ExportError>> {
        self.exporter.wait()
    }

    // === Panneau ===

    /// Feed a keypress to the panel toggle. Returns `true` when it flipped.
    pub fn handle_key(&mut self, key: PanelKey) -> bool {
        self.panel.handle(key, self.time.now_ms())
    }

    /// Flip the panel directly.
    pub fn toggle_panel(&mut self) {
        self.panel.flip();
    }

    /// `true` when the control panel is shown.
    #[must_use]
    pub fn panel_visible(&self) -> bool {
        self.panel.is_visible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_core::clock::{ManualTime, PlaybackState};
    use df_core::color::Rgb;

    fn studio() -> (Studio<ManualTime>, ManualTime) {
        let time = ManualTime::default();
        let config = StudioConfig {
            seed: Some(11),
            ..StudioConfig::default()
        };
        let renderer = Renderer::new(None, Some(11));
        let mut studio = Studio::with_renderer(&config, renderer, time.clone());
        // Image sources need no font.
        studio.set_image(FrameBuffer::filled(4, 4, Rgb::BLACK));
        (studio, time)
    }

    #[test]
    fn first_frame_renders_then_idles() {
        let (mut s, _) = studio();
        let frame = s.frame().unwrap().unwrap();
        assert_eq!((frame.width, frame.height), (800, 600));
        assert!(s.frame().unwrap().is_none());
    }

    #[test]
    fn edits_wait_for_the_debounce_window() {
        let (mut s, time) = studio();
        s.frame().unwrap();
        s.update_params(ParamsPatch {
            density: Some(0.2),
            ..ParamsPatch::default()
        });
        time.advance(50.0);
        s.update_params(ParamsPatch {
            size: Some(8.0),
            ..ParamsPatch::default()
        });
        time.advance(60.0);
        assert!(s.frame().unwrap().is_none());
        time.advance(50.0);
        assert!(s.frame().unwrap().is_some());
        assert_eq!(s.params().density, 0.2);
        assert_eq!(s.params().size, 8.0);
    }

    #[test]
    fn reset_drops_pending_edits() {
        let (mut s, time) = studio();
        s.update_params(ParamsPatch {
            density: Some(0.1),
            ..ParamsPatch::default()
        });
        s.reset_params();
        time.advance(500.0);
        s.frame().unwrap();
        assert_eq!(s.params(), DotFilterParams::default());
    }

    #[test]
    fn playing_uses_interpolated_params() {
        let (mut s, time) = studio();
        s.set_easing(Easing::Linear);
        assert_eq!(s.active_params(), s.params());
        s.play();
        time.advance(2500.0);
        s.frame().unwrap();
        let expected = interpolate_params(
            &s.keyframes().start,
            &s.keyframes().end,
            0.5,
            Easing::Linear,
        );
        assert_eq!(s.active_params(), expected);
        assert_eq!(s.animation_state().progress, 0.5);

        s.pause();
        assert_eq!(s.animation_state().progress, 0.5);
        assert_eq!(s.active_params(), s.params());
        s.stop();
        assert_eq!(s.clock.playback(), PlaybackState::Stopped);
        assert_eq!(s.animation_state().progress, 0.0);
    }

    #[test]
    fn play_then_pause_keeps_progress() {
        let (mut s, time) = studio();
        s.seek(0.3);
        s.toggle_play();
        s.toggle_play();
        time.advance(1000.0);
        assert!((s.animation_state().progress - 0.3).abs() < 1e-9);
    }

    #[test]
    fn form_inputs_fall_back() {
        let (mut s, _) = studio();
        s.set_canvas_size_text("abc", "");
        assert_eq!(s.canvas_size(), (800, 600));
        s.apply_aspect(AspectPreset::Portrait);
        assert_eq!(s.canvas_size(), (450, 800));
        s.apply_aspect(AspectPreset::Custom);
        assert_eq!(s.canvas_size(), (450, 800));
        s.set_duration_text("nope");
        assert_eq!(s.duration_ms(), 1000);
        s.set_duration_ms(10);
        assert_eq!(s.duration_ms(), 500);
        assert!(s.set_color_hex("#zzz").is_err());
        assert!(s.set_easing_name("bounce").is_err());
        s.set_easing_name("easeOutQuad").unwrap();
        assert_eq!(s.easing(), Easing::EaseOutQuad);
    }

    #[test]
    fn still_export_matches_surface_size() {
        let (mut s, _) = studio();
        s.apply_aspect(AspectPreset::Square);
        s.set_color_hex("3B82F6").unwrap();
        let blob = s.export_png().unwrap();
        assert_eq!(blob.filename, "dot-filter-600x600.png");
        let decoded = image::load_from_memory(&blob.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (600, 600));
        let mut colors: Vec<[u8; 4]> = decoded.pixels().map(|p| p.0).collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors, vec![[0x3b, 0x82, 0xf6, 255], [255, 255, 255, 255]]);
    }

    #[test]
    fn text_without_font_has_nothing_to_capture() {
        let time = ManualTime::default();
        let mut s = Studio::with_renderer(
            &StudioConfig::default(),
            Renderer::new(None, Some(1)),
            time,
        );
        assert!(s.frame().is_err());
        assert!(matches!(s.export_png(), Err(ExportError::NothingToCapture)));
    }

    #[test]
    fn default_studio_renders_its_text() {
        let time = ManualTime::default();
        let config = StudioConfig {
            canvas_width: 320,
            canvas_height: 200,
            seed: Some(5),
            ..StudioConfig::default()
        };
        let mut s = Studio::with_time_source(&config, time).unwrap();
        assert!(!s.has_image());
        assert!(s.frame().unwrap().is_some());
        let blob = s.export_png().unwrap();
        assert_eq!(blob.filename, "dot-filter-320x200.png");
    }

    #[cfg(feature = "gif")]
    #[test]
    fn gif_export_through_the_studio() {
        let (mut s, _) = studio();
        s.set_canvas_size(40, 30);
        s.set_duration_ms(1000);
        let report = s.start_gif_export(|_| {}).unwrap();
        assert_eq!(report.total_frames, 20);
        assert!(s.export_busy());
        assert!(matches!(
            s.start_gif_export(|_| {}),
            Err(ExportError::Busy)
        ));
        let blob = s.wait_export().unwrap().unwrap();
        assert_eq!(blob.filename, "dot-filter-40x30.gif");
        assert!(!s.export_busy());
    }

    #[cfg(not(feature = "gif"))]
    #[test]
    fn gif_export_is_unavailable_without_the_feature() {
        let (mut s, _) = studio();
        assert!(matches!(
            s.start_gif_export(|_| {}),
            Err(ExportError::Unavailable)
        ));
        assert!(!s.export_busy());
        assert!(s.export_png().is_ok());
    }

    #[test]
    fn chorded_panel_toggle() {
        let time = ManualTime::default();
        let config = StudioConfig {
            require_chord: true,
            ..StudioConfig::default()
        };
        let mut s = Studio::with_renderer(&config, Renderer::new(None, Some(1)), time.clone());
        assert!(s.panel_visible());
        assert!(!s.handle_key(PanelKey::Toggle));
        s.handle_key(PanelKey::Marker);
        time.advance(400.0);
        assert!(s.handle_key(PanelKey::Toggle));
        assert!(!s.panel_visible());
        s.handle_key(PanelKey::Marker);
        time.advance(1500.0);
        assert!(!s.handle_key(PanelKey::Toggle));
    }
}
