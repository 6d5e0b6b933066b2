/// Default window between the marker key and the toggle key.
pub const CHORD_WINDOW_MS: f64 = 1000.0;

/// Reconnaisseur d'accord temporisé : une touche « marqueur » puis la touche
/// de bascule dans la fenêtre impartie.
///
/// Accepting a toggle consumes the marker, so each toggle needs a fresh
/// marker press.
///
/// # Example
/// ```
/// use df_core::chord::KeyChord;
/// let mut chord = KeyChord::new(1000.0);
/// assert!(!chord.press_toggle(0.0));
/// chord.press_marker(100.0);
/// assert!(chord.press_toggle(900.0));
/// assert!(!chord.press_toggle(950.0));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct KeyChord {
    window_ms: f64,
    marker_at: Option<f64>,
}

impl KeyChord {
    /// Recognizer accepting toggles up to `window_ms` after the marker.
    #[must_use]
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            marker_at: None,
        }
    }

    /// Record a marker keypress at `now_ms`.
    pub fn press_marker(&mut self, now_ms: f64) {
        self.marker_at = Some(now_ms);
    }

    /// Toggle keypress at `now_ms`. Returns `true` when the chord completes.
    pub fn press_toggle(&mut self, now_ms: f64) -> bool {
        let Some(marker) = self.marker_at.take() else {
            return false;
        };
        let dt = now_ms - marker;
        (0.0..=self.window_ms).contains(&dt)
    }
}

impl Default for KeyChord {
    fn default() -> Self {
        Self::new(CHORD_WINDOW_MS)
    }
}

/// Key events the panel toggle cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelKey {
    /// The chord marker key.
    Marker,
    /// The toggle key.
    Toggle,
    /// Anything else; ignored.
    Other,
}

/// Visibilité du panneau de contrôle, basculée au clavier.
///
/// In plain mode every toggle key flips the panel; in chord mode the toggle
/// must follow the marker within the chord window. Other keys pressed in
/// between leave a pending marker alone.
#[derive(Clone, Copy, Debug)]
pub struct PanelToggle {
    visible: bool,
    chord: Option<KeyChord>,
}

impl PanelToggle {
    /// Single-key toggle, panel visible.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            visible: true,
            chord: None,
        }
    }

    /// Chorded toggle, panel visible.
    #[must_use]
    pub fn chorded(window_ms: f64) -> Self {
        Self {
            visible: true,
            chord: Some(KeyChord::new(window_ms)),
        }
    }

    /// Feed a keypress. Returns `true` when visibility changed.
    pub fn handle(&mut self, key: PanelKey, now_ms: f64) -> bool {
        let accepted = match (&mut self.chord, key) {
            (None, PanelKey::Toggle) => true,
            (Some(chord), PanelKey::Marker) => {
                chord.press_marker(now_ms);
                false
            }
            (Some(chord), PanelKey::Toggle) => chord.press_toggle(now_ms),
            _ => false,
        };
        if accepted {
            self.visible = !self.visible;
        }
        accepted
    }

    /// Flip visibility directly (button click).
    pub fn flip(&mut self) {
        self.visible = !self.visible;
    }

    /// `true` when the panel is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Default for PanelToggle {
    fn default() -> Self {
        Self::plain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_outside_window_is_rejected() {
        let mut chord = KeyChord::default();
        chord.press_marker(0.0);
        assert!(!chord.press_toggle(1000.5));
    }

    #[test]
    fn marker_is_consumed_even_on_rejection() {
        let mut chord = KeyChord::default();
        chord.press_marker(0.0);
        assert!(!chord.press_toggle(5000.0));
        assert!(!chord.press_toggle(5001.0));
    }

    #[test]
    fn window_edge_is_inclusive() {
        let mut chord = KeyChord::new(1000.0);
        chord.press_marker(2000.0);
        assert!(chord.press_toggle(3000.0));
    }

    #[test]
    fn plain_panel_flips_on_every_toggle() {
        let mut panel = PanelToggle::plain();
        assert!(panel.handle(PanelKey::Toggle, 0.0));
        assert!(!panel.is_visible());
        assert!(!panel.handle(PanelKey::Marker, 1.0));
        assert!(panel.handle(PanelKey::Toggle, 2.0));
        assert!(panel.is_visible());
    }

    #[test]
    fn chorded_panel_needs_marker_first() {
        let mut panel = PanelToggle::chorded(1000.0);
        assert!(!panel.handle(PanelKey::Toggle, 0.0));
        assert!(panel.is_visible());
        panel.handle(PanelKey::Marker, 10.0);
        assert!(panel.handle(PanelKey::Toggle, 200.0));
        assert!(!panel.is_visible());
    }

    #[test]
    fn other_keys_between_marker_and_toggle_are_ignored() {
        let mut panel = PanelToggle::chorded(1000.0);
        panel.handle(PanelKey::Marker, 0.0);
        assert!(!panel.handle(PanelKey::Other, 10.0));
        assert!(!panel.handle(PanelKey::Other, 30.0));
        assert!(panel.handle(PanelKey::Toggle, 400.0));
        assert!(!panel.is_visible());
    }
}
