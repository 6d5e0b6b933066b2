use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Source de temps en millisecondes, monotone.
///
/// Le clock d'animation lit l'heure à travers ce trait pour que les tests
/// puissent piloter le temps à la main.
pub trait TimeSource {
    /// Current time in milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> f64;
}

/// Wall-clock time measured from the moment of construction.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    /// Start measuring from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Horloge manuelle. Les clones partagent le même instant courant.
///
/// # Example
/// ```
/// use df_core::clock::{ManualTime, TimeSource};
/// let time = ManualTime::default();
/// let handle = time.clone();
/// handle.advance(250.0);
/// assert_eq!(time.now_ms(), 250.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualTime {
    now: Rc<Cell<f64>>,
}

impl ManualTime {
    /// Move time forward by `ms`.
    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    /// Jump to an absolute time.
    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl TimeSource for ManualTime {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Position normalisée [0, 1) dans une boucle de `duration_ms`.
///
/// Pure: usable outside the live loop, e.g. to sample frames for export.
/// Wraps exactly at every multiple of `duration_ms`; a zero duration always
/// yields 0.
///
/// # Example
/// ```
/// use df_core::clock::progress_at;
/// assert_eq!(progress_at(0.0, 5000), 0.0);
/// assert_eq!(progress_at(1250.0, 5000), 0.25);
/// assert_eq!(progress_at(5000.0, 5000), 0.0);
/// ```
#[inline]
#[must_use]
pub fn progress_at(elapsed_ms: f64, duration_ms: u32) -> f64 {
    if duration_ms == 0 || !elapsed_ms.is_finite() {
        return 0.0;
    }
    let d = f64::from(duration_ms);
    elapsed_ms.rem_euclid(d) / d
}

/// Playback state of the animation loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Progress is 0 and does not advance.
    #[default]
    Stopped,
    /// Progress holds its last value.
    Paused,
    /// Progress follows wall-clock time.
    Playing,
}

/// Instantané de l'état d'animation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    /// `true` while playing.
    pub is_playing: bool,
    /// Loop period in milliseconds.
    pub duration_ms: u32,
    /// Position in the loop [0.0, 1.0].
    pub progress: f64,
}

/// Horloge d'animation : play / pause / stop / seek sur une boucle.
///
/// While playing, each [`tick`](Self::tick) recomputes progress from the
/// anchor, chosen at play time as `now - progress * duration` so resuming
/// never jumps back to 0.
///
/// # Example
/// ```
/// use df_core::clock::{AnimationClock, ManualTime};
/// let time = ManualTime::default();
/// let mut clock = AnimationClock::with_time_source(1000, time.clone());
/// clock.play();
/// time.advance(250.0);
/// assert_eq!(clock.tick(), Some(0.25));
/// ```
#[derive(Debug)]
pub struct AnimationClock<T: TimeSource = MonotonicTime> {
    time: T,
    state: PlaybackState,
    duration_ms: u32,
    progress: f64,
    /// Instant (ms) correspondant à progress = 0 pour la lecture en cours.
    anchor_ms: Option<f64>,
}

impl AnimationClock<MonotonicTime> {
    /// Stopped clock on wall-clock time.
    #[must_use]
    pub fn new(duration_ms: u32) -> Self {
        Self::with_time_source(duration_ms, MonotonicTime::new())
    }
}

impl<T: TimeSource> AnimationClock<T> {
    /// Stopped clock reading time from `time`.
    #[must_use]
    pub fn with_time_source(duration_ms: u32, time: T) -> Self {
        Self {
            time,
            state: PlaybackState::Stopped,
            duration_ms,
            progress: 0.0,
            anchor_ms: None,
        }
    }

    /// Start or resume playback, preserving the current progress.
    pub fn play(&mut self) {
        if self.state == PlaybackState::Playing {
            return;
        }
        self.reanchor(self.time.now_ms());
        self.state = PlaybackState::Playing;
    }

    /// Freeze progress at its value at this instant. No-op unless playing.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.sample();
        self.anchor_ms = None;
        self.state = PlaybackState::Paused;
    }

    /// Play when paused or stopped, pause when playing.
    pub fn toggle(&mut self) {
        if self.state == PlaybackState::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Back to progress 0, dropping the time anchor.
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.progress = 0.0;
        self.anchor_ms = None;
    }

    /// Set progress directly (clamped to [0, 1]); valid in any state.
    /// While playing, playback continues from the new position.
    pub fn seek(&mut self, progress: f64) {
        self.progress = crate::interpolate::clamp(progress, 0.0, 1.0);
        if self.state == PlaybackState::Playing {
            self.reanchor(self.time.now_ms());
        }
    }

    /// Change the loop period. The anchor is kept, so only the modulus of
    /// subsequent ticks changes.
    pub fn set_duration_ms(&mut self, duration_ms: u32) {
        self.duration_ms = duration_ms;
    }

    /// Per-frame callback. Returns the fresh progress while playing, `None`
    /// otherwise.
    pub fn tick(&mut self) -> Option<f64> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        Some(self.sample())
    }

    fn sample(&mut self) -> f64 {
        let now = self.time.now_ms();
        let anchor = *self.anchor_ms.get_or_insert(now);
        self.progress = progress_at(now - anchor, self.duration_ms);
        self.progress
    }

    fn reanchor(&mut self, now: f64) {
        self.anchor_ms = Some(now - self.progress * f64::from(self.duration_ms));
    }

    /// Current playback state.
    #[inline]
    #[must_use]
    pub fn playback(&self) -> PlaybackState {
        self.state
    }

    /// `true` while playing.
    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Last computed progress.
    #[inline]
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Loop period in milliseconds.
    #[inline]
    #[must_use]
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Snapshot for the presentation layer.
    #[must_use]
    pub fn state(&self) -> AnimationState {
        AnimationState {
            is_playing: self.is_playing(),
            duration_ms: self.duration_ms,
            progress: self.progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(duration_ms: u32) -> (AnimationClock<ManualTime>, ManualTime) {
        let time = ManualTime::default();
        time.set(10_000.0);
        (
            AnimationClock::with_time_source(duration_ms, time.clone()),
            time,
        )
    }

    #[test]
    fn progress_wraps_at_period_boundaries() {
        assert_eq!(progress_at(5000.0, 5000), progress_at(0.0, 5000));
        assert_eq!(progress_at(10_000.0, 5000), 0.0);
        assert_eq!(progress_at(7500.0, 5000), 0.5);
        assert_eq!(progress_at(123.0, 0), 0.0);
        assert_eq!(progress_at(f64::NAN, 5000), 0.0);
    }

    #[test]
    fn progress_is_monotonic_within_a_period() {
        let mut last = -1.0;
        for ms in (0..5000).step_by(7) {
            let p = progress_at(f64::from(ms), 5000);
            assert!(p >= last);
            assert!((0.0..1.0).contains(&p));
            last = p;
        }
    }

    #[test]
    fn playing_advances_and_loops() {
        let (mut c, time) = clock(1000);
        assert_eq!(c.tick(), None);
        c.play();
        assert_eq!(c.tick(), Some(0.0));
        time.advance(400.0);
        assert_eq!(c.tick(), Some(0.4));
        time.advance(800.0);
        let p = c.tick().unwrap();
        assert!((p - 0.2).abs() < 1e-9);
    }

    #[test]
    fn play_then_pause_preserves_progress() {
        let (mut c, time) = clock(2000);
        c.seek(0.37);
        c.play();
        c.pause();
        assert!((c.progress() - 0.37).abs() < 1e-9);
        assert_eq!(c.playback(), PlaybackState::Paused);

        time.advance(500.0);
        assert_eq!(c.tick(), None);
        assert!((c.progress() - 0.37).abs() < 1e-9);
    }

    #[test]
    fn resume_continues_from_paused_value() {
        let (mut c, time) = clock(1000);
        c.play();
        time.advance(300.0);
        c.pause();
        time.advance(10_000.0);
        c.play();
        time.advance(100.0);
        let p = c.tick().unwrap();
        assert!((p - 0.4).abs() < 1e-9);
    }

    #[test]
    fn stop_resets_progress() {
        let (mut c, time) = clock(1000);
        c.play();
        time.advance(600.0);
        c.tick();
        c.stop();
        assert_eq!(c.progress(), 0.0);
        assert_eq!(c.playback(), PlaybackState::Stopped);
        c.play();
        time.advance(100.0);
        assert!((c.tick().unwrap() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn seek_is_clamped_and_valid_while_playing() {
        let (mut c, time) = clock(1000);
        c.seek(4.0);
        assert_eq!(c.progress(), 1.0);
        c.seek(-1.0);
        assert_eq!(c.progress(), 0.0);

        c.play();
        time.advance(100.0);
        c.seek(0.5);
        time.advance(100.0);
        assert!((c.tick().unwrap() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn duration_change_keeps_anchor() {
        let (mut c, time) = clock(1000);
        c.play();
        time.advance(1500.0);
        c.set_duration_ms(2000);
        // Elapsed is still 1500 ms, now measured against a 2000 ms loop.
        assert!((c.tick().unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn pause_outside_playing_is_noop() {
        let (mut c, _time) = clock(1000);
        c.pause();
        assert_eq!(c.playback(), PlaybackState::Stopped);
        c.toggle();
        assert!(c.is_playing());
        c.toggle();
        assert_eq!(c.playback(), PlaybackState::Paused);
    }

    #[test]
    fn state_snapshot() {
        let (mut c, _time) = clock(5000);
        c.seek(0.25);
        let s = c.state();
        assert!(!s.is_playing);
        assert_eq!(s.duration_ms, 5000);
        assert_eq!(s.progress, 0.25);
    }
}
