/// Default coalescing window for parameter edits.
pub const DEBOUNCE_MS: f64 = 100.0;

/// Fusionne les modifications rapides : seule la dernière valeur soumise est
/// livrée, une fois la fenêtre écoulée sans nouvelle soumission.
///
/// # Example
/// ```
/// use df_core::debounce::Debouncer;
/// let mut d = Debouncer::new(100.0);
/// d.submit(1, 0.0);
/// d.submit(2, 50.0);
/// assert_eq!(d.poll(120.0), None);
/// assert_eq!(d.poll(150.0), Some(2));
/// assert_eq!(d.poll(300.0), None);
/// ```
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    window_ms: f64,
    pending: Option<(T, f64)>,
}

impl<T> Debouncer<T> {
    /// Debouncer with a `window_ms` quiet period.
    #[must_use]
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms: window_ms.max(0.0),
            pending: None,
        }
    }

    /// Replace any pending value and restart the window at `now_ms`.
    pub fn submit(&mut self, value: T, now_ms: f64) {
        self.pending = Some((value, now_ms + self.window_ms));
    }

    /// Deliver the pending value once its deadline has passed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        match self.pending {
            Some((_, deadline)) if now_ms >= deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    /// Deliver the pending value immediately, ignoring the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    /// `true` while a value waits for its deadline.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEBOUNCE_MS)
    }
}
