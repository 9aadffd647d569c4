//! Debounce and throttle timers.
//!
//! Both are pure state machines over caller-supplied timestamps. The caller
//! owns the actual timer (a `setTimeout`, a frame tick, a test loop) and asks
//! them when to act.

/// Delays an action until no signal has arrived for a quiet period.
///
/// Each [`signal`](Debouncer::signal) re-arms the deadline and replaces the
/// pending payload; [`poll`](Debouncer::poll) yields the latest payload once
/// the deadline has passed.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet_ms: f64,
    pending: Option<(f64, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet_ms: f64) -> Self {
        Self {
            quiet_ms,
            pending: None,
        }
    }

    pub fn signal(&mut self, now: f64, value: T) {
        self.pending = Some((now + self.quiet_ms, value));
    }

    /// When the pending action becomes due, if any.
    pub fn deadline(&self) -> Option<f64> {
        self.pending.as_ref().map(|(at, _)| *at)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the payload if the quiet period has elapsed.
    pub fn poll(&mut self, now: f64) -> Option<T> {
        match &self.pending {
            Some((at, _)) if now >= *at => self.pending.take().map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Admits at most one call per window.
#[derive(Debug, Clone)]
pub struct Throttle {
    window_ms: f64,
    open_at: Option<f64>,
}

impl Throttle {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            open_at: None,
        }
    }

    /// `true` if a call at `now` may proceed; closes the window if so.
    pub fn ready(&mut self, now: f64) -> bool {
        match self.open_at {
            Some(at) if now < at => false,
            _ => {
                self.open_at = Some(now + self.window_ms);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_fires_once_after_quiet_period() {
        let mut d = Debouncer::new(250.0);
        d.signal(0.0, 1);
        d.signal(100.0, 2);
        assert_eq!(d.poll(300.0), None);
        assert_eq!(d.deadline(), Some(350.0));
        assert_eq!(d.poll(350.0), Some(2));
        assert_eq!(d.poll(1000.0), None);
    }

    #[test]
    fn test_debounce_cancel() {
        let mut d = Debouncer::new(10.0);
        d.signal(0.0, ());
        d.cancel();
        assert!(!d.is_pending());
        assert_eq!(d.poll(100.0), None);
    }

    #[test]
    fn test_throttle_admits_one_per_window() {
        let mut t = Throttle::new(100.0);
        assert!(t.ready(0.0));
        assert!(!t.ready(50.0));
        assert!(!t.ready(99.9));
        assert!(t.ready(100.0));
        assert!(!t.ready(150.0));
    }
}
