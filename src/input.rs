//! Pointer tracking.
//!
//! The backdrop reacts to the pointer only while the user is interacting:
//! after `idle_timeout_ms` without movement the pointer reads as absent, so
//! residual influence does not linger where the cursor was left.

use glam::Vec2;

/// Last known pointer position with an idle timeout.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    position: Option<Vec2>,
    last_move: f64,
    idle_timeout_ms: f64,
}

impl PointerTracker {
    pub fn new(idle_timeout_ms: f64) -> Self {
        Self {
            position: None,
            last_move: 0.0,
            idle_timeout_ms,
        }
    }

    /// Record pointer movement to `position` (surface pixels) at `now`.
    pub fn moved(&mut self, position: Vec2, now: f64) {
        self.position = Some(position);
        self.last_move = now;
    }

    /// The pointer left the surface.
    pub fn leave(&mut self) {
        self.position = None;
    }

    /// Pointer position, or `None` when absent or idle past the timeout.
    pub fn position(&self, now: f64) -> Option<Vec2> {
        self.position
            .filter(|_| now - self.last_move < self.idle_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_absent_initially() {
        let pointer = PointerTracker::new(3000.0);
        assert_eq!(pointer.position(0.0), None);
    }

    #[test]
    fn test_pointer_idle_timeout() {
        let mut pointer = PointerTracker::new(3000.0);
        pointer.moved(Vec2::new(10.0, 20.0), 1000.0);
        assert_eq!(pointer.position(3999.0), Some(Vec2::new(10.0, 20.0)));
        assert_eq!(pointer.position(4000.0), None);

        pointer.moved(Vec2::new(1.0, 1.0), 5000.0);
        assert_eq!(pointer.position(5001.0), Some(Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn test_pointer_leave() {
        let mut pointer = PointerTracker::new(3000.0);
        pointer.moved(Vec2::ONE, 0.0);
        pointer.leave();
        assert_eq!(pointer.position(1.0), None);
    }
}
