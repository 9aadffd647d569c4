//! Time facilities.
//!
//! All timestamps are milliseconds as `f64`, the unit the browser hands to
//! frame callbacks. [`Clock`] abstracts the time source so timers, counters and
//! the assistant's latency can be driven by a [`ManualClock`] in tests.
//!
//! # Example
//!
//! ```ignore
//! use folio::time::FrameTime;
//!
//! let mut time = FrameTime::new();
//!
//! // In your frame callback:
//! time.update(timestamp_ms);
//!
//! println!("Delta: {:.2}ms", time.delta());
//! println!("FPS: {:.1}", time.fps());
//! ```

use std::cell::Cell;

use web_time::Instant;

/// A monotonic millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`web_time::Instant`], usable on wasm and native.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Frame timing fed by frame-callback timestamps.
///
/// Tracks elapsed time, delta time, frame count and FPS. While paused (page
/// hidden) updates are ignored, and the first update after resuming reports a
/// zero delta so the hidden interval is not folded into motion.
#[derive(Debug)]
pub struct FrameTime {
    /// Timestamp of the first frame.
    start: Option<f64>,
    /// Timestamp of the last frame.
    last_frame: Option<f64>,
    /// Time spent paused, excluded from `elapsed`.
    paused_total: f64,
    paused_at: Option<f64>,
    elapsed: f64,
    delta: f64,
    frame_count: u64,
    fps: f64,
    fps_frame_count: u64,
    fps_update_time: f64,
    fps_update_interval: f64,
}

impl FrameTime {
    pub fn new() -> Self {
        Self {
            start: None,
            last_frame: None,
            paused_total: 0.0,
            paused_at: None,
            elapsed: 0.0,
            delta: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: 0.0,
            fps_update_interval: 500.0,
        }
    }

    /// Record a frame at `now`. Returns `(elapsed, delta)` in milliseconds.
    pub fn update(&mut self, now: f64) -> (f64, f64) {
        if self.paused_at.is_some() {
            self.delta = 0.0;
            return (self.elapsed, self.delta);
        }

        let start = match self.start {
            Some(start) => start,
            None => {
                self.start = Some(now);
                self.fps_update_time = now;
                now
            }
        };
        self.delta = self.last_frame.map_or(0.0, |last| (now - last).max(0.0));
        self.last_frame = Some(now);
        self.elapsed = (now - start - self.paused_total).max(0.0);
        self.frame_count += 1;

        let since_fps = now - self.fps_update_time;
        if since_fps >= self.fps_update_interval {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f64 * 1000.0 / since_fps;
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed, self.delta)
    }

    /// Stop time progression at `now`.
    pub fn pause(&mut self, now: f64) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Resume after [`pause`](Self::pause).
    pub fn resume(&mut self, now: f64) {
        if let Some(at) = self.paused_at.take() {
            if self.start.is_some() {
                self.paused_total += (now - at).max(0.0);
            }
            // The next update starts a fresh delta.
            self.last_frame = None;
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }
    }

    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_time_new() {
        let time = FrameTime::new();
        assert_eq!(time.frame(), 0);
        assert!(!time.is_paused());
    }

    #[test]
    fn test_frame_time_update() {
        let mut time = FrameTime::new();
        assert_eq!(time.update(100.0), (0.0, 0.0));
        let (elapsed, delta) = time.update(116.0);
        assert_eq!(elapsed, 16.0);
        assert_eq!(delta, 16.0);
        assert_eq!(time.frame(), 2);
    }

    #[test]
    fn test_pause_excludes_hidden_interval() {
        let mut time = FrameTime::new();
        time.update(0.0);
        time.update(10.0);

        time.pause(10.0);
        assert!(time.is_paused());
        time.update(500.0);
        assert_eq!(time.elapsed(), 10.0);
        assert_eq!(time.delta(), 0.0);

        time.resume(1010.0);
        let (_, delta) = time.update(1010.0);
        assert_eq!(delta, 0.0);
        let (elapsed, delta) = time.update(1020.0);
        assert_eq!(delta, 10.0);
        assert_eq!(elapsed, 20.0);
    }

    #[test]
    fn test_fps_estimate() {
        let mut time = FrameTime::new();
        for i in 0..=60 {
            time.update(i as f64 * 1000.0 / 60.0);
        }
        assert!((time.fps() - 60.0).abs() < 2.0);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(5.0);
        clock.advance(10.0);
        assert_eq!(clock.now_ms(), 15.0);
        clock.set(1.0);
        assert_eq!(clock.now_ms(), 1.0);
    }
}
