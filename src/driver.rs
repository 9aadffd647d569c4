//! Animation driver.
//!
//! The per-frame callback re-schedules itself after each frame. That loop is
//! modelled as a two-state machine so it can be started, stopped and
//! single-stepped:
//!
//! ```text
//!   Stopped --start()--> Running { pending }
//!   Running --frame(pending)--> Running { next }
//!   Running --stop()--> Stopped
//! ```
//!
//! Only the frame whose handle is currently pending runs. A callback that was
//! cancelled but fired anyway, or one left over from a previous `start()`, is
//! ignored, so there is never more than one live callback chain.

use std::collections::VecDeque;

use tracing::{debug, trace};

/// Identifies one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Something that can run a callback on the next display refresh.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// A scheduler that queues frames until the caller fires them.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    queue: VecDeque<FrameHandle>,
    /// Total frames ever requested.
    pub requested: u64,
    /// Total frames ever cancelled.
    pub cancelled: u64,
}

impl ManualScheduler {
    /// Frames requested and not yet fired or cancelled.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Pop the oldest pending frame, as the display refresh would.
    pub fn fire_next(&mut self) -> Option<FrameHandle> {
        self.queue.pop_front()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.queue.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.queue.len();
        self.queue.retain(|h| *h != handle);
        if self.queue.len() < before {
            self.cancelled += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverState {
    Stopped,
    Running { pending: FrameHandle },
}

/// Start/stop state machine around the frame loop.
#[derive(Debug)]
pub struct AnimationDriver {
    state: DriverState,
    /// Whether the page hid us while running.
    resume_on_visible: bool,
    frames: u64,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::Stopped,
            resume_on_visible: false,
            frames: 0,
        }
    }

    /// Enter Running and schedule the first frame, replacing any pending one.
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let DriverState::Running { pending } = self.state {
            scheduler.cancel_frame(pending);
        }
        let pending = scheduler.request_frame();
        self.state = DriverState::Running { pending };
        self.resume_on_visible = false;
        debug!(?pending, "animation started");
    }

    /// Cancel the pending frame and enter Stopped. Only `start()` leaves it.
    pub fn stop<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.resume_on_visible = false;
        self.halt(scheduler);
    }

    fn halt<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let DriverState::Running { pending } = self.state {
            scheduler.cancel_frame(pending);
            debug!(frames = self.frames, "animation stopped");
        }
        self.state = DriverState::Stopped;
    }

    /// Handle a page-visibility change: stop while hidden, resume when shown.
    pub fn set_visible<S: FrameScheduler + ?Sized>(&mut self, visible: bool, scheduler: &mut S) {
        if visible {
            if self.resume_on_visible {
                self.resume_on_visible = false;
                self.start(scheduler);
            }
        } else if self.is_running() {
            self.halt(scheduler);
            self.resume_on_visible = true;
        }
    }

    /// Run `frame` if `handle` is the pending frame, then schedule the next one.
    ///
    /// Returns whether the frame ran.
    pub fn on_frame<S, F>(&mut self, handle: FrameHandle, scheduler: &mut S, frame: F) -> bool
    where
        S: FrameScheduler + ?Sized,
        F: FnOnce(),
    {
        match self.state {
            DriverState::Running { pending } if pending == handle => {
                frame();
                self.frames += 1;
                // Only reschedule once the frame has completed.
                let next = scheduler.request_frame();
                self.state = DriverState::Running { pending: next };
                true
            }
            _ => {
                trace!(?handle, "ignoring stale frame");
                false
            }
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, DriverState::Running { .. })
    }

    /// Frames run since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_twice_keeps_one_chain() {
        let mut sched = ManualScheduler::default();
        let mut driver = AnimationDriver::new();

        driver.start(&mut sched);
        driver.start(&mut sched);
        assert_eq!(sched.pending(), 1);

        let mut ran = 0;
        for _ in 0..10 {
            let handle = sched.fire_next().unwrap();
            assert!(driver.on_frame(handle, &mut sched, || ran += 1));
            assert_eq!(sched.pending(), 1);
        }
        assert_eq!(ran, 10);
        assert_eq!(driver.frames(), 10);
    }

    #[test]
    fn test_stale_handle_ignored() {
        let mut sched = ManualScheduler::default();
        let mut driver = AnimationDriver::new();

        driver.start(&mut sched);
        let first = FrameHandle(1);
        driver.start(&mut sched);

        let mut ran = false;
        assert!(!driver.on_frame(first, &mut sched, || ran = true));
        assert!(!ran);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_stop_cancels_pending() {
        let mut sched = ManualScheduler::default();
        let mut driver = AnimationDriver::new();

        driver.start(&mut sched);
        let handle = sched.fire_next().unwrap();
        driver.on_frame(handle, &mut sched, || {});
        driver.stop(&mut sched);

        assert!(!driver.is_running());
        assert_eq!(sched.pending(), 0);
        assert_eq!(sched.cancelled, 1);
    }

    #[test]
    fn test_no_frames_while_stopped() {
        let mut sched = ManualScheduler::default();
        let mut driver = AnimationDriver::new();

        assert!(!driver.on_frame(FrameHandle(0), &mut sched, || panic!("must not run")));
        assert_eq!(sched.requested, 0);
    }

    #[test]
    fn test_visibility_pauses_and_resumes() {
        let mut sched = ManualScheduler::default();
        let mut driver = AnimationDriver::new();

        driver.start(&mut sched);
        driver.set_visible(false, &mut sched);
        assert!(!driver.is_running());
        assert_eq!(sched.pending(), 0);

        driver.set_visible(true, &mut sched);
        assert!(driver.is_running());
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_visible_does_not_start_stopped_driver() {
        let mut sched = ManualScheduler::default();
        let mut driver = AnimationDriver::new();

        driver.set_visible(false, &mut sched);
        driver.set_visible(true, &mut sched);
        assert!(!driver.is_running());
        assert_eq!(sched.requested, 0);
    }

    #[test]
    fn test_stop_while_hidden_stays_stopped() {
        let mut sched = ManualScheduler::default();
        let mut driver = AnimationDriver::new();

        driver.start(&mut sched);
        driver.set_visible(false, &mut sched);
        driver.stop(&mut sched);
        driver.set_visible(true, &mut sched);

        assert!(!driver.is_running());
        assert_eq!(sched.pending(), 0);

        driver.start(&mut sched);
        assert!(driver.is_running());
        assert_eq!(sched.pending(), 1);
    }
}
