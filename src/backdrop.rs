//! The animated particle backdrop.
//!
//! Ties the simulation, renderer and driver together with the viewport, the
//! pointer and debounced resizing. Platform code forwards events in and hands
//! over a [`Surface`] and a [`FrameScheduler`] each time:
//!
//! ```ignore
//! backdrop.start(&mut scheduler);
//! // on each display refresh:
//! backdrop.on_frame(handle, now, &mut scheduler, &mut surface);
//! // on window resize:
//! backdrop.resize_signal(now, Viewport::new(w, h));
//! // when the debounce timer fires:
//! backdrop.poll_resize(now, &mut surface);
//! ```

use glam::Vec2;
use tracing::info;

use crate::config::{FolioConfig, FrameClear};
use crate::driver::{AnimationDriver, FrameHandle, FrameScheduler};
use crate::input::PointerTracker;
use crate::particle::ParticleSet;
use crate::render::ProximityRenderer;
use crate::simulation::ParticleSimulation;
use crate::surface::Surface;
use crate::time::FrameTime;
use crate::viewport::{ResizeHandler, Viewport};

pub struct Backdrop {
    viewport: Viewport,
    simulation: ParticleSimulation,
    renderer: ProximityRenderer,
    driver: AnimationDriver,
    resize: ResizeHandler,
    pointer: PointerTracker,
    time: FrameTime,
    frame_clear: FrameClear,
    narrow_width: f32,
}

impl Backdrop {
    /// Build a backdrop and generate its first particle set.
    pub fn new(config: &FolioConfig, viewport: Viewport) -> Self {
        let simulation =
            ParticleSimulation::new(config.particles.clone(), config.connections.mode);
        Self::with_simulation(config, viewport, simulation)
    }

    /// Like [`new`](Self::new) with a caller-built simulation, e.g. a seeded one.
    pub fn with_simulation(
        config: &FolioConfig,
        viewport: Viewport,
        mut simulation: ParticleSimulation,
    ) -> Self {
        let count = simulation.initialize(viewport).len();
        info!(count, "particle system initialized");

        Self {
            viewport,
            simulation,
            renderer: ProximityRenderer::new(&config.connections, &config.particles),
            driver: AnimationDriver::new(),
            resize: ResizeHandler::new(config.resize_debounce_ms),
            pointer: PointerTracker::new(config.pointer.idle_timeout_ms),
            time: FrameTime::new(),
            frame_clear: config.particles.frame_clear,
            narrow_width: config.narrow_viewport_width,
        }
    }

    /// Size `surface` to the viewport and apply quality settings.
    pub fn attach<S: Surface + ?Sized>(&self, surface: &mut S) {
        let (w, h) = self.viewport.pixel_size();
        if surface.size() != (w, h) {
            surface.resize(w, h);
        }
        surface.set_image_smoothing(self.viewport.width >= self.narrow_width);
    }

    pub fn start<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) {
        self.driver.start(scheduler);
    }

    pub fn stop<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) {
        self.driver.stop(scheduler);
    }

    /// Page visibility changed.
    pub fn set_visible<F: FrameScheduler + ?Sized>(
        &mut self,
        visible: bool,
        now: f64,
        scheduler: &mut F,
    ) {
        if visible {
            self.time.resume(now);
        } else {
            self.time.pause(now);
        }
        self.driver.set_visible(visible, scheduler);
    }

    /// Display refresh callback. Runs one frame if `handle` is the pending one.
    pub fn on_frame<F, S>(
        &mut self,
        handle: FrameHandle,
        now: f64,
        scheduler: &mut F,
        surface: &mut S,
    ) -> bool
    where
        F: FrameScheduler + ?Sized,
        S: Surface + ?Sized,
    {
        let Self {
            viewport,
            simulation,
            renderer,
            driver,
            pointer,
            time,
            frame_clear,
            ..
        } = self;

        driver.on_frame(handle, scheduler, || {
            time.update(now);
            match *frame_clear {
                FrameClear::Clear => surface.clear(),
                FrameClear::Fade { alpha } => surface.fade(alpha),
            }
            simulation.step(*viewport, pointer.position(now));
            renderer.render(surface, simulation.particles());
        })
    }

    pub fn pointer_moved(&mut self, position: Vec2, now: f64) {
        self.pointer.moved(position, now);
    }

    pub fn pointer_left(&mut self) {
        self.pointer.leave();
    }

    /// Window size changed. Acted on by [`poll_resize`](Self::poll_resize)
    /// after the debounce window.
    pub fn resize_signal(&mut self, now: f64, viewport: Viewport) {
        self.resize.signal(now, viewport);
    }

    /// When the pending resize becomes due.
    pub fn resize_deadline(&self) -> Option<f64> {
        self.resize.deadline()
    }

    /// Time left until the pending resize is due, zero if overdue.
    pub fn resize_remaining(&self, now: f64) -> Option<f64> {
        self.resize.deadline().map(|at| (at - now).max(0.0))
    }

    /// Apply a debounced resize if one is due. Returns whether it applied.
    pub fn poll_resize<S: Surface + ?Sized>(&mut self, now: f64, surface: &mut S) -> bool {
        match self.resize.poll(now) {
            Some(viewport) => {
                self.apply_viewport(viewport, surface);
                true
            }
            None => false,
        }
    }

    /// Resize immediately and regenerate the particle set.
    pub fn apply_viewport<S: Surface + ?Sized>(&mut self, viewport: Viewport, surface: &mut S) {
        self.viewport = viewport;
        self.attach(surface);
        let count = self.simulation.initialize(viewport).len();
        info!(
            width = viewport.width,
            height = viewport.height,
            count,
            "viewport resized"
        );
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn particles(&self) -> &ParticleSet {
        self.simulation.particles()
    }

    pub fn simulation(&self) -> &ParticleSimulation {
        &self.simulation
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    pub fn time(&self) -> &FrameTime {
        &self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ManualScheduler;
    use crate::surface::{CommandRecorder, DrawCommand};

    fn backdrop(config: &FolioConfig) -> Backdrop {
        let sim = ParticleSimulation::new(config.particles.clone(), config.connections.mode)
            .with_seed(5);
        Backdrop::with_simulation(config, Viewport::new(800.0, 600.0), sim)
    }

    #[test]
    fn test_frame_clears_then_draws() {
        let config = FolioConfig::default();
        let mut backdrop = backdrop(&config);
        let mut sched = ManualScheduler::default();
        let mut surface = CommandRecorder::new(800, 600);

        backdrop.start(&mut sched);
        let handle = sched.fire_next().unwrap();
        assert!(backdrop.on_frame(handle, 16.0, &mut sched, &mut surface));
        assert_eq!(surface.commands[0], DrawCommand::Clear);
        assert!(surface.circles().count() >= backdrop.particles().len());
        assert_eq!(backdrop.time().frame(), 1);
    }

    #[test]
    fn test_fade_mode() {
        let mut config = FolioConfig::default();
        config.particles.frame_clear = FrameClear::Fade { alpha: 0.1 };
        let mut backdrop = backdrop(&config);
        let mut sched = ManualScheduler::default();
        let mut surface = CommandRecorder::new(800, 600);

        backdrop.start(&mut sched);
        let handle = sched.fire_next().unwrap();
        backdrop.on_frame(handle, 0.0, &mut sched, &mut surface);
        assert_eq!(surface.commands[0], DrawCommand::Fade { alpha: 0.1 });
    }

    #[test]
    fn test_two_resizes_in_window_regenerate_once() {
        let config = FolioConfig::default();
        let mut backdrop = backdrop(&config);
        let mut surface = CommandRecorder::new(800, 600);
        assert_eq!(backdrop.simulation().generation(), 1);

        backdrop.resize_signal(0.0, Viewport::new(1024.0, 768.0));
        backdrop.resize_signal(100.0, Viewport::new(1200.0, 900.0));
        for t in [150.0, 300.0, 349.0] {
            assert!(!backdrop.poll_resize(t, &mut surface));
        }
        assert!(backdrop.poll_resize(350.0, &mut surface));
        assert!(!backdrop.poll_resize(1000.0, &mut surface));

        assert_eq!(backdrop.simulation().generation(), 2);
        assert_eq!(backdrop.viewport(), Viewport::new(1200.0, 900.0));
        assert_eq!(surface.size(), (1200, 900));
        assert_eq!(
            backdrop.particles().len(),
            Viewport::new(1200.0, 900.0).particle_count(&config.particles)
        );
    }

    #[test]
    fn test_narrow_viewport_disables_smoothing() {
        let config = FolioConfig::default();
        let mut backdrop = backdrop(&config);
        let mut surface = CommandRecorder::new(0, 0);
        backdrop.apply_viewport(Viewport::new(375.0, 812.0), &mut surface);
        assert_eq!(surface.image_smoothing, Some(false));
        backdrop.apply_viewport(Viewport::new(1440.0, 900.0), &mut surface);
        assert_eq!(surface.image_smoothing, Some(true));
    }

    #[test]
    fn test_hidden_page_runs_no_frames() {
        let config = FolioConfig::default();
        let mut backdrop = backdrop(&config);
        let mut sched = ManualScheduler::default();

        backdrop.start(&mut sched);
        backdrop.set_visible(false, 10.0, &mut sched);
        assert_eq!(sched.pending(), 0);
        assert!(!backdrop.is_running());

        backdrop.set_visible(true, 500.0, &mut sched);
        assert!(backdrop.is_running());
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_stop_while_hidden_is_not_undone_by_show() {
        let config = FolioConfig::default();
        let mut backdrop = backdrop(&config);
        let mut sched = ManualScheduler::default();

        backdrop.start(&mut sched);
        backdrop.set_visible(false, 10.0, &mut sched);
        backdrop.stop(&mut sched);
        backdrop.set_visible(true, 500.0, &mut sched);

        assert!(!backdrop.is_running());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_early_resize_poll_keeps_pending() {
        let config = FolioConfig::default();
        let mut backdrop = backdrop(&config);
        let mut surface = CommandRecorder::new(800, 600);

        backdrop.resize_signal(0.0, Viewport::new(1024.0, 768.0));
        assert!(!backdrop.poll_resize(249.6, &mut surface));
        let remaining = backdrop.resize_remaining(249.6).unwrap();
        assert!((remaining - 0.4).abs() < 1e-6);

        assert!(backdrop.poll_resize(250.0, &mut surface));
        assert_eq!(backdrop.resize_remaining(300.0), None);
        assert_eq!(surface.size(), (1024, 768));
    }
}
