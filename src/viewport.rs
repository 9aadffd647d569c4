//! Viewport state and debounced resize handling.

use glam::Vec2;
use tracing::debug;

use crate::config::ParticleConfig;
use crate::debounce::Debouncer;

/// Size of the drawing surface in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Particle count for this viewport: one per `area_per_particle`,
    /// clamped to `[min_count, max_count]`.
    pub fn particle_count(&self, config: &ParticleConfig) -> usize {
        let by_area = (self.area() / config.area_per_particle).floor() as usize;
        by_area.clamp(config.min_count, config.max_count)
    }

    /// Whether `point` lies inside the viewport.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// Whether `point` lies inside the viewport grown by `margin` on every side.
    pub fn contains_with_margin(&self, point: Vec2, margin: f32) -> bool {
        point.x >= -margin
            && point.x <= self.width + margin
            && point.y >= -margin
            && point.y <= self.height + margin
    }

    /// Surface dimensions in whole pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width.round() as u32, self.height.round() as u32)
    }
}

/// Debounced resize signals.
///
/// Continuous drag-resizing produces a burst of signals; only the last one is
/// acted on, once the window has been still for the quiet period.
#[derive(Debug, Clone)]
pub struct ResizeHandler {
    debounce: Debouncer<Viewport>,
}

impl ResizeHandler {
    pub fn new(quiet_ms: f64) -> Self {
        Self {
            debounce: Debouncer::new(quiet_ms),
        }
    }

    pub fn signal(&mut self, now: f64, viewport: Viewport) {
        debug!(width = viewport.width, height = viewport.height, "resize signal");
        self.debounce.signal(now, viewport);
    }

    /// The new viewport, once the quiet period has passed.
    pub fn poll(&mut self, now: f64) -> Option<Viewport> {
        self.debounce.poll(now)
    }

    pub fn deadline(&self) -> Option<f64> {
        self.debounce.deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_count_monotonic_in_area() {
        let config = ParticleConfig::default();
        let mut last = 0;
        for step in 0..200 {
            let side = step as f32 * 10.0;
            let count = Viewport::new(side, side * 0.75).particle_count(&config);
            assert!(count >= last);
            assert!(count >= config.min_count && count <= config.max_count);
            last = count;
        }
    }

    #[test]
    fn test_particle_count_bounds() {
        let config = ParticleConfig::default();
        assert_eq!(Viewport::new(0.0, 0.0).particle_count(&config), config.min_count);
        assert_eq!(
            Viewport::new(10_000.0, 10_000.0).particle_count(&config),
            config.max_count
        );
        // 1280 * 720 / 15000 = 61.44
        assert_eq!(Viewport::new(1280.0, 720.0).particle_count(&config), 61);
    }

    #[test]
    fn test_contains_with_margin() {
        let v = Viewport::new(100.0, 50.0);
        assert!(v.contains_with_margin(Vec2::new(-5.0, 55.0), 10.0));
        assert!(!v.contains_with_margin(Vec2::new(-15.0, 0.0), 10.0));
    }

    #[test]
    fn test_resize_handler_keeps_last_size() {
        let mut handler = ResizeHandler::new(250.0);
        handler.signal(0.0, Viewport::new(800.0, 600.0));
        handler.signal(120.0, Viewport::new(640.0, 480.0));
        assert_eq!(handler.poll(300.0), None);
        assert_eq!(handler.poll(370.0), Some(Viewport::new(640.0, 480.0)));
    }
}
