//! Proximity renderer.
//!
//! Draws a line between every pair of particles closer than the threshold,
//! fading out with distance, then draws each particle as a filled circle over
//! a larger, fainter glow. With sampled connections only the pre-selected
//! pairs are tested.
//!
//! The all-pairs pass is O(n²); particle counts are capped at around a hundred.

use crate::config::{ConnectionConfig, ParticleConfig};
use crate::particle::{Particle, ParticleSet};
use crate::surface::Surface;

/// Line opacity for two particles `distance` apart.
///
/// `(1 - distance / threshold) * base_opacity`, and zero at or beyond the threshold.
#[inline]
pub fn connection_opacity(distance: f32, threshold: f32, base_opacity: f32) -> f32 {
    if distance >= threshold {
        0.0
    } else {
        (1.0 - distance / threshold) * base_opacity
    }
}

/// Draws a [`ParticleSet`] onto a [`Surface`].
#[derive(Debug, Clone)]
pub struct ProximityRenderer {
    threshold: f32,
    base_opacity: f32,
    line_width: f32,
    glow_scale: f32,
    glow_alpha: f32,
}

impl ProximityRenderer {
    pub fn new(connections: &ConnectionConfig, particles: &ParticleConfig) -> Self {
        Self {
            threshold: connections.threshold,
            base_opacity: connections.base_opacity,
            line_width: connections.line_width,
            glow_scale: particles.glow_scale,
            glow_alpha: particles.glow_alpha,
        }
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, set: &ParticleSet) {
        match &set.connections {
            None => self.draw_all_pairs(surface, &set.particles),
            Some(connections) => {
                for connection in connections {
                    if let Some((a, b)) = set.endpoints(connection) {
                        self.draw_link(surface, a, b, connection.opacity);
                    }
                }
            }
        }

        for p in &set.particles {
            self.draw_particle(surface, p);
        }
    }

    fn draw_all_pairs<S: Surface + ?Sized>(&self, surface: &mut S, particles: &[Particle]) {
        for (i, a) in particles.iter().enumerate() {
            for b in &particles[i + 1..] {
                self.draw_link(surface, a, b, 1.0);
            }
        }
    }

    fn draw_link<S: Surface + ?Sized>(&self, surface: &mut S, a: &Particle, b: &Particle, scale: f32) {
        let distance = a.position.distance(b.position);
        if distance < self.threshold {
            let alpha = connection_opacity(distance, self.threshold, self.base_opacity) * scale;
            surface.stroke_line(a.position, b.position, self.line_width, a.color.rgb(), alpha);
        }
    }

    fn draw_particle<S: Surface + ?Sized>(&self, surface: &mut S, p: &Particle) {
        let color = p.color.rgb();
        if self.glow_scale > 0.0 {
            let glow_radius = p.radius * self.glow_scale * (0.75 + 0.25 * p.pulse());
            surface.fill_circle(p.position, glow_radius, color, p.alpha * self.glow_alpha);
        }
        surface.fill_circle(p.position, p.radius, color, p.alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::{Connection, ParticleColor};
    use crate::surface::{CommandRecorder, DrawCommand};
    use glam::Vec2;

    fn at(x: f32, y: f32) -> Particle {
        Particle {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            radius: 2.0,
            color: ParticleColor::Violet,
            alpha: 0.5,
            pulse_phase: 0.0,
            pulse_speed: 0.0,
        }
    }

    fn renderer() -> ProximityRenderer {
        ProximityRenderer::new(&ConnectionConfig::default(), &ParticleConfig::default())
    }

    #[test]
    fn test_opacity_zero_at_threshold() {
        assert_eq!(connection_opacity(120.0, 120.0, 0.15), 0.0);
        assert_eq!(connection_opacity(500.0, 120.0, 0.15), 0.0);
    }

    #[test]
    fn test_opacity_approaches_base_near_zero() {
        assert!((connection_opacity(0.0, 120.0, 0.15) - 0.15).abs() < 1e-6);
        assert!((connection_opacity(0.001, 120.0, 0.15) - 0.15).abs() < 1e-5);
    }

    #[test]
    fn test_opacity_monotonic() {
        let mut last = f32::INFINITY;
        for i in 0..=240 {
            let alpha = connection_opacity(i as f32 * 0.5, 120.0, 0.15);
            assert!(alpha <= last);
            last = alpha;
        }
    }

    #[test]
    fn test_all_pairs_draws_close_pairs_only() {
        let set = ParticleSet {
            particles: vec![at(0.0, 0.0), at(60.0, 0.0), at(400.0, 0.0)],
            connections: None,
        };
        let mut rec = CommandRecorder::new(500, 500);
        renderer().render(&mut rec, &set);

        let lines: Vec<_> = rec.lines().collect();
        assert_eq!(lines.len(), 1);
        match lines[0] {
            DrawCommand::Line { alpha, width, .. } => {
                assert!((alpha - 0.075).abs() < 1e-6);
                assert_eq!(*width, 0.8);
            }
            _ => unreachable!(),
        }
        // glow + body per particle
        assert_eq!(rec.circles().count(), 6);
    }

    #[test]
    fn test_lines_drawn_before_particles() {
        let set = ParticleSet {
            particles: vec![at(0.0, 0.0), at(10.0, 0.0)],
            connections: None,
        };
        let mut rec = CommandRecorder::new(100, 100);
        renderer().render(&mut rec, &set);
        assert!(matches!(rec.commands[0], DrawCommand::Line { .. }));
        assert!(matches!(rec.commands.last(), Some(DrawCommand::Circle { .. })));
    }

    #[test]
    fn test_sampled_skips_stale_and_unlisted_pairs() {
        let set = ParticleSet {
            particles: vec![at(0.0, 0.0), at(10.0, 0.0), at(20.0, 0.0)],
            connections: Some(vec![
                Connection { a: 0, b: 1, opacity: 0.5 },
                Connection { a: 1, b: 9, opacity: 1.0 },
            ]),
        };
        let mut rec = CommandRecorder::new(100, 100);
        renderer().render(&mut rec, &set);
        assert_eq!(rec.lines().count(), 1);
    }

    #[test]
    fn test_glow_disabled() {
        let particles = ParticleConfig {
            glow_scale: 0.0,
            ..ParticleConfig::default()
        };
        let renderer = ProximityRenderer::new(&ConnectionConfig::default(), &particles);
        let set = ParticleSet {
            particles: vec![at(0.0, 0.0)],
            connections: None,
        };
        let mut rec = CommandRecorder::new(100, 100);
        renderer.render(&mut rec, &set);
        assert_eq!(rec.circles().count(), 1);
    }
}
