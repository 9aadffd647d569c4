//! Particle data.

use glam::Vec2;

use crate::surface::Rgb;

/// The backdrop's fixed color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleColor {
    Cyan,
    Blue,
    Violet,
    Emerald,
    Amber,
    Red,
}

impl ParticleColor {
    pub const ALL: [ParticleColor; 6] = [
        ParticleColor::Cyan,
        ParticleColor::Blue,
        ParticleColor::Violet,
        ParticleColor::Emerald,
        ParticleColor::Amber,
        ParticleColor::Red,
    ];

    pub fn rgb(self) -> Rgb {
        match self {
            ParticleColor::Cyan => Rgb::from_hex(0x06b6d4),
            ParticleColor::Blue => Rgb::from_hex(0x3b82f6),
            ParticleColor::Violet => Rgb::from_hex(0x8b5cf6),
            ParticleColor::Emerald => Rgb::from_hex(0x10b981),
            ParticleColor::Amber => Rgb::from_hex(0xf59e0b),
            ParticleColor::Red => Rgb::from_hex(0xef4444),
        }
    }
}

/// A simulated point rendered as a circle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub color: ParticleColor,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Glow oscillation phase in radians.
    pub pulse_phase: f32,
    pub pulse_speed: f32,
}

impl Particle {
    /// Glow intensity in `[0, 1]` at the current pulse phase.
    #[inline]
    pub fn pulse(&self) -> f32 {
        0.5 + 0.5 * self.pulse_phase.sin()
    }
}

/// A pre-selected pair of particles that may be joined by a line.
///
/// Indices are not kept consistent with the particle buffer; renderers skip
/// pairs that no longer resolve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    /// Extra opacity factor for this pair, in `[0, 1]`.
    pub opacity: f32,
}

/// The particles of one generation, plus sampled connections when enabled.
#[derive(Debug, Clone, Default)]
pub struct ParticleSet {
    pub particles: Vec<Particle>,
    /// `None` when every pair is a connection candidate.
    pub connections: Option<Vec<Connection>>,
}

impl ParticleSet {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Resolve a connection to its two endpoints, or `None` if either index is stale.
    pub fn endpoints(&self, connection: &Connection) -> Option<(&Particle, &Particle)> {
        if connection.a == connection.b {
            return None;
        }
        Some((
            self.particles.get(connection.a)?,
            self.particles.get(connection.b)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(x: f32) -> Particle {
        Particle {
            position: Vec2::new(x, 0.0),
            velocity: Vec2::ZERO,
            radius: 1.0,
            color: ParticleColor::Cyan,
            alpha: 1.0,
            pulse_phase: 0.0,
            pulse_speed: 0.0,
        }
    }

    #[test]
    fn test_palette_is_distinct() {
        let colors: std::collections::HashSet<_> =
            ParticleColor::ALL.iter().map(|c| c.rgb()).collect();
        assert_eq!(colors.len(), ParticleColor::ALL.len());
    }

    #[test]
    fn test_stale_connection_does_not_resolve() {
        let set = ParticleSet {
            particles: vec![dot(0.0), dot(1.0)],
            connections: None,
        };
        let ok = Connection { a: 0, b: 1, opacity: 1.0 };
        let stale = Connection { a: 1, b: 7, opacity: 1.0 };
        let degenerate = Connection { a: 1, b: 1, opacity: 1.0 };
        assert!(set.endpoints(&ok).is_some());
        assert!(set.endpoints(&stale).is_none());
        assert!(set.endpoints(&degenerate).is_none());
    }

    #[test]
    fn test_pulse_range() {
        let mut p = dot(0.0);
        for i in 0..64 {
            p.pulse_phase = i as f32 * 0.1;
            assert!((0.0..=1.0).contains(&p.pulse()));
        }
    }
}
