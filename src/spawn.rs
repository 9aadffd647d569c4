//! Random helpers for particle generation.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::ParticleConfig;
use crate::particle::{Connection, Particle, ParticleColor};
use crate::viewport::Viewport;

/// Owns the RNG used to create and jitter particles.
///
/// Seed it with [`Spawner::seeded`] for reproducible runs.
#[derive(Debug, Clone)]
pub(crate) struct Spawner {
    rng: SmallRng,
}

impl Spawner {
    /// Spawner seeded from OS entropy, different each run.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random f32 in `[min, max)`; returns `min` for an empty range.
    #[inline]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random vector with each component in `±half`.
    pub fn symmetric(&mut self, half: f32) -> Vec2 {
        Vec2::new(self.range(-half, half), self.range(-half, half))
    }

    /// Uniform point inside the viewport.
    pub fn in_viewport(&mut self, viewport: Viewport) -> Vec2 {
        Vec2::new(
            self.range(0.0, viewport.width),
            self.range(0.0, viewport.height),
        )
    }

    pub fn color(&mut self) -> ParticleColor {
        ParticleColor::ALL[self.rng.gen_range(0..ParticleColor::ALL.len())]
    }

    pub fn particle(&mut self, viewport: Viewport, config: &ParticleConfig) -> Particle {
        Particle {
            position: self.in_viewport(viewport),
            velocity: self.symmetric(config.max_initial_speed),
            radius: self.range(config.radius_min, config.radius_max),
            color: self.color(),
            alpha: self.range(config.alpha_min, config.alpha_max),
            pulse_phase: self.range(0.0, TAU),
            pulse_speed: self.range(config.pulse_speed_min, config.pulse_speed_max),
        }
    }

    /// Pick up to `count` distinct unordered pairs out of `n` particles.
    pub fn connections(&mut self, n: usize, count: usize) -> Vec<Connection> {
        let possible = n * n.saturating_sub(1) / 2;
        let wanted = count.min(possible);
        let mut picked = Vec::with_capacity(wanted);
        let mut seen = std::collections::HashSet::with_capacity(wanted);

        while picked.len() < wanted {
            let a = self.rng.gen_range(0..n);
            let b = self.rng.gen_range(0..n);
            if a == b {
                continue;
            }
            let key = (a.min(b), a.max(b));
            if seen.insert(key) {
                picked.push(Connection {
                    a: key.0,
                    b: key.1,
                    opacity: self.range(0.5, 1.0),
                });
            }
        }
        picked
    }
}
