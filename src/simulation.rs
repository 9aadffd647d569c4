//! Particle simulation.
//!
//! Owns the particle set and advances it once per tick. Each tick, for every
//! particle and in this order:
//!
//! 1. integrate: `position += velocity`
//! 2. pointer influence within `influence_radius`, force
//!    `strength * (radius - distance) / radius`
//! 3. damping: `velocity *= damping`
//! 4. jitter: a small random kick per axis
//! 5. clamp speed to `max_speed`
//! 6. wrap to the opposite edge once `wrap_margin` past the viewport

use glam::Vec2;
use tracing::debug;

use crate::config::{ConnectionMode, ParticleConfig, PointerMode};
use crate::particle::ParticleSet;
use crate::spawn::Spawner;
use crate::viewport::Viewport;

/// The particle simulation.
#[derive(Debug, Clone)]
pub struct ParticleSimulation {
    config: ParticleConfig,
    connection_mode: ConnectionMode,
    spawner: Spawner,
    set: ParticleSet,
    generation: u64,
}

impl ParticleSimulation {
    /// Create an empty simulation; call [`initialize`](Self::initialize) to populate it.
    pub fn new(config: ParticleConfig, connection_mode: ConnectionMode) -> Self {
        Self {
            config,
            connection_mode,
            spawner: Spawner::from_entropy(),
            set: ParticleSet::default(),
            generation: 0,
        }
    }

    /// Use a fixed RNG seed for reproducible particle sets and jitter.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.spawner = Spawner::seeded(seed);
        self
    }

    /// Discard the current set and generate a new one sized for `viewport`.
    pub fn initialize(&mut self, viewport: Viewport) -> &ParticleSet {
        let count = viewport.particle_count(&self.config);
        let particles = (0..count)
            .map(|_| self.spawner.particle(viewport, &self.config))
            .collect();
        let connections = match self.connection_mode {
            ConnectionMode::AllPairs => None,
            ConnectionMode::Sampled { count: pairs } => {
                Some(self.spawner.connections(count, pairs))
            }
        };

        self.set = ParticleSet {
            particles,
            connections,
        };
        self.generation += 1;
        debug!(
            count,
            generation = self.generation,
            width = viewport.width,
            height = viewport.height,
            "particle set generated"
        );
        &self.set
    }

    /// Advance every particle by one tick.
    pub fn step(&mut self, viewport: Viewport, pointer: Option<Vec2>) {
        let cfg = &self.config;
        let spawner = &mut self.spawner;

        for p in &mut self.set.particles {
            p.position += p.velocity;

            if let Some(pointer) = pointer {
                let away = p.position - pointer;
                let distance = away.length();
                if distance > 0.0 && distance < cfg.influence_radius {
                    let falloff = (cfg.influence_radius - distance) / cfg.influence_radius;
                    let direction = match cfg.pointer_mode {
                        PointerMode::Repel => away / distance,
                        PointerMode::Attract => -away / distance,
                    };
                    p.velocity += direction * falloff * cfg.influence_strength;
                }
            }

            p.velocity *= cfg.damping;
            p.velocity += spawner.symmetric(cfg.jitter);
            p.velocity = p.velocity.clamp_length_max(cfg.max_speed);

            p.position.x = wrap(p.position.x, viewport.width, cfg.wrap_margin);
            p.position.y = wrap(p.position.y, viewport.height, cfg.wrap_margin);

            p.pulse_phase = (p.pulse_phase + p.pulse_speed) % std::f32::consts::TAU;
        }
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.set
    }

    /// Number of times the set has been (re)generated.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }
}

/// Wrap a coordinate to the opposite edge once it leaves `[-margin, extent + margin]`.
#[inline]
fn wrap(value: f32, extent: f32, margin: f32) -> f32 {
    if value < -margin {
        extent + margin
    } else if value > extent + margin {
        -margin
    } else {
        value
    }
}
