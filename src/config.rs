//! Canonical configuration.
//!
//! Every tunable constant lives here. [`FolioConfig::default`] is the canonical
//! configuration; a JSON document can override any subset of it:
//!
//! ```ignore
//! let config = FolioConfig::from_json_str(r#"{ "particles": { "max_count": 60 } }"#)?;
//! ```

use serde::Deserialize;

use crate::error::FolioError;
use crate::responder::ResponseTable;

/// Top-level configuration for every component.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub particles: ParticleConfig,
    pub connections: ConnectionConfig,
    pub pointer: PointerConfig,
    /// Quiet period before a resize is acted upon.
    pub resize_debounce_ms: f64,
    /// Minimum spacing between handled scroll events.
    pub scroll_throttle_ms: f64,
    /// Viewports narrower than this render without image smoothing.
    pub narrow_viewport_width: f32,
    pub counter: CounterConfig,
    pub assistant: AssistantConfig,
    pub navigation: NavigationConfig,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            particles: ParticleConfig::default(),
            connections: ConnectionConfig::default(),
            pointer: PointerConfig::default(),
            resize_debounce_ms: 250.0,
            scroll_throttle_ms: 100.0,
            narrow_viewport_width: 768.0,
            counter: CounterConfig::default(),
            assistant: AssistantConfig::default(),
            navigation: NavigationConfig::default(),
        }
    }
}

impl FolioConfig {
    /// Parse a (possibly partial) JSON configuration and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, FolioError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), FolioError> {
        let p = &self.particles;
        let fail = |msg: &str| Err(FolioError::InvalidConfig(msg.to_string()));

        if p.area_per_particle <= 0.0 {
            return fail("particles.area_per_particle must be positive");
        }
        if p.min_count > p.max_count {
            return fail("particles.min_count exceeds particles.max_count");
        }
        if !(p.damping > 0.0 && p.damping < 1.0) {
            return fail("particles.damping must lie in (0, 1)");
        }
        if p.radius_min <= 0.0 || p.radius_min >= p.radius_max {
            return fail("particles.radius_min must be positive and below radius_max");
        }
        if p.alpha_min < 0.0 || p.alpha_max > 1.0 || p.alpha_min >= p.alpha_max {
            return fail("particles.alpha range must lie within [0, 1]");
        }
        if p.pulse_speed_min > p.pulse_speed_max {
            return fail("particles.pulse_speed_min exceeds pulse_speed_max");
        }
        if p.max_speed <= 0.0 || p.wrap_margin < 0.0 {
            return fail("particles.max_speed must be positive and wrap_margin non-negative");
        }
        if self.connections.threshold <= 0.0 {
            return fail("connections.threshold must be positive");
        }
        if self.counter.duration_ms <= 0.0 {
            return fail("counter.duration_ms must be positive");
        }
        if !(0.0..=1.0).contains(&self.counter.visibility_threshold) {
            return fail("counter.visibility_threshold must lie in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.navigation.section_threshold) {
            return fail("navigation.section_threshold must lie in [0, 1]");
        }
        if let Some(table) = &self.assistant.table {
            table.validate()?;
        }
        Ok(())
    }
}

/// Particle generation and motion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Viewport area (px²) per particle when deriving the particle count.
    pub area_per_particle: f32,
    pub min_count: usize,
    pub max_count: usize,
    /// Initial velocity per axis is drawn from `±max_initial_speed`.
    pub max_initial_speed: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    pub alpha_min: f32,
    pub alpha_max: f32,
    /// Glow oscillation speed in radians per tick.
    pub pulse_speed_min: f32,
    pub pulse_speed_max: f32,
    /// Multiplicative velocity factor applied each tick.
    pub damping: f32,
    /// Per-axis random velocity added each tick, drawn from `±jitter`.
    pub jitter: f32,
    pub max_speed: f32,
    /// Distance beyond the viewport edge before a particle wraps.
    pub wrap_margin: f32,
    pub influence_radius: f32,
    pub influence_strength: f32,
    pub pointer_mode: PointerMode,
    /// Glow circle radius as a multiple of the particle radius. Zero disables the glow.
    pub glow_scale: f32,
    /// Glow opacity as a fraction of the particle opacity.
    pub glow_alpha: f32,
    pub frame_clear: FrameClear,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            area_per_particle: 15_000.0,
            min_count: 12,
            max_count: 100,
            max_initial_speed: 0.4,
            radius_min: 1.0,
            radius_max: 3.0,
            alpha_min: 0.3,
            alpha_max: 0.8,
            pulse_speed_min: 0.01,
            pulse_speed_max: 0.04,
            damping: 0.99,
            jitter: 0.05,
            max_speed: 1.5,
            wrap_margin: 10.0,
            influence_radius: 150.0,
            influence_strength: 0.3,
            pointer_mode: PointerMode::Repel,
            glow_scale: 2.5,
            glow_alpha: 0.15,
            frame_clear: FrameClear::Clear,
        }
    }
}

/// How the pointer affects nearby particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerMode {
    #[default]
    Repel,
    Attract,
}

/// What happens to the previous frame before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FrameClear {
    /// Wipe the surface.
    #[default]
    Clear,
    /// Paint the background over the previous frame at `alpha`, leaving trails.
    Fade { alpha: f32 },
}

/// Connection line rendering.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Maximum distance at which a line is still drawn.
    pub threshold: f32,
    /// Line opacity as the distance approaches zero.
    pub base_opacity: f32,
    pub line_width: f32,
    pub mode: ConnectionMode,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            threshold: 120.0,
            base_opacity: 0.15,
            line_width: 0.8,
            mode: ConnectionMode::AllPairs,
        }
    }
}

/// Which particle pairs are candidates for a connection line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ConnectionMode {
    /// Every unordered pair is tested each frame.
    #[default]
    AllPairs,
    /// A random subset of pairs is chosen whenever the set is regenerated.
    Sampled { count: usize },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Without movement for this long, the pointer stops influencing particles.
    pub idle_timeout_ms: f64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self { idle_timeout_ms: 3000.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub duration_ms: f64,
    /// Fraction of the element that must be visible to start counting.
    pub visibility_threshold: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2000.0,
            visibility_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Simulated processing time before a reply is shown.
    pub latency_ms: f64,
    /// Replaces the built-in response table when present.
    pub table: Option<ResponseTable>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            latency_ms: 1800.0,
            table: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Height of the fixed header; scroll targets land this far below the top.
    pub header_height: f64,
    /// Visible fraction at which a section counts as intersecting.
    pub section_threshold: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            header_height: 80.0,
            section_threshold: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        FolioConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            FolioConfig::from_json_str(r#"{ "particles": { "max_count": 60 } }"#).unwrap();
        assert_eq!(config.particles.max_count, 60);
        assert_eq!(config.particles.min_count, 12);
        assert_eq!(config.connections.threshold, 120.0);
    }

    #[test]
    fn test_tagged_enums_parse() {
        let config = FolioConfig::from_json_str(
            r#"{
                "particles": { "frame_clear": { "kind": "fade", "alpha": 0.2 }, "pointer_mode": "attract" },
                "connections": { "mode": { "kind": "sampled", "count": 40 } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.particles.frame_clear, FrameClear::Fade { alpha: 0.2 });
        assert_eq!(config.particles.pointer_mode, PointerMode::Attract);
        assert_eq!(config.connections.mode, ConnectionMode::Sampled { count: 40 });
    }

    #[test]
    fn test_inverted_count_bounds_rejected() {
        let err = FolioConfig::from_json_str(
            r#"{ "particles": { "min_count": 200, "max_count": 100 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, FolioError::InvalidConfig(_)));
    }

    #[test]
    fn test_damping_must_be_below_one() {
        let mut config = FolioConfig::default();
        config.particles.damping = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_section_threshold_configurable() {
        let config =
            FolioConfig::from_json_str(r#"{ "navigation": { "section_threshold": 0.6 } }"#)
                .unwrap();
        assert_eq!(config.navigation.section_threshold, 0.6);
        assert_eq!(config.navigation.header_height, 80.0);
        assert_eq!(FolioConfig::default().navigation.section_threshold, 0.3);

        let err = FolioConfig::from_json_str(r#"{ "navigation": { "section_threshold": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(err, FolioError::InvalidConfig(_)));
    }
}
