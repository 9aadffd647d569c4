//! Scroll-triggered counters.
//!
//! Each counter element carries a goal integer. The first time it becomes
//! sufficiently visible it counts up from zero along an ease-out quartic curve
//! and then snaps exactly to the goal. An element never animates twice.

use std::collections::HashSet;
use std::hash::Hash;

use tracing::{debug, warn};

use crate::config::CounterConfig;
use crate::error::FolioError;

/// Ease-out quartic: `1 - (1 - t)^4`, with `t` clamped to `[0, 1]`.
#[inline]
pub fn ease_out_quart(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(4)
}

/// Parse a goal attribute such as `data-target="150"`.
pub fn parse_goal(raw: &str) -> Result<u64, FolioError> {
    raw.trim().parse().map_err(|_| FolioError::InvalidGoal {
        raw: raw.to_string(),
    })
}

/// One running count-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterAnimation {
    pub goal: u64,
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl CounterAnimation {
    pub fn new(goal: u64, start_ms: f64, duration_ms: f64) -> Self {
        Self {
            goal,
            start_ms,
            duration_ms,
        }
    }

    /// Progress in `[0, 1]` at `now`.
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Displayed value at `progress`: `floor(goal * ease(progress))`, exactly
    /// `goal` once progress reaches 1.
    pub fn value_at_progress(&self, progress: f64) -> u64 {
        if progress >= 1.0 {
            return self.goal;
        }
        let value = (self.goal as f64 * ease_out_quart(progress)).floor() as u64;
        value.min(self.goal)
    }

    /// `(displayed value, finished)` at `now`.
    pub fn sample(&self, now: f64) -> (u64, bool) {
        let progress = self.progress(now);
        (self.value_at_progress(progress), progress >= 1.0)
    }
}

/// Where counter values are written.
pub trait CounterDisplay<K> {
    fn show(&mut self, key: &K, value: u64);
}

impl<K: Clone> CounterDisplay<K> for Vec<(K, u64)> {
    fn show(&mut self, key: &K, value: u64) {
        self.push((key.clone(), value));
    }
}

/// Slack allowed when comparing an intersection ratio with the threshold.
pub const RATIO_EPSILON: f64 = 1e-3;

/// All counters on the page, keyed by element identity.
#[derive(Debug)]
pub struct CounterBoard<K> {
    goals: Vec<(K, u64)>,
    seen: HashSet<K>,
    running: Vec<(K, CounterAnimation)>,
    duration_ms: f64,
    threshold: f64,
}

impl<K: Clone + Eq + Hash + std::fmt::Debug> CounterBoard<K> {
    pub fn new(config: &CounterConfig) -> Self {
        Self {
            goals: Vec::new(),
            seen: HashSet::new(),
            running: Vec::new(),
            duration_ms: config.duration_ms,
            threshold: config.visibility_threshold,
        }
    }

    /// Register an element with its raw goal attribute.
    ///
    /// Elements with unparsable goals are logged and skipped.
    pub fn register(&mut self, key: K, raw_goal: &str) -> Result<(), FolioError> {
        match parse_goal(raw_goal) {
            Ok(goal) => {
                self.goals.push((key, goal));
                Ok(())
            }
            Err(err) => {
                warn!(?key, %err, "skipping counter");
                Err(err)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Intersection report for `key`. Starts its animation the first time the
    /// visible fraction reaches the threshold. Returns whether it started.
    ///
    /// Observers may report a ratio a hair below the threshold on the
    /// crossing callback, so the comparison allows [`RATIO_EPSILON`].
    pub fn on_visible(&mut self, key: &K, ratio: f64, now: f64) -> bool {
        if ratio + RATIO_EPSILON < self.threshold || self.seen.contains(key) {
            return false;
        }
        let Some(goal) = self
            .goals
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, goal)| *goal)
        else {
            return false;
        };

        self.seen.insert(key.clone());
        self.running
            .push((key.clone(), CounterAnimation::new(goal, now, self.duration_ms)));
        debug!(?key, goal, "counter started");
        true
    }

    /// Write the current value of every running counter, retiring finished ones.
    pub fn tick<D: CounterDisplay<K> + ?Sized>(&mut self, now: f64, display: &mut D) {
        self.running.retain(|(key, animation)| {
            let (value, done) = animation.sample(now);
            display.show(key, value);
            if done {
                debug!(?key, value, "counter finished");
            }
            !done
        });
    }

    /// Whether any counter still needs frames.
    pub fn is_animating(&self) -> bool {
        !self.running.is_empty()
    }

    pub fn has_fired(&self, key: &K) -> bool {
        self.seen.contains(key)
    }
}
