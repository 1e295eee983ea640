//! Game configuration with documented constants
//!
//! All magic numbers of the game and of the planning agent are collected
//! here. Every field has a default, so a TOML file only needs to name the
//! values it overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{FairwayError, Result};

/// What happens to a player whose decision produced no usable action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoidPolicy {
    /// The player fails immediately
    #[default]
    Forfeit,
    /// The attempt is spent; the player fails only at the attempt cap
    ConsumeAttempt,
}

/// Rules of the game and engine limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === SHOT MODEL ===
    /// Longest legal full shot before the skill bonus (course units)
    ///
    /// A player of skill `s` may request full shots up to
    /// `max_distance + s`; longer requests are void.
    pub max_distance: f64,

    /// Requests shorter than this are putts: no air phase, no extra roll
    pub min_putter_distance: f64,

    /// Fraction of the carry a full shot rolls on after landing
    pub extra_roll: f64,

    /// A roll segment passing this close to the target is captured
    pub target_radius: f64,

    // === PLAYERS ===
    /// Attempts before a player is forced to `Failed`
    pub max_tries: u32,

    /// Inclusive range skills are drawn from at registration
    pub min_skill: u32,
    pub max_skill: u32,

    // === TURN ENGINE ===
    /// Wall-clock budget for a single decision call (seconds)
    pub decision_timeout_secs: f64,

    /// Enforce the decision budget. Interactive play never enforces it.
    pub use_timeout: bool,

    pub void_policy: VoidPolicy,

    pub planner: PlannerConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_distance: 200.0,
            min_putter_distance: 20.0,
            extra_roll: 0.1,
            target_radius: 0.054,

            max_tries: 10,
            min_skill: 10,
            max_skill: 100,

            decision_timeout_secs: 60.0,
            use_timeout: true,
            void_policy: VoidPolicy::Forfeit,

            planner: PlannerConfig::default(),
        }
    }
}

/// Tuning of the confidence-bounded planning agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Confidence of the first search round
    pub start_confidence: f64,

    /// Confidence given up after each failed round
    ///
    /// Rounds stop before confidence reaches zero; running out of rounds
    /// is a planning failure.
    pub confidence_step: f64,

    /// A search node this close to the goal ends the search
    pub goal_tolerance: f64,

    /// Spacing of the candidate grid laid over the course interior
    pub grid_step: f64,

    /// Probability levels sampled along each arc of the splash envelope
    pub splash_samples: usize,

    /// Shots at or below this distance get no outer-arc widening
    pub splash_short_shot: f64,

    /// Outer-arc widening for shots longer than `splash_short_shot`
    pub splash_scale: f64,

    /// Aim past the target by this factor when the goal is the next point
    pub overshoot_factor: f64,

    /// Overshoot only while the stretched distance stays within this cap
    pub overshoot_cap: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            start_confidence: 0.95,
            confidence_step: 0.05,
            goal_tolerance: 0.054,
            grid_step: 1.0,
            splash_samples: 100,
            splash_short_shot: 20.0,
            splash_scale: 1.1,
            overshoot_factor: 1.10,
            overshoot_cap: 20.0,
        }
    }
}

impl PlannerConfig {
    /// Confidence levels tried in order, strictly positive
    pub fn confidence_schedule(&self) -> impl Iterator<Item = f64> + '_ {
        (0u32..)
            .map(move |round| self.start_confidence - self.confidence_step * round as f64)
            .take_while(|c| *c > 1e-9)
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decision_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.decision_timeout_secs.max(0.0))
    }

    /// Parse a (possibly partial) TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(FairwayError::InvalidConfig(msg));

        if !(self.max_distance > 0.0) {
            return invalid(format!("max_distance ({}) must be positive", self.max_distance));
        }
        if !(self.min_putter_distance >= 0.0) || self.min_putter_distance > self.max_distance {
            return invalid(format!(
                "min_putter_distance ({}) must lie in [0, max_distance]",
                self.min_putter_distance
            ));
        }
        if !(self.extra_roll >= 0.0) {
            return invalid(format!("extra_roll ({}) must be non-negative", self.extra_roll));
        }
        if !(self.target_radius > 0.0) {
            return invalid(format!("target_radius ({}) must be positive", self.target_radius));
        }
        if self.max_tries == 0 {
            return invalid("max_tries must be at least 1".into());
        }
        if self.min_skill == 0 || self.min_skill > self.max_skill {
            return invalid(format!(
                "skill range [{}, {}] must be positive and ordered",
                self.min_skill, self.max_skill
            ));
        }
        if !(self.decision_timeout_secs > 0.0) {
            return invalid("decision_timeout_secs must be positive".into());
        }

        let planner = &self.planner;
        if !(planner.start_confidence > 0.0 && planner.start_confidence < 1.0) {
            return invalid(format!(
                "planner.start_confidence ({}) must lie in (0, 1)",
                planner.start_confidence
            ));
        }
        if !(planner.confidence_step > 0.0) {
            return invalid("planner.confidence_step must be positive".into());
        }
        if !(planner.grid_step > 0.0) {
            return invalid("planner.grid_step must be positive".into());
        }
        if planner.splash_samples < 2 {
            return invalid("planner.splash_samples must be at least 2".into());
        }

        Ok(())
    }
}
