//! Gamification tuning.
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DAILY_SET_SIZE, DEFAULT_FLAT_XP_PER_STEP, DEFAULT_MIN_XP_RATIO, DEFAULT_XP_PER_LEVEL,
};
use crate::error::QuestError;

const DEFAULT_GAMIFICATION_DATA: &str = include_str!("../data/gamification.json");

/// How XP is awarded for a finished challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum XpFormula {
    /// Scales between a floor and the challenge's points by answered ratio.
    #[default]
    Dynamic,
    /// Legacy scoring: a fixed amount per answered step.
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamificationConfig {
    /// Challenges drawn per day.
    pub daily_set_size: usize,
    pub xp_per_level: u32,
    /// Fraction of `xp_reward` granted even with nothing answered.
    pub min_xp_ratio: f64,
    pub xp_formula: XpFormula,
    pub flat_xp_per_step: u32,
}

impl Default for GamificationConfig {
    fn default() -> Self {
        Self {
            daily_set_size: DEFAULT_DAILY_SET_SIZE,
            xp_per_level: DEFAULT_XP_PER_LEVEL,
            min_xp_ratio: DEFAULT_MIN_XP_RATIO,
            xp_formula: XpFormula::Dynamic,
            flat_xp_per_step: DEFAULT_FLAT_XP_PER_STEP,
        }
    }
}

impl GamificationConfig {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str::<Self>(DEFAULT_GAMIFICATION_DATA)
            .unwrap_or_default()
            .sanitized()
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    /// Parse an override file. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::Config`] if the JSON cannot be parsed into
    /// a configuration.
    pub fn from_json(json: &str) -> Result<Self, QuestError> {
        Ok(serde_json::from_str::<Self>(json)?.sanitized())
    }

    /// Clamp values that would break the level or XP math.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.xp_per_level = self.xp_per_level.max(1);
        self.min_xp_ratio = if self.min_xp_ratio.is_finite() {
            self.min_xp_ratio.clamp(0.0, 1.0)
        } else {
            DEFAULT_MIN_XP_RATIO
        };
        self
    }
}
