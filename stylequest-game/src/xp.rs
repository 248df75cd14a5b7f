//! XP awarded for finishing a challenge.
use serde::{Deserialize, Serialize};

use crate::catalog::ChallengeDefinition;
use crate::config::{GamificationConfig, XpFormula};

/// How a completion's XP was put together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XpBreakdown {
    pub answered: usize,
    pub total_steps: usize,
    /// Answered ratio in `[0, 1]`.
    pub performance: f64,
    pub base_xp: u32,
    pub streak_bonus: u32,
    /// Final award, never above the challenge's `points`.
    pub earned: u32,
}

/// Ratio of answered steps, clamped to `[0, 1]`. A flow without steps scores 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn performance(answered: usize, total_steps: usize) -> f64 {
    if total_steps == 0 {
        return 0.0;
    }
    (answered as f64 / total_steps as f64).clamp(0.0, 1.0)
}

/// Convert a raw XP amount to a whole, non-negative award.
/// Negative and NaN inputs become zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sanitize_xp(raw: f64) -> u32 {
    if raw.is_nan() || raw <= 0.0 {
        0
    } else if raw >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        raw.floor() as u32
    }
}

/// Performance-scaled XP between `floor(min_ratio * xp_reward)` and `points`.
#[must_use]
pub fn dynamic_xp(challenge: &ChallengeDefinition, performance: f64, min_ratio: f64) -> u32 {
    let performance = if performance.is_nan() {
        0.0
    } else {
        performance.clamp(0.0, 1.0)
    };
    let min_xp = (f64::from(challenge.xp_reward) * min_ratio).floor();
    let max_xp = f64::from(challenge.points);
    let calculated = performance.mul_add(max_xp - min_xp, min_xp);
    sanitize_xp(calculated).min(challenge.points)
}

/// Legacy scoring: a fixed amount per answered step.
#[must_use]
pub fn flat_xp(answered: usize, per_step: u32) -> u32 {
    u32::try_from(answered)
        .unwrap_or(u32::MAX)
        .saturating_mul(per_step)
}

/// XP for a completion. `current_streak` is the streak *before* this
/// completion is applied; any running streak earns the challenge's bonus.
#[must_use]
pub fn earned_xp(
    config: &GamificationConfig,
    challenge: &ChallengeDefinition,
    answered: usize,
    total_steps: usize,
    current_streak: u32,
) -> XpBreakdown {
    let performance = performance(answered, total_steps);
    let base_xp = match config.xp_formula {
        XpFormula::Dynamic => dynamic_xp(challenge, performance, config.min_xp_ratio),
        XpFormula::Flat => flat_xp(answered, config.flat_xp_per_step),
    };
    let streak_bonus = if current_streak > 0 {
        challenge.streak_bonus
    } else {
        0
    };
    XpBreakdown {
        answered,
        total_steps,
        performance,
        base_xp,
        streak_bonus,
        earned: base_xp.saturating_add(streak_bonus).min(challenge.points),
    }
}
