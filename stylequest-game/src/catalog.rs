//! Static challenge definitions, pooled by weekday.
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::QuestError;

const DEFAULT_CHALLENGE_DATA: &str = include_str!("../data/challenges.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeCategory {
    Style,
    Creativity,
    Social,
    Learning,
    Fun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Task,
    Streak,
    Creative,
    Social,
    Learning,
}

/// An immutable challenge as authored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeDefinition {
    pub id: String,
    pub title: String,
    pub emoji: String,
    pub description: String,
    pub instructions: String,
    pub difficulty: Difficulty,
    pub category: ChallengeCategory,
    /// Maximum XP the challenge can ever award.
    pub points: u32,
    pub xp_reward: u32,
    pub streak_bonus: u32,
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub rewards: Vec<String>,
}

impl ChallengeDefinition {
    /// Progress target: one unit per requirement, never less than one.
    #[must_use]
    pub fn max_progress(&self) -> u32 {
        u32::try_from(self.requirements.len().max(1)).unwrap_or(u32::MAX)
    }
}

/// Lowercase weekday name used as the pool key.
#[must_use]
pub const fn weekday_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChallengeCatalog {
    #[serde(default)]
    pub pools: BTreeMap<String, Vec<ChallengeDefinition>>,
}

impl ChallengeCatalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_CHALLENGE_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<ChallengeCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns [`QuestError::Config`] if the JSON cannot be parsed into
    /// a challenge catalog.
    pub fn from_json(json: &str) -> Result<Self, QuestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Challenges eligible on `day`, in authored order. Unknown days are empty.
    #[must_use]
    pub fn pool_for_day(&self, day: Weekday) -> &[ChallengeDefinition] {
        self.pools
            .get(weekday_key(day))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Look a definition up by id across every pool.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&ChallengeDefinition> {
        self.pools.values().flatten().find(|c| c.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
