//! Badge catalog and unlock evaluation.
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::QuestError;
use crate::ledger::ProgressLedger;

const DEFAULT_BADGE_DATA: &str = include_str!("../data/badges.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeCategory {
    Streak,
    Challenges,
    Xp,
    /// No unlock rule is defined for these yet; they never qualify.
    Special,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub description: String,
    pub requirement: u32,
    pub category: BadgeCategory,
}

impl BadgeDefinition {
    /// Whether `ledger` meets this badge's threshold, ignoring whether it is
    /// already held.
    #[must_use]
    pub const fn is_met_by(&self, ledger: &ProgressLedger) -> bool {
        match self.category {
            BadgeCategory::Challenges => ledger.challenges_completed >= self.requirement,
            BadgeCategory::Streak => ledger.current_streak >= self.requirement,
            BadgeCategory::Xp => ledger.total_xp >= self.requirement,
            BadgeCategory::Special => false,
        }
    }
}

/// A badge together with whether the profile holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeStatus<'a> {
    pub badge: &'a BadgeDefinition,
    pub unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BadgeCatalog {
    #[serde(default)]
    pub badges: Vec<BadgeDefinition>,
}

impl BadgeCatalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_BADGE_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<BadgeCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns [`QuestError::Config`] if the JSON cannot be parsed into
    /// a badge catalog.
    pub fn from_json(json: &str) -> Result<Self, QuestError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BadgeDefinition> {
        self.badges.iter().find(|b| b.id == id)
    }

    /// Ids of badges `ledger` newly qualifies for, in catalog order.
    /// Badges already in `ledger.badges` are never returned.
    #[must_use]
    pub fn evaluate(&self, ledger: &ProgressLedger) -> Vec<String> {
        self.badges
            .iter()
            .filter(|badge| !ledger.has_badge(&badge.id))
            .filter(|badge| badge.is_met_by(ledger))
            .map(|badge| badge.id.clone())
            .collect()
    }

    /// Definitions of the badges `ledger` holds. Ids missing from the
    /// catalog are skipped.
    #[must_use]
    pub fn unlocked(&self, ledger: &ProgressLedger) -> Vec<&BadgeDefinition> {
        self.badges
            .iter()
            .filter(|badge| ledger.has_badge(&badge.id))
            .collect()
    }

    /// Every badge in catalog order with its unlock state.
    #[must_use]
    pub fn statuses(&self, ledger: &ProgressLedger) -> Vec<BadgeStatus<'_>> {
        self.badges
            .iter()
            .map(|badge| BadgeStatus {
                badge,
                unlocked: ledger.has_badge(&badge.id),
            })
            .collect()
    }
}
