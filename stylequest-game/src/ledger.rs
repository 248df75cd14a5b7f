//! The single local profile: XP, level, streaks and badges.
use serde::{Deserialize, Deserializer, Serialize};

use crate::badges::BadgeCatalog;
use crate::calendar::CalendarDay;
use crate::config::GamificationConfig;
use crate::constants::USER_PROGRESS_KEY;
use crate::error::QuestError;
use crate::storage::{KeyValueStore, encode_json, read_json, write_raw};

/// Level for an XP total: one level per `xp_per_level`, starting at 1.
#[must_use]
pub const fn level_for_xp(total_xp: u32, xp_per_level: u32) -> u32 {
    let per_level = if xp_per_level == 0 { 1 } else { xp_per_level };
    (total_xp / per_level).saturating_add(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressLedger {
    #[serde(rename = "totalXP", default)]
    pub total_xp: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub challenges_completed: u32,
    #[serde(default)]
    pub badges: Vec<String>,
    /// `None` until the first completion.
    #[serde(default, deserialize_with = "lenient_day")]
    pub last_active_date: Option<CalendarDay>,
    #[serde(default)]
    pub weekly_progress: u32,
    #[serde(default)]
    pub monthly_progress: u32,
}

const fn default_level() -> u32 {
    1
}

/// Accepts ISO days and the web client's `Thu Oct 15 2026` form; anything
/// else reads as "never active" instead of failing the ledger.
fn lenient_day<'de, D>(deserializer: D) -> Result<Option<CalendarDay>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

impl Default for ProgressLedger {
    fn default() -> Self {
        Self {
            total_xp: 0,
            level: default_level(),
            current_streak: 0,
            longest_streak: 0,
            challenges_completed: 0,
            badges: Vec::new(),
            last_active_date: None,
            weekly_progress: 0,
            monthly_progress: 0,
        }
    }
}

/// What a completion did to the daily streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakChange {
    /// First completion ever.
    Started,
    /// Last activity was yesterday.
    Extended,
    /// A day or more was skipped; the streak starts over at 1.
    Reset,
    /// Already active today; only the first completion of a day counts.
    SameDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub old_level: u32,
    pub new_level: u32,
}

/// Result of applying one completion to a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerUpdate {
    pub ledger: ProgressLedger,
    pub new_badges: Vec<String>,
    pub streak: StreakChange,
    pub level_up: Option<LevelUp>,
}

/// Position within the current level, for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    pub xp_into_level: u32,
    pub xp_per_level: u32,
    pub xp_to_next_level: u32,
}

impl LevelProgress {
    #[must_use]
    pub fn new(total_xp: u32, xp_per_level: u32) -> Self {
        let per_level = xp_per_level.max(1);
        let xp_into_level = total_xp % per_level;
        Self {
            level: level_for_xp(total_xp, per_level),
            xp_into_level,
            xp_per_level: per_level,
            xp_to_next_level: per_level - xp_into_level,
        }
    }

    /// Fraction of the current level completed, `0.0..1.0`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        f64::from(self.xp_into_level) / f64::from(self.xp_per_level)
    }
}

impl ProgressLedger {
    /// Load the stored profile. Missing, unreadable, or corrupt data yields
    /// a fresh profile.
    #[must_use]
    pub fn read<S: KeyValueStore>(store: &S) -> Self {
        read_json(store, USER_PROGRESS_KEY).unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns an error if the ledger cannot be encoded or the store rejects the write.
    pub fn write<S: KeyValueStore>(&self, store: &S) -> Result<(), QuestError> {
        let json = self.to_json()?;
        write_raw(store, USER_PROGRESS_KEY, &json)
    }

    pub(crate) fn to_json(&self) -> Result<String, QuestError> {
        encode_json(USER_PROGRESS_KEY, self)
    }

    #[must_use]
    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b == id)
    }

    #[must_use]
    pub fn level_progress(&self, xp_per_level: u32) -> LevelProgress {
        LevelProgress::new(self.total_xp, xp_per_level)
    }

    /// Update the daily streak for activity on `today`.
    pub fn advance_streak(&mut self, today: CalendarDay) -> StreakChange {
        let change = match self.last_active_date {
            Some(last) if last == today => StreakChange::SameDay,
            Some(last) if today.follows(last) => StreakChange::Extended,
            Some(_) => StreakChange::Reset,
            None => StreakChange::Started,
        };
        match change {
            StreakChange::Extended => {
                self.current_streak = self.current_streak.saturating_add(1);
            }
            StreakChange::Started | StreakChange::Reset => self.current_streak = 1,
            StreakChange::SameDay => {}
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_active_date = Some(today);
        change
    }

    /// Apply one finished challenge worth `earned_xp`, then unlock any badges
    /// the updated totals qualify for. Pure; persisting is the caller's job.
    #[must_use]
    pub fn apply_completion(
        &self,
        earned_xp: u32,
        today: CalendarDay,
        config: &GamificationConfig,
        badges: &BadgeCatalog,
    ) -> LedgerUpdate {
        let mut ledger = self.clone();
        let old_level = level_for_xp(self.total_xp, config.xp_per_level);

        ledger.total_xp = ledger.total_xp.saturating_add(earned_xp);
        ledger.level = level_for_xp(ledger.total_xp, config.xp_per_level);
        let streak = ledger.advance_streak(today);
        ledger.challenges_completed = ledger.challenges_completed.saturating_add(1);

        let new_badges = badges.evaluate(&ledger);
        ledger.badges.extend(new_badges.iter().cloned());

        let level_up = (ledger.level > old_level).then_some(LevelUp {
            old_level,
            new_level: ledger.level,
        });

        LedgerUpdate {
            ledger,
            new_badges,
            streak,
            level_up,
        }
    }
}
