//! Storage keys and default tuning values.
//!
//! The key names match what the web client has always written to local
//! storage, so existing profiles keep working.

// Storage keys -------------------------------------------------------------
pub const DAILY_CHALLENGES_KEY: &str = "dailyChallenges";
pub const DAILY_CHALLENGES_DATE_KEY: &str = "dailyChallengesDate";
pub const USER_PROGRESS_KEY: &str = "userProgress";
pub const TODAY_XP_KEY_PREFIX: &str = "todayXP:";

// Tuning defaults ----------------------------------------------------------
pub const DEFAULT_DAILY_SET_SIZE: usize = 5;
pub const DEFAULT_XP_PER_LEVEL: u32 = 100;
pub const DEFAULT_MIN_XP_RATIO: f64 = 0.2;
pub const DEFAULT_FLAT_XP_PER_STEP: u32 = 10;

/// Key of the per-day XP counter.
#[must_use]
pub fn today_xp_key(day: crate::CalendarDay) -> String {
    format!("{TODAY_XP_KEY_PREFIX}{day}")
}
