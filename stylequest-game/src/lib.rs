//! StyleQuest Engine
//!
//! Platform-agnostic gamification core for the StyleQuest fashion app:
//! daily challenge rotation, XP, levels, streaks and badges.
//! Storage, time and randomness are injected so front ends (and tests)
//! decide where state lives and which day it is.

pub mod badges;
pub mod calendar;
pub mod catalog;
pub mod completion;
pub mod config;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod rotation;
pub mod steps;
pub mod storage;
pub mod xp;

// Re-export commonly used types
pub use badges::{BadgeCatalog, BadgeCategory, BadgeDefinition, BadgeStatus};
pub use calendar::{CalendarDay, Clock, FixedClock, SystemClock};
pub use catalog::{
    ChallengeCatalog, ChallengeCategory, ChallengeDefinition, ChallengeKind, Difficulty,
};
pub use completion::{CompletionOrchestrator, CompletionOutcome, read_today_xp};
pub use config::{GamificationConfig, XpFormula};
pub use error::{QuestError, StorageFailure};
pub use ledger::{LevelProgress, LevelUp, ProgressLedger, StreakChange, level_for_xp};
pub use rotation::{DailyChallengeInstance, DailyRotation, completed_count};
pub use steps::{
    Answer, AnswerError, ChallengeAnswers, ChallengeStep, StepCatalog, StepFlow, StepKind,
    StepOption, answered_count,
};
pub use storage::{KeyValueStore, MemoryStore, MemoryStoreError};
pub use xp::{XpBreakdown, earned_xp};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::constants::{
    DAILY_CHALLENGES_DATE_KEY, DAILY_CHALLENGES_KEY, USER_PROGRESS_KEY, today_xp_key,
};
use crate::storage::remove_key;

/// Main engine tying the progression pieces to one store, clock and
/// random source.
pub struct StyleQuest<S, C, R = ChaCha20Rng>
where
    S: KeyValueStore,
    C: Clock,
    R: Rng,
{
    store: S,
    clock: C,
    rng: R,
    config: GamificationConfig,
    challenges: ChallengeCatalog,
    badges: BadgeCatalog,
    steps: StepCatalog,
}

impl<S, C> StyleQuest<S, C, ChaCha20Rng>
where
    S: KeyValueStore,
    C: Clock,
{
    /// Engine whose rotations are reproducible for `seed`.
    #[must_use]
    pub fn seeded(store: S, clock: C, seed: u64) -> Self {
        Self::new(store, clock, ChaCha20Rng::seed_from_u64(seed))
    }
}

impl<S, C, R> StyleQuest<S, C, R>
where
    S: KeyValueStore,
    C: Clock,
    R: Rng,
{
    /// Create an engine with the bundled catalogs and configuration.
    #[must_use]
    pub fn new(store: S, clock: C, rng: R) -> Self {
        Self {
            store,
            clock,
            rng,
            config: GamificationConfig::default_config(),
            challenges: ChallengeCatalog::default_catalog().clone(),
            badges: BadgeCatalog::default_catalog().clone(),
            steps: StepCatalog::default_catalog().clone(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: GamificationConfig) -> Self {
        self.config = config.sanitized();
        self
    }

    #[must_use]
    pub fn with_challenge_catalog(mut self, catalog: ChallengeCatalog) -> Self {
        self.challenges = catalog;
        self
    }

    #[must_use]
    pub fn with_badge_catalog(mut self, catalog: BadgeCatalog) -> Self {
        self.badges = catalog;
        self
    }

    #[must_use]
    pub fn with_step_catalog(mut self, catalog: StepCatalog) -> Self {
        self.steps = catalog;
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    pub const fn config(&self) -> &GamificationConfig {
        &self.config
    }

    pub const fn badge_catalog(&self) -> &BadgeCatalog {
        &self.badges
    }

    /// Today's challenges, drawing and saving a new set on the first call of
    /// a day.
    pub fn todays_challenges(&mut self) -> Vec<DailyChallengeInstance> {
        let today = self.clock.today();
        self.set_for(today)
    }

    fn set_for(&mut self, day: CalendarDay) -> Vec<DailyChallengeInstance> {
        day_rotation(&self.challenges, &self.config).todays_set(&self.store, day, &mut self.rng)
    }

    /// Draw a new set for today.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::AlreadyCompletedToday`] once anything in today's
    /// set is completed, or a storage error if the new set cannot be saved.
    pub fn refresh_challenges(&mut self) -> Result<Vec<DailyChallengeInstance>, QuestError> {
        let today = self.clock.today();
        day_rotation(&self.challenges, &self.config).refresh(&self.store, today, &mut self.rng)
    }

    /// Step flow of a challenge, looked up in today's stored set first and
    /// then in the catalog.
    #[must_use]
    pub fn challenge_steps(&self, challenge_id: &str) -> Option<&[ChallengeStep]> {
        let today = self.clock.today();
        let title = day_rotation(&self.challenges, &self.config)
            .stored_set(&self.store, today)
            .and_then(|set| {
                set.into_iter()
                    .find(|c| c.id() == challenge_id)
                    .map(|c| c.challenge.title)
            })
            .or_else(|| self.challenges.find(challenge_id).map(|c| c.title.clone()))?;
        Some(self.steps.steps_for(&title))
    }

    /// Complete one of today's challenges.
    ///
    /// # Errors
    ///
    /// See [`CompletionOrchestrator::complete`].
    pub fn complete_challenge(
        &mut self,
        challenge_id: &str,
        answers: &ChallengeAnswers,
    ) -> Result<CompletionOutcome, QuestError> {
        let today = self.clock.today();
        let challenges = self.set_for(today);
        CompletionOrchestrator::new(&self.config, &self.badges, &self.steps).complete(
            &self.store,
            today,
            self.clock.now(),
            challenges,
            challenge_id,
            answers,
        )
    }

    #[must_use]
    pub fn progress(&self) -> ProgressLedger {
        ProgressLedger::read(&self.store)
    }

    #[must_use]
    pub fn level_progress(&self) -> LevelProgress {
        self.progress().level_progress(self.config.xp_per_level)
    }

    #[must_use]
    pub fn today_xp(&self) -> u32 {
        read_today_xp(&self.store, self.clock.today())
    }

    /// Every badge with whether the stored profile holds it.
    #[must_use]
    pub fn badges(&self) -> Vec<BadgeStatus<'_>> {
        self.badges.statuses(&self.progress())
    }

    /// Wipe today's rotation, today's XP counter and the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if any key cannot be removed.
    pub fn reset(&self) -> Result<(), QuestError> {
        remove_key(&self.store, DAILY_CHALLENGES_KEY)?;
        remove_key(&self.store, DAILY_CHALLENGES_DATE_KEY)?;
        remove_key(&self.store, &today_xp_key(self.clock.today()))?;
        remove_key(&self.store, USER_PROGRESS_KEY)?;
        log::info!("progress and rotation reset");
        Ok(())
    }
}

fn day_rotation<'a>(
    challenges: &'a ChallengeCatalog,
    config: &GamificationConfig,
) -> DailyRotation<'a> {
    DailyRotation::new(challenges, config.daily_set_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::cell::Cell;

    /// Reports 2026-10-16 once, then 2026-10-17 for every later call.
    struct MidnightClock {
        calls: Cell<u32>,
    }

    impl Clock for MidnightClock {
        fn today(&self) -> CalendarDay {
            let calls = self.calls.get();
            self.calls.set(calls + 1);
            CalendarDay::from_ymd(2026, 10, if calls == 0 { 16 } else { 17 }).unwrap()
        }

        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    fn engine() -> StyleQuest<MemoryStore, FixedClock> {
        let day = CalendarDay::from_ymd(2026, 10, 16).unwrap();
        StyleQuest::seeded(MemoryStore::new(), FixedClock::new(day), 42)
    }

    fn all_answers(steps: &[ChallengeStep]) -> ChallengeAnswers {
        steps
            .iter()
            .map(|s| (s.id.clone(), Answer::Text("yes".into())))
            .collect()
    }

    #[test]
    fn engine_plays_a_day() {
        let mut quest = engine();
        let set = quest.todays_challenges();
        assert_eq!(set.len(), 5);
        assert_eq!(quest.todays_challenges(), set);

        let id = set[0].id().to_string();
        let answers = all_answers(quest.challenge_steps(&id).unwrap());
        let outcome = quest.complete_challenge(&id, &answers).unwrap();
        assert_eq!(outcome.earned_xp, set[0].challenge.points);
        assert_eq!(quest.today_xp(), outcome.earned_xp);
        assert_eq!(quest.progress().challenges_completed, 1);
        assert_eq!(completed_count(&quest.todays_challenges()), 1);
        assert!(quest.badges().iter().any(|b| b.unlocked && b.badge.id == "first-challenge"));
        assert!(matches!(
            quest.refresh_challenges(),
            Err(QuestError::AlreadyCompletedToday { completed: 1 })
        ));
    }

    #[test]
    fn reset_clears_everything() {
        let mut quest = engine();
        let id = quest.todays_challenges()[0].id().to_string();
        quest.complete_challenge(&id, &ChallengeAnswers::new()).unwrap();
        quest.reset().unwrap();
        assert!(quest.store().is_empty());
        assert_eq!(quest.progress(), ProgressLedger::default());
        assert_eq!(quest.today_xp(), 0);
    }

    #[test]
    fn steps_fall_back_to_catalog_lookup() {
        let quest = engine();
        let steps = quest.challenge_steps("monday-5").unwrap();
        assert_eq!(steps.len(), 6);
        assert!(quest.challenge_steps("nope").is_none());
    }

    #[test]
    fn config_controls_set_size_and_levels() {
        let config = GamificationConfig {
            daily_set_size: 2,
            xp_per_level: 10,
            ..GamificationConfig::default()
        };
        let mut quest = engine().with_config(config);
        let set = quest.todays_challenges();
        assert_eq!(set.len(), 2);
        let id = set[0].id().to_string();
        let answers = all_answers(quest.challenge_steps(&id).unwrap());
        let outcome = quest.complete_challenge(&id, &answers).unwrap();
        assert_eq!(
            quest.level_progress().level,
            outcome.ledger.total_xp / 10 + 1
        );
        assert_eq!(outcome.ledger.level, quest.level_progress().level);
    }

    #[test]
    fn completion_keeps_the_set_and_its_day_together_across_midnight() {
        let clock = MidnightClock { calls: Cell::new(0) };
        let config = GamificationConfig {
            daily_set_size: 100,
            ..GamificationConfig::default()
        };
        let mut quest = StyleQuest::seeded(MemoryStore::new(), clock, 42).with_config(config);
        let friday = CalendarDay::from_ymd(2026, 10, 16).unwrap();
        let id = quest.challenges.pool_for_day(friday.weekday())[0].id.clone();

        let outcome = quest.complete_challenge(&id, &ChallengeAnswers::new()).unwrap();

        let store = quest.store();
        assert_eq!(
            store.get(DAILY_CHALLENGES_DATE_KEY).unwrap().as_deref(),
            Some("2026-10-16")
        );
        assert!(outcome.challenges.iter().all(|c| c.id().starts_with("friday-")));
        assert_eq!(read_today_xp(store, friday), outcome.earned_xp);
        assert_eq!(outcome.ledger.last_active_date, Some(friday));
    }

    #[test]
    fn custom_badge_catalog_drives_unlocks() {
        let badges = BadgeCatalog::from_json(
            r#"{"badges":[{"id":"warm-up","name":"Warm Up","description":"Finish one",
                "emoji":"🔥","category":"challenges","requirement":1}]}"#,
        )
        .unwrap();
        let mut quest = engine().with_badge_catalog(badges);
        let id = quest.todays_challenges()[0].id().to_string();
        let outcome = quest.complete_challenge(&id, &ChallengeAnswers::new()).unwrap();
        assert_eq!(outcome.new_badges, vec!["warm-up"]);
        assert_eq!(quest.badges().len(), 1);
        assert!(quest.badges()[0].unlocked);
    }
}
