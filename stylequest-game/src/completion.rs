//! Finishing a challenge: XP, ledger, badges and the persisted day set.
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::badges::BadgeCatalog;
use crate::calendar::CalendarDay;
use crate::config::GamificationConfig;
use crate::constants::{DAILY_CHALLENGES_DATE_KEY, DAILY_CHALLENGES_KEY, today_xp_key};
use crate::error::QuestError;
use crate::ledger::{LevelUp, ProgressLedger, StreakChange};
use crate::rotation::DailyChallengeInstance;
use crate::steps::{ChallengeAnswers, StepCatalog, answered_count};
use crate::storage::{KeyValueStore, WriteJournal, encode_json, read_raw};
use crate::xp::{XpBreakdown, earned_xp};

/// Everything a front end needs to celebrate a completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub challenge_id: String,
    pub earned_xp: u32,
    pub xp: XpBreakdown,
    pub ledger: ProgressLedger,
    pub challenges: Vec<DailyChallengeInstance>,
    pub new_badges: Vec<String>,
    pub today_xp: u32,
    pub streak: StreakChange,
    pub level_up: Option<LevelUp>,
}

/// XP earned on `day`; zero when nothing was recorded or the value is garbled.
#[must_use]
pub fn read_today_xp<S: KeyValueStore>(store: &S, day: CalendarDay) -> u32 {
    read_raw(store, &today_xp_key(day))
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy)]
pub struct CompletionOrchestrator<'a> {
    config: &'a GamificationConfig,
    badges: &'a BadgeCatalog,
    steps: &'a StepCatalog,
}

impl<'a> CompletionOrchestrator<'a> {
    #[must_use]
    pub const fn new(
        config: &'a GamificationConfig,
        badges: &'a BadgeCatalog,
        steps: &'a StepCatalog,
    ) -> Self {
        Self {
            config,
            badges,
            steps,
        }
    }

    /// Complete `challenge_id` from `challenges`, the set stored for `today`,
    /// with `answers`. `completed_at` stamps the finished instance.
    ///
    /// Writes happen in order: the updated set, today's XP counter, then the
    /// ledger. If any write fails, the earlier ones are rolled back so the
    /// set and the ledger never disagree.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::UnknownChallenge`] or
    /// [`QuestError::AlreadyCompleted`] without touching storage, or a
    /// storage error after rolling back partial writes.
    pub fn complete<S: KeyValueStore>(
        &self,
        store: &S,
        today: CalendarDay,
        completed_at: DateTime<Utc>,
        mut challenges: Vec<DailyChallengeInstance>,
        challenge_id: &str,
        answers: &ChallengeAnswers,
    ) -> Result<CompletionOutcome, QuestError> {
        let index = challenges
            .iter()
            .position(|c| c.id() == challenge_id)
            .ok_or_else(|| QuestError::UnknownChallenge {
                id: challenge_id.to_string(),
            })?;
        if challenges[index].is_completed {
            log::info!("rejected repeat completion of {challenge_id}");
            return Err(QuestError::AlreadyCompleted {
                id: challenge_id.to_string(),
            });
        }

        let before = ProgressLedger::read(store);
        let definition = &challenges[index].challenge;
        let steps = self.steps.steps_for(&definition.title);
        let answered = answered_count(steps, answers);
        let xp = earned_xp(
            self.config,
            definition,
            answered,
            steps.len(),
            before.current_streak,
        );
        log::debug!(
            "{challenge_id}: {answered}/{} steps answered, base {} + bonus {} -> {} XP",
            steps.len(),
            xp.base_xp,
            xp.streak_bonus,
            xp.earned
        );

        challenges[index].mark_completed(completed_at);
        let today_xp = read_today_xp(store, today).saturating_add(xp.earned);
        let update = before.apply_completion(xp.earned, today, self.config, self.badges);

        let mut journal = WriteJournal::new(store);
        if let Err(err) = persist(&mut journal, today, &challenges, today_xp, &update.ledger) {
            log::warn!("completion of {challenge_id} not saved, rolling back: {err}");
            journal.rollback();
            return Err(err);
        }

        log::info!(
            "completed {challenge_id}: +{} XP, streak {}, {} new badge(s)",
            xp.earned,
            update.ledger.current_streak,
            update.new_badges.len()
        );
        Ok(CompletionOutcome {
            challenge_id: challenge_id.to_string(),
            earned_xp: xp.earned,
            xp,
            ledger: update.ledger,
            challenges,
            new_badges: update.new_badges,
            today_xp,
            streak: update.streak,
            level_up: update.level_up,
        })
    }
}

fn persist<S: KeyValueStore>(
    journal: &mut WriteJournal<'_, S>,
    today: CalendarDay,
    challenges: &[DailyChallengeInstance],
    today_xp: u32,
    ledger: &ProgressLedger,
) -> Result<(), QuestError> {
    let set_json = encode_json(DAILY_CHALLENGES_KEY, &challenges)?;
    let ledger_json = ledger.to_json()?;
    journal.write(DAILY_CHALLENGES_KEY, &set_json)?;
    journal.write(DAILY_CHALLENGES_DATE_KEY, &today.to_string())?;
    journal.write(&today_xp_key(today), &today_xp.to_string())?;
    journal.write(crate::constants::USER_PROGRESS_KEY, &ledger_json)
}
