//! Daily challenge rotation.
//!
//! A day's set is drawn once, persisted, and then reused for the rest of
//! that calendar day so completion flags are never silently discarded.
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDay;
use crate::catalog::{ChallengeCatalog, ChallengeDefinition};
use crate::constants::{DAILY_CHALLENGES_DATE_KEY, DAILY_CHALLENGES_KEY};
use crate::error::QuestError;
use crate::storage::{KeyValueStore, encode_json, read_json, read_raw, write_raw};

/// A catalog challenge as it appears in one day's set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallengeInstance {
    #[serde(flatten)]
    pub challenge: ChallengeDefinition,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub max_progress: u32,
}

impl DailyChallengeInstance {
    #[must_use]
    pub fn fresh(challenge: ChallengeDefinition) -> Self {
        let max_progress = challenge.max_progress();
        Self {
            challenge,
            is_completed: false,
            completed_at: None,
            progress: 0,
            max_progress,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.challenge.id
    }

    /// Flag as done at `at` with full progress.
    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.is_completed = true;
        self.completed_at = Some(at);
        self.progress = self.max_progress;
    }

    /// Repair fields older payloads may have left empty.
    fn normalized(mut self) -> Self {
        if self.max_progress == 0 {
            self.max_progress = self.challenge.max_progress();
        }
        self
    }
}

/// Number of completed instances in `set`.
#[must_use]
pub fn completed_count(set: &[DailyChallengeInstance]) -> usize {
    set.iter().filter(|c| c.is_completed).count()
}

/// Picks and remembers each day's challenges.
#[derive(Debug, Clone, Copy)]
pub struct DailyRotation<'a> {
    catalog: &'a ChallengeCatalog,
    set_size: usize,
}

impl<'a> DailyRotation<'a> {
    #[must_use]
    pub const fn new(catalog: &'a ChallengeCatalog, set_size: usize) -> Self {
        Self { catalog, set_size }
    }

    /// The persisted set for `today`, if one exists and parses.
    #[must_use]
    pub fn stored_set<S: KeyValueStore>(
        &self,
        store: &S,
        today: CalendarDay,
    ) -> Option<Vec<DailyChallengeInstance>> {
        let stored_day = read_raw(store, DAILY_CHALLENGES_DATE_KEY)?;
        if stored_day.parse::<CalendarDay>().ok() != Some(today) {
            log::debug!("stored rotation is for {stored_day}, today is {today}");
            return None;
        }
        let set: Vec<DailyChallengeInstance> = read_json(store, DAILY_CHALLENGES_KEY)?;
        Some(set.into_iter().map(DailyChallengeInstance::normalized).collect())
    }

    /// Shuffle `today`'s weekday pool and take up to the configured set size.
    pub fn draw<R>(&self, today: CalendarDay, rng: &mut R) -> Vec<DailyChallengeInstance>
    where
        R: Rng + ?Sized,
    {
        let mut pool: Vec<&ChallengeDefinition> =
            self.catalog.pool_for_day(today.weekday()).iter().collect();
        pool.shuffle(rng);
        pool.into_iter()
            .take(self.set_size)
            .cloned()
            .map(DailyChallengeInstance::fresh)
            .collect()
    }

    /// Today's set: the stored one when it is from today, otherwise a fresh
    /// draw that is persisted before returning. A failed persist is logged and
    /// the drawn set is still returned.
    pub fn todays_set<S, R>(
        &self,
        store: &S,
        today: CalendarDay,
        rng: &mut R,
    ) -> Vec<DailyChallengeInstance>
    where
        S: KeyValueStore,
        R: Rng + ?Sized,
    {
        if let Some(set) = self.stored_set(store, today) {
            return set;
        }
        let set = self.draw(today, rng);
        log::info!(
            "drew {} challenges for {today} ({})",
            set.len(),
            today.weekday()
        );
        if let Err(err) = save_set(store, today, &set) {
            log::warn!("could not persist today's challenges: {err}");
        }
        set
    }

    /// Replace today's set with a fresh draw. Refused while any of today's
    /// challenges is completed, since that would throw the progress away.
    ///
    /// # Errors
    ///
    /// Returns [`QuestError::AlreadyCompletedToday`] when the current set has
    /// completions, or a storage error if the new set cannot be saved.
    pub fn refresh<S, R>(
        &self,
        store: &S,
        today: CalendarDay,
        rng: &mut R,
    ) -> Result<Vec<DailyChallengeInstance>, QuestError>
    where
        S: KeyValueStore,
        R: Rng + ?Sized,
    {
        if let Some(current) = self.stored_set(store, today) {
            let completed = completed_count(&current);
            if completed > 0 {
                return Err(QuestError::AlreadyCompletedToday { completed });
            }
        }
        let set = self.draw(today, rng);
        save_set(store, today, &set)?;
        log::info!("refreshed challenges for {today}");
        Ok(set)
    }
}

/// Persist `set` as the rotation for `today`. The list is written before the
/// date so an interrupted save never pairs today's date with an old list.
///
/// # Errors
///
/// Returns an error if the set cannot be encoded or either write fails.
pub fn save_set<S: KeyValueStore>(
    store: &S,
    today: CalendarDay,
    set: &[DailyChallengeInstance],
) -> Result<(), QuestError> {
    let json = encode_json(DAILY_CHALLENGES_KEY, &set)?;
    write_raw(store, DAILY_CHALLENGES_KEY, &json)?;
    write_raw(store, DAILY_CHALLENGES_DATE_KEY, &today.to_string())
}
