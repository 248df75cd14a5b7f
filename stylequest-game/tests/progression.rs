use stylequest_game::constants::{
    DAILY_CHALLENGES_DATE_KEY, DAILY_CHALLENGES_KEY, USER_PROGRESS_KEY,
};
use stylequest_game::{
    Answer, BadgeCatalog, CalendarDay, ChallengeAnswers, ChallengeCatalog, Clock, FixedClock,
    KeyValueStore, MemoryStore, ProgressLedger, QuestError, StepCatalog, StreakChange, StyleQuest,
    completed_count, level_for_xp,
};

const CUSTOM_CHALLENGES: &str = r#"{
  "pools": {
    "friday": [
      {
        "id": "friday-capsule",
        "title": "Capsule Wardrobe Builder",
        "emoji": "🧳",
        "description": "Build a tiny capsule",
        "instructions": "Pick core items and count the outfits",
        "difficulty": "Hard",
        "category": "Learning",
        "points": 40,
        "xpReward": 25,
        "streakBonus": 5,
        "type": "task",
        "requirements": ["a", "b", "c", "d", "e"],
        "rewards": ["40 XP"]
      }
    ]
  }
}"#;

const CUSTOM_STEPS: &str = r#"{
  "flows": [
    {
      "title": "Capsule",
      "steps": [
        { "id": "one", "kind": "text_input", "question": "1?" },
        { "id": "two", "kind": "text_input", "question": "2?" },
        { "id": "three", "kind": "text_input", "question": "3?" },
        { "id": "four", "kind": "text_input", "question": "4?" },
        { "id": "five", "kind": "text_input", "question": "5?" }
      ]
    }
  ]
}"#;

fn friday() -> CalendarDay {
    CalendarDay::from_ymd(2026, 10, 16).unwrap()
}

fn quest(store: &MemoryStore, seed: u64) -> StyleQuest<MemoryStore, FixedClock> {
    StyleQuest::seeded(store.clone(), FixedClock::new(friday()), seed)
}

fn capsule_quest(store: &MemoryStore) -> StyleQuest<MemoryStore, FixedClock> {
    quest(store, 1)
        .with_challenge_catalog(ChallengeCatalog::from_json(CUSTOM_CHALLENGES).unwrap())
        .with_step_catalog(StepCatalog::from_json(CUSTOM_STEPS).unwrap())
}

fn answers(ids: &[&str]) -> ChallengeAnswers {
    ids.iter()
        .map(|id| ((*id).to_string(), Answer::Text("done".into())))
        .collect()
}

fn complete_first_open(quest: &mut StyleQuest<MemoryStore, FixedClock>) -> u32 {
    let set = quest.todays_challenges();
    let open = set.iter().find(|c| !c.is_completed).unwrap();
    let id = open.id().to_string();
    let step_ids: Vec<String> = quest
        .challenge_steps(&id)
        .unwrap()
        .iter()
        .map(|s| s.id.clone())
        .collect();
    let refs: Vec<&str> = step_ids.iter().map(String::as_str).collect();
    quest
        .complete_challenge(&id, &answers(&refs))
        .unwrap()
        .earned_xp
}

#[test]
fn same_day_calls_return_identical_sets() {
    let store = MemoryStore::new();
    let first = quest(&store, 7).todays_challenges();
    // A different seed must not matter once the day's set is stored.
    let second = quest(&store, 8).todays_challenges();
    assert_eq!(first, second);
    assert_eq!(
        store.get(DAILY_CHALLENGES_DATE_KEY).unwrap().as_deref(),
        Some("2026-10-16")
    );
}

#[test]
fn completion_survives_reload_and_blocks_regeneration() {
    let store = MemoryStore::new();
    let mut first = quest(&store, 3);
    complete_first_open(&mut first);

    let mut reloaded = quest(&store, 99);
    let set = reloaded.todays_challenges();
    assert_eq!(completed_count(&set), 1);
    assert!(matches!(
        reloaded.refresh_challenges(),
        Err(QuestError::AlreadyCompletedToday { .. })
    ));
    assert_eq!(reloaded.todays_challenges(), set);
}

#[test]
fn full_performance_on_a_fresh_profile_earns_all_points() {
    let store = MemoryStore::new();
    let mut quest = capsule_quest(&store);
    quest.todays_challenges();

    let outcome = quest
        .complete_challenge("friday-capsule", &answers(&["one", "two", "three", "four", "five"]))
        .unwrap();
    assert_eq!(outcome.earned_xp, 40);
    assert_eq!(outcome.ledger.total_xp, 40);
    assert_eq!(outcome.ledger.level, 1);
    assert_eq!(outcome.ledger.current_streak, 1);
    assert_eq!(outcome.ledger.challenges_completed, 1);
    assert_eq!(outcome.new_badges, vec!["first-challenge"]);
    assert_eq!(outcome.level_up, None);
}

#[test]
fn one_of_five_steps_earns_the_scaled_amount() {
    let store = MemoryStore::new();
    let mut quest = capsule_quest(&store);
    let outcome = quest
        .complete_challenge("friday-capsule", &answers(&["three"]))
        .unwrap();
    // floor(0.2 * 25) = 5, 5 + 0.2 * (40 - 5) = 12
    assert_eq!(outcome.earned_xp, 12);
    assert_eq!(quest.today_xp(), 12);
}

#[test]
fn xp_never_exceeds_points_even_with_a_streak() {
    let store = MemoryStore::new();
    let ledger = ProgressLedger {
        current_streak: 10,
        last_active_date: friday().previous(),
        ..ProgressLedger::default()
    };
    ledger.write(&store).unwrap();

    let mut quest = capsule_quest(&store);
    let outcome = quest
        .complete_challenge("friday-capsule", &answers(&["one", "two", "three", "four", "five"]))
        .unwrap();
    assert_eq!(outcome.xp.streak_bonus, 5);
    assert_eq!(outcome.earned_xp, 40);
    assert_eq!(outcome.ledger.current_streak, 11);
}

#[test]
fn streak_follows_calendar_days() {
    let store = MemoryStore::new();
    let clock = FixedClock::new(friday());
    let mut quest = StyleQuest::seeded(store.clone(), clock, 5);
    let mut streaks = Vec::new();

    for advance in [0, 0, 1, 1, 2] {
        quest.clock().advance_days(advance);
        complete_first_open(&mut quest);
        streaks.push(quest.progress().current_streak);
    }
    // same day, next day, next day, gap of one day
    assert_eq!(streaks, vec![1, 1, 2, 3, 1]);
    let ledger = quest.progress();
    assert_eq!(ledger.longest_streak, 3);
    assert_eq!(ledger.challenges_completed, 5);
    assert_eq!(ledger.last_active_date, Some(quest.clock().today()));

    let later = CalendarDay::from_ymd(2026, 12, 1).unwrap();
    quest.clock().set_day(later);
    complete_first_open(&mut quest);
    let ledger = quest.progress();
    assert_eq!(ledger.current_streak, 1);
    assert_eq!(ledger.longest_streak, 3);
    assert_eq!(ledger.last_active_date, Some(later));
    assert_eq!(
        store.get(DAILY_CHALLENGES_DATE_KEY).unwrap().as_deref(),
        Some("2026-12-01")
    );
}

#[test]
fn same_day_completions_leave_the_streak_alone() {
    let store = MemoryStore::new();
    let mut quest = quest(&store, 11);
    complete_first_open(&mut quest);
    let set = quest.todays_challenges();
    let id = set.iter().find(|c| !c.is_completed).unwrap().id().to_string();
    let outcome = quest.complete_challenge(&id, &ChallengeAnswers::new()).unwrap();
    assert_eq!(outcome.streak, StreakChange::SameDay);
    assert_eq!(outcome.ledger.current_streak, 1);
}

#[test]
fn level_is_always_derived_from_total_xp() {
    let store = MemoryStore::new();
    let clock = FixedClock::new(friday());
    let mut quest = StyleQuest::seeded(store.clone(), clock, 21);

    for _ in 0..4 {
        for _ in 0..5 {
            complete_first_open(&mut quest);
            let ledger = quest.progress();
            assert_eq!(ledger.level, level_for_xp(ledger.total_xp, 100));
            assert_eq!(ledger.level, ledger.total_xp / 100 + 1);
        }
        quest.clock().advance_days(1);
    }
    assert!(quest.progress().level >= 2);
}

#[test]
fn badges_are_awarded_once() {
    let store = MemoryStore::new();
    let clock = FixedClock::new(friday());
    let mut quest = StyleQuest::seeded(store.clone(), clock, 33);
    let mut awarded = Vec::new();

    for _ in 0..3 {
        for _ in 0..5 {
            let set = quest.todays_challenges();
            let id = set.iter().find(|c| !c.is_completed).unwrap().id().to_string();
            let outcome = quest.complete_challenge(&id, &ChallengeAnswers::new()).unwrap();
            awarded.extend(outcome.new_badges);
        }
        quest.clock().advance_days(1);
    }

    let mut unique = awarded.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), awarded.len());

    let ledger = quest.progress();
    assert_eq!(ledger.badges, awarded);
    for id in ["first-challenge", "streak-3", "challenges-10"] {
        assert!(ledger.has_badge(id), "missing {id}");
    }
    assert!(BadgeCatalog::default_catalog().evaluate(&ledger).is_empty());
}

#[test]
fn failed_profile_write_rolls_back_the_day() {
    let store = MemoryStore::new();
    let mut quest = quest(&store, 2);
    let set = quest.todays_challenges();
    let before = store.snapshot();

    store.fail_writes_for(USER_PROGRESS_KEY);
    let err = quest
        .complete_challenge(set[0].id(), &ChallengeAnswers::new())
        .unwrap_err();
    assert!(matches!(err, QuestError::StorageWrite { .. }));
    assert!(!err.is_rejection());
    assert_eq!(store.snapshot(), before);

    store.clear_write_failures();
    let outcome = quest
        .complete_challenge(set[0].id(), &ChallengeAnswers::new())
        .unwrap();
    assert_eq!(outcome.ledger.challenges_completed, 1);
}

#[test]
fn corrupt_records_fall_back_to_defaults() {
    let store = MemoryStore::new();
    store.set(USER_PROGRESS_KEY, "{not json").unwrap();
    store.set(DAILY_CHALLENGES_DATE_KEY, "2026-10-16").unwrap();
    store.set(DAILY_CHALLENGES_KEY, "42").unwrap();

    let mut quest = quest(&store, 4);
    assert_eq!(quest.progress(), ProgressLedger::default());
    assert_eq!(quest.todays_challenges().len(), 5);
    complete_first_open(&mut quest);
    assert_eq!(quest.progress().challenges_completed, 1);
}

#[test]
fn profiles_from_the_web_client_keep_working() {
    let store = MemoryStore::new();
    store
        .set(
            USER_PROGRESS_KEY,
            r#"{"totalXP":240,"level":3,"currentStreak":2,"longestStreak":4,
                "challengesCompleted":9,"badges":["first-challenge","xp-100"],
                "lastActiveDate":"Thu Oct 15 2026","weeklyProgress":0,"monthlyProgress":0}"#,
        )
        .unwrap();

    let mut quest = quest(&store, 6);
    assert_eq!(quest.progress().total_xp, 240);
    let xp = complete_first_open(&mut quest);
    let ledger = quest.progress();
    // Active on Thursday, so Friday extends the streak.
    assert_eq!(ledger.current_streak, 3);
    assert_eq!(ledger.longest_streak, 4);
    assert_eq!(ledger.total_xp, 240 + xp);
    assert_eq!(ledger.last_active_date, Some(friday()));
    assert!(ledger.has_badge("challenges-10"));
    assert!(ledger.has_badge("streak-3"));
}

#[test]
fn web_client_day_strings_keep_todays_set() {
    let store = MemoryStore::new();
    let mut first = quest(&store, 4);
    complete_first_open(&mut first);
    let set = first.todays_challenges();
    store
        .set(DAILY_CHALLENGES_DATE_KEY, "Fri Oct 16 2026")
        .unwrap();

    let mut reloaded = quest(&store, 40);
    let again = reloaded.todays_challenges();
    assert_eq!(again, set);
    assert_eq!(completed_count(&again), 1);
    assert!(matches!(
        reloaded.refresh_challenges(),
        Err(QuestError::AlreadyCompletedToday { completed: 1 })
    ));
}
