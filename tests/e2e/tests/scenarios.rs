//! End-to-end scenario tests driving the full `SqliteStore` + `SessionContext`
//! stack, covering the scenarios that span persistence and pool assembly
//! rather than the pure update-engine math (covered by unit tests in
//! `vocab-core` itself).

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use vocab_core::card::{CardKey, ExerciseType, Grade};
use vocab_core::context::SessionContext;
use vocab_core::pool::{CardSnapshot, PoolSnapshot, PoolStatus, RecentAgain};
use vocab_core::session::Activity;
use vocab_core::storage::CardStore;

use vocab_e2e_tests::harness::db_manager::TestDatabaseManager;

/// A verb's joint retrievability is `min(R_perfectum, R_past)`, it lands in
/// LTM sorted by that joint score, and a grade submitted on only one of its
/// two tense steps must not move it out of the pool yet.
#[test]
fn verb_pool_move_waits_for_both_tense_grades() {
    let mut db = TestDatabaseManager::new_temp();
    let user_id = "u1";

    db.seed_ltm_card(user_id, "v1", ExerciseType::VerbPerfectum, 0);
    db.seed_ltm_card(user_id, "v1", ExerciseType::VerbPastTense, 0);

    let now = Utc::now();
    let r_perfectum =
        db.store.snapshot_cards(user_id, ExerciseType::VerbPerfectum, now).unwrap()[0].retrievability;
    let r_past =
        db.store.snapshot_cards(user_id, ExerciseType::VerbPastTense, now).unwrap()[0].retrievability;

    let joint = CardSnapshot { word_id: "v1".to_string(), retrievability: r_perfectum.min(r_past) };
    let pool = PoolSnapshot::build(&[joint], &[], Vec::new(), db.config().r_target);
    assert_eq!(pool.status_of("v1"), Some(PoolStatus::Ltm));
    assert_eq!(pool.score_of("v1"), Some(r_perfectum.min(r_past)));

    let mut context =
        SessionContext::new(user_id, Activity::Verb, &db.store, db.config().clone(), pool, "session-e");

    context.submit("v1", ExerciseType::VerbPerfectum, Grade::Medium, None, false, 0, None).unwrap();
    // Pool membership only changes once both tense grades are known; a
    // single submit() must leave it untouched.
    assert_eq!(context.pool().status_of("v1"), Some(PoolStatus::Ltm));

    context.submit("v1", ExerciseType::VerbPastTense, Grade::Medium, None, false, 1, None).unwrap();
    let combined = vocab_core::session::combine_verb_grades(Grade::Medium, Grade::Medium, false);
    context.apply_pool_grade("v1", combined);
    assert_eq!(context.pool().status_of("v1"), Some(PoolStatus::Known));

    context.flush().unwrap();
    let perfectum_key = CardKey::new(user_id, "v1", ExerciseType::VerbPerfectum);
    let stored = db.store.load_card(&perfectum_key).unwrap().unwrap();
    assert_eq!(stored.review_count, 4); // 3 seeded + 1 from this test
}

/// A card currently in STM (most recent feedback HARD) moves to KNOWN on an
/// EASY grade and is no longer eligible for the same activity's next
/// session launch.
#[test]
fn stm_card_exits_to_known_pool_on_easy_grade() {
    let mut db = TestDatabaseManager::new_temp();
    let user_id = "u1";
    db.seed_stm_card(user_id, "snel", ExerciseType::WordTranslation);

    let recent = vec![RecentAgain { word_id: "snel".to_string(), most_recent_grade: Grade::Hard }];
    let pool = PoolSnapshot::build(&[], &recent, Vec::new(), db.config().r_target);
    assert_eq!(pool.status_of("snel"), Some(PoolStatus::Stm));

    let mut context = SessionContext::new(
        user_id,
        Activity::WordTranslation,
        &db.store,
        db.config().clone(),
        pool,
        "session-f",
    );
    context.submit("snel", ExerciseType::WordTranslation, Grade::Easy, None, false, 0, None).unwrap();
    context.apply_pool_grade("snel", Grade::Easy);
    assert_eq!(context.pool().status_of("snel"), Some(PoolStatus::Known));

    // A freshly built pool for the next launch (no more recent AGAIN, card
    // retrievability high after the EASY) must not put it back in STM.
    let now = Utc::now();
    let snapshot = db.store.snapshot_cards(user_id, ExerciseType::WordTranslation, now).unwrap();
    let no_recent_again: Vec<RecentAgain> = Vec::new();
    context.flush().unwrap();
    let next_pool = PoolSnapshot::build(&snapshot, &no_recent_again, Vec::new(), db.config().r_target);
    assert_ne!(next_pool.status_of("snel"), Some(PoolStatus::Stm));
}

/// Pool exhaustion with zero items available is a valid outcome, not an error.
#[test]
fn empty_pool_yields_empty_session_with_reason() {
    let db = TestDatabaseManager::new_temp();
    let pool = PoolSnapshot::build(&[], &[], Vec::new(), db.config().r_target);
    let context =
        SessionContext::new("u1", Activity::WordTranslation, &db.store, db.config().clone(), pool, "session-empty");
    let mut rng = StdRng::seed_from_u64(7);
    let assembled = context.start_session(&mut rng);
    assert!(assembled.items.is_empty());
    assert_eq!(assembled.shortfall_reason.as_deref(), Some("no items available"));
}
