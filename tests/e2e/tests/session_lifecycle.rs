//! End-to-end coverage of a full `SessionContext` launch: assemble, submit a
//! mix of scored and KNOWN-filler items, flush, and verify both the card
//! state and the event log landed in the database.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use vocab_core::card::{CardKey, ExerciseType, Grade};
use vocab_core::context::SessionContext;
use vocab_core::pool::{CardSnapshot, PoolSnapshot};
use vocab_core::session::Activity;
use vocab_core::storage::CardStore;

use vocab_e2e_tests::harness::db_manager::TestDatabaseManager;
use vocab_e2e_tests::mocks::fixtures::WordFixtures;

#[test]
fn full_session_round_trips_through_sqlite() {
    let mut db = TestDatabaseManager::new_temp();
    let user_id = "learner-1";

    // Three due cards plus one comfortably known card.
    let mut cards = Vec::new();
    for i in 0..3 {
        let word_id = format!("due{i}");
        db.seed_ltm_card(user_id, &word_id, ExerciseType::WordTranslation, 0);
        let r = db.store.snapshot_cards(user_id, ExerciseType::WordTranslation, Utc::now()).unwrap();
        let retrievability = r.iter().find(|c| c.word_id == word_id).unwrap().retrievability;
        cards.push(CardSnapshot { word_id, retrievability });
    }
    let known_word = WordFixtures::noun("kat", "cat");
    let now = Utc::now();
    let known_card = {
        let key = CardKey::new(user_id, known_word.word_id.clone(), ExerciseType::WordTranslation);
        vocab_core::card::CardState {
            key,
            stability: 30.0,
            difficulty: 2.0,
            effective_difficulty: 2.0,
            review_count: 5,
            last_review_timestamp: now,
            last_ltm_timestamp: Some(now),
            ltm_review_date: Some(now.date_naive()),
            stm_success_count_today: 0,
        }
    };
    db.store.save_card(&known_card).unwrap();
    cards.push(CardSnapshot {
        word_id: known_word.word_id.clone(),
        retrievability: known_card.retrievability_at(now),
    });

    let pool = PoolSnapshot::build(&cards, &[], Vec::new(), db.config().r_target);
    let mut config = db.config().clone();
    config.session_size.insert("word_translation".to_string(), 4);

    let mut context =
        SessionContext::new(user_id, Activity::WordTranslation, &db.store, config, pool, "session-lifecycle");
    let mut rng = StdRng::seed_from_u64(1);
    let assembled = context.start_session(&mut rng);
    assert_eq!(assembled.items.len(), 4);

    for (position, item) in assembled.items.iter().enumerate() {
        let is_filler = item.source_pool == vocab_core::pool::PoolStatus::Known;
        let grade = if is_filler { Grade::Medium } else { Grade::Easy };
        context
            .submit(&item.word_id, item.exercise_type, grade, Some(1200), is_filler, position as u32, None)
            .unwrap();
        if !is_filler {
            context.apply_pool_grade(&item.word_id, grade);
        }
    }

    context.flush().unwrap();

    // Every due card should now show a fresh review count and be out of LTM.
    for i in 0..3 {
        let key = CardKey::new(user_id, format!("due{i}"), ExerciseType::WordTranslation);
        let stored = db.store.load_card(&key).unwrap().unwrap();
        assert_eq!(stored.review_count, 4); // 3 seeded + 1 EASY from this session
    }

    // The KNOWN filler item must not have been touched by the update engine.
    let known_key = CardKey::new(user_id, &known_word.word_id, ExerciseType::WordTranslation);
    let stored_known = db.store.load_card(&known_key).unwrap().unwrap();
    assert_eq!(stored_known.review_count, 5);
}

#[test]
fn end_session_flushes_pending_writes() {
    let db = TestDatabaseManager::new_temp();
    let pool = PoolSnapshot::build(&[], &[], vec!["fresh".to_string()], db.config().r_target);
    let mut context = SessionContext::new(
        "u1",
        Activity::WordTranslation,
        &db.store,
        db.config().clone(),
        pool,
        "session-end",
    );
    context.submit("fresh", ExerciseType::WordTranslation, Grade::Medium, None, false, 0, None).unwrap();
    context.apply_pool_grade("fresh", Grade::Medium);
    context.end_session().unwrap();

    let key = CardKey::new("u1", "fresh", ExerciseType::WordTranslation);
    let stored = db.store.load_card(&key).unwrap();
    assert!(stored.is_some());
}
