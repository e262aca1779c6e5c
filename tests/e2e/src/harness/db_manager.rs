//! Test database manager
//!
//! Provides isolated [`SqliteStore`] instances for end-to-end tests: a
//! temporary database that is cleaned up when the manager drops, plus
//! seeding helpers for the three memory states a card can be in
//! (new/never reviewed, a well-learned LTM card, a struggling STM card).

use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use vocab_core::card::{CardKey, CardState, ExerciseType, Grade};
use vocab_core::config::SchedulerConfig;
use vocab_core::engine;
use vocab_core::storage::{CardStore, SqliteStore};

/// Owns a temp-dir-backed [`SqliteStore`] for one test.
///
/// The temp directory is kept alive for the manager's lifetime so the
/// underlying file survives until the test finishes and the directory is
/// removed on drop.
pub struct TestDatabaseManager {
    pub store: SqliteStore,
    _temp_dir: TempDir,
    config: SchedulerConfig,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory.
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let db_path = temp_dir.path().join("test_vocab.db");
        let store = SqliteStore::new(Some(db_path)).expect("failed to create test store");
        Self { store, _temp_dir: temp_dir, config: SchedulerConfig::default() }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Insert a brand-new card (never reviewed) for `word_id`.
    pub fn seed_new_card(&mut self, user_id: &str, word_id: &str, exercise_type: ExerciseType) -> CardState {
        let key = CardKey::new(user_id, word_id, exercise_type);
        let card = CardState::new_card(key, Utc::now(), &self.config);
        self.store.save_card(&card).expect("failed to save seeded card");
        card
    }

    /// Insert a card that looks well-learned: several LTM successes, most
    /// recently `days_ago` days in the past, so its retrievability sits
    /// comfortably above `r_target`.
    pub fn seed_ltm_card(
        &mut self,
        user_id: &str,
        word_id: &str,
        exercise_type: ExerciseType,
        days_ago: i64,
    ) -> CardState {
        let key = CardKey::new(user_id, word_id, exercise_type);
        let mut card = CardState::new_card(key, Utc::now() - Duration::days(days_ago + 30), &self.config);
        let mut now = Utc::now() - Duration::days(days_ago + 20);
        for _ in 0..3 {
            let (next, _event) = engine::process_review(&card, Grade::Medium, None, now, &self.config);
            card = next;
            now += Duration::days(7);
        }
        self.store.save_card(&card).expect("failed to save seeded card");
        card
    }

    /// Insert a card fresh out of an AGAIN: LTM review today, then a same-day
    /// AGAIN, so the engine classifies the failure as STM rather than LTM.
    pub fn seed_stm_card(&mut self, user_id: &str, word_id: &str, exercise_type: ExerciseType) -> CardState {
        let key = CardKey::new(user_id, word_id, exercise_type);
        let card = CardState::new_card(key, Utc::now() - Duration::days(10), &self.config);
        let now = Utc::now();
        let (after_ltm, _) = engine::process_review(&card, Grade::Medium, None, now, &self.config);
        let (after_again, _) = engine::process_review(&after_ltm, Grade::Again, None, now, &self.config);
        self.store.save_card(&after_again).expect("failed to save seeded card");
        after_again
    }

    pub fn since(days: i64) -> DateTime<Utc> {
        Utc::now() - Duration::days(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_new_card_has_implicit_state() {
        let mut db = TestDatabaseManager::new_temp();
        let card = db.seed_new_card("u1", "koe", ExerciseType::WordTranslation);
        assert!(card.is_new());

        let loaded = db
            .store
            .load_card(&CardKey::new("u1", "koe", ExerciseType::WordTranslation))
            .unwrap();
        assert!(loaded.is_some());
    }

    #[test]
    fn seed_ltm_card_is_no_longer_new() {
        let mut db = TestDatabaseManager::new_temp();
        let card = db.seed_ltm_card("u1", "huis", ExerciseType::WordTranslation, 3);
        assert!(!card.is_new());
        assert!(card.review_count >= 3);
    }

    #[test]
    fn seed_stm_card_has_pending_stm_bookkeeping() {
        let mut db = TestDatabaseManager::new_temp();
        let card = db.seed_stm_card("u1", "boek", ExerciseType::WordTranslation);
        assert!(card.last_ltm_timestamp.is_some());
    }
}
