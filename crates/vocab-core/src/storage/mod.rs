//! Persistence layer
//!
//! A narrow contract (load/save/batch-save cards, append events, snapshot a
//! user's cards, look up recent AGAINs) plus one SQLite-backed implementation.
//! The update engine and pool builder depend only on the [`CardStore`] trait,
//! never on `SqliteStore` directly, so an embedding application can swap in
//! another backend without touching the algorithm.

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};

use crate::card::{CardKey, CardState, ExerciseType};
use crate::event::ReviewEvent;
use crate::pool::{CardSnapshot, RecentAgain};

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The on-disk schema is missing a column this crate's version requires.
    /// Fatal: the core refuses to start rather than operate on a partial schema.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
    /// Initialization error
    #[error("initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// The persistence contract the update engine, pool builder, and session
/// context depend on.
pub trait CardStore {
    /// `None` if the card has never been reviewed.
    fn load_card(&self, key: &CardKey) -> Result<Option<CardState>>;

    /// Upsert by identity triple.
    fn save_card(&self, card: &CardState) -> Result<()>;

    /// Upsert a batch in a single transaction.
    fn batch_save_cards(&self, cards: &[CardState]) -> Result<()>;

    /// Append events in order, in a single transaction.
    fn append_events(&self, events: &[ReviewEvent]) -> Result<()>;

    /// All cards for `user_id`/`exercise_type`, with retrievability computed at `now`.
    fn snapshot_cards(
        &self,
        user_id: &str,
        exercise_type: ExerciseType,
        now: DateTime<Utc>,
    ) -> Result<Vec<CardSnapshot>>;

    /// word_ids that received an AGAIN within `[since, now]`, each paired
    /// with their most recent feedback grade (of any kind, not just AGAIN).
    fn recent_again_events(
        &self,
        user_id: &str,
        exercise_type: ExerciseType,
        since: DateTime<Utc>,
    ) -> Result<Vec<RecentAgain>>;
}
