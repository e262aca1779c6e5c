//! SQLite-backed [`CardStore`] implementation.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::migrations::{self, REQUIRED_CARD_STATE_COLUMNS};
use super::{CardStore, Result, StorageError};
use crate::card::{CardKey, CardState, ExerciseType, Grade};
use crate::event::{EventKind, ReviewEvent};
use crate::pool::{CardSnapshot, RecentAgain};

/// A [`CardStore`] backed by SQLite.
///
/// Every method takes `&self`, not `&mut self`: `SqliteStore` is
/// `Send + Sync` and callers can share it via `Arc` without an outer
/// `Mutex` of their own.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if necessary) the database at `db_path`, or an
    /// in-memory database if `db_path` is `None`.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let conn = match db_path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                Connection::open(path)?
            }
            None => Connection::open_in_memory()?,
        };

        Self::configure_connection(&conn)?;
        migrations::apply_migrations(&conn)?;
        Self::check_schema(&conn)?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    /// Refuse to start if `card_state` is missing a column this version
    /// requires. Fatal per the persistence-layer error taxonomy.
    fn check_schema(conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare("PRAGMA table_info(card_state)")?;
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<_>>()?;

        for required in REQUIRED_CARD_STATE_COLUMNS {
            if !columns.iter().any(|c| c == required) {
                return Err(StorageError::SchemaMismatch(format!(
                    "card_state is missing required column `{required}`"
                )));
            }
        }
        Ok(())
    }

    fn row_to_card(row: &rusqlite::Row) -> rusqlite::Result<CardState> {
        let last_ltm_timestamp: Option<String> = row.get("last_ltm_timestamp")?;
        let ltm_review_date: Option<String> = row.get("ltm_review_date")?;

        Ok(CardState {
            key: CardKey {
                user_id: row.get("user_id")?,
                word_id: row.get("word_id")?,
                exercise_type: ExerciseType::parse(&row.get::<_, String>("exercise_type")?)
                    .expect("stored exercise_type is always one of the closed set"),
            },
            stability: row.get("stability")?,
            difficulty: row.get("difficulty")?,
            effective_difficulty: row.get("effective_difficulty")?,
            review_count: row.get("review_count")?,
            last_review_timestamp: parse_timestamp(&row.get::<_, String>("last_review_timestamp")?),
            last_ltm_timestamp: last_ltm_timestamp.as_deref().map(parse_timestamp),
            ltm_review_date: ltm_review_date.as_deref().map(parse_date),
            stm_success_count_today: row.get("stm_success_count_today")?,
        })
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("card_state/review_events timestamps are always stored as RFC3339")
        .with_timezone(&Utc)
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("ltm_review_date is always stored as YYYY-MM-DD")
}

fn grade_to_str(grade: Grade) -> &'static str {
    match grade {
        Grade::Again => "again",
        Grade::Hard => "hard",
        Grade::Medium => "medium",
        Grade::Easy => "easy",
    }
}

fn grade_from_str(s: &str) -> Grade {
    match s {
        "again" => Grade::Again,
        "hard" => Grade::Hard,
        "medium" => Grade::Medium,
        "easy" => Grade::Easy,
        other => panic!("unknown stored grade `{other}`"),
    }
}

fn kind_to_str(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Ltm => "ltm",
        EventKind::Stm => "stm",
        EventKind::KnownNoScore => "known_no_score",
    }
}

impl CardStore for SqliteStore {
    fn load_card(&self, key: &CardKey) -> Result<Option<CardState>> {
        let conn = self.conn.lock().expect("sqlite connection mutex poisoned");
        conn.query_row(
            "SELECT user_id, word_id, exercise_type, stability, difficulty, effective_difficulty,
                    review_count, last_review_timestamp, last_ltm_timestamp, ltm_review_date,
                    stm_success_count_today
             FROM card_state
             WHERE user_id = ?1 AND word_id = ?2 AND exercise_type = ?3",
            params![key.user_id, key.word_id, key.exercise_type.as_str()],
            Self::row_to_card,
        )
        .optional()
        .map_err(StorageError::from)
    }

    fn save_card(&self, card: &CardState) -> Result<()> {
        let conn = self.conn.lock().expect("sqlite connection mutex poisoned");
        upsert_card(&conn, card)?;
        Ok(())
    }

    fn batch_save_cards(&self, cards: &[CardState]) -> Result<()> {
        let mut conn = self.conn.lock().expect("sqlite connection mutex poisoned");
        let tx = conn.transaction()?;
        for card in cards {
            upsert_card(&tx, card)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn append_events(&self, events: &[ReviewEvent]) -> Result<()> {
        let mut conn = self.conn.lock().expect("sqlite connection mutex poisoned");
        let tx = conn.transaction()?;
        for event in events {
            tx.execute(
                "INSERT INTO review_events (
                    user_id, word_id, exercise_type, timestamp, kind, grade, latency_ms,
                    stability_before, stability_after, difficulty_before, difficulty_after,
                    effective_difficulty_before, effective_difficulty_after,
                    retrievability_before, retrievability_after,
                    session_id, position, presentation_mode
                ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)",
                params![
                    event.user_id,
                    event.word_id,
                    event.exercise_type,
                    event.timestamp.to_rfc3339(),
                    kind_to_str(event.kind),
                    event.grade.map(grade_to_str),
                    event.latency_ms,
                    event.stability_before,
                    event.stability_after,
                    event.difficulty_before,
                    event.difficulty_after,
                    event.effective_difficulty_before,
                    event.effective_difficulty_after,
                    event.retrievability_before,
                    event.retrievability_after,
                    event.session_id,
                    event.position,
                    event.presentation_mode,
                ],
            )?;
        }
        tx.commit()?;
        tracing::debug!(count = events.len(), "appended review events");
        Ok(())
    }

    fn snapshot_cards(
        &self,
        user_id: &str,
        exercise_type: ExerciseType,
        now: DateTime<Utc>,
    ) -> Result<Vec<CardSnapshot>> {
        let conn = self.conn.lock().expect("sqlite connection mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT user_id, word_id, exercise_type, stability, difficulty, effective_difficulty,
                    review_count, last_review_timestamp, last_ltm_timestamp, ltm_review_date,
                    stm_success_count_today
             FROM card_state
             WHERE user_id = ?1 AND exercise_type = ?2",
        )?;
        let cards = stmt
            .query_map(params![user_id, exercise_type.as_str()], Self::row_to_card)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(cards
            .into_iter()
            .map(|card| CardSnapshot {
                word_id: card.key.word_id.clone(),
                retrievability: card.retrievability_at(now),
            })
            .collect())
    }

    fn recent_again_events(
        &self,
        user_id: &str,
        exercise_type: ExerciseType,
        since: DateTime<Utc>,
    ) -> Result<Vec<RecentAgain>> {
        let conn = self.conn.lock().expect("sqlite connection mutex poisoned");

        let mut stmt = conn.prepare(
            "SELECT DISTINCT word_id FROM review_events
             WHERE user_id = ?1 AND exercise_type = ?2 AND grade = 'again' AND timestamp >= ?3",
        )?;
        let word_ids: Vec<String> = stmt
            .query_map(params![user_id, exercise_type.as_str(), since.to_rfc3339()], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        drop(stmt);

        let mut results = Vec::with_capacity(word_ids.len());
        for word_id in word_ids {
            let most_recent: String = conn.query_row(
                "SELECT grade FROM review_events
                 WHERE user_id = ?1 AND word_id = ?2 AND exercise_type = ?3 AND grade IS NOT NULL
                 ORDER BY timestamp DESC LIMIT 1",
                params![user_id, word_id, exercise_type.as_str()],
                |row| row.get(0),
            )?;
            results.push(RecentAgain { word_id, most_recent_grade: grade_from_str(&most_recent) });
        }
        Ok(results)
    }
}

fn upsert_card(conn: &Connection, card: &CardState) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO card_state (
            user_id, word_id, exercise_type, stability, difficulty, effective_difficulty,
            review_count, last_review_timestamp, last_ltm_timestamp, ltm_review_date,
            stm_success_count_today
        ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)
        ON CONFLICT (user_id, word_id, exercise_type) DO UPDATE SET
            stability = excluded.stability,
            difficulty = excluded.difficulty,
            effective_difficulty = excluded.effective_difficulty,
            review_count = excluded.review_count,
            last_review_timestamp = excluded.last_review_timestamp,
            last_ltm_timestamp = excluded.last_ltm_timestamp,
            ltm_review_date = excluded.ltm_review_date,
            stm_success_count_today = excluded.stm_success_count_today",
        params![
            card.key.user_id,
            card.key.word_id,
            card.key.exercise_type.as_str(),
            card.stability,
            card.difficulty,
            card.effective_difficulty,
            card.review_count,
            card.last_review_timestamp.to_rfc3339(),
            card.last_ltm_timestamp.map(|t| t.to_rfc3339()),
            card.ltm_review_date.map(|d| d.format("%Y-%m-%d").to_string()),
            card.stm_success_count_today,
        ],
    )?;
    Ok(())
}
