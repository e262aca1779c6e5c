//! Database migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: card_state and review_events",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Indices for recent-AGAIN and snapshot queries",
        up: MIGRATION_V2_UP,
    },
    Migration {
        version: 3,
        description: "Add retrievability_after and presentation_mode to review_events",
        up: MIGRATION_V3_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));

CREATE TABLE IF NOT EXISTS card_state (
    user_id TEXT NOT NULL,
    word_id TEXT NOT NULL,
    exercise_type TEXT NOT NULL,

    stability REAL NOT NULL,
    difficulty REAL NOT NULL,
    effective_difficulty REAL NOT NULL,

    review_count INTEGER NOT NULL DEFAULT 0,
    last_review_timestamp TEXT NOT NULL,
    last_ltm_timestamp TEXT,
    ltm_review_date TEXT,
    stm_success_count_today INTEGER NOT NULL DEFAULT 0,

    PRIMARY KEY (user_id, word_id, exercise_type)
);

CREATE TABLE IF NOT EXISTS review_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    word_id TEXT NOT NULL,
    exercise_type TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    kind TEXT NOT NULL,
    grade TEXT,
    latency_ms INTEGER,

    stability_before REAL NOT NULL,
    stability_after REAL NOT NULL,
    difficulty_before REAL NOT NULL,
    difficulty_after REAL NOT NULL,
    effective_difficulty_before REAL NOT NULL,
    effective_difficulty_after REAL NOT NULL,
    retrievability_before REAL NOT NULL,

    session_id TEXT,
    position INTEGER
);
"#;

const MIGRATION_V2_UP: &str = r#"
CREATE INDEX IF NOT EXISTS idx_card_state_user_activity
    ON card_state (user_id, exercise_type);

CREATE INDEX IF NOT EXISTS idx_review_events_user_activity_ts
    ON review_events (user_id, exercise_type, timestamp);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

const MIGRATION_V3_UP: &str = r#"
ALTER TABLE review_events ADD COLUMN retrievability_after REAL NOT NULL DEFAULT 0;
ALTER TABLE review_events ADD COLUMN presentation_mode TEXT;

UPDATE schema_version SET version = 3, applied_at = datetime('now');
"#;

/// Columns `card_state` must carry for this crate's version to operate.
/// Checked at startup so a stale schema fails fast — a partial schema would
/// silently corrupt every later read.
pub const REQUIRED_CARD_STATE_COLUMNS: &[&str] = &[
    "user_id",
    "word_id",
    "exercise_type",
    "stability",
    "difficulty",
    "effective_difficulty",
    "review_count",
    "last_review_timestamp",
    "last_ltm_timestamp",
    "ltm_review_date",
    "stm_success_count_today",
];

pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| row.get(0))
        .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                version = migration.version,
                description = migration.description,
                "applying migration"
            );
            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn migrations_bring_a_fresh_db_to_latest_version() {
        let conn = Connection::open_in_memory().unwrap();
        apply_migrations(&conn).unwrap();
        assert_eq!(get_current_version(&conn).unwrap(), 3);
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_migrations(&conn).unwrap();
        let applied_again = apply_migrations(&conn).unwrap();
        assert_eq!(applied_again, 0);
    }
}
