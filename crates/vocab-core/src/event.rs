//! Review events: the append-only audit trail the engine emits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::{CardKey, Grade};

/// Which branch of the update engine produced this event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A long-term-memory review: the first review of the UTC day for this card.
    Ltm,
    /// A same-day short-term-memory repetition.
    Stm,
    /// A draw from the KNOWN pool that was shown but not scored against the model.
    KnownNoScore,
}

/// One immutable record of a single review attempt.
///
/// Emitted by [`crate::engine::process_review`] alongside the card's new
/// state; persisted verbatim by [`crate::storage::CardStore::append_events`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    pub user_id: String,
    pub word_id: String,
    pub exercise_type: String,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    /// `None` for a `KnownNoScore` event: nothing was graded.
    pub grade: Option<Grade>,
    /// Client-reported response latency, in milliseconds, if supplied.
    pub latency_ms: Option<u32>,

    pub stability_before: f64,
    pub stability_after: f64,
    pub difficulty_before: f64,
    pub difficulty_after: f64,
    pub effective_difficulty_before: f64,
    pub effective_difficulty_after: f64,
    pub retrievability_before: f64,
    pub retrievability_after: f64,

    /// Opaque session identifier, if this review happened inside an assembled session.
    pub session_id: Option<String>,
    /// 0-based position of the card within its session.
    pub position: Option<u32>,
    /// Free-form label for how the item was presented (e.g. `"words"`,
    /// `"sentences"`), set by the presentation layer and otherwise unused
    /// by the engine.
    pub presentation_mode: Option<String>,
}

impl ReviewEvent {
    pub fn key(&self) -> CardKey {
        CardKey {
            user_id: self.user_id.clone(),
            word_id: self.word_id.clone(),
            exercise_type: crate::card::ExerciseType::parse(&self.exercise_type)
                .expect("ReviewEvent.exercise_type is always a valid ExerciseType string"),
        }
    }
}
