//! Card identity and memory state.
//!
//! A card is keyed by `(user_id, word_id, exercise_type)`. Its [`CardState`]
//! holds the continuous memory model (stability, difficulty, effective
//! difficulty) plus the bookkeeping the update engine needs to classify the
//! next review as LTM or STM.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;

/// Closed set of drill activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    WordTranslation,
    VerbPerfectum,
    VerbPastTense,
    WordPreposition,
}

impl ExerciseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::WordTranslation => "word_translation",
            ExerciseType::VerbPerfectum => "verb_perfectum",
            ExerciseType::VerbPastTense => "verb_past_tense",
            ExerciseType::WordPreposition => "word_preposition",
        }
    }

    /// Parse the wire/storage form of an exercise type.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "word_translation" => Some(ExerciseType::WordTranslation),
            "verb_perfectum" => Some(ExerciseType::VerbPerfectum),
            "verb_past_tense" => Some(ExerciseType::VerbPastTense),
            "word_preposition" => Some(ExerciseType::WordPreposition),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity triple for a card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardKey {
    pub user_id: String,
    pub word_id: String,
    pub exercise_type: ExerciseType,
}

impl CardKey {
    pub fn new(user_id: impl Into<String>, word_id: impl Into<String>, exercise_type: ExerciseType) -> Self {
        Self {
            user_id: user_id.into(),
            word_id: word_id.into(),
            exercise_type,
        }
    }
}

/// Feedback grade given by the presentation layer after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// Retrieval failed.
    Again,
    /// Retrieved with high effort.
    Hard,
    /// Retrieved normally.
    Medium,
    /// Retrieved fluently.
    Easy,
}

impl Grade {
    pub fn is_failure(self) -> bool {
        self == Grade::Again
    }
}

impl TryFrom<i32> for Grade {
    type Error = crate::error::SchedulerError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Grade::Again),
            2 => Ok(Grade::Hard),
            3 => Ok(Grade::Medium),
            4 => Ok(Grade::Easy),
            other => Err(crate::error::SchedulerError::InvalidRequest(format!(
                "grade must be 1..=4 (Again..Easy), got {other}"
            ))),
        }
    }
}

/// Persistent memory state for a single card.
///
/// A card that has never been reviewed has no stored `CardState` at all; its
/// implicit state is produced by [`CardState::new_card`]. Once reviewed, the
/// engine always hands back a concrete `CardState` to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardState {
    pub key: CardKey,

    /// Stability (S), in days. Always `>= S_MIN`.
    pub stability: f64,
    /// Difficulty (D), in `[D_MIN, D_MAX]`.
    pub difficulty: f64,
    /// Effective difficulty (D_eff), in `[D_MIN, difficulty]`.
    pub effective_difficulty: f64,

    /// Total reviews across LTM and STM.
    pub review_count: u32,
    /// Updated on every review (LTM or STM).
    pub last_review_timestamp: DateTime<Utc>,
    /// Set on the first LTM review and every LTM review after.
    pub last_ltm_timestamp: Option<DateTime<Utc>>,
    /// UTC calendar date of `last_ltm_timestamp`, kept denormalized for pool queries.
    pub ltm_review_date: Option<NaiveDate>,
    /// Reset to 0 on every LTM event; incremented on each non-failing STM review.
    pub stm_success_count_today: u32,
}

impl CardState {
    /// The implicit state of a card that has never been reviewed.
    pub fn new_card(key: CardKey, now: DateTime<Utc>, config: &SchedulerConfig) -> Self {
        Self {
            key,
            stability: config.initial_stability,
            difficulty: config.initial_difficulty,
            effective_difficulty: config.initial_difficulty,
            review_count: 0,
            last_review_timestamp: now,
            last_ltm_timestamp: None,
            ltm_review_date: None,
            stm_success_count_today: 0,
        }
    }

    /// `true` if this card has never received an LTM review.
    pub fn is_new(&self) -> bool {
        self.last_ltm_timestamp.is_none()
    }

    /// Retrievability `R = exp(-Δt / S)` at `now`, clamped to `[0, 1]`.
    ///
    /// A card with no LTM history has `R = 1.0` (spec: never decayed yet).
    pub fn retrievability_at(&self, now: DateTime<Utc>) -> f64 {
        match self.last_ltm_timestamp {
            None => 1.0,
            Some(last_ltm) => crate::engine::retrievability(self.stability, elapsed_days(last_ltm, now)),
        }
    }
}

/// Days elapsed between `last_ltm_timestamp` and `now`, clamped to `>= 0`.
///
/// Negative deltas (clock skew, replayed events) are clamped to zero rather
/// than propagated as NaN/negative retrievability.
pub fn elapsed_days(last_ltm_timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (now - last_ltm_timestamp).num_milliseconds() as f64 / 1000.0;
    (seconds / 86_400.0).max(0.0)
}
