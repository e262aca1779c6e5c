//! The update engine: pure transitions from `(card, grade, now)` to `(new_card, event)`.
//!
//! No I/O, no implicit clock access — every function here takes `now` as an
//! argument so review processing is deterministic and testable without
//! wall-clock mocking.

use chrono::{DateTime, Utc};

use crate::card::{elapsed_days, CardKey, CardState, Grade};
use crate::config::{self, SchedulerConfig};
use crate::event::{EventKind, ReviewEvent};

/// Retrievability `R = exp(-Δt / S)`, clamped to `[0, 1]` to guard against FPU artefacts.
pub fn retrievability(stability: f64, elapsed_days: f64) -> f64 {
    (-elapsed_days / stability).exp().clamp(0.0, 1.0)
}

/// `true` if `last_ltm_timestamp`'s UTC calendar date differs from `now`'s.
fn is_new_utc_day(last_ltm_timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    last_ltm_timestamp.date_naive() != now.date_naive()
}

/// Start of the short-term-memory lookback window: UTC midnight at the
/// start of the calendar day before `now`'s.
///
/// This is a calendar-day boundary, not a rolling 24-hour cutoff: an AGAIN
/// logged at 00:10 UTC still counts as "yesterday" for a card reviewed at
/// 00:30 UTC the next day, even though only twenty minutes separate them.
pub fn stm_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let yesterday = now.date_naive() - chrono::Duration::days(1);
    yesterday
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc()
}

/// Run one review through the update engine.
///
/// `card` is the card's state *before* this review (the caller is
/// responsible for materializing [`CardState::new_card`] when none is
/// stored yet). Returns the new state to persist and the event to append.
#[tracing::instrument(skip(config), fields(word_id = %card.key.word_id, exercise_type = %card.key.exercise_type))]
pub fn process_review(
    card: &CardState,
    grade: Grade,
    latency_ms: Option<u32>,
    now: DateTime<Utc>,
    config: &SchedulerConfig,
) -> (CardState, ReviewEvent) {
    let is_ltm = match card.last_ltm_timestamp {
        None => true,
        Some(last_ltm) => is_new_utc_day(last_ltm, now),
    };

    let retrievability_before = card.retrievability_at(now);

    let (new_card, kind) = if is_ltm {
        (ltm_transition(card, grade, now, retrievability_before, config), EventKind::Ltm)
    } else {
        (stm_transition(card, grade, now, retrievability_before, config), EventKind::Stm)
    };

    tracing::debug!(
        ?kind,
        retrievability_before,
        stability_after = new_card.stability,
        difficulty_after = new_card.difficulty,
        "processed review"
    );

    let event = ReviewEvent {
        user_id: card.key.user_id.clone(),
        word_id: card.key.word_id.clone(),
        exercise_type: card.key.exercise_type.as_str().to_string(),
        timestamp: now,
        kind,
        grade: Some(grade),
        latency_ms,
        stability_before: card.stability,
        stability_after: new_card.stability,
        difficulty_before: card.difficulty,
        difficulty_after: new_card.difficulty,
        effective_difficulty_before: card.effective_difficulty,
        effective_difficulty_after: new_card.effective_difficulty,
        retrievability_before,
        retrievability_after: new_card.retrievability_at(now),
        session_id: None,
        position: None,
        presentation_mode: None,
    };

    (new_card, event)
}

fn ltm_transition(
    card: &CardState,
    grade: Grade,
    now: DateTime<Utc>,
    r: f64,
    config: &SchedulerConfig,
) -> CardState {
    let is_brand_new = card.review_count == 0 || r >= 0.99;

    let new_stability = if grade.is_failure() {
        (card.stability * (1.0 - config.k_fail * r)).max(config.s_min)
    } else if is_brand_new {
        (config.s_min * config::base_gain(grade) * 2.0).max(config.s_min)
    } else {
        let f_d_eff = 1.0 / (1.0 + config.alpha * (card.effective_difficulty - 1.0));
        let delta_s = config.k * card.stability * config::base_gain(grade) * (1.0 - r) * f_d_eff;
        card.stability + delta_s
    };

    let surprise = if grade.is_failure() { r } else { 1.0 - r };
    let new_difficulty =
        (card.difficulty + config.eta * surprise * config::u_rating(grade)).clamp(config.d_min, config.d_max);

    CardState {
        key: card.key.clone(),
        stability: new_stability,
        difficulty: new_difficulty,
        effective_difficulty: new_difficulty,
        review_count: card.review_count + 1,
        last_review_timestamp: now,
        last_ltm_timestamp: Some(now),
        ltm_review_date: Some(now.date_naive()),
        stm_success_count_today: 0,
    }
}

fn stm_transition(
    card: &CardState,
    grade: Grade,
    now: DateTime<Utc>,
    r: f64,
    config: &SchedulerConfig,
) -> CardState {
    if grade.is_failure() {
        return CardState {
            last_review_timestamp: now,
            review_count: card.review_count + 1,
            ..card.clone()
        };
    }

    let d_floor = (card.difficulty + config.eta * (1.0 - r) * config::u_rating(Grade::Hard))
        .clamp(config.d_min, config.d_max);
    let m = card.stm_success_count_today as f64;
    let lambda = 0.5 / (m + 1.0);
    let new_d_eff = (d_floor + (card.effective_difficulty - d_floor) * (1.0 - lambda)).max(d_floor);

    CardState {
        key: card.key.clone(),
        stability: card.stability,
        difficulty: card.difficulty,
        effective_difficulty: new_d_eff,
        review_count: card.review_count + 1,
        last_review_timestamp: now,
        last_ltm_timestamp: card.last_ltm_timestamp,
        ltm_review_date: card.ltm_review_date,
        stm_success_count_today: card.stm_success_count_today + 1,
    }
}

/// A [`CardKey`]-bearing brand-new state, ready to hand to [`process_review`].
pub fn implicit_state(key: CardKey, now: DateTime<Utc>, config: &SchedulerConfig) -> CardState {
    CardState::new_card(key, now, config)
}
