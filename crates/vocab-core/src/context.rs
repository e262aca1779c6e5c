//! `SessionContext`: the owned value carried across the presentation/core
//! boundary for a single study session.
//!
//! Pool snapshots are immutable value objects (see [`crate::pool`]); a
//! `SessionContext` owns the mutable in-memory view for one activity launch
//! and is responsible for buffering writes until [`SessionContext::flush`].

use chrono::Utc;
use rand::Rng;

use crate::card::{CardState, ExerciseType, Grade};
use crate::config::SchedulerConfig;
use crate::engine;
use crate::event::ReviewEvent;
use crate::pool::PoolSnapshot;
use crate::session::{Activity, AssembledSession, SessionAssembler};
use crate::storage::{CardStore, StorageError};

/// Ties a pool snapshot, the update engine, and a [`CardStore`] together for
/// one user/activity session.
///
/// One review is processed to completion (state update, event buffered, pool
/// mutated) before the next begins — the core makes no concurrency claims
/// beyond this within a single `SessionContext`.
pub struct SessionContext<'a, S: CardStore> {
    user_id: String,
    activity: Activity,
    store: &'a S,
    config: SchedulerConfig,
    pool: PoolSnapshot,
    session_id: String,
    pending_cards: Vec<CardState>,
    pending_events: Vec<ReviewEvent>,
}

impl<'a, S: CardStore> SessionContext<'a, S> {
    pub fn new(
        user_id: impl Into<String>,
        activity: Activity,
        store: &'a S,
        config: SchedulerConfig,
        pool: PoolSnapshot,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            activity,
            store,
            config,
            pool,
            session_id: session_id.into(),
            pending_cards: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    /// Assemble the ordered batch to present for this launch.
    pub fn start_session(&self, rng: &mut impl Rng) -> AssembledSession {
        SessionAssembler::assemble(&self.pool, self.activity, &self.config, rng)
    }

    /// Process one submitted grade: runs the update engine and buffers the
    /// new card state and event. Does **not** mutate the pool snapshot —
    /// see [`SessionContext::apply_pool_grade`].
    ///
    /// Word and preposition activities mutate the pool immediately after
    /// this call with the same grade. Verb activities submit once per tense
    /// step and only mutate the pool after combining both grades with
    /// [`crate::session::combine_verb_grades`] — `submit` has no way to know
    /// whether a second step is still pending, so that sequencing is the
    /// caller's responsibility.
    ///
    /// A `source_pool == Known` item is a filler draw: it is logged as
    /// `KNOWN_NO_SCORE` and never reaches the update engine.
    pub fn submit(
        &mut self,
        word_id: &str,
        exercise_type: ExerciseType,
        grade: Grade,
        latency_ms: Option<u32>,
        is_known_filler: bool,
        position: u32,
        presentation_mode: Option<String>,
    ) -> Result<(), StorageError> {
        let now = Utc::now();

        if is_known_filler {
            self.pending_events.push(ReviewEvent {
                user_id: self.user_id.clone(),
                word_id: word_id.to_string(),
                exercise_type: exercise_type.as_str().to_string(),
                timestamp: now,
                kind: crate::event::EventKind::KnownNoScore,
                grade: None,
                latency_ms,
                stability_before: 0.0,
                stability_after: 0.0,
                difficulty_before: 0.0,
                difficulty_after: 0.0,
                effective_difficulty_before: 0.0,
                effective_difficulty_after: 0.0,
                retrievability_before: 0.0,
                retrievability_after: 0.0,
                session_id: Some(self.session_id.clone()),
                position: Some(position),
                presentation_mode,
            });
            return Ok(());
        }

        let key = crate::card::CardKey::new(self.user_id.clone(), word_id.to_string(), exercise_type);
        let current = self
            .store
            .load_card(&key)?
            .unwrap_or_else(|| engine::implicit_state(key.clone(), now, &self.config));

        let (new_card, mut event) = engine::process_review(&current, grade, latency_ms, now, &self.config);
        event.session_id = Some(self.session_id.clone());
        event.position = Some(position);
        event.presentation_mode = presentation_mode;

        self.pending_cards.push(new_card);
        self.pending_events.push(event);
        Ok(())
    }

    /// Move `word_id` between pools for `grade`. Call once per word per
    /// launch: immediately after [`SessionContext::submit`] for
    /// single-step activities, or after combining both tense grades for verbs.
    pub fn apply_pool_grade(&mut self, word_id: &str, grade: Grade) {
        self.pool.apply_grade(word_id, grade);
    }

    /// Commit all pending writes as a single transaction-backed batch.
    ///
    /// Safe to call more than once; it drains the pending buffers.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if !self.pending_cards.is_empty() {
            self.store.batch_save_cards(&self.pending_cards)?;
            self.pending_cards.clear();
        }
        if !self.pending_events.is_empty() {
            self.store.append_events(&self.pending_events)?;
            self.pending_events.clear();
        }
        Ok(())
    }

    /// Flush and release the session.
    pub fn end_session(mut self) -> Result<(), StorageError> {
        self.flush()
    }

    pub fn pool(&self) -> &PoolSnapshot {
        &self.pool
    }
}
