//! Pool builder: snapshots card state into LTM / STM / NEW / KNOWN sets.
//!
//! Pool membership is represented as a single tagged set — a
//! `HashMap<word_id, PoolStatus>` — rather than four overlapping `HashSet`s,
//! so `move_to` is always an unconditional overwrite and disjointness is
//! structural rather than an invariant callers must maintain by hand.

use std::collections::HashMap;

use crate::card::Grade;
use crate::lexicon::{PartOfSpeech, WordRecord};
use crate::session::Activity;

/// Which of the four pools a word currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolStatus {
    Ltm,
    Stm,
    New,
    Known,
}

/// A stored card's retrievability at snapshot time, as handed to the pool
/// builder by the persistence layer (`snapshot_cards`).
///
/// For verb activities the caller joins the two tenses before building the
/// snapshot: `retrievability` is `min(R_perfectum, R_past)` and the word_id
/// names the verb, not either individual tense card.
#[derive(Debug, Clone)]
pub struct CardSnapshot {
    pub word_id: String,
    pub retrievability: f64,
}

/// A recent-AGAIN record, as handed back by `recent_again_events`.
#[derive(Debug, Clone)]
pub struct RecentAgain {
    pub word_id: String,
    /// The most recent feedback grade this word received, of any kind.
    pub most_recent_grade: Grade,
}

/// An immutable-at-construction snapshot of pool membership for one activity
/// launch, plus the score map used to sort LTM by urgency.
///
/// Built once per launch from `snapshot_cards` + `recent_again_events` +
/// lexicon eligibility; mutated afterwards only through [`PoolSnapshot::move_to`]
/// and the grade-driven convenience methods, which keep the four pools
/// pairwise disjoint by construction.
#[derive(Debug, Clone, Default)]
pub struct PoolSnapshot {
    status: HashMap<String, PoolStatus>,
    /// Retrievability at snapshot time, kept only for LTM/KNOWN words (used
    /// to sort LTM by urgency in the session assembler).
    scores: HashMap<String, f64>,
}

impl PoolSnapshot {
    /// Build a snapshot from stored-card retrievabilities, recent AGAIN
    /// events, and the set of word_ids eligible for NEW.
    ///
    /// `cards` covers every word_id with stored state for this activity.
    /// `eligible_new_ids` must exclude any word_id already present in
    /// `cards` — the caller (pool assembly glue) is responsible for that
    /// since eligibility for NEW is lexicon-driven and the builder has no
    /// other way to know which words have no state.
    pub fn build(
        cards: &[CardSnapshot],
        recent_again: &[RecentAgain],
        eligible_new_ids: impl IntoIterator<Item = String>,
        r_target: f64,
    ) -> Self {
        let mut status = HashMap::new();
        let mut scores = HashMap::new();

        for card in cards {
            let pool = if card.retrievability < r_target {
                PoolStatus::Ltm
            } else {
                PoolStatus::Known
            };
            status.insert(card.word_id.clone(), pool);
            scores.insert(card.word_id.clone(), card.retrievability);
        }

        for word_id in eligible_new_ids {
            status.entry(word_id).or_insert(PoolStatus::New);
        }

        // STM takes precedence: a recent AGAIN whose most recent feedback
        // was not EASY pulls the word out of whatever pool it landed in.
        for again in recent_again {
            if again.most_recent_grade != Grade::Easy {
                status.insert(again.word_id.clone(), PoolStatus::Stm);
                scores.remove(&again.word_id);
            }
        }

        Self { status, scores }
    }

    pub fn status_of(&self, word_id: &str) -> Option<PoolStatus> {
        self.status.get(word_id).copied()
    }

    pub fn score_of(&self, word_id: &str) -> Option<f64> {
        self.scores.get(word_id).copied()
    }

    pub fn ids_in(&self, pool: PoolStatus) -> Vec<String> {
        self.status
            .iter()
            .filter(|(_, p)| **p == pool)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// LTM word_ids sorted ascending by retrievability (most urgent first).
    pub fn ltm_sorted_by_urgency(&self) -> Vec<String> {
        let mut ids = self.ids_in(PoolStatus::Ltm);
        ids.sort_by(|a, b| {
            self.scores
                .get(a)
                .unwrap_or(&0.0)
                .partial_cmp(self.scores.get(b).unwrap_or(&0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ids
    }

    /// Unconditionally move `word_id` to `target`, dropping any LTM/KNOWN
    /// score it held (scores are only meaningful for LTM urgency sorting).
    pub fn move_to(&mut self, word_id: &str, target: PoolStatus) {
        self.status.insert(word_id.to_string(), target);
        if target != PoolStatus::Ltm && target != PoolStatus::Known {
            self.scores.remove(word_id);
        }
    }

    /// Apply the in-memory transition rules for a single graded review.
    ///
    /// Mirrors the pool builder's `move_to` rules exactly:
    /// - AGAIN always moves the word to STM.
    /// - A grade while in STM: EASY exits to KNOWN, anything else stays in STM.
    /// - A grade while in LTM or NEW: any non-AGAIN grade moves to KNOWN.
    pub fn apply_grade(&mut self, word_id: &str, grade: Grade) {
        if grade.is_failure() {
            self.move_to(word_id, PoolStatus::Stm);
            return;
        }

        match self.status_of(word_id) {
            Some(PoolStatus::Stm) => {
                if grade == Grade::Easy {
                    self.move_to(word_id, PoolStatus::Known);
                }
                // else: stays in STM.
            }
            Some(PoolStatus::Ltm) | Some(PoolStatus::New) => {
                self.move_to(word_id, PoolStatus::Known);
            }
            Some(PoolStatus::Known) | None => {}
        }
    }

    /// All four pools pairwise disjoint, by construction of the tagged set.
    /// Exposed for property tests rather than relied on internally.
    pub fn is_disjoint(&self) -> bool {
        // A HashMap<word_id, PoolStatus> can only ever hold one status per
        // key, so disjointness is structural. This method exists to make
        // that invariant independently checkable from tests.
        let mut seen = std::collections::HashSet::new();
        self.status.keys().all(|id| seen.insert(id))
    }
}

/// Word ids from `candidates` eligible to enter the NEW pool for `activity`,
/// per the per-activity predicate table: word_translation takes any
/// (already lexicon-filtered) word; verb and preposition activities require
/// enrichment plus, when `filter_known` is set, a sufficiently-retrievable
/// base-meaning card.
///
/// `has_state` should report whether a card already exists for the word
/// under this activity's exercise type(s) — eligible-but-already-stored
/// words are not NEW and must be excluded by the caller building the full
/// snapshot, since the pool builder itself has no notion of "no state".
pub fn eligible_new_word_ids(
    activity: Activity,
    candidates: &[WordRecord],
    has_state: impl Fn(&str) -> bool,
    base_meaning_retrievability: impl Fn(&str) -> Option<f64>,
    filter_known: bool,
    verb_filter_threshold: f64,
    preposition_filter_threshold: f64,
) -> Vec<String> {
    candidates
        .iter()
        .filter(|w| !has_state(&w.word_id))
        .filter(|w| match activity {
            Activity::WordTranslation => true,
            Activity::Verb => w.pos == PartOfSpeech::Verb && w.enriched && w.has_verb_forms,
            Activity::WordPreposition => {
                matches!(w.pos, PartOfSpeech::Verb | PartOfSpeech::Noun | PartOfSpeech::Adjective)
                    && w.enriched
                    && w.has_preposition_example
            }
        })
        .filter(|w| {
            if !filter_known || activity == Activity::WordTranslation {
                return true;
            }
            let threshold = match activity {
                Activity::Verb => verb_filter_threshold,
                Activity::WordPreposition => preposition_filter_threshold,
                Activity::WordTranslation => return true,
            };
            base_meaning_retrievability(&w.word_id).is_none_or(|r| r >= threshold)
        })
        .map(|w| w.word_id.clone())
        .collect()
}
