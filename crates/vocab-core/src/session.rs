//! Session assembler: turns a pool snapshot into an ordered batch to present.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::card::{ExerciseType, Grade};
use crate::config::SchedulerConfig;
use crate::pool::{PoolSnapshot, PoolStatus};

/// Which activity a session is being assembled for.
///
/// Word and preposition activities draw a single exercise type per word;
/// verb activities expand each selected verb into two sequential steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    WordTranslation,
    Verb,
    WordPreposition,
}

impl Activity {
    /// Key used to look up a per-activity session size override in [`SchedulerConfig`].
    pub fn config_key(&self) -> &'static str {
        match self {
            Activity::WordTranslation => "word_translation",
            Activity::Verb => "verb",
            Activity::WordPreposition => "word_preposition",
        }
    }
}

/// One presented card within an assembled session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionItem {
    pub word_id: String,
    pub exercise_type: ExerciseType,
    /// The pool this word was drawn from when the session was assembled.
    /// `Known` marks a filler item: feedback on it must be logged as
    /// `KNOWN_NO_SCORE` and must not mutate card state.
    pub source_pool: PoolStatus,
}

/// The result of one assembly pass.
#[derive(Debug, Clone, Default)]
pub struct AssembledSession {
    pub items: Vec<SessionItem>,
    /// Set when the assembler could not reach the requested size even after
    /// the KNOWN fallback. An empty `items` with `Some(reason)` is a valid
    /// "no items available" outcome, not an error.
    pub shortfall_reason: Option<String>,
}

/// Assembles sessions from a [`PoolSnapshot`] under the configured LTM
/// fraction and session size.
pub struct SessionAssembler;

impl SessionAssembler {
    /// Select and order a session for `activity` from `pool`.
    ///
    /// `rng` is injected so callers that need reproducible sessions can
    /// supply a seeded generator; assembly is otherwise deterministic given
    /// the snapshot.
    pub fn assemble(
        pool: &PoolSnapshot,
        activity: Activity,
        config: &SchedulerConfig,
        rng: &mut impl Rng,
    ) -> AssembledSession {
        let n = config.session_size_for(activity.config_key());
        let target_ltm = (n as f64 * config.ltm_session_fraction).floor() as usize;

        let mut chosen: Vec<(String, PoolStatus)> = Vec::with_capacity(n);
        let mut taken: HashSet<String> = HashSet::new();

        // Step 1: most-urgent LTM, up to target_ltm.
        let ltm_sorted = pool.ltm_sorted_by_urgency();
        for word_id in ltm_sorted.iter().take(target_ltm) {
            chosen.push((word_id.clone(), PoolStatus::Ltm));
            taken.insert(word_id.clone());
        }

        // Step 2: STM in randomised order, skipping already-chosen ids.
        if chosen.len() < n {
            let mut stm_ids = pool.ids_in(PoolStatus::Stm);
            stm_ids.shuffle(rng);
            for word_id in stm_ids {
                if chosen.len() >= n {
                    break;
                }
                if taken.insert(word_id.clone()) {
                    chosen.push((word_id, PoolStatus::Stm));
                }
            }
        }

        // Step 3: uniform random sample without replacement from NEW.
        if chosen.len() < n {
            let mut new_ids: Vec<String> =
                pool.ids_in(PoolStatus::New).into_iter().filter(|id| !taken.contains(id)).collect();
            new_ids.shuffle(rng);
            let remaining = n - chosen.len();
            for word_id in new_ids.into_iter().take(remaining) {
                taken.insert(word_id.clone());
                chosen.push((word_id, PoolStatus::New));
            }
        }

        // Step 4: remaining LTM entries in urgency order (overflow beyond step 1).
        if chosen.len() < n {
            for word_id in ltm_sorted.iter() {
                if chosen.len() >= n {
                    break;
                }
                if taken.insert(word_id.clone()) {
                    chosen.push((word_id.clone(), PoolStatus::Ltm));
                }
            }
        }

        // Step 5: KNOWN fallback, presented but not scored.
        if chosen.len() < n {
            let mut known_ids: Vec<String> =
                pool.ids_in(PoolStatus::Known).into_iter().filter(|id| !taken.contains(id)).collect();
            known_ids.shuffle(rng);
            let remaining = n - chosen.len();
            for word_id in known_ids.into_iter().take(remaining) {
                taken.insert(word_id.clone());
                chosen.push((word_id, PoolStatus::Known));
            }
        }

        let shortfall_reason = if chosen.len() < n {
            Some(if chosen.is_empty() {
                "no items available".to_string()
            } else {
                format!("requested {n} items, only {} available across all pools", chosen.len())
            })
        } else {
            None
        };

        let mut items = Vec::with_capacity(chosen.len() * 2);
        for (word_id, source_pool) in &chosen {
            match activity {
                Activity::Verb => {
                    items.push(SessionItem {
                        word_id: word_id.clone(),
                        exercise_type: ExerciseType::VerbPerfectum,
                        source_pool: *source_pool,
                    });
                    items.push(SessionItem {
                        word_id: word_id.clone(),
                        exercise_type: ExerciseType::VerbPastTense,
                        source_pool: *source_pool,
                    });
                }
                Activity::WordTranslation => items.push(SessionItem {
                    word_id: word_id.clone(),
                    exercise_type: ExerciseType::WordTranslation,
                    source_pool: *source_pool,
                }),
                Activity::WordPreposition => items.push(SessionItem {
                    word_id: word_id.clone(),
                    exercise_type: ExerciseType::WordPreposition,
                    source_pool: *source_pool,
                }),
            }
        }

        // Step 6: shuffle the whole list. Verb steps are pushed as adjacent
        // pairs above; the spec requires perfectum before past_tense within
        // a verb, so we shuffle verb *pairs* as units rather than individual
        // items when the activity is Verb.
        match activity {
            Activity::Verb => {
                let mut pairs: Vec<[SessionItem; 2]> = items
                    .chunks_exact(2)
                    .map(|chunk| [chunk[0].clone(), chunk[1].clone()])
                    .collect();
                pairs.shuffle(rng);
                items = pairs.into_iter().flatten().collect();
            }
            _ => items.shuffle(rng),
        }

        AssembledSession { items, shortfall_reason }
    }
}

/// Combine the two per-tense grades of a verb into the single grade that
/// drives the verb's pool transition.
///
/// If either step is AGAIN the combined grade is AGAIN; else if the verb is
/// currently in STM and both grades are EASY the combined grade is EASY;
/// else if currently in STM the combined grade is HARD; otherwise (verb in
/// LTM, NEW, or KNOWN) the combined grade is MEDIUM.
pub fn combine_verb_grades(perfectum: Grade, past_tense: Grade, currently_stm: bool) -> Grade {
    if perfectum.is_failure() || past_tense.is_failure() {
        return Grade::Again;
    }
    if currently_stm {
        if perfectum == Grade::Easy && past_tense == Grade::Easy {
            Grade::Easy
        } else {
            Grade::Hard
        }
    } else {
        Grade::Medium
    }
}
