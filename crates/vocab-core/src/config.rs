//! Tunable constants for the memory model and session assembler.
//!
//! Every value here has a recommended default from the scheduling design;
//! [`SchedulerConfig::default`] uses those defaults. Callers that want to
//! tune the algorithm (without forking it) construct their own value.

use std::collections::HashMap;

use crate::card::Grade;

/// Target retrievability threshold below which a card counts as "due" (LTM pool).
pub const R_TARGET: f64 = 0.70;
/// Minimum stability, in days.
pub const S_MIN: f64 = 0.5;
/// Minimum difficulty.
pub const D_MIN: f64 = 1.0;
/// Maximum difficulty.
pub const D_MAX: f64 = 10.0;
/// Stability learning rate on success.
pub const K: f64 = 1.2;
/// Stability penalty rate on failure.
pub const K_FAIL: f64 = 0.6;
/// Difficulty penalty factor in the success stability gain.
pub const ALPHA: f64 = 0.15;
/// Difficulty adaptation rate.
pub const ETA: f64 = 0.8;
/// Starting stability for a brand-new card, in days.
pub const INITIAL_STABILITY: f64 = 4.0;
/// Starting difficulty for a brand-new card.
pub const INITIAL_DIFFICULTY: f64 = 5.0;

/// Default session size for word and preposition activities.
pub const DEFAULT_SESSION_SIZE: usize = 20;
/// Default session size for verb activities (verbs, not exercise steps).
pub const DEFAULT_VERB_SESSION_SIZE: usize = 20;
/// Default fraction of a session drawn from the LTM pool.
pub const DEFAULT_LTM_SESSION_FRACTION: f64 = 0.75;
/// Default base-meaning retrievability threshold gating verb tense practice.
pub const DEFAULT_VERB_FILTER_THRESHOLD: f64 = 0.0;
/// Default base-meaning retrievability threshold gating preposition practice.
pub const DEFAULT_PREPOSITION_FILTER_THRESHOLD: f64 = 0.0;

/// Per-rating base stability gain multiplier for successful LTM reviews.
pub fn base_gain(grade: Grade) -> f64 {
    match grade {
        Grade::Again => 0.0, // unused: AGAIN takes the failure branch
        Grade::Hard => 0.5,
        Grade::Medium => 1.0,
        Grade::Easy => 1.8,
    }
}

/// Signed direction/magnitude of difficulty change per rating.
pub fn u_rating(grade: Grade) -> f64 {
    match grade {
        Grade::Again => 1.0,
        Grade::Hard => 0.35,
        Grade::Medium => -0.20,
        Grade::Easy => -0.60,
    }
}

/// All tunables the memory model and session assembler consult.
///
/// A plain data bag with a `Default` impl, passed by reference into the
/// pure algorithm functions rather than read from globals — keeps
/// `process_review` and the session assembler free of hidden state.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub r_target: f64,
    pub s_min: f64,
    pub d_min: f64,
    pub d_max: f64,
    pub k: f64,
    pub k_fail: f64,
    pub alpha: f64,
    pub eta: f64,
    pub initial_stability: f64,
    pub initial_difficulty: f64,

    /// Session size per activity kind, keyed by the activity name
    /// (`"word_translation"`, `"verb"`, `"word_preposition"`). Activities not
    /// present here fall back to [`DEFAULT_SESSION_SIZE`].
    pub session_size: HashMap<String, usize>,
    pub ltm_session_fraction: f64,
    pub verb_filter_threshold: f64,
    pub preposition_filter_threshold: f64,
}

impl SchedulerConfig {
    /// Session size configured for `activity`, falling back to the default.
    pub fn session_size_for(&self, activity: &str) -> usize {
        self.session_size
            .get(activity)
            .copied()
            .unwrap_or(DEFAULT_SESSION_SIZE)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            r_target: R_TARGET,
            s_min: S_MIN,
            d_min: D_MIN,
            d_max: D_MAX,
            k: K,
            k_fail: K_FAIL,
            alpha: ALPHA,
            eta: ETA,
            initial_stability: INITIAL_STABILITY,
            initial_difficulty: INITIAL_DIFFICULTY,
            session_size: HashMap::new(),
            ltm_session_fraction: DEFAULT_LTM_SESSION_FRACTION,
            verb_filter_threshold: DEFAULT_VERB_FILTER_THRESHOLD,
            preposition_filter_threshold: DEFAULT_PREPOSITION_FILTER_THRESHOLD,
        }
    }
}
