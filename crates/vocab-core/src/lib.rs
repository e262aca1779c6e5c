//! # Vocab Core
//!
//! Scheduling core for a spaced-repetition vocabulary trainer: the memory
//! model, the per-review update engine, the pool builder, and the session
//! assembler that blends due, recently-failed, new, and already-known words
//! into an ordered study batch.
//!
//! The lexicon, presentation layer, AI enrichment, and analytics are treated
//! as external collaborators — this crate only defines the interfaces
//! ([`lexicon::LexiconSource`]) it calls into them through.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use vocab_core::{card::{CardKey, ExerciseType, Grade}, config::SchedulerConfig, storage::SqliteStore};
//!
//! let store = SqliteStore::new(None)?;
//! let key = CardKey::new("u1", "koe", ExerciseType::WordTranslation);
//! // ... build a pool snapshot, assemble a session, submit grades via SessionContext.
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod card;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod event;
pub mod lexicon;
pub mod pool;
pub mod session;
pub mod storage;

pub use card::{CardKey, CardState, ExerciseType, Grade};
pub use config::SchedulerConfig;
pub use context::SessionContext;
pub use error::SchedulerError;
pub use event::{EventKind, ReviewEvent};
pub use lexicon::{LexiconSource, PartOfSpeech, StaticLexicon, WordFilters, WordRecord};
pub use pool::{eligible_new_word_ids, CardSnapshot, PoolSnapshot, PoolStatus, RecentAgain};
pub use session::{combine_verb_grades, Activity, AssembledSession, SessionAssembler, SessionItem};
pub use storage::{CardStore, SqliteStore, StorageError};
