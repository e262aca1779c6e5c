//! A small fixed word list standing in for the lexicon collaborator.
//!
//! The real lexicon (enrichment, translations, user tagging) is out of
//! scope for this crate; this module exists only so `vocab study`/`vocab
//! stats` have something to drive the scheduling core against without a
//! database of their own.

use std::collections::HashSet;

use vocab_core::lexicon::{PartOfSpeech, StaticLexicon, WordRecord};

pub fn demo_lexicon() -> StaticLexicon {
    StaticLexicon::new(vec![
        word("koe", "koe", PartOfSpeech::Noun, "cow", true, false, false),
        word("huis", "huis", PartOfSpeech::Noun, "house", true, false, false),
        word("boek", "boek", PartOfSpeech::Noun, "book", true, false, false),
        word("snel", "snel", PartOfSpeech::Adjective, "fast", true, false, true),
        word("mooi", "mooi", PartOfSpeech::Adjective, "beautiful", true, false, true),
        word("gaan", "gaan", PartOfSpeech::Verb, "to go", true, true, true),
        word("werken", "werken", PartOfSpeech::Verb, "to work", true, true, true),
        word("lopen", "lopen", PartOfSpeech::Verb, "to walk", true, true, true),
        word("kat", "kat", PartOfSpeech::Noun, "cat", true, false, false),
        word("water", "water", PartOfSpeech::Noun, "water", true, false, false),
    ])
}

#[allow(clippy::too_many_arguments)]
fn word(
    id: &str,
    lemma: &str,
    pos: PartOfSpeech,
    translation: &str,
    enriched: bool,
    has_verb_forms: bool,
    has_preposition_example: bool,
) -> WordRecord {
    WordRecord {
        word_id: id.to_string(),
        lemma: lemma.to_string(),
        pos,
        translation: Some(translation.to_string()),
        enriched,
        has_verb_forms,
        has_preposition_example,
        user_tags: HashSet::new(),
    }
}
