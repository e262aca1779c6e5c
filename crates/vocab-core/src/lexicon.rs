//! The lexicon collaborator: word records and the read-only interface the
//! core consumes them through.
//!
//! The lexicon store itself (enrichment, translations, tagging) is out of
//! scope for this crate; [`LexiconSource`] is the seam an embedding
//! application implements.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Part of speech, as far as the scheduling core needs to know it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    Verb,
    Noun,
    Adjective,
    Other,
}

/// A word record as the core sees it: opaque apart from the fields pool
/// eligibility filters on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordRecord {
    pub word_id: String,
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub translation: Option<String>,
    /// `true` once AI enrichment (out of scope here) has populated verb/prep metadata.
    pub enriched: bool,
    /// `true` if verb metadata includes usable perfectum/past-tense forms.
    pub has_verb_forms: bool,
    /// `true` if at least one usable preposition example is attached.
    pub has_preposition_example: bool,
    pub user_tags: HashSet<String>,
}

/// Filters accepted by [`LexiconSource::list_words`].
#[derive(Debug, Clone, Default)]
pub struct WordFilters {
    pub enriched_only: bool,
    pub pos: Option<HashSet<PartOfSpeech>>,
    pub user_tags: Option<HashSet<String>>,
}

/// The read-only lexicon interface the pool builder and session assembler call.
///
/// Implemented by the embedding application; this crate never stores word
/// metadata itself.
pub trait LexiconSource {
    fn list_words(&self, filters: &WordFilters) -> Vec<WordRecord>;
    fn get_word(&self, word_id: &str) -> Option<WordRecord>;
}

/// An in-memory [`LexiconSource`] backed by a fixed word list.
///
/// Useful for tests and for small embedding applications that load their
/// lexicon from a static file rather than a database.
#[derive(Debug, Clone, Default)]
pub struct StaticLexicon {
    words: Vec<WordRecord>,
}

impl StaticLexicon {
    pub fn new(words: Vec<WordRecord>) -> Self {
        Self { words }
    }
}

impl LexiconSource for StaticLexicon {
    fn list_words(&self, filters: &WordFilters) -> Vec<WordRecord> {
        self.words
            .iter()
            .filter(|w| !filters.enriched_only || w.enriched)
            .filter(|w| filters.pos.as_ref().is_none_or(|pos| pos.contains(&w.pos)))
            .filter(|w| {
                filters
                    .user_tags
                    .as_ref()
                    .is_none_or(|tags| w.user_tags.iter().any(|t| tags.contains(t)))
            })
            .cloned()
            .collect()
    }

    fn get_word(&self, word_id: &str) -> Option<WordRecord> {
        self.words.iter().find(|w| w.word_id == word_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(id: &str, pos: PartOfSpeech, enriched: bool) -> WordRecord {
        WordRecord {
            word_id: id.to_string(),
            lemma: id.to_string(),
            pos,
            translation: None,
            enriched,
            has_verb_forms: false,
            has_preposition_example: false,
            user_tags: HashSet::new(),
        }
    }

    #[test]
    fn list_words_filters_by_enriched_only() {
        let lexicon = StaticLexicon::new(vec![
            word("w1", PartOfSpeech::Noun, true),
            word("w2", PartOfSpeech::Noun, false),
        ]);
        let filters = WordFilters {
            enriched_only: true,
            ..Default::default()
        };
        let got: Vec<_> = lexicon.list_words(&filters).into_iter().map(|w| w.word_id).collect();
        assert_eq!(got, vec!["w1"]);
    }

    #[test]
    fn get_word_returns_none_for_unknown_id() {
        let lexicon = StaticLexicon::new(vec![word("w1", PartOfSpeech::Verb, true)]);
        assert!(lexicon.get_word("missing").is_none());
    }
}
