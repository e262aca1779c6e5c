//! Test data factory: builds word records and seeded lexicons for
//! end-to-end scenario tests.

use std::collections::HashSet;

use vocab_core::lexicon::{PartOfSpeech, StaticLexicon, WordRecord};

/// Factory for word fixtures.
pub struct WordFixtures;

impl WordFixtures {
    pub fn noun(id: &str, translation: &str) -> WordRecord {
        WordRecord {
            word_id: id.to_string(),
            lemma: id.to_string(),
            pos: PartOfSpeech::Noun,
            translation: Some(translation.to_string()),
            enriched: true,
            has_verb_forms: false,
            has_preposition_example: false,
            user_tags: HashSet::new(),
        }
    }

    pub fn verb(id: &str, translation: &str, enriched: bool, has_verb_forms: bool) -> WordRecord {
        WordRecord {
            word_id: id.to_string(),
            lemma: id.to_string(),
            pos: PartOfSpeech::Verb,
            translation: Some(translation.to_string()),
            enriched,
            has_verb_forms,
            has_preposition_example: false,
            user_tags: HashSet::new(),
        }
    }

    /// A batch of `count` plain nouns named `word0`..`word{count-1}`, all
    /// eligible for the word_translation activity.
    pub fn noun_batch(count: usize) -> Vec<WordRecord> {
        (0..count).map(|i| Self::noun(&format!("word{i}"), &format!("translation{i}"))).collect()
    }

    /// A lexicon seeded with a mix of nouns and verbs, enough to exercise
    /// activity-specific NEW-pool eligibility filtering.
    pub fn mixed_lexicon() -> StaticLexicon {
        let mut words = Self::noun_batch(5);
        words.push(Self::verb("gaan", "to go", true, true));
        words.push(Self::verb("half-enriched", "to be unfinished", true, false));
        StaticLexicon::new(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::lexicon::{LexiconSource, WordFilters};

    #[test]
    fn noun_batch_has_requested_size() {
        assert_eq!(WordFixtures::noun_batch(7).len(), 7);
    }

    #[test]
    fn mixed_lexicon_filters_by_part_of_speech() {
        let lexicon = WordFixtures::mixed_lexicon();
        let filters = WordFilters {
            enriched_only: true,
            pos: Some([PartOfSpeech::Verb].into_iter().collect()),
            user_tags: None,
        };
        let verbs = lexicon.list_words(&filters);
        assert_eq!(verbs.len(), 2);
        assert!(verbs.iter().any(|w| w.word_id == "gaan" && w.has_verb_forms));
    }
}
