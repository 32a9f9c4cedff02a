//! Stopword filtering.
//!
//! Keyword extraction gates candidates by part of speech first, then drops
//! function words through this filter. Lists come from the `stop-words`
//! crate; the engine's home language is Portuguese, with the other Romance
//! and Germanic lists available for mixed corpora.

use rustc_hash::FxHashSet;
use stop_words::{get, LANGUAGE};

/// A lowercase stopword set for one language plus any custom additions.
#[derive(Debug, Clone)]
pub struct StopwordFilter {
    stopwords: FxHashSet<String>,
}

impl Default for StopwordFilter {
    fn default() -> Self {
        Self::new("pt")
    }
}

impl StopwordFilter {
    /// Build a filter for a language code (`pt`, `en`, `es`, `fr`, `de`,
    /// `it`, `nl`). Unknown codes fall back to Portuguese.
    pub fn new(language: &str) -> Self {
        let lang = match language.to_lowercase().as_str() {
            "en" | "english" => LANGUAGE::English,
            "es" | "spanish" => LANGUAGE::Spanish,
            "fr" | "french" => LANGUAGE::French,
            "de" | "german" => LANGUAGE::German,
            "it" | "italian" => LANGUAGE::Italian,
            "nl" | "dutch" => LANGUAGE::Dutch,
            _ => LANGUAGE::Portuguese,
        };
        StopwordFilter {
            stopwords: get(lang).iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// A filter that rejects nothing.
    pub fn empty() -> Self {
        StopwordFilter {
            stopwords: FxHashSet::default(),
        }
    }

    /// Extend the filter with corpus-specific words.
    pub fn add(&mut self, words: &[&str]) {
        for word in words {
            self.stopwords.insert(word.to_lowercase());
        }
    }

    /// Case-insensitive membership test.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }
}
