//! Global keyword extraction.
//!
//! Keywords are the highest-scoring open-class, non-stopword terms in the
//! corpus, deduplicated lemma-aware and capped at `K = round(sqrt(totalWords
//! / 2))`. The extracted list drives keyword clustering and paragraph
//! titling; each keyword is a scored copy carrying a fixed bonus so keyword
//! matches lift sentence rankings.

use rustc_hash::FxHashMap;

use crate::nlp::StopwordFilter;
use crate::types::{Document, SingleToken, SummarizerConfig, Word};

/// Extract the global keyword list for a scored corpus.
///
/// Candidates are single tokens only; named entities contribute their member
/// tokens. Ordering is by score descending with the representation string as
/// the final tie-break, so extraction is deterministic.
pub fn extract_keywords(
    documents: &[Document],
    cfg: &SummarizerConfig,
    stopwords: &StopwordFilter,
) -> Vec<SingleToken> {
    let total_words: usize = documents.iter().map(|d| d.total_words()).sum();
    let cap = cfg.keyword_cap(total_words);
    if cap == 0 {
        return Vec::new();
    }

    // Deduplicate by representation, keeping the highest-scoring instance.
    let mut best: FxHashMap<String, SingleToken> = FxHashMap::default();
    for doc in documents {
        for sentence in &doc.sentences {
            for word in &sentence.words {
                for token in candidate_tokens(word) {
                    if !token.pos.is_relevant()
                        || token.pos.is_punctuation()
                        || stopwords.is_stopword(&token.term)
                    {
                        continue;
                    }
                    let key = token.representation().to_string();
                    match best.get(&key) {
                        Some(existing) if existing.score() >= token.score() => {}
                        _ => {
                            best.insert(key, token.clone());
                        }
                    }
                }
            }
        }
    }

    let mut candidates: Vec<SingleToken> = best.into_values().collect();
    candidates.sort_by(|a, b| {
        b.score()
            .total_cmp(&a.score())
            .then_with(|| a.representation().cmp(b.representation()))
    });
    candidates.truncate(cap);

    for keyword in candidates.iter_mut() {
        keyword.extra_score += cfg.keyword_bonus;
    }
    candidates
}

fn candidate_tokens(word: &Word) -> impl Iterator<Item = &SingleToken> {
    match word {
        Word::Single(t) => std::slice::from_ref(t).iter(),
        Word::Entity(e) => e.tokens.iter(),
    }
}
