//! Scoring model.
//!
//! Every ranking decision in the engine reduces to `completeScore = score +
//! extraScore` with a fixed deterministic tie-break chain. The base score is
//! TF-IDF over lemma-aware term counts, computed in one corpus pass; the
//! clusterers later adjust `extraScore` only. Functions here either mutate
//! score fields in place on structures the controller owns, or build fresh
//! scored copies ([`rescored_copy`]) — they never touch word or sentence
//! identity fields.

use std::cmp::Ordering;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::types::{Document, Sentence, SingleToken, Word};

// ============================================================================
// Corpus pass
// ============================================================================

/// Compute occurrences, TF, IDF, TF-IDF, and every per-sentence base score
/// for the whole corpus. One pass; call once after annotation.
pub fn score_corpus(documents: &mut [Document]) {
    let total_docs = documents.len();
    if total_docs == 0 {
        return;
    }

    // Document frequency per representation.
    let mut docs_containing: FxHashMap<String, FxHashSet<usize>> = FxHashMap::default();
    for doc in documents.iter() {
        for sentence in &doc.sentences {
            for token in sentence_tokens(sentence) {
                docs_containing
                    .entry(token.representation().to_string())
                    .or_default()
                    .insert(doc.id);
            }
        }
    }

    let total_sentences: usize = documents.iter().map(|d| d.total_sentences()).sum();

    for doc in documents.iter_mut() {
        let doc_words = doc.total_words();
        let doc_sentences = doc.total_sentences();
        let doc_entities = doc.total_entities();

        // In-document occurrence counts, lemma-aware.
        let mut counts: FxHashMap<String, usize> = FxHashMap::default();
        for sentence in &doc.sentences {
            for token in sentence_tokens(sentence) {
                *counts.entry(token.representation().to_string()).or_insert(0) += 1;
            }
        }

        for sentence in doc.sentences.iter_mut() {
            for word in sentence.words.iter_mut() {
                match word {
                    Word::Single(token) => {
                        score_token(token, &counts, &docs_containing, doc_words, total_docs);
                    }
                    Word::Entity(entity) => {
                        for token in entity.tokens.iter_mut() {
                            score_token(token, &counts, &docs_containing, doc_words, total_docs);
                        }
                    }
                }
            }

            compute_sentence_score(sentence);
            compute_sentence_frequency(sentence);
            compute_relevant_word_properties(sentence);
            compute_entity_properties(sentence, doc_entities);

            sentence.relative_position =
                doc_sentences as f64 / sentence.absolute_position.max(1) as f64;
            sentence.relative_position_ratio = if total_sentences > 0 {
                sentence.relative_position / total_sentences as f64
            } else {
                0.0
            };
        }
    }
}

fn score_token(
    token: &mut SingleToken,
    counts: &FxHashMap<String, usize>,
    docs_containing: &FxHashMap<String, FxHashSet<usize>>,
    doc_words: usize,
    total_docs: usize,
) {
    let repr = token.representation().to_string();
    let occurrences = counts.get(&repr).copied().unwrap_or(0);
    token.set_occurrences(occurrences, doc_words);

    let docs_with = docs_containing.get(&repr).map_or(0, |s| s.len());
    let idf = (total_docs as f64 / (1 + docs_with) as f64).log10().abs();
    token.tfidf = (token.frequency * idf).abs();
}

fn sentence_tokens(sentence: &Sentence) -> impl Iterator<Item = &SingleToken> {
    sentence.words.iter().flat_map(|w| match w {
        Word::Single(t) => std::slice::from_ref(t).iter(),
        Word::Entity(e) => e.tokens.iter(),
    })
}

// ============================================================================
// Per-sentence scores
// ============================================================================

/// Base score: mean word score.
pub fn compute_sentence_score(sentence: &mut Sentence) {
    let total = sentence.total_words();
    sentence.score = if total == 0 {
        0.0
    } else {
        sentence.words.iter().map(|w| w.score()).sum::<f64>() / total as f64
    };
}

/// Mean term frequency over single tokens only; named entities contribute to
/// the denominator but not the numerator.
pub fn compute_sentence_frequency(sentence: &mut Sentence) {
    let total = sentence.total_words();
    sentence.frequency = if total == 0 {
        0.0
    } else {
        sentence.single_tokens().map(|t| t.frequency).sum::<f64>() / total as f64
    };
}

/// Number of distinct keywords present in the sentence.
pub fn count_keywords(sentence: &Sentence, keywords: &[SingleToken]) -> usize {
    keywords
        .iter()
        .filter(|kw| sentence.words.iter().any(|w| w.represents_token(kw)))
        .count()
}

/// Keyword count, ratio over the keyword set, and mean score of the keywords
/// present.
pub fn compute_keyword_properties(sentence: &mut Sentence, keywords: &[SingleToken]) {
    let present: Vec<&SingleToken> = keywords
        .iter()
        .filter(|kw| sentence.words.iter().any(|w| w.represents_token(kw)))
        .collect();
    sentence.number_of_keywords = present.len();
    sentence.keyword_ratio = if keywords.is_empty() {
        0.0
    } else {
        present.len() as f64 / keywords.len() as f64
    };
    sentence.keyword_avg_score = if present.is_empty() {
        0.0
    } else {
        present.iter().map(|kw| kw.score()).sum::<f64>() / present.len() as f64
    };
}

/// Entity count, ratio over the document's entity total, and mean entity
/// score.
pub fn compute_entity_properties(sentence: &mut Sentence, total_entities: usize) {
    let entities: Vec<f64> = sentence
        .words
        .iter()
        .filter_map(|w| match w {
            Word::Entity(e) => Some(e.score()),
            Word::Single(_) => None,
        })
        .collect();
    sentence.number_of_entities = entities.len();
    sentence.entity_ratio = if total_entities == 0 {
        0.0
    } else {
        entities.len() as f64 / total_entities as f64
    };
    sentence.entity_avg_score = if entities.is_empty() {
        0.0
    } else {
        entities.iter().sum::<f64>() / entities.len() as f64
    };
}

/// Count and ratio of open-class content words.
pub fn compute_relevant_word_properties(sentence: &mut Sentence) {
    let relevant = sentence.words.iter().filter(|w| w.is_relevant()).count();
    sentence.relevant_words = relevant;
    sentence.relevant_ratio = if sentence.total_words() == 0 {
        0.0
    } else {
        relevant as f64 / sentence.total_words() as f64
    };
}

// ============================================================================
// Orderings
// ============================================================================

/// The ranking order used everywhere sentences compete: best first by
/// `completeScore`, ties broken by raw score, then `extraScore`, then
/// ascending absolute position. Total and deterministic.
pub fn cmp_complete_score(a: &Sentence, b: &Sentence) -> Ordering {
    b.complete_score()
        .total_cmp(&a.complete_score())
        .then(b.score.total_cmp(&a.score))
        .then(b.extra_score.total_cmp(&a.extra_score))
        .then(a.absolute_position.cmp(&b.absolute_position))
}

/// Reading order inside a paragraph. Same-document sentences keep document
/// order; cross-document ties fall back to similarity-cluster density.
pub fn cmp_in_paragraph(a: &Sentence, b: &Sentence) -> Ordering {
    if a.doc_id == b.doc_id {
        return a.absolute_position.cmp(&b.absolute_position);
    }
    a.absolute_position
        .cmp(&b.absolute_position)
        .then(b.avg_position_sim_cluster.total_cmp(&a.avg_position_sim_cluster))
        .then(b.sim_cluster_size.cmp(&a.sim_cluster_size))
}

// ============================================================================
// Scored copies
// ============================================================================

/// Build a new sentence from a word subset of `source`, carrying over the
/// cluster scores and recomputing everything derived from the words. Used by
/// the compression search; the source is never mutated.
pub fn rescored_copy(source: &Sentence, words: Vec<Word>, keywords: &[SingleToken]) -> Sentence {
    let mut copy = Sentence {
        doc_id: source.doc_id,
        absolute_position: source.absolute_position,
        text: Sentence::render_text(&words),
        words,
        tree: None,
        extra_score: source.extra_score,
        keyword_cluster_score: source.keyword_cluster_score,
        similarity_cluster_score: source.similarity_cluster_score,
        relative_position: source.relative_position,
        relative_position_ratio: source.relative_position_ratio,
        avg_position_sim_cluster: source.avg_position_sim_cluster,
        sim_cluster_size: source.sim_cluster_size,
        entity_ratio: source.entity_ratio,
        keyword_key: source.keyword_key.clone(),
        is_title: source.is_title,
        is_subsentence: true,
        has_connective: source.has_connective,
        ..Sentence::default()
    };
    compute_sentence_score(&mut copy);
    compute_sentence_frequency(&mut copy);
    compute_keyword_properties(&mut copy, keywords);
    compute_relevant_word_properties(&mut copy);
    copy.number_of_entities = copy
        .words
        .iter()
        .filter(|w| matches!(w, Word::Entity(_)))
        .count();
    copy.simplification_score = copy.score;
    copy
}

// ============================================================================
// Tests
// ============================================================================
