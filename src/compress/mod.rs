//! Compression search.
//!
//! For one sentence, enumerate subsets of its removable constituents
//! (appositions, parentheticals, relative clauses, prepositional phrases),
//! rebuild a candidate sentence per surviving subset, and keep the
//! best-ranked result — but only when it is strictly shorter than the
//! original. Constituents are opaque handles into the parse tree, so the
//! search works on plain index sets.
//!
//! The power set is the dominant cost (2^n candidates); `max_removable`
//! caps n. Subsets are enumerated in ascending bitmask order, which keeps
//! the search deterministic without affecting the selection rule.

use tracing::debug;

use crate::external::{ConstituencyParser, SubTreeId};
use crate::scoring::{cmp_complete_score, rescored_copy};
use crate::types::{Sentence, SingleToken, SummarizerConfig, Word};

/// Compress one sentence, returning either a strictly shorter rescored copy
/// or a clone of the original.
///
/// Parse and prune failures make the sentence non-compressible; they are
/// absorbed here, never surfaced.
pub fn compress_sentence<P: ConstituencyParser>(
    sentence: &Sentence,
    parser: &P,
    keywords: &[SingleToken],
    cfg: &SummarizerConfig,
) -> Sentence {
    let tree = match sentence.tree.clone().or_else(|| parser.parse(sentence)) {
        Some(tree) => tree,
        None => {
            debug!(position = sentence.absolute_position, "no parse, keeping sentence");
            return sentence.clone();
        }
    };

    let mut removable = parser.removable(&tree);
    if removable.is_empty() {
        return sentence.clone();
    }
    removable.truncate(cfg.max_removable.min(usize::BITS as usize - 1));

    let mut candidates: Vec<Sentence> = Vec::new();
    let n = removable.len();
    for mask in 1_usize..(1 << n) {
        let subset: Vec<SubTreeId> = (0..n)
            .filter(|bit| mask & (1 << bit) != 0)
            .map(|bit| removable[bit])
            .collect();
        let pruned = match parser.prune(&tree, &subset) {
            Some(pruned) => pruned,
            None => continue,
        };
        let words = surviving_words(sentence, &pruned.leaves());
        if words.is_empty() || words.len() == sentence.total_words() {
            continue;
        }
        candidates.push(rescored_copy(sentence, words, keywords));
    }

    if candidates.is_empty() {
        return sentence.clone();
    }

    candidates.push(sentence.clone());
    candidates.sort_by(cmp_complete_score);
    let winner = candidates.swap_remove(0);
    if winner.total_words() < sentence.total_words() {
        debug!(
            position = sentence.absolute_position,
            from = sentence.total_words(),
            to = winner.total_words(),
            "sentence compressed"
        );
        winner
    } else {
        sentence.clone()
    }
}

/// Map the pruned tree's leaves back onto the sentence's words, in order.
/// Each leaf consumes the first not-yet-used word with the same surface
/// form; leaves with no counterpart (parser-internal tokens) are skipped.
fn surviving_words(sentence: &Sentence, leaves: &[&str]) -> Vec<Word> {
    let mut used = vec![false; sentence.words.len()];
    let mut words = Vec::new();
    for leaf in leaves {
        let found = sentence
            .words
            .iter()
            .enumerate()
            .find(|(i, w)| !used[*i] && w.surface() == *leaf);
        if let Some((i, w)) = found {
            used[i] = true;
            words.push(w.clone());
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::tree::{ConstituencyTree, TreeNode};
    use crate::external::NoopParser;
    use crate::types::PosTag;

    /// Parser that returns the tree already stored on the sentence.
    struct StoredTreeParser;

    impl ConstituencyParser for StoredTreeParser {
        fn parse(&self, sentence: &Sentence) -> Option<ConstituencyTree> {
            sentence.tree.clone()
        }
    }

    fn word(surface: &str, position: usize) -> Word {
        Word::Single(SingleToken::new(surface, surface, PosTag::Noun, 0, 1, position))
    }

    fn scored_word(surface: &str, position: usize, tfidf: f64) -> Word {
        let mut t = SingleToken::new(surface, surface, PosTag::Noun, 0, 1, position);
        t.tfidf = tfidf;
        Word::Single(t)
    }

    // "O presidente um economista discursou em Lisboa" with a low-scoring
    // apposition and a low-scoring PP, so pruning raises the mean score.
    fn sample_sentence() -> Sentence {
        let words = vec![
            scored_word("O", 0, 0.5),
            scored_word("presidente", 1, 0.9),
            scored_word("um", 2, 0.01),
            scored_word("economista", 3, 0.02),
            scored_word("discursou", 4, 0.8),
            scored_word("em", 5, 0.05),
            scored_word("Lisboa", 6, 0.1),
        ];
        let text = Sentence::render_text(&words);
        let mut s = Sentence::new(0, 1, &text, words);
        s.tree = Some(ConstituencyTree::new(TreeNode::branch(
            "S",
            vec![
                TreeNode::branch(
                    "NP",
                    vec![
                        TreeNode::leaf("DET", "O"),
                        TreeNode::leaf("N", "presidente"),
                        TreeNode::branch(
                            "APP",
                            vec![TreeNode::leaf("DET", "um"), TreeNode::leaf("N", "economista")],
                        ),
                    ],
                ),
                TreeNode::branch(
                    "VP",
                    vec![
                        TreeNode::leaf("V", "discursou"),
                        TreeNode::branch(
                            "PP",
                            vec![TreeNode::leaf("P", "em"), TreeNode::leaf("N", "Lisboa")],
                        ),
                    ],
                ),
            ],
        )));
        crate::scoring::compute_sentence_score(&mut s);
        s
    }

    #[test]
    fn test_no_parse_keeps_original() {
        let words = vec![word("O", 0), word("gato", 1), word("dorme", 2)];
        let s = Sentence::new(0, 1, "O gato dorme", words);
        let out = compress_sentence(&s, &NoopParser, &[], &SummarizerConfig::default());
        assert_eq!(out.total_words(), s.total_words());
        assert!(!out.is_subsentence);
    }

    #[test]
    fn test_no_removable_keeps_original() {
        let words = vec![word("O", 0), word("gato", 1)];
        let mut s = Sentence::new(0, 1, "O gato", words);
        s.tree = Some(ConstituencyTree::new(TreeNode::branch(
            "S",
            vec![TreeNode::leaf("DET", "O"), TreeNode::leaf("N", "gato")],
        )));
        let out = compress_sentence(&s, &StoredTreeParser, &[], &SummarizerConfig::default());
        assert_eq!(out.total_words(), 2);
        assert!(!out.is_subsentence);
    }

    #[test]
    fn test_low_value_constituents_removed() {
        let s = sample_sentence();
        let out = compress_sentence(&s, &StoredTreeParser, &[], &SummarizerConfig::default());
        // Dropping both low-scoring constituents maximizes the mean score.
        assert_eq!(out.text, "O presidente discursou");
        assert!(out.is_subsentence);
        assert!(out.total_words() < s.total_words());
        assert!(out.score > s.score);
    }

    #[test]
    fn test_never_longer_than_input() {
        let s = sample_sentence();
        let out = compress_sentence(&s, &StoredTreeParser, &[], &SummarizerConfig::default());
        assert!(out.total_words() <= s.total_words());
    }

    #[test]
    fn test_original_kept_when_it_ranks_first() {
        // High-scoring constituents: any pruning lowers the mean, so the
        // original wins the ranking and is returned unchanged.
        let words = vec![
            scored_word("A", 0, 0.5),
            scored_word("empresa", 1, 0.5),
            scored_word("de", 2, 0.9),
            scored_word("Lisboa", 3, 0.9),
        ];
        let text = Sentence::render_text(&words);
        let mut s = Sentence::new(0, 1, &text, words);
        s.tree = Some(ConstituencyTree::new(TreeNode::branch(
            "S",
            vec![
                TreeNode::leaf("DET", "A"),
                TreeNode::leaf("N", "empresa"),
                TreeNode::branch(
                    "PP",
                    vec![TreeNode::leaf("P", "de"), TreeNode::leaf("N", "Lisboa")],
                ),
            ],
        )));
        crate::scoring::compute_sentence_score(&mut s);
        let out = compress_sentence(&s, &StoredTreeParser, &[], &SummarizerConfig::default());
        assert_eq!(out.total_words(), 4);
        assert!(!out.is_subsentence);
    }

    #[test]
    fn test_max_removable_caps_search() {
        let s = sample_sentence();
        let cfg = SummarizerConfig::default().with_max_removable(1);
        let out = compress_sentence(&s, &StoredTreeParser, &[], &cfg);
        // Only the apposition (first handle) is searchable.
        assert_eq!(out.text, "O presidente discursou em Lisboa");
    }

    #[test]
    fn test_candidate_scores_recomputed() {
        let s = sample_sentence();
        let out = compress_sentence(&s, &StoredTreeParser, &[], &SummarizerConfig::default());
        let expected = (0.5 + 0.9 + 0.8) / 3.0;
        assert!((out.score - expected).abs() < 1e-9);
        assert!((out.simplification_score - out.score).abs() < 1e-9);
    }
}
