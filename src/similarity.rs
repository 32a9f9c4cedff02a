//! Sentence similarity metric.
//!
//! Two signals, averaged: common word subsequences (ROUGE-L-inspired) and
//! plain word overlap (Jaccard). The subsequence scan is greedy and
//! non-backtracking, resuming past the previous match; downstream thresholds
//! were tuned against exactly this scan, so it is preserved as-is rather than
//! replaced with a full LCS.

use crate::types::{Sentence, Word};

/// Round half away from zero to two decimal places. Threshold comparisons
/// are made on rounded values, so 0.7451 compares as 0.75.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Symmetric, length-normalized similarity in `[0, 1]`, rounded to two
/// decimals.
pub fn sentence_similarity(first: &Sentence, second: &Sentence) -> f64 {
    // The scan direction matters: the shorter sentence drives the outer loop.
    let (s1, s2) = if first.total_words() > second.total_words() {
        (&second.words, &first.words)
    } else {
        (&first.words, &second.words)
    };
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let subsequences = common_subsequences(s1, s2);
    let n1 = s1.len() as f64;
    let n2 = s2.len() as f64;

    let subsequence_score = if subsequences.is_empty() {
        0.0
    } else {
        let total: f64 = subsequences
            .iter()
            .map(|&len| (len as f64 / n1 + len as f64 / n2) / 2.0)
            .sum();
        total / subsequences.len() as f64
    };

    let overlap = s1.iter().filter(|a| s2.iter().any(|b| a.represents(b))).count() as f64;
    let overlap_score = overlap / (n1 + n2 - overlap);

    round2((subsequence_score + overlap_score) / 2.0)
}

/// Lengths of all maximal common word runs (length > 1), scanning `s1` left
/// to right. After a match the scan of `s2` resumes past the previous match
/// length instead of restarting, and matched words are consumed from `s1`.
fn common_subsequences(s1: &[Word], s2: &[Word]) -> Vec<usize> {
    let mut lengths = Vec::new();
    let mut i = 0;
    let mut resume = 0;
    while i < s1.len() {
        let mut matched = false;
        for j in resume..s2.len() {
            if s1[i].represents(&s2[j]) {
                let mut len = 0;
                while i + len < s1.len() && j + len < s2.len() && s1[i + len].represents(&s2[j + len])
                {
                    len += 1;
                }
                if len > 1 {
                    lengths.push(len);
                    resume = len;
                    i += len;
                } else {
                    i += 1;
                }
                matched = true;
                break;
            }
        }
        if !matched {
            i += 1;
        }
    }
    lengths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PosTag, SingleToken};

    fn sentence(doc: usize, position: usize, tokens: &[(&str, &str)]) -> Sentence {
        let words: Vec<Word> = tokens
            .iter()
            .enumerate()
            .map(|(i, (surface, lemma))| {
                Word::Single(SingleToken::new(surface, lemma, PosTag::Noun, doc, position, i))
            })
            .collect();
        let text = Sentence::render_text(&words);
        Sentence::new(doc, position, &text, words)
    }

    fn cat_sentence() -> Sentence {
        sentence(
            0,
            1,
            &[
                ("O", "o"),
                ("gato", "gato"),
                ("caçou", "caçar"),
                ("o", "o"),
                ("rato", "rato"),
            ],
        )
    }

    fn mouse_sentence() -> Sentence {
        sentence(
            1,
            1,
            &[
                ("O", "o"),
                ("rato", "rato"),
                ("foi", "ser"),
                ("caçado", "caçar"),
                ("pelo", "pelo"),
                ("gato", "gato"),
            ],
        )
    }

    #[test]
    fn test_self_similarity_is_one() {
        let s = cat_sentence();
        assert_eq!(sentence_similarity(&s, &s), 1.0);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = cat_sentence();
        let b = mouse_sentence();
        assert_eq!(sentence_similarity(&a, &b), sentence_similarity(&b, &a));
    }

    #[test]
    fn test_cat_and_mouse_paraphrases() {
        // s1 = 5 words, s2 = 6 words. Every s1 word has a match in s2
        // (caçou/caçado share the lemma caçar), so overlap = 5 and the
        // Jaccard score is 5/6. One common run of length 2 ("o rato"):
        // subsequence score = (2/5 + 2/6) / 2. Average and round: 0.60.
        let a = cat_sentence();
        let b = mouse_sentence();
        assert_eq!(sentence_similarity(&a, &b), 0.6);
    }

    #[test]
    fn test_disjoint_sentences_score_zero() {
        let a = sentence(0, 1, &[("navio", "navio"), ("atracou", "atracar")]);
        let b = sentence(1, 1, &[("chuva", "chuva"), ("caiu", "cair")]);
        assert_eq!(sentence_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_empty_sentence_scores_zero() {
        let a = cat_sentence();
        let b = sentence(1, 1, &[]);
        assert_eq!(sentence_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_shared_prefix_counts_as_subsequence() {
        let a = sentence(0, 1, &[("o", "o"), ("governo", "governo"), ("anunciou", "anunciar")]);
        let b = sentence(
            1,
            1,
            &[("o", "o"), ("governo", "governo"), ("negou", "negar"), ("tudo", "tudo")],
        );
        // Run "o governo" (length 2), overlap 2 of {3, 4}.
        // subsequence = (2/3 + 2/4) / 2 = 7/12; overlap = 2/5.
        // similarity = (7/12 + 2/5) / 2 ≈ 0.49.
        assert_eq!(sentence_similarity(&a, &b), 0.49);
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(0.745), 0.75);
        assert_eq!(round2(0.744), 0.74);
    }

    #[test]
    fn test_single_word_runs_do_not_count() {
        // Same words in reversed pair order: matches exist but no run > 1.
        let a = sentence(0, 1, &[("gato", "gato"), ("rato", "rato")]);
        let b = sentence(1, 1, &[("rato", "rato"), ("gato", "gato")]);
        // overlap = 2, Jaccard = 2/2 = 1.0; no subsequences.
        assert_eq!(sentence_similarity(&a, &b), 0.5);
    }
}
