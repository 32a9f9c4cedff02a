//! Keyword clustering.
//!
//! Partitions sentences by their single strongest keyword. The loop repeats
//! until the unassigned pool stops shrinking; assignments are never undone,
//! so the pool size is non-increasing and bounded below by zero — the loop
//! always terminates.

use crate::scoring::count_keywords;
use crate::types::{Sentence, SingleToken};

/// One keyword cluster. The keyword is the grouping key; the centroid is the
/// member sentence with the highest keyword-occurrence count.
#[derive(Debug, Clone)]
pub struct KeywordCluster {
    pub keyword: SingleToken,
    pub sentences: Vec<Sentence>,
    /// Index of the centroid member. Replaced whenever a joining sentence's
    /// occurrence count exceeds the stored cluster value.
    pub centroid: usize,
    /// During the scan: maximum keyword-occurrence count observed.
    /// After the post-pass: relative cluster size.
    pub value: f64,
}

impl KeywordCluster {
    pub fn centroid_sentence(&self) -> Option<&Sentence> {
        self.sentences.get(self.centroid)
    }
}

/// The fixed-point accumulator: filled clusters plus the unassigned pool.
#[derive(Debug, Clone, Default)]
pub struct KeywordClustering {
    pub clusters: Vec<KeywordCluster>,
    pub unassigned: Vec<Sentence>,
}

impl KeywordClustering {
    /// Every sentence, assigned or not, for the Reduce phase.
    pub fn into_sentences(self) -> Vec<Sentence> {
        let mut out: Vec<Sentence> = self
            .clusters
            .into_iter()
            .flat_map(|c| c.sentences)
            .collect();
        out.extend(self.unassigned);
        out
    }
}

/// Occurrences of one keyword within one sentence.
fn keyword_occurrences(sentence: &Sentence, keyword: &SingleToken) -> usize {
    sentence
        .words
        .iter()
        .filter(|w| w.represents_token(keyword))
        .count()
}

/// Cluster sentences by dominant keyword.
///
/// Each pass assigns every assignable sentence to the keyword with the
/// strict maximum occurrence count; ties fall to the larger current cluster,
/// then the higher keyword score. Sentences with no keyword occurrences stay
/// unassigned and take the fixed penalty once, after the fixed point.
pub fn cluster_by_keywords(
    sentences: Vec<Sentence>,
    keywords: &[SingleToken],
    penalty: f64,
) -> KeywordClustering {
    let mut clusters: Vec<KeywordCluster> = keywords
        .iter()
        .map(|kw| KeywordCluster {
            keyword: kw.clone(),
            sentences: Vec::new(),
            centroid: 0,
            value: 0.0,
        })
        .collect();

    let mut unassigned = sentences;
    let mut previous = usize::MAX;
    while !unassigned.is_empty() && unassigned.len() < previous {
        previous = unassigned.len();
        let mut still_unassigned = Vec::new();

        for mut sentence in unassigned.drain(..) {
            let mut best: Option<(usize, usize)> = None; // (keyword index, count)
            for (idx, keyword) in keywords.iter().enumerate() {
                let count = keyword_occurrences(&sentence, keyword);
                if count == 0 {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some((best_idx, best_count)) => {
                        (count, clusters[idx].sentences.len(), keywords[idx].score())
                            .partial_cmp(&(
                                best_count,
                                clusters[best_idx].sentences.len(),
                                keywords[best_idx].score(),
                            ))
                            == Some(std::cmp::Ordering::Greater)
                    }
                };
                if better {
                    best = Some((idx, count));
                }
            }

            match best {
                Some((idx, count)) => {
                    let keyword = &keywords[idx];
                    sentence.keyword_cluster_score = keyword.score();
                    sentence.keyword_key = Some(keyword.representation().to_string());
                    let cluster = &mut clusters[idx];
                    if count as f64 > cluster.value {
                        cluster.value = count as f64;
                        cluster.centroid = cluster.sentences.len();
                    }
                    cluster.sentences.push(sentence);
                }
                None => still_unassigned.push(sentence),
            }
        }
        unassigned = still_unassigned;
    }

    for sentence in unassigned.iter_mut() {
        sentence.extra_score -= penalty;
    }

    clusters.retain(|c| !c.sentences.is_empty());
    let total = clusters.len().max(1);
    for cluster in clusters.iter_mut() {
        cluster.value = cluster.sentences.len() as f64 / total as f64;
        let mean = cluster.sentences.iter().map(|s| s.score).sum::<f64>()
            / cluster.sentences.len() as f64;
        let centroid_score = cluster.sentences[cluster.centroid].score;
        for sentence in cluster.sentences.iter_mut() {
            sentence.keyword_cluster_score =
                (sentence.keyword_cluster_score + centroid_score + mean) / 3.0;
            let present = count_keywords(sentence, keywords);
            sentence.number_of_keywords = present;
            sentence.extra_score += present as f64;
        }
    }

    KeywordClustering {
        clusters,
        unassigned,
    }
}
