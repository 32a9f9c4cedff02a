//! Similarity clustering.
//!
//! First-fit, single-scan clustering: each sentence joins the first existing
//! cluster where some member is similar enough, otherwise it founds a new
//! singleton. There is no global re-optimization; the scan order is the
//! original sentence order, which keeps the result deterministic.

use crate::cluster::Cluster;
use crate::similarity::sentence_similarity;
use crate::types::Sentence;

/// The accumulator produced by one clustering scan.
#[derive(Debug, Clone, Default)]
pub struct SimilarityClustering {
    pub clusters: Vec<Cluster<Sentence>>,
}

/// Cluster sentences by pairwise similarity against the given threshold.
///
/// A sentence joins a cluster when its text equals the centroid's text or
/// its maximum similarity to any cluster member reaches the threshold. On
/// joining, a higher-scoring sentence displaces the centroid. After the
/// scan, every member (centroid included) receives its
/// `similarity_cluster_score`, the cluster size, and the cluster's mean
/// relative position.
pub fn cluster_by_similarity(sentences: Vec<Sentence>, threshold: f64) -> SimilarityClustering {
    let mut clusters: Vec<Cluster<Sentence>> = Vec::new();

    for sentence in sentences {
        let slot = clusters.iter().position(|cluster| {
            cluster.centroid.text == sentence.text
                || cluster
                    .iter_all()
                    .map(|member| sentence_similarity(member, &sentence))
                    .fold(0.0_f64, f64::max)
                    >= threshold
        });
        match slot {
            Some(i) => {
                if sentence.score > clusters[i].centroid.score {
                    clusters[i].replace_centroid(sentence);
                } else {
                    clusters[i].push(sentence);
                }
            }
            None => clusters.push(Cluster::new(sentence)),
        }
    }

    let total = clusters.len().max(1);
    for cluster in clusters.iter_mut() {
        let size = cluster.size();
        cluster.value = size as f64 / total as f64;
        let mean_score = cluster.iter_all().map(|s| s.score).sum::<f64>() / size as f64;
        let mean_position =
            cluster.iter_all().map(|s| s.relative_position).sum::<f64>() / size as f64;
        let centroid_score = cluster.centroid.score;
        for member in cluster.iter_all_mut() {
            member.similarity_cluster_score = (centroid_score + mean_score) / 2.0;
            member.sim_cluster_size = size;
            member.avg_position_sim_cluster = mean_position;
        }
    }

    SimilarityClustering { clusters }
}

impl SimilarityClustering {
    /// Split into representatives and leftovers. Each centroid gets the
    /// fixed extra-score bonus; non-centroid members are kept aside for
    /// budget backfill.
    pub fn into_representatives(self, bonus: f64) -> (Vec<Sentence>, Vec<Sentence>) {
        let mut representatives = Vec::with_capacity(self.clusters.len());
        let mut leftovers = Vec::new();
        for cluster in self.clusters {
            let mut centroid = cluster.centroid;
            centroid.extra_score += bonus;
            representatives.push(centroid);
            leftovers.extend(cluster.members);
        }
        (representatives, leftovers)
    }
}
