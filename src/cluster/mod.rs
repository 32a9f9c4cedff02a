//! Sentence clustering.
//!
//! Two clusterers run back to back in the Map phase: similarity clustering
//! collapses near-duplicate sentences to one representative each, then
//! keyword clustering partitions the representatives by their strongest
//! keyword. Both are written as folds over an explicit accumulator, so the
//! fixed-point loop in the keyword clusterer is an iterate-until-stable
//! function rather than mutation of shared collections.

pub mod keyword;
pub mod similarity;

pub use keyword::{cluster_by_keywords, KeywordCluster, KeywordClustering};
pub use similarity::{cluster_by_similarity, SimilarityClustering};

/// A cluster: a centroid plus its non-centroid members, and a scalar value
/// used as the cluster-level ranking weight.
#[derive(Debug, Clone)]
pub struct Cluster<T> {
    pub centroid: T,
    pub members: Vec<T>,
    pub value: f64,
}

impl<T> Cluster<T> {
    pub fn new(centroid: T) -> Self {
        Cluster {
            centroid,
            members: Vec::new(),
            value: 0.0,
        }
    }

    /// Members plus centroid.
    pub fn size(&self) -> usize {
        self.members.len() + 1
    }

    pub fn push(&mut self, member: T) {
        self.members.push(member);
    }

    /// Install a new centroid; the old one becomes a regular member.
    pub fn replace_centroid(&mut self, new_centroid: T) {
        let old = std::mem::replace(&mut self.centroid, new_centroid);
        self.members.push(old);
    }

    pub fn iter_all(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.centroid).chain(self.members.iter())
    }

    pub fn iter_all_mut(&mut self) -> impl Iterator<Item = &mut T> {
        std::iter::once(&mut self.centroid).chain(self.members.iter_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cluster_is_singleton() {
        let c = Cluster::new(5);
        assert_eq!(c.size(), 1);
        assert_eq!(c.iter_all().copied().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_replace_centroid_keeps_old_as_member() {
        let mut c = Cluster::new(1);
        c.push(2);
        c.replace_centroid(3);
        assert_eq!(c.centroid, 3);
        assert_eq!(c.members, vec![2, 1]);
        assert_eq!(c.size(), 3);
    }
}
