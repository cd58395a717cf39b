//! Hierarchical clustering of triplets and projection to point clusters.

pub mod dendrogram;
pub mod linkage;
pub mod projection;

pub use dendrogram::{cut_position_auto, cut_position_fixed, CutPolicy, Dendrogram, MergeStep};
pub use linkage::{linkage, CondensedMatrix, Linkage};
pub use projection::{assign_cluster_ids, clusters_to_point_indices, prune_small_clusters};

use crate::triplet::{Triplet, TripletMetric};

/// A cluster: an ordered sequence of indices (triplet indices right after
/// clustering, point indices after projection).
pub type Cluster = Vec<usize>;

/// An ordered sequence of clusters.
pub type ClusterGroup = Vec<Cluster>;

/// Cluster `triplets` under the scale metric and slice the dendrogram.
///
/// Builds the condensed distance matrix (released as soon as the
/// dendrogram exists), runs the selected linkage, cuts per `cut`, and
/// groups triplet indices by flat label. Labels partition
/// `{0, …, |T|−1}`; an empty triplet set yields an empty group.
pub fn cluster_triplets(
    triplets: &[Triplet],
    scale: f64,
    cut: CutPolicy,
    method: Linkage,
) -> ClusterGroup {
    let n = triplets.len();
    if n == 0 {
        return ClusterGroup::new();
    }

    let metric = TripletMetric::new(scale);
    let matrix = CondensedMatrix::from_triplets(triplets, &metric);
    let dendrogram = linkage(matrix, method);

    let cdists = dendrogram.merge_distances();
    let merges = match cut {
        CutPolicy::Fixed(t) => cut_position_fixed(&cdists, t),
        CutPolicy::Automatic => cut_position_auto(&cdists),
    };

    let labels = dendrogram.cut(merges);
    let mut group: ClusterGroup = vec![Cluster::new(); n - merges];
    for (triplet_index, &label) in labels.iter().enumerate() {
        group[label].push(triplet_index);
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point;

    fn parallel_triplet(y: f64) -> Triplet {
        Triplet {
            a: 0,
            b: 1,
            c: 2,
            center: Point::new(0.0, y, 0.0),
            direction: Point::new(1.0, 0.0, 0.0),
            error: 0.0,
        }
    }

    #[test]
    fn test_empty_triplets_yield_empty_group() {
        let group = cluster_triplets(&[], 1.0, CutPolicy::Automatic, Linkage::Single);
        assert!(group.is_empty());
    }

    #[test]
    fn test_single_triplet_yields_singleton_cluster() {
        let group = cluster_triplets(
            &[parallel_triplet(0.0)],
            1.0,
            CutPolicy::Automatic,
            Linkage::Single,
        );
        assert_eq!(group, vec![vec![0]]);
    }

    #[test]
    fn test_fixed_cut_separates_bands() {
        // Two bands of parallel triplets, 100 apart.
        let triplets: Vec<Triplet> = [0.0, 0.2, 0.4, 100.0, 100.2, 100.4]
            .iter()
            .map(|&y| parallel_triplet(y))
            .collect();

        let group = cluster_triplets(&triplets, 1.0, CutPolicy::Fixed(10.0), Linkage::Single);
        assert_eq!(group.len(), 2);

        // Coverage: the clusters partition all triplet indices.
        let mut all: Vec<usize> = group.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(group[0], vec![0, 1, 2]);
        assert_eq!(group[1], vec![3, 4, 5]);
    }

    #[test]
    fn test_automatic_cut_separates_bands() {
        let triplets: Vec<Triplet> = [0.0, 0.1, 0.2, 0.3, 100.0, 100.1, 100.2, 100.3]
            .iter()
            .map(|&y| parallel_triplet(y))
            .collect();

        let group = cluster_triplets(&triplets, 1.0, CutPolicy::Automatic, Linkage::Single);
        assert_eq!(group.len(), 2);
        assert_eq!(group[0].len(), 4);
        assert_eq!(group[1].len(), 4);
    }
}
