//! Condensed distance matrix and agglomerative linkage.
//!
//! Single linkage runs as a Prim-style minimum-spanning-tree pass over the
//! condensed matrix; complete and average linkage use the nearest-neighbor
//! chain algorithm with Lance–Williams distance updates. Both produce the
//! same dendrogram representation: |T| − 1 merge steps, stable-sorted
//! ascending by merge distance.
//!
//! Tie-breaks are deterministic: the argmin scans ascend by cluster index,
//! and the chain's previous element wins ties so reciprocal pairs
//! terminate. The dendrogram cut is stable under exactly these rules.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::cluster::dendrogram::{Dendrogram, MergeStep};
use crate::triplet::{Triplet, TripletMetric};

/// Rule for combining cluster-to-cluster distances during agglomeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Linkage {
    /// Minimum pairwise distance. Merge heights are monotone.
    #[default]
    Single,
    /// Maximum pairwise distance.
    Complete,
    /// Size-weighted mean pairwise distance.
    Average,
}

/// Condensed upper-triangular distance matrix in row-major order.
///
/// This is the dominant allocation of the pipeline (|T|·(|T|−1)/2 doubles,
/// contiguous); [`linkage`] consumes it so it is released as soon as the
/// dendrogram exists.
pub struct CondensedMatrix {
    data: Vec<f64>,
    n: usize,
}

impl CondensedMatrix {
    /// Pairwise distances of `triplets` under `metric`.
    pub fn from_triplets(triplets: &[Triplet], metric: &TripletMetric) -> Self {
        let n = triplets.len();
        let mut data = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                data.push(metric.distance(&triplets[i], &triplets[j]));
            }
        }
        Self { data, n }
    }

    /// Number of observations (not stored entries).
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < j && j < self.n);
        i * self.n - i * (i + 1) / 2 + (j - i - 1)
    }

    /// Distance between observations `i` and `j` (i ≠ j).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.data[self.offset(i, j)]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, value: f64) {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        let off = self.offset(i, j);
        self.data[off] = value;
    }
}

/// Run agglomerative clustering on `matrix` with the given linkage rule.
///
/// Consumes the matrix; the NN-chain methods update it in place.
pub fn linkage(mut matrix: CondensedMatrix, method: Linkage) -> Dendrogram {
    let n = matrix.len();
    let mut steps = match method {
        Linkage::Single => mst_linkage(&matrix),
        Linkage::Complete | Linkage::Average => nn_chain_linkage(&mut matrix, method),
    };
    drop(matrix);

    steps.sort_by(|x, y| x.distance.partial_cmp(&y.distance).unwrap());
    Dendrogram::new(n, steps)
}

/// Single linkage as a Prim minimum-spanning-tree pass.
///
/// Each recorded step is the MST edge that first connects a new
/// observation to the growing tree; sorted, these edges are exactly the
/// single-linkage merge heights.
fn mst_linkage(matrix: &CondensedMatrix) -> Vec<MergeStep> {
    let n = matrix.len();
    let mut steps = Vec::with_capacity(n.saturating_sub(1));
    if n < 2 {
        return steps;
    }

    let mut in_tree = vec![false; n];
    let mut min_dist = vec![f64::INFINITY; n];
    let mut closest_tree_node = vec![0usize; n];
    let mut current = 0usize;
    in_tree[0] = true;

    for _ in 1..n {
        let mut next = n;
        let mut best = f64::INFINITY;
        for j in 0..n {
            if in_tree[j] {
                continue;
            }
            let d = matrix.get(current, j);
            if d < min_dist[j] {
                min_dist[j] = d;
                closest_tree_node[j] = current;
            }
            if min_dist[j] < best {
                best = min_dist[j];
                next = j;
            }
        }
        steps.push(MergeStep {
            left: closest_tree_node[next],
            right: next,
            distance: min_dist[next],
        });
        in_tree[next] = true;
        current = next;
    }
    steps
}

/// Complete/average linkage via the nearest-neighbor chain algorithm.
///
/// Clusters are represented by one of their observation indices; on a
/// merge the larger index survives and its distances are rewritten with
/// the Lance–Williams formula for the method. Both rules are reducible,
/// so the chain stays valid across merges.
fn nn_chain_linkage(matrix: &mut CondensedMatrix, method: Linkage) -> Vec<MergeStep> {
    let n = matrix.len();
    let mut steps = Vec::with_capacity(n.saturating_sub(1));
    if n < 2 {
        return steps;
    }

    let mut active = vec![true; n];
    let mut size = vec![1usize; n];
    let mut chain: Vec<usize> = Vec::with_capacity(n);

    for _ in 0..n - 1 {
        if chain.is_empty() {
            // Any active cluster seeds the chain; take the lowest index.
            let seed = (0..n).find(|&i| active[i]).unwrap();
            chain.push(seed);
        }

        loop {
            let tip = chain[chain.len() - 1];
            let prev = chain.len().checked_sub(2).map(|p| chain[p]);

            let mut nearest = prev.unwrap_or(n);
            let mut best = match prev {
                Some(p) => matrix.get(tip, p),
                None => f64::INFINITY,
            };
            for j in 0..n {
                if !active[j] || j == tip || Some(j) == prev {
                    continue;
                }
                let d = matrix.get(tip, j);
                if d < best {
                    best = d;
                    nearest = j;
                }
            }

            if Some(nearest) == prev {
                // Reciprocal nearest neighbors: merge the chain tail.
                chain.pop();
                chain.pop();
                let (a, b) = if tip < nearest {
                    (tip, nearest)
                } else {
                    (nearest, tip)
                };

                let (sa, sb) = (size[a] as f64, size[b] as f64);
                for j in 0..n {
                    if !active[j] || j == a || j == b {
                        continue;
                    }
                    let daj = matrix.get(a, j);
                    let dbj = matrix.get(b, j);
                    let updated = match method {
                        Linkage::Single => daj.min(dbj),
                        Linkage::Complete => daj.max(dbj),
                        Linkage::Average => (sa * daj + sb * dbj) / (sa + sb),
                    };
                    matrix.set(b, j, updated);
                }
                active[a] = false;
                size[b] += size[a];

                steps.push(MergeStep {
                    left: a,
                    right: b,
                    distance: best,
                });
                break;
            }
            chain.push(nearest);
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point;
    use approx::assert_relative_eq;

    /// Triplets laid out on a line so their pairwise metric distances are
    /// the perpendicular offsets of their centers; directions all +x.
    fn line_triplets(ys: &[f64]) -> Vec<Triplet> {
        ys.iter()
            .map(|&y| Triplet {
                a: 0,
                b: 1,
                c: 2,
                center: Point::new(0.0, y, 0.0),
                direction: Point::new(1.0, 0.0, 0.0),
                error: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_condensed_matrix_layout() {
        let triplets = line_triplets(&[0.0, 1.0, 3.0]);
        let matrix = CondensedMatrix::from_triplets(&triplets, &TripletMetric::new(1.0));

        assert_eq!(matrix.len(), 3);
        assert_relative_eq!(matrix.get(0, 1), 1.0);
        assert_relative_eq!(matrix.get(0, 2), 3.0);
        assert_relative_eq!(matrix.get(1, 2), 2.0);
        // Symmetric access.
        assert_relative_eq!(matrix.get(2, 0), 3.0);
    }

    #[test]
    fn test_single_linkage_merge_heights() {
        // Offsets 0, 1, 3, 7: single linkage merges at 1, 2, 4.
        let triplets = line_triplets(&[0.0, 1.0, 3.0, 7.0]);
        let matrix = CondensedMatrix::from_triplets(&triplets, &TripletMetric::new(1.0));
        let dendrogram = linkage(matrix, Linkage::Single);

        let cdists = dendrogram.merge_distances();
        assert_eq!(cdists.len(), 3);
        assert_relative_eq!(cdists[0], 1.0);
        assert_relative_eq!(cdists[1], 2.0);
        assert_relative_eq!(cdists[2], 4.0);
    }

    #[test]
    fn test_complete_linkage_merge_heights() {
        // Offsets 0, 1, 3: merges {0,1} at 1, then {0,1,2} at max(3, 2) = 3.
        let triplets = line_triplets(&[0.0, 1.0, 3.0]);
        let matrix = CondensedMatrix::from_triplets(&triplets, &TripletMetric::new(1.0));
        let dendrogram = linkage(matrix, Linkage::Complete);

        let cdists = dendrogram.merge_distances();
        assert_relative_eq!(cdists[0], 1.0);
        assert_relative_eq!(cdists[1], 3.0);
    }

    #[test]
    fn test_average_linkage_merge_heights() {
        // Offsets 0, 1, 3: merges {0,1} at 1, then the mean of (3, 2) = 2.5.
        let triplets = line_triplets(&[0.0, 1.0, 3.0]);
        let matrix = CondensedMatrix::from_triplets(&triplets, &TripletMetric::new(1.0));
        let dendrogram = linkage(matrix, Linkage::Average);

        let cdists = dendrogram.merge_distances();
        assert_relative_eq!(cdists[0], 1.0);
        assert_relative_eq!(cdists[1], 2.5);
    }

    #[test]
    fn test_two_well_separated_groups() {
        let triplets = line_triplets(&[0.0, 0.1, 0.2, 100.0, 100.1, 100.2]);
        let matrix = CondensedMatrix::from_triplets(&triplets, &TripletMetric::new(1.0));
        let dendrogram = linkage(matrix, Linkage::Single);

        let cdists = dendrogram.merge_distances();
        // Five merges; the last one bridges the groups.
        assert_eq!(cdists.len(), 5);
        assert!(cdists[4] > 99.0);
        assert!(cdists[3] < 1.0);

        let labels = dendrogram.cut(4);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[3], labels[5]);
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn test_single_observation_has_no_steps() {
        let triplets = line_triplets(&[0.0]);
        let matrix = CondensedMatrix::from_triplets(&triplets, &TripletMetric::new(1.0));
        let dendrogram = linkage(matrix, Linkage::Single);
        assert!(dendrogram.merge_distances().is_empty());
        assert_eq!(dendrogram.cut(0), vec![0]);
    }
}
