//! Dendrogram representation and flat-cut extraction.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::stats::sample_std;

/// One agglomerative merge: two cluster representatives (observation
/// indices inside the respective clusters) and the merge distance.
#[derive(Clone, Copy, Debug)]
pub struct MergeStep {
    pub left: usize,
    pub right: usize,
    pub distance: f64,
}

/// Merge tree of an agglomerative clustering run, with steps sorted
/// ascending by merge distance.
pub struct Dendrogram {
    num_observations: usize,
    steps: Vec<MergeStep>,
}

impl Dendrogram {
    pub(crate) fn new(num_observations: usize, steps: Vec<MergeStep>) -> Self {
        debug_assert_eq!(steps.len(), num_observations.saturating_sub(1));
        Self {
            num_observations,
            steps,
        }
    }

    #[inline]
    pub fn num_observations(&self) -> usize {
        self.num_observations
    }

    /// Merge distances in merge order (the `cdists` array).
    pub fn merge_distances(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.distance).collect()
    }

    /// Flat labels after applying the first `merges` steps.
    ///
    /// Returns one label per observation in `[0, n − merges)`; label ids
    /// are assigned by first occurrence in observation order, which is the
    /// tie-break downstream ordering is stable under.
    pub fn cut(&self, merges: usize) -> Vec<usize> {
        let n = self.num_observations;
        let mut parent: Vec<usize> = (0..n).collect();

        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        for step in &self.steps[..merges] {
            let a = find(&mut parent, step.left);
            let b = find(&mut parent, step.right);
            debug_assert_ne!(a, b, "merge steps must join distinct clusters");
            parent[a.max(b)] = a.min(b);
        }

        let mut labels = vec![usize::MAX; n];
        let mut next_label = 0usize;
        let mut root_label = vec![usize::MAX; n];
        for i in 0..n {
            let root = find(&mut parent, i);
            if root_label[root] == usize::MAX {
                root_label[root] = next_label;
                next_label += 1;
            }
            labels[i] = root_label[root];
        }
        debug_assert_eq!(next_label, n - merges);
        labels
    }
}

/// Where to slice the dendrogram into a flat clustering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutPolicy {
    /// Cut at the first merge distance ≥ the given threshold.
    Fixed(f64),
    /// Cut where the merge distances jump by more than twice their
    /// running standard deviation.
    Automatic,
}

/// Number of merges to apply for a fixed cut threshold `t`.
///
/// The flat clustering then has `n − k` clusters; saturates at `n − 1`
/// (a single cluster) when no merge distance reaches the threshold.
pub fn cut_position_fixed(cdists: &[f64], t: f64) -> usize {
    cdists.iter().position(|&d| d >= t).unwrap_or(cdists.len())
}

/// Number of merges to apply under the automatic stopping rule.
///
/// Starting from half the merge count, stops at the first k where the
/// merge distance is unexpectedly large: nonzero history and
/// `cdists[k] > cdists[k−1] + 2·σ(cdists[0..=k])` with σ the sample
/// standard deviation. σ of a single sample is NaN, so k = 0 never
/// breaks. Saturates at `n − 1` when no jump is found.
pub fn cut_position_auto(cdists: &[f64]) -> usize {
    let len = cdists.len();
    let mut k = len / 2;
    while k < len {
        let prev = if k == 0 { 0.0 } else { cdists[k - 1] };
        if (prev > 0.0 || cdists[k] > 1.0e-8)
            && cdists[k] > prev + 2.0 * sample_std(&cdists[..=k])
        {
            break;
        }
        k += 1;
    }

    let threshold = if k == 0 {
        0.0
    } else if k < len {
        (cdists[k - 1] + cdists[k]) / 2.0
    } else {
        cdists[k - 1]
    };
    debug!("automatic cut threshold: {threshold}");
    k
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_cut_positions() {
        let cdists = [0.1, 0.2, 0.5, 3.0, 4.0];
        assert_eq!(cut_position_fixed(&cdists, 0.5), 2);
        assert_eq!(cut_position_fixed(&cdists, 0.05), 0);
        assert_eq!(cut_position_fixed(&cdists, 100.0), 5);
        assert_eq!(cut_position_fixed(&[], 1.0), 0);
    }

    #[test]
    fn test_auto_cut_finds_clean_jump() {
        // Eight constant merges, then a huge bridge merge.
        let cdists = [0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 50.0];
        let k = cut_position_auto(&cdists);
        assert_eq!(k, 8);
    }

    #[test]
    fn test_auto_cut_saturates_without_jump() {
        let cdists = [0.1, 0.11, 0.12, 0.13, 0.14, 0.15];
        assert_eq!(cut_position_auto(&cdists), 6);
    }

    #[test]
    fn test_auto_cut_single_merge_never_breaks() {
        // One merge: σ of one sample is NaN, so the scan runs through.
        assert_eq!(cut_position_auto(&[123.0]), 1);
    }

    #[test]
    fn test_auto_cut_ignores_leading_zero_region() {
        // All-zero history then a jump: the zero guard skips the flat
        // region without breaking on it.
        let cdists = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 10.0];
        assert_eq!(cut_position_auto(&cdists), 7);
    }

    #[test]
    fn test_auto_cut_empty() {
        assert_eq!(cut_position_auto(&[]), 0);
    }

    #[test]
    fn test_cut_labels_cover_and_partition() {
        // Chain 0-1-2 and singleton 3.
        let steps = vec![
            MergeStep {
                left: 0,
                right: 1,
                distance: 1.0,
            },
            MergeStep {
                left: 1,
                right: 2,
                distance: 2.0,
            },
            MergeStep {
                left: 2,
                right: 3,
                distance: 9.0,
            },
        ];
        let dendrogram = Dendrogram::new(4, steps);

        let labels = dendrogram.cut(2);
        assert_eq!(labels, vec![0, 0, 0, 1]);

        let labels = dendrogram.cut(0);
        assert_eq!(labels, vec![0, 1, 2, 3]);

        let labels = dendrogram.cut(3);
        assert_eq!(labels, vec![0, 0, 0, 0]);
    }
}
