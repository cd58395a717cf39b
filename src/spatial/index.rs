//! Static kd-tree index over a point cloud.
//!
//! Thin wrapper around [`kiddo::KdTree`] that stores each point's cloud
//! index as the tree payload, so queries return stable indices rather than
//! geometric copies. All distances are squared Euclidean.
//!
//! Both query kinds include the query point itself when it is part of the
//! indexed cloud (at squared distance 0); callers filter it out or raise k
//! by one as needed.

use kiddo::{KdTree, SquaredEuclidean};

use crate::core::PointCloud;

/// A single query result: cloud index plus squared Euclidean distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub squared_distance: f64,
}

/// Immutable spatial index over a [`PointCloud`].
pub struct SpatialIndex {
    tree: KdTree<f64, 3>,
    len: usize,
}

impl SpatialIndex {
    /// Build an index over all points of `cloud`.
    pub fn build(cloud: &PointCloud) -> Self {
        let mut tree: KdTree<f64, 3> = KdTree::new();
        for (i, point) in cloud.iter().enumerate() {
            tree.add(&point.coords(), i as u64);
        }
        Self {
            tree,
            len: cloud.len(),
        }
    }

    /// Number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `k` nearest points to `query`, ascending by squared distance.
    ///
    /// Returns at most `min(k, len)` neighbors. Ties are broken by
    /// ascending cloud index, so traversal order is reproducible.
    pub fn k_nearest(&self, query: &[f64; 3], k: usize) -> Vec<Neighbor> {
        let mut result: Vec<Neighbor> = self
            .tree
            .nearest_n::<SquaredEuclidean>(query, k)
            .into_iter()
            .map(|n| Neighbor {
                index: n.item as usize,
                squared_distance: n.distance,
            })
            .collect();
        result.sort_by(|a, b| {
            a.squared_distance
                .partial_cmp(&b.squared_distance)
                .unwrap()
                .then(a.index.cmp(&b.index))
        });
        result
    }

    /// All points with Euclidean distance ≤ `radius` from `query`,
    /// ascending by cloud index.
    pub fn radius(&self, query: &[f64; 3], radius: f64) -> Vec<Neighbor> {
        let mut result: Vec<Neighbor> = self
            .tree
            .within_unsorted::<SquaredEuclidean>(query, radius * radius)
            .into_iter()
            .map(|n| Neighbor {
                index: n.item as usize,
                squared_distance: n.distance,
            })
            .collect();
        result.sort_by_key(|n| n.index);
        result
    }
}
