//! Triplet generation from a smoothed cloud.
//!
//! # Algorithm
//!
//! For every midpoint b in cloud order:
//!
//! 1. Query the k nearest neighbors of b (the query point itself comes
//!    back at distance 0 and is skipped, as is any duplicate of it).
//! 2. For every pair (a, c) of remaining results with a before c in the
//!    query result, compute the branch directions û_ab = (b−a)/‖b−a‖ and
//!    û_bc = (c−b)/‖c−b‖ and the error 1 − û_ab·û_bc. Pairs within the
//!    angular tolerance become candidates.
//! 3. Stable-sort candidates by error and emit the best n.
//!
//! On an ordered cloud only pairs with `a.index <= b.index <= c.index`
//! (chronological input indices) are considered, which suppresses triplets
//! that jump between passes of a self-crossing track.

use serde::{Deserialize, Serialize};

use crate::core::PointCloud;
use crate::spatial::SpatialIndex;
use crate::triplet::Triplet;

/// Configuration for triplet generation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TripletConfig {
    /// Number of nearest neighbors considered around each midpoint.
    ///
    /// The query point itself occupies one slot.
    /// Default: 19
    pub neighbors: usize,

    /// Maximum number of triplets emitted per midpoint.
    ///
    /// Candidates are ranked by collinearity error; fewer may exist.
    /// Default: 2
    pub max_per_midpoint: usize,

    /// Angular tolerance as 1 − cos of the branch angle, in [0, 2].
    ///
    /// Default: 0.03
    pub max_error: f64,
}

impl Default for TripletConfig {
    fn default() -> Self {
        Self {
            neighbors: 19,
            max_per_midpoint: 2,
            max_error: 0.03,
        }
    }
}

/// Generate approximately collinear triplets from `cloud`.
///
/// Emission order is deterministic: midpoints in cloud order, candidates
/// per midpoint ascending by error with ties in kNN traversal order.
pub fn generate_triplets(cloud: &PointCloud, config: &TripletConfig) -> Vec<Triplet> {
    let index = SpatialIndex::build(cloud);
    let ordered = cloud.is_ordered();
    let mut triplets = Vec::new();

    for b in 0..cloud.len() {
        let point_b = &cloud[b];
        let neighbors = index.k_nearest(&point_b.coords(), config.neighbors);
        let mut candidates: Vec<Triplet> = Vec::new();

        for (pos_a, na) in neighbors.iter().enumerate() {
            // Zero distance is the midpoint itself or a duplicate of it.
            if na.squared_distance == 0.0 {
                continue;
            }
            let a = na.index;
            let point_a = &cloud[a];
            if ordered && point_a.index > point_b.index {
                continue;
            }

            let branch_ab = point_b - point_a;
            let dir_ab = &branch_ab / branch_ab.norm();

            for nc in &neighbors[pos_a + 1..] {
                if nc.squared_distance == 0.0 {
                    continue;
                }
                let c = nc.index;
                let point_c = &cloud[c];
                if ordered && point_b.index > point_c.index {
                    continue;
                }

                let branch_bc = point_c - point_b;
                let dir_bc = &branch_bc / branch_bc.norm();

                let error = 1.0 - dir_ab.dot(&dir_bc);
                if error <= config.max_error {
                    candidates.push(Triplet {
                        a,
                        b,
                        c,
                        center: (point_a + point_b + point_c) / 3.0,
                        direction: dir_bc,
                        error,
                    });
                }
            }
        }

        candidates.sort_by(|l, r| l.error.partial_cmp(&r.error).unwrap());
        triplets.extend(
            candidates
                .into_iter()
                .take(config.max_per_midpoint),
        );
    }
    triplets
}
