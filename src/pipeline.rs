//! The four-stage extraction pipeline.
//!
//! ```text
//! raw points ──► smoothing ──► triplet generation ──► hierarchical
//! clustering ──► pruning ──► point projection ──► (gap splitting) ──►
//! cluster-id writeback
//! ```
//!
//! The pipeline is a pure batch function from a cloud plus resolved scalar
//! configuration to per-point cluster labels; the only mutation is the
//! final id writeback into the input cloud. Triplets are generated on the
//! smoothed cloud, but gap distances are measured on the raw input.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::cluster::{
    assign_cluster_ids, cluster_triplets, clusters_to_point_indices, prune_small_clusters,
    ClusterGroup, CutPolicy, Linkage,
};
use crate::core::PointCloud;
use crate::error::{Error, Result};
use crate::graph::split_at_gaps;
use crate::smoothing::Smoother;
use crate::triplet::{generate_triplets, TripletConfig};

/// Fully-resolved pipeline configuration.
///
/// All lengths are in input-coordinate units; callers that express radii
/// as multiples of the characteristic length resolve them before building
/// this (the CLI does exactly that for its `NdNN` option syntax).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Smoothing radius; 0 disables smoothing.
    pub smoothing_radius: f64,

    /// kNN size for triplet generation.
    pub neighbors: usize,

    /// Per-midpoint cap on emitted triplets.
    pub triplets_per_midpoint: usize,

    /// Angular tolerance (1 − cos of the branch angle), in [0, 2].
    pub max_error: f64,

    /// Length scale of the triplet metric. Strictly positive.
    pub scale: f64,

    /// Dendrogram cut rule.
    pub cut: CutPolicy,

    /// Linkage method for the agglomerative clustering.
    pub linkage: Linkage,

    /// Minimum cluster size, counted in triplets; the gap splitter keeps
    /// components of at least `min_triplets + 2` points.
    pub min_triplets: usize,

    /// Maximum spatial gap within a cluster; `None` disables splitting.
    pub max_gap: Option<f64>,

    /// Treat the input as a chronological sequence and only build
    /// triplets with monotone input indices.
    pub ordered: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        // The length-dependent defaults correspond to a characteristic
        // length of 1; see `with_characteristic_length`.
        Self {
            smoothing_radius: 2.0,
            neighbors: 19,
            triplets_per_midpoint: 2,
            max_error: 0.03,
            scale: 0.3,
            cut: CutPolicy::Automatic,
            linkage: Linkage::Single,
            min_triplets: 5,
            max_gap: None,
            ordered: false,
        }
    }
}

impl PipelineConfig {
    /// Defaults with the length-dependent options scaled by the
    /// characteristic length `dnn`: radius 2·dnn, metric scale 0.3·dnn.
    pub fn with_characteristic_length(dnn: f64) -> Self {
        Self {
            smoothing_radius: 2.0 * dnn,
            scale: 0.3 * dnn,
            ..Self::default()
        }
    }
}

/// Run the full pipeline on `cloud`, writing cluster ids into its points
/// and returning the final cluster group (point-index clusters, plus
/// overlap clusters when `extract_overlap` is set).
///
/// Points whose id set stays empty are noise; serialisation renders them
/// as label −1. Zero generated triplets is not an error: the result is an
/// empty group and an all-noise cloud.
pub fn run(
    cloud: &mut PointCloud,
    config: &PipelineConfig,
    extract_overlap: bool,
) -> Result<ClusterGroup> {
    if cloud.is_empty() {
        return Err(Error::EmptyCloud);
    }
    cloud.set_ordered(config.ordered);

    // Step 1: position smoothing.
    let smoothed = Smoother::new(config.smoothing_radius).apply(cloud);

    // Step 2: collinear triplet generation on the smoothed cloud.
    let triplet_config = TripletConfig {
        neighbors: config.neighbors,
        max_per_midpoint: config.triplets_per_midpoint,
        max_error: config.max_error,
    };
    let triplets = generate_triplets(&smoothed, &triplet_config);
    info!("generated {} triplets", triplets.len());

    // Step 3: hierarchical clustering of the triplets.
    let mut group = cluster_triplets(&triplets, config.scale, config.cut, config.linkage);
    debug!("clustering produced {} raw clusters", group.len());

    // Step 4: pruning, projection to points, optional gap splitting.
    prune_small_clusters(&mut group, config.min_triplets);
    clusters_to_point_indices(&triplets, &mut group);

    if let Some(max_gap) = config.max_gap {
        let mut split = ClusterGroup::new();
        for cluster in &group {
            split_at_gaps(&mut split, cluster, cloud, max_gap, config.min_triplets + 2);
        }
        group = split;
    }

    assign_cluster_ids(cloud, &mut group, extract_overlap);
    info!("final cluster count: {}", group.len());
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_smoothing_config() -> PipelineConfig {
        PipelineConfig {
            smoothing_radius: 0.0,
            scale: 1.0,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_empty_cloud_is_an_error() {
        let mut cloud = PointCloud::new();
        assert!(matches!(
            run(&mut cloud, &PipelineConfig::default(), false),
            Err(Error::EmptyCloud)
        ));
    }

    #[test]
    fn test_degenerate_three_point_line() {
        // Three collinear points: one triplet, one cluster of all three
        // point indices, gap splitting disabled.
        let mut cloud =
            PointCloud::from_coords(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (2.0, 0.0, 0.0)]);
        let config = PipelineConfig {
            neighbors: 3,
            min_triplets: 1,
            ..no_smoothing_config()
        };
        let group = run(&mut cloud, &config, false).unwrap();

        assert_eq!(group, vec![vec![0, 1, 2]]);
        for p in &cloud {
            assert_eq!(p.cluster_ids.len(), 1);
            assert!(p.cluster_ids.contains(&0));
        }
    }

    #[test]
    fn test_too_sparse_input_yields_noise_only() {
        // Two points cannot form a triplet.
        let mut cloud = PointCloud::from_coords(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0)]);
        let config = PipelineConfig {
            neighbors: 2,
            min_triplets: 1,
            ..no_smoothing_config()
        };
        let group = run(&mut cloud, &config, false).unwrap();

        assert!(group.is_empty());
        assert!(cloud.iter().all(|p| p.cluster_ids.is_empty()));
    }

    #[test]
    fn test_ordered_flag_reaches_the_cloud() {
        let mut cloud =
            PointCloud::from_coords(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (2.0, 0.0, 0.0)]);
        let config = PipelineConfig {
            neighbors: 3,
            min_triplets: 1,
            ordered: true,
            ..no_smoothing_config()
        };
        run(&mut cloud, &config, false).unwrap();
        assert!(cloud.is_ordered());
    }
}
