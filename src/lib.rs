//! tracklet - curve extraction from unordered point clouds
//!
//! Given a 2D or 3D point sample, tracklet labels points lying on the same
//! underlying curve with a shared cluster id, tags isolated points as
//! noise, and lets points at curve intersections carry several labels.
//!
//! # Architecture
//!
//! The crate is organized into 5 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     main                            │  ← CLI entry point
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                      io/                            │  ← CSV + gnuplot
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   pipeline                          │  ← Orchestration
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │     smoothing / triplet / cluster / graph           │  ← Core algorithms
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                 core/ + spatial/                    │  ← Foundation
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Pipeline stages
//!
//! 1. **Smoothing** — every point is replaced by the centroid of its
//!    radius neighborhood, damping curvature noise.
//! 2. **Triplet generation** — approximately collinear ordered point
//!    triples sample the local curve direction.
//! 3. **Hierarchical clustering** — triplets agglomerate under a
//!    scale-parameterised dissimilarity; the dendrogram is cut at a fixed
//!    or automatically detected height.
//! 4. **Projection and pruning** — triplet clusters map back to point
//!    clusters; small clusters are dropped, and clusters can be split at
//!    spatial gaps along their Euclidean minimum spanning tree.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tracklet::{pipeline, PipelineConfig, PointCloud};
//!
//! let mut cloud = PointCloud::from_coords(&points);
//! let config = PipelineConfig::with_characteristic_length(dnn);
//! let clusters = pipeline::run(&mut cloud, &config, false)?;
//! ```

// Layer 1: Foundation (no internal deps)
pub mod core;
pub mod error;

// Layer 2: Spatial queries (depends on core)
pub mod spatial;

// Layer 3: Algorithm stages (depend on core, spatial)
pub mod cluster;
pub mod graph;
pub mod smoothing;
pub mod triplet;

// Layer 4: Orchestration (depends on all algorithm stages)
pub mod pipeline;

// Layer 5: I/O (depends on core, cluster)
pub mod io;

// Convenience re-exports (flat namespace for common use)
pub use cluster::{Cluster, ClusterGroup, CutPolicy, Linkage};
pub use core::{Point, PointCloud};
pub use error::{Error, Result};
pub use pipeline::PipelineConfig;
pub use smoothing::Smoother;
pub use spatial::{characteristic_length, SpatialIndex};
pub use triplet::{Triplet, TripletConfig, TripletMetric};
