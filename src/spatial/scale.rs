//! Characteristic length of a point distribution.
//!
//! For every point the squared distance to its single nearest other point
//! is computed; the lower quartile of these values (by selection, not a
//! full sort) is the squared characteristic length. Downstream radii are
//! typically expressed as multiples of its square root.

use log::debug;

use crate::core::PointCloud;
use crate::error::{Error, Result};
use crate::spatial::SpatialIndex;

/// Mean squared distance of every point to its `k` nearest other points.
///
/// The query result's leading zero-distance entry (the point itself) is
/// dropped before averaging.
pub fn mean_squared_distances(cloud: &PointCloud, k: usize) -> Vec<f64> {
    let index = SpatialIndex::build(cloud);
    let mut msd = Vec::with_capacity(cloud.len());

    for point in cloud {
        // k + 1 because the nearest result is the point itself.
        let neighbors = index.k_nearest(&point.coords(), k + 1);
        let others = &neighbors[1..];
        let sum: f64 = others.iter().map(|n| n.squared_distance).sum();
        msd.push(sum / others.len() as f64);
    }
    msd
}

/// Lower quartile of the per-point mean squared nearest-neighbor distance.
pub fn first_quartile(cloud: &PointCloud) -> f64 {
    let mut msd = mean_squared_distances(cloud, 1);
    let q1 = msd.len() / 4;
    let (_, value, _) = msd.select_nth_unstable_by(q1, |a, b| a.partial_cmp(b).unwrap());
    *value
}

/// Characteristic length: square root of the lower-quartile mean squared
/// nearest-neighbor distance.
///
/// A zero value means the input contains duplicate points and is reported
/// as [`Error::DegenerateSpacing`].
pub fn characteristic_length(cloud: &PointCloud) -> Result<f64> {
    let dnn = first_quartile(cloud).sqrt();
    debug!("computed characteristic length: {dnn}");
    if dnn == 0.0 {
        return Err(Error::DegenerateSpacing);
    }
    Ok(dnn)
}
