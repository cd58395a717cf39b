//! Position smoothing by neighborhood averaging.
//!
//! Every point is replaced by the centroid of all cloud points within a
//! radius of it. The smoothed cloud has the same size and order as the
//! input, so indices stay valid for the downstream triplet and cluster
//! stages; averaging damps local curvature noise before collinearity is
//! measured.

use crate::core::{Point, PointCloud};
use crate::spatial::SpatialIndex;

/// Neighborhood-centroid smoother.
///
/// A radius of 0 disables smoothing and returns a copy of the input.
#[derive(Clone, Copy, Debug)]
pub struct Smoother {
    /// Averaging radius in input-coordinate units.
    pub radius: f64,
}

impl Smoother {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    /// Smooth `cloud`, preserving length, order, per-point `index`, and
    /// the `is2d`/`ordered` flags.
    ///
    /// The query point itself always lies within its own radius, so the
    /// neighbor set is never empty.
    pub fn apply(&self, cloud: &PointCloud) -> PointCloud {
        if self.radius == 0.0 {
            return cloud.clone();
        }

        let index = SpatialIndex::build(cloud);
        let mut result = PointCloud::new();
        result.set_2d(cloud.is2d());
        result.set_ordered(cloud.is_ordered());

        for point in cloud {
            let neighbors = index.radius(&point.coords(), self.radius);
            let count = neighbors.len() as f64;

            let mut centroid = Point::new(0.0, 0.0, 0.0);
            for n in &neighbors {
                centroid = &centroid + &cloud[n.index];
            }
            centroid = centroid / count;
            centroid.index = point.index;
            result.push(centroid);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line_cloud() -> PointCloud {
        PointCloud::from_coords(&[
            (0.0, 0.0, 0.0),
            (1.0, 0.2, 0.0),
            (2.0, -0.2, 0.0),
            (3.0, 0.0, 0.0),
        ])
    }

    #[test]
    fn test_zero_radius_is_identity() {
        let mut cloud = line_cloud();
        cloud.set_ordered(true);
        let smoothed = Smoother::new(0.0).apply(&cloud);

        assert_eq!(smoothed.len(), cloud.len());
        assert!(smoothed.is_ordered());
        for (a, b) in cloud.iter().zip(smoothed.iter()) {
            assert_eq!(a, b);
            assert_eq!(a.index, b.index);
        }
    }

    #[test]
    fn test_centroid_of_radius_neighbors() {
        let cloud = PointCloud::from_coords(&[
            (0.0, 0.0, 0.0),
            (1.0, 0.0, 0.0),
            (2.0, 0.0, 0.0),
        ]);
        let smoothed = Smoother::new(1.0).apply(&cloud);

        // Point 0 averages {0, 1}, point 1 averages {0, 1, 2}.
        assert_relative_eq!(smoothed[0].x, 0.5);
        assert_relative_eq!(smoothed[1].x, 1.0);
        assert_relative_eq!(smoothed[2].x, 1.5);
    }

    #[test]
    fn test_size_order_and_indices_preserved() {
        let mut cloud = line_cloud();
        cloud.set_ordered(true);
        let smoothed = Smoother::new(1.5).apply(&cloud);

        assert_eq!(smoothed.len(), cloud.len());
        assert!(smoothed.is2d());
        assert!(smoothed.is_ordered());
        for (i, p) in smoothed.iter().enumerate() {
            assert_eq!(p.index, i);
        }
    }

    #[test]
    fn test_isolated_point_maps_to_itself() {
        let cloud = PointCloud::from_coords(&[(0.0, 0.0, 0.0), (100.0, 0.0, 0.0)]);
        let smoothed = Smoother::new(1.0).apply(&cloud);
        assert_relative_eq!(smoothed[1].x, 100.0);
        assert_relative_eq!(smoothed[1].y, 0.0);
    }
}
