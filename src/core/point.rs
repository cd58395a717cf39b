//! 3D points and clouds thereof.
//!
//! A [`Point`] is a plain f64 3-vector plus two bookkeeping fields: the
//! immutable `index` it had in the input sequence (used for tie-breaking and
//! for chronological filtering of triplets) and the set of cluster ids it is
//! assigned during finalisation. 2D data is represented with z = 0.

use std::collections::BTreeSet;
use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A single point of the input sample.
///
/// Equality is exact and componentwise on the coordinates only; `index` and
/// `cluster_ids` do not participate.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,

    /// Position of this point in the original input sequence.
    ///
    /// Preserved verbatim through smoothing so that chronological-order
    /// filtering in the triplet stage works on smoothed clouds.
    pub index: usize,

    /// Ids of the clusters this point belongs to, written once during
    /// finalisation. An ordered set keeps overlap-key comparison
    /// deterministic.
    pub cluster_ids: BTreeSet<usize>,
}

impl Point {
    /// Create a point with coordinates only (index 0, no cluster ids).
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Self::default()
        }
    }

    /// Create a point with coordinates and its input-sequence index.
    pub fn with_index(x: f64, y: f64, z: f64, index: usize) -> Self {
        Self {
            x,
            y,
            z,
            index,
            ..Self::default()
        }
    }

    /// Coordinates as a fixed-size array, for kd-tree queries.
    #[inline]
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.squared_norm().sqrt()
    }

    /// Squared Euclidean norm.
    #[inline]
    pub fn squared_norm(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }
}

// Arithmetic is provided for both owned points and references; cluster ids
// and indices never propagate through arithmetic results.

impl Add<&Point> for &Point {
    type Output = Point;

    #[inline]
    fn add(self, p: &Point) -> Point {
        Point::new(self.x + p.x, self.y + p.y, self.z + p.z)
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, p: Point) -> Point {
        &self + &p
    }
}

impl Add<&Point> for Point {
    type Output = Point;

    #[inline]
    fn add(self, p: &Point) -> Point {
        &self + p
    }
}

impl Add<Point> for &Point {
    type Output = Point;

    #[inline]
    fn add(self, p: Point) -> Point {
        self + &p
    }
}

impl Sub<&Point> for &Point {
    type Output = Point;

    #[inline]
    fn sub(self, p: &Point) -> Point {
        Point::new(self.x - p.x, self.y - p.y, self.z - p.z)
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, p: Point) -> Point {
        &self - &p
    }
}

impl Mul<f64> for &Point {
    type Output = Point;

    #[inline]
    fn mul(self, c: f64) -> Point {
        Point::new(self.x * c, self.y * c, self.z * c)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, c: f64) -> Point {
        &self * c
    }
}

impl Mul<&Point> for f64 {
    type Output = Point;

    #[inline]
    fn mul(self, p: &Point) -> Point {
        p * self
    }
}

impl Div<f64> for &Point {
    type Output = Point;

    #[inline]
    fn div(self, c: f64) -> Point {
        Point::new(self.x / c, self.y / c, self.z / c)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    #[inline]
    fn div(self, c: f64) -> Point {
        &self / c
    }
}

/// An ordered sequence of points with two structural flags.
///
/// Built once at ingest and read-only afterwards, except for the final
/// cluster-id writeback into the member points.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PointCloud {
    points: Vec<Point>,
    /// All z coordinates are zero by construction.
    is2d: bool,
    /// The input is a chronological/parametric sequence; enables the
    /// index-ordered triplet filter.
    ordered: bool,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cloud from raw coordinates, assigning indices in order.
    /// Intended for tests and programmatic construction; `is2d` is derived
    /// from the z values.
    pub fn from_coords(coords: &[(f64, f64, f64)]) -> Self {
        let points: Vec<Point> = coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| Point::with_index(x, y, z, i))
            .collect();
        let is2d = points.iter().all(|p| p.z == 0.0);
        Self {
            points,
            is2d,
            ordered: false,
        }
    }

    /// Append a point as-is (the caller manages `index`).
    #[inline]
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }

    #[inline]
    pub fn is2d(&self) -> bool {
        self.is2d
    }

    #[inline]
    pub fn set_2d(&mut self, is2d: bool) {
        self.is2d = is2d;
    }

    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    #[inline]
    pub fn set_ordered(&mut self, ordered: bool) {
        self.ordered = ordered;
    }
}

impl std::ops::Index<usize> for PointCloud {
    type Output = Point;

    #[inline]
    fn index(&self, i: usize) -> &Point {
        &self.points[i]
    }
}

impl std::ops::IndexMut<usize> for PointCloud {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut Point {
        &mut self.points[i]
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vector_algebra() {
        let a = Point::new(1.0, 2.0, 3.0);
        let b = Point::new(4.0, -2.0, 0.5);

        assert_eq!(&a + &b, Point::new(5.0, 0.0, 3.5));
        assert_eq!(&a - &b, Point::new(-3.0, 4.0, 2.5));
        assert_relative_eq!(a.dot(&b), 1.0 * 4.0 + 2.0 * (-2.0) + 3.0 * 0.5);
        assert_eq!(&a * 2.0, Point::new(2.0, 4.0, 6.0));
        assert_eq!(2.0 * &a, Point::new(2.0, 4.0, 6.0));
        assert_eq!(&b / 2.0, Point::new(2.0, -1.0, 0.25));
    }

    #[test]
    fn test_norms() {
        let p = Point::new(3.0, 4.0, 0.0);
        assert_relative_eq!(p.squared_norm(), 25.0);
        assert_relative_eq!(p.norm(), 5.0);
    }

    #[test]
    fn test_equality_ignores_bookkeeping() {
        let mut a = Point::with_index(1.0, 2.0, 3.0, 7);
        let b = Point::with_index(1.0, 2.0, 3.0, 42);
        a.cluster_ids.insert(3);
        assert_eq!(a, b);

        let c = Point::new(1.0, 2.0, 3.0 + 1e-15);
        assert_ne!(a, c);
    }

    #[test]
    fn test_from_coords_assigns_indices() {
        let cloud = PointCloud::from_coords(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0)]);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud[0].index, 0);
        assert_eq!(cloud[1].index, 1);
        assert!(cloud.is2d());
        assert!(!cloud.is_ordered());
    }

    #[test]
    fn test_from_coords_detects_3d() {
        let cloud = PointCloud::from_coords(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.5)]);
        assert!(!cloud.is2d());
    }
}
