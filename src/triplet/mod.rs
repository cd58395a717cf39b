//! Oriented curve-segment samples built from near-collinear point triples.

pub mod generator;
pub mod metric;

pub use generator::{generate_triplets, TripletConfig};
pub use metric::TripletMetric;

use serde::{Deserialize, Serialize};

use crate::core::Point;

/// An ordered triple (a, b, c) of cloud indices with b as midpoint.
///
/// `direction` is the unit vector from b to c; `error` is 1 − cos of the
/// angle between the branches b−a and c−b and lies in [0, 2]. Emitted
/// triplets always satisfy `error <= alpha` for the generator's tolerance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Triplet {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    /// Arithmetic mean of the three member points.
    pub center: Point,
    /// Unit vector c − b, normalised.
    pub direction: Point,
    /// Collinearity error, 1 − û_ab · û_bc.
    pub error: f64,
}
