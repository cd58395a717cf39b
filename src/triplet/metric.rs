//! Scale-parameterised dissimilarity between triplets.

use crate::triplet::Triplet;

/// Two triplet directions are treated as orthogonal below this |cos θ|.
const ORTHOGONAL_COS_EPS: f64 = 1.0e-8;

/// Dissimilarity returned for orthogonal pairs; effectively forbids
/// joining perpendicular curve segments during clustering.
const SATURATION: f64 = 1.0e8;

/// Dissimilarity measure between two triplets.
///
/// Combines the larger of the two perpendicular residuals of the centers
/// against the opposite direction line, divided by the external scale, with
/// the |tan| of the angle between the directions. Symmetric and
/// non-negative; saturates at 1e8 for near-perpendicular directions.
#[derive(Clone, Copy, Debug)]
pub struct TripletMetric {
    /// External length scale dividing the positional residual term.
    /// Must be strictly positive.
    pub scale: f64,
}

impl TripletMetric {
    pub fn new(scale: f64) -> Self {
        debug_assert!(scale > 0.0);
        Self { scale }
    }

    /// Distance between `lhs` and `rhs`.
    pub fn distance(&self, lhs: &Triplet, rhs: &Triplet) -> f64 {
        let towards_rhs = &rhs.center - &lhs.center;
        let towards_lhs = &lhs.center - &rhs.center;

        let residual_lr =
            (&towards_rhs + &lhs.direction * towards_lhs.dot(&lhs.direction)).squared_norm();
        let residual_rl =
            (&towards_lhs + &rhs.direction * towards_rhs.dot(&rhs.direction)).squared_norm();

        let cos_angle = lhs.direction.dot(&rhs.direction).clamp(-1.0, 1.0);
        if cos_angle.abs() < ORTHOGONAL_COS_EPS {
            return SATURATION;
        }
        residual_lr.max(residual_rl).sqrt() / self.scale + cos_angle.acos().tan().abs()
    }
}
