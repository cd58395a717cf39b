//! Spatial queries and derived length scales.

pub mod index;
pub mod scale;

pub use index::{Neighbor, SpatialIndex};
pub use scale::{characteristic_length, first_quartile};
