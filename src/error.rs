//! Error types for tracklet.
//!
//! Input-shape problems (malformed CSV rows, mixed 2D/3D data, duplicate
//! points collapsing the characteristic length to zero) are user errors and
//! surface as `Error` variants. Algorithmic no-ops (zero triplets, a single
//! triplet, zero smoothing radius) are not errors and produce empty or
//! trivial results instead. Internal invariant violations are programming
//! errors guarded by debug assertions, never `Error` variants.

use thiserror::Error;

/// Errors that can occur during ingest or pipeline setup.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("row {row}: too few columns")]
    TooFewColumns { row: usize },

    #[error("row {row} column {column}: invalid number '{value}'")]
    InvalidNumber {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("mixed 2d and 3d points")]
    MixedDimensions,

    #[error("empty point cloud (maybe the wrong delimiter was used)")]
    EmptyCloud,

    #[error("characteristic length is zero; remove duplicate points, e.g. with 'sort -u'")]
    DegenerateSpacing,

    #[error("invalid option value for {option}: '{value}'")]
    InvalidOption { option: String, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
