//! File ingest and result emission.

pub mod csv;
pub mod gnuplot;

pub use csv::{load_csv, write_cloud_csv, write_clusters_csv};
pub use gnuplot::{write_clusters_gnuplot, write_smoothing_gnuplot};
