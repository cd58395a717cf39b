//! Statistical helpers for the dendrogram cut heuristic.

/// Arithmetic mean of `values`.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation of `values` (m − 1 divisor).
///
/// A single sample yields NaN (0/0); the automatic dendrogram cut relies on
/// this to reject a break at the very first merge, where no spread exists.
pub fn sample_std(values: &[f64]) -> f64 {
    let m = values.len() as f64;
    let mean_val = mean(values);
    let sum: f64 = values.iter().map(|v| (mean_val - v) * (mean_val - v)).sum();
    ((1.0 / (m - 1.0)) * sum).sqrt()
}
