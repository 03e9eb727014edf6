//! Population standard deviation helpers.
//!
//! STDDEV(n)[j] = sqrt(sum((P[i] - mean)^2 for i in window) / n), dividing by
//! N rather than N-1.

/// Mean and population standard deviation of `window`.
///
/// Returns `(0.0, 0.0)` for an empty window.
pub fn mean_and_stddev(window: &[f64]) -> (f64, f64) {
    if window.is_empty() {
        return (0.0, 0.0);
    }

    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    (mean, variance.sqrt())
}
