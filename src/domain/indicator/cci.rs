//! Commodity Channel Index.
//!
//! TP = (high + low + close) / 3
//! CCI = (TP - SMA(TP, n)) / (0.015 * mean_abs_deviation(TP, n))
//! A zero mean deviation yields 0. Output length: len - n + 1.

use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_PERIOD: usize = 20;
const LAMBERT_CONSTANT: f64 = 0.015;

pub fn cci(bars: &[PriceBar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period {
        return Vec::new();
    }

    let typical: Vec<f64> = bars.iter().map(PriceBar::typical_price).collect();

    typical
        .windows(period)
        .map(|window| {
            let n = period as f64;
            let mean = window.iter().sum::<f64>() / n;
            let mean_deviation = window.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / n;
            if mean_deviation == 0.0 {
                0.0
            } else {
                (window[window.len() - 1] - mean) / (LAMBERT_CONSTANT * mean_deviation)
            }
        })
        .collect()
}
