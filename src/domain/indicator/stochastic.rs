//! Stochastic oscillator (%K / %D).
//!
//! %K = 100 * (close - lowest_low(n)) / (highest_high(n) - lowest_low(n))
//! %D = SMA(%K, d)
//!
//! A flat window (highest high == lowest low) yields %K = 50.
//! Lengths: %K = len - n + 1, %D = %K - d + 1.

use crate::domain::indicator::sma;
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StochasticSeries {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn stochastic(bars: &[PriceBar], k_period: usize, d_period: usize) -> StochasticSeries {
    if k_period == 0 || d_period == 0 || bars.len() < k_period {
        return StochasticSeries::default();
    }

    let k: Vec<f64> = bars
        .windows(k_period)
        .map(|window| {
            let (lowest, highest) = low_high(window);
            let close = window[window.len() - 1].close;
            let range = highest - lowest;
            if range == 0.0 {
                50.0
            } else {
                100.0 * (close - lowest) / range
            }
        })
        .collect();
    let d = sma(&k, d_period);

    StochasticSeries { k, d }
}

/// Lowest low and highest high across `window`.
pub(crate) fn low_high(window: &[PriceBar]) -> (f64, f64) {
    window
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), bar| {
            (lo.min(bar.low), hi.max(bar.high))
        })
}
