//! Bollinger Bands indicator.
//!
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Default parameters: period=20, multiplier=2.0. Output length: len - n + 1.

use crate::domain::indicator::stddev::mean_and_stddev;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn bollinger(prices: &[f64], period: usize, multiplier: f64) -> BollingerSeries {
    if period == 0 || prices.len() < period {
        return BollingerSeries::default();
    }

    let count = prices.len() - period + 1;
    let mut bands = BollingerSeries {
        upper: Vec::with_capacity(count),
        middle: Vec::with_capacity(count),
        lower: Vec::with_capacity(count),
    };

    for window in prices.windows(period) {
        let (middle, stddev) = mean_and_stddev(window);
        bands.upper.push(middle + multiplier * stddev);
        bands.middle.push(middle);
        bands.lower.push(middle - multiplier * stddev);
    }

    bands
}
