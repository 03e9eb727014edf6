//! Simple Moving Average indicator.
//!
//! SMA[j] = mean(prices[j..j+n]).
//! Output length: len - n + 1 (empty when len < n).

pub fn sma(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    prices
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / period as f64)
        .collect()
}
