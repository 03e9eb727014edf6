//! Average True Range indicator, plus the shared Wilder smoothing helper.
//!
//! TR[0] = high - low; TR[i] = max(high - low, |high - prev_close|, |low - prev_close|)
//! ATR seed = mean of the first n TRs, then ATR[i] = (ATR[i-1] * (n-1) + TR[i]) / n.
//! Output length: len - n + 1.

use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn atr(bars: &[PriceBar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period {
        return Vec::new();
    }

    let true_ranges: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();

    wilder_smooth(&true_ranges, period)
}

/// Wilder smoothing: seed with the mean of the first `period` values, then
/// avg = (prev * (period - 1) + value) / period.
pub(crate) fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let mut smoothed = Vec::with_capacity(values.len() - period + 1);
    let mut current = values[..period].iter().sum::<f64>() / period as f64;
    smoothed.push(current);

    for &value in &values[period..] {
        current = (current * (period - 1) as f64 + value) / period as f64;
        smoothed.push(current);
    }

    smoothed
}
