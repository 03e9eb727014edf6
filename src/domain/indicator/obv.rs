//! OBV (On-Balance Volume) indicator.

use crate::domain::ohlcv::PriceBar;

/// OBV[0] = volume[0]
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// No warm-up; output length equals input length.
pub fn obv(bars: &[PriceBar]) -> Vec<f64> {
    let mut values = Vec::with_capacity(bars.len());
    let mut total = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            total = bar.volume;
        } else {
            let prev_close = bars[i - 1].close;
            if bar.close > prev_close {
                total += bar.volume;
            } else if bar.close < prev_close {
                total -= bar.volume;
            }
        }
        values.push(total);
    }

    values
}
