//! Money Flow Index: a volume-weighted RSI.
//!
//! Raw money flow = typical price * volume. A bar's flow counts as positive
//! when its typical price rises over the previous bar, negative when it falls,
//! and is ignored when unchanged. Over each trailing window of n flows:
//! MFI = 100 - 100 / (1 + positive / negative); MFI = 100 when negative == 0.
//! Output length: len - n.

use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn mfi(bars: &[PriceBar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() <= period {
        return Vec::new();
    }

    let flows: Vec<(f64, f64)> = bars
        .windows(2)
        .map(|pair| {
            let prev_tp = pair[0].typical_price();
            let tp = pair[1].typical_price();
            let raw = tp * pair[1].volume;
            if tp > prev_tp {
                (raw, 0.0)
            } else if tp < prev_tp {
                (0.0, raw)
            } else {
                (0.0, 0.0)
            }
        })
        .collect();

    flows
        .windows(period)
        .map(|window| {
            let (positive, negative) = window
                .iter()
                .fold((0.0, 0.0), |(p, n), (fp, fn_)| (p + fp, n + fn_));
            if negative == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + positive / negative)
            }
        })
        .collect()
}
