//! Average Directional Index with +DI / -DI.
//!
//! For each bar after the first:
//! - up = high - prev_high, down = prev_low - low
//! - +DM = up if up > down and up > 0, else 0
//! - -DM = down if down > up and down > 0, else 0
//! - TR = true range against the previous close
//!
//! TR, +DM and -DM are Wilder-smoothed over n; +DI = 100 * +DM_s / TR_s,
//! -DI = 100 * -DM_s / TR_s; DX = 100 * |+DI - -DI| / (+DI + -DI);
//! ADX = Wilder smoothing of DX over n.
//!
//! Lengths: DI series = len - n, ADX = len - 2n + 1.

use crate::domain::indicator::atr::wilder_smooth;
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdxSeries {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

pub fn adx(bars: &[PriceBar], period: usize) -> AdxSeries {
    if period == 0 || bars.len() <= period {
        return AdxSeries::default();
    }

    let moves = bars.len() - 1;
    let mut true_ranges = Vec::with_capacity(moves);
    let mut plus_dm = Vec::with_capacity(moves);
    let mut minus_dm = Vec::with_capacity(moves);

    for pair in bars.windows(2) {
        let (prev, bar) = (&pair[0], &pair[1]);
        let up = bar.high - prev.high;
        let down = prev.low - bar.low;

        true_ranges.push(bar.true_range(prev.close));
        plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
    }

    let smoothed_tr = wilder_smooth(&true_ranges, period);
    let smoothed_plus = wilder_smooth(&plus_dm, period);
    let smoothed_minus = wilder_smooth(&minus_dm, period);

    let mut plus_di = Vec::with_capacity(smoothed_tr.len());
    let mut minus_di = Vec::with_capacity(smoothed_tr.len());
    let mut dx = Vec::with_capacity(smoothed_tr.len());

    for ((tr, plus), minus) in smoothed_tr.iter().zip(&smoothed_plus).zip(&smoothed_minus) {
        let (pdi, mdi) = if *tr > 0.0 {
            (100.0 * plus / tr, 100.0 * minus / tr)
        } else {
            (0.0, 0.0)
        };
        let di_sum = pdi + mdi;
        dx.push(if di_sum > 0.0 {
            100.0 * (pdi - mdi).abs() / di_sum
        } else {
            0.0
        });
        plus_di.push(pdi);
        minus_di.push(mdi);
    }

    AdxSeries {
        adx: wilder_smooth(&dx, period),
        plus_di,
        minus_di,
    }
}
