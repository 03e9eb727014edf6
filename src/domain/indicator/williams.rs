//! Williams %R oscillator.
//!
//! %R = -100 * (highest_high(n) - close) / (highest_high(n) - lowest_low(n)),
//! ranging over [-100, 0]. A flat window yields -50.
//! Output length: len - n + 1.

use crate::domain::indicator::stochastic::low_high;
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn williams_r(bars: &[PriceBar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period {
        return Vec::new();
    }

    bars.windows(period)
        .map(|window| {
            let (lowest, highest) = low_high(window);
            let close = window[window.len() - 1].close;
            let range = highest - lowest;
            if range == 0.0 {
                -50.0
            } else {
                -100.0 * (highest - close) / range
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(day: u32, high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn williams_close_at_high_is_zero() {
        let bars = vec![make_bar(1, 10.0, 5.0, 7.0), make_bar(2, 12.0, 6.0, 12.0)];
        let series = williams_r(&bars, 2);
        assert_eq!(series.len(), 1);
        assert!(series[0].abs() < f64::EPSILON);
    }

    #[test]
    fn williams_close_at_low_is_minus_100() {
        let bars = vec![make_bar(1, 10.0, 5.0, 7.0), make_bar(2, 12.0, 6.0, 5.0)];
        let series = williams_r(&bars, 2);
        assert!((series[0] + 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn williams_flat_window() {
        let bars = vec![make_bar(1, 10.0, 10.0, 10.0), make_bar(2, 10.0, 10.0, 10.0)];
        assert_eq!(williams_r(&bars, 2), vec![-50.0]);
    }

    #[test]
    fn williams_range_bounds() {
        let bars: Vec<PriceBar> = (1..=25)
            .map(|d| {
                let mid = 100.0 + ((d * 5) % 9) as f64;
                make_bar(d, mid + 2.0, mid - 2.0, mid)
            })
            .collect();
        for v in williams_r(&bars, DEFAULT_PERIOD) {
            assert!((-100.0..=0.0).contains(&v));
        }
    }

    #[test]
    fn williams_insufficient_data() {
        let bars = vec![make_bar(1, 10.0, 5.0, 7.0)];
        assert!(williams_r(&bars, 2).is_empty());
    }
}
