//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow), aligned on the (slow - fast) offset
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line, aligned on the signal warm-up offset
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Lengths: line = len - slow + 1, signal = histogram = line - signal + 1.

use crate::domain::indicator::ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(prices: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdSeries {
    if fast == 0 || slow == 0 || signal_period == 0 || fast > slow {
        return MacdSeries::default();
    }

    let ema_fast = ema(prices, fast);
    let ema_slow = ema(prices, slow);
    if ema_slow.is_empty() {
        return MacdSeries::default();
    }

    let offset = slow - fast;
    let line: Vec<f64> = ema_slow
        .iter()
        .enumerate()
        .map(|(j, slow_value)| ema_fast[j + offset] - slow_value)
        .collect();

    let signal = ema(&line, signal_period);
    let signal_offset = signal_period - 1;
    let histogram = signal
        .iter()
        .enumerate()
        .map(|(j, signal_value)| line[j + signal_offset] - signal_value)
        .collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}

pub fn macd_default(prices: &[f64]) -> MacdSeries {
    macd(prices, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
