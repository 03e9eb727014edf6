//! Indicator-augmented price series.
//!
//! Each requested indicator is computed once over the whole history and its
//! compact output is right-aligned onto the bars: the last value belongs to
//! the last bar, and bars inside the warm-up window simply carry no entry.

use crate::domain::indicator::{
    IndicatorField, IndicatorRef, IndicatorSnapshot, IndicatorType, adx, atr, bollinger, cci,
    ema, macd, mfi, obv, rsi, sma, stochastic, williams_r,
};
use crate::domain::ohlcv::{PriceBar, closes};

/// A price bar together with the indicator values computable at that bar.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedBar {
    pub bar: PriceBar,
    pub indicators: IndicatorSnapshot,
}

impl AnalyzedBar {
    pub fn close(&self) -> f64 {
        self.bar.close
    }

    pub fn get(&self, key: IndicatorRef) -> Option<f64> {
        self.indicators.get(key)
    }

    pub fn value(&self, indicator_type: IndicatorType) -> Option<f64> {
        self.indicators.value(indicator_type)
    }
}

/// Computes every output series of `indicator_type` over `bars`.
pub fn compute_series(
    bars: &[PriceBar],
    indicator_type: IndicatorType,
) -> Vec<(IndicatorField, Vec<f64>)> {
    let prices = || closes(bars);

    match indicator_type {
        IndicatorType::Sma(period) => vec![(IndicatorField::Value, sma(&prices(), period))],
        IndicatorType::Ema(period) => vec![(IndicatorField::Value, ema(&prices(), period))],
        IndicatorType::Rsi(period) => vec![(IndicatorField::Value, rsi(&prices(), period))],
        IndicatorType::Macd { fast, slow, signal } => {
            let series = macd(&prices(), fast, slow, signal);
            vec![
                (IndicatorField::MacdLine, series.line),
                (IndicatorField::MacdSignal, series.signal),
                (IndicatorField::MacdHistogram, series.histogram),
            ]
        }
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => {
            let series = bollinger(&prices(), period, stddev_mult_x100 as f64 / 100.0);
            vec![
                (IndicatorField::BollingerUpper, series.upper),
                (IndicatorField::BollingerMiddle, series.middle),
                (IndicatorField::BollingerLower, series.lower),
            ]
        }
        IndicatorType::Stochastic { k_period, d_period } => {
            let series = stochastic(bars, k_period, d_period);
            vec![
                (IndicatorField::StochasticK, series.k),
                (IndicatorField::StochasticD, series.d),
            ]
        }
        IndicatorType::WilliamsR(period) => {
            vec![(IndicatorField::Value, williams_r(bars, period))]
        }
        IndicatorType::Atr(period) => vec![(IndicatorField::Value, atr(bars, period))],
        IndicatorType::Adx(period) => {
            let series = adx(bars, period);
            vec![
                (IndicatorField::Value, series.adx),
                (IndicatorField::PlusDi, series.plus_di),
                (IndicatorField::MinusDi, series.minus_di),
            ]
        }
        IndicatorType::Cci(period) => vec![(IndicatorField::Value, cci(bars, period))],
        IndicatorType::Mfi(period) => vec![(IndicatorField::Value, mfi(bars, period))],
        IndicatorType::Obv => vec![(IndicatorField::Value, obv(bars))],
    }
}

/// Builds the indicator-augmented series for `bars`. The input is not modified.
pub fn augment(bars: &[PriceBar], indicator_types: &[IndicatorType]) -> Vec<AnalyzedBar> {
    let mut analyzed: Vec<AnalyzedBar> = bars
        .iter()
        .map(|bar| AnalyzedBar {
            bar: bar.clone(),
            indicators: IndicatorSnapshot::new(),
        })
        .collect();

    for &indicator_type in indicator_types {
        for (field, series) in compute_series(bars, indicator_type) {
            let offset = bars.len() - series.len();
            let key = IndicatorRef::new(indicator_type, field);
            for (j, value) in series.into_iter().enumerate() {
                analyzed[offset + j].indicators.insert(key, value);
            }
        }
    }

    analyzed
}

/// Indicator values at the most recent bar.
pub fn latest_snapshot(bars: &[PriceBar], indicator_types: &[IndicatorType]) -> IndicatorSnapshot {
    let mut snapshot = IndicatorSnapshot::new();
    for &indicator_type in indicator_types {
        for (field, series) in compute_series(bars, indicator_type) {
            if let Some(&value) = series.last() {
                snapshot.insert(IndicatorRef::new(indicator_type, field), value);
            }
        }
    }
    snapshot
}
