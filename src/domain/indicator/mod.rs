//! Technical indicator implementations.
//!
//! Every indicator is a pure transform from price/volume arrays to a compact
//! output array. An indicator whose window needs `w` leading bars returns
//! `len - w + 1` values (empty when the input is shorter than `w`); the last
//! value always belongs to the last input bar.
//!
//! This module also provides the identity types used to look values up:
//! - `IndicatorType`: indicator kind + parameters (serves as HashMap key)
//! - `IndicatorField`: which output of a multi-value indicator
//! - `IndicatorRef`: an `(IndicatorType, IndicatorField)` pair
//! - `IndicatorSnapshot`: sparse map of `IndicatorRef` to value for one bar

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod ema;
pub mod frame;
pub mod macd;
pub mod mfi;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod williams;

pub use adx::{AdxSeries, adx};
pub use atr::atr;
pub use bollinger::{BollingerSeries, bollinger};
pub use cci::cci;
pub use ema::ema;
pub use frame::{AnalyzedBar, augment, latest_snapshot};
pub use macd::{MacdSeries, macd};
pub use mfi::mfi;
pub use obv::obv;
pub use rsi::rsi;
pub use sma::sma;
pub use stochastic::{StochasticSeries, stochastic};
pub use williams::williams_r;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
    },
    WilliamsR(usize),
    Atr(usize),
    Adx(usize),
    Cci(usize),
    Mfi(usize),
    Obv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorField {
    Value,
    MacdLine,
    MacdSignal,
    MacdHistogram,
    BollingerUpper,
    BollingerMiddle,
    BollingerLower,
    StochasticK,
    StochasticD,
    PlusDi,
    MinusDi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndicatorRef {
    pub indicator_type: IndicatorType,
    pub field: IndicatorField,
}

impl IndicatorRef {
    pub const fn new(indicator_type: IndicatorType, field: IndicatorField) -> Self {
        Self {
            indicator_type,
            field,
        }
    }

    /// Reference to the single-valued output of `indicator_type`.
    pub const fn value(indicator_type: IndicatorType) -> Self {
        Self::new(indicator_type, IndicatorField::Value)
    }
}

impl IndicatorType {
    /// The outputs this indicator produces, in the order its series are computed.
    pub fn fields(&self) -> &'static [IndicatorField] {
        match self {
            IndicatorType::Macd { .. } => &[
                IndicatorField::MacdLine,
                IndicatorField::MacdSignal,
                IndicatorField::MacdHistogram,
            ],
            IndicatorType::Bollinger { .. } => &[
                IndicatorField::BollingerUpper,
                IndicatorField::BollingerMiddle,
                IndicatorField::BollingerLower,
            ],
            IndicatorType::Stochastic { .. } => {
                &[IndicatorField::StochasticK, IndicatorField::StochasticD]
            }
            IndicatorType::Adx(_) => &[
                IndicatorField::Value,
                IndicatorField::PlusDi,
                IndicatorField::MinusDi,
            ],
            _ => &[IndicatorField::Value],
        }
    }

    /// Default indicator set used for snapshots fed to the technical scorer.
    pub fn standard_set() -> Vec<IndicatorType> {
        vec![
            standard::SMA_SHORT,
            standard::SMA_MEDIUM,
            standard::SMA_LONG,
            IndicatorType::Ema(12),
            IndicatorType::Ema(26),
            standard::RSI,
            standard::MACD,
            standard::BOLLINGER,
            standard::STOCHASTIC,
            standard::WILLIAMS_R,
            standard::ATR,
            standard::CCI,
            standard::MFI,
            standard::ADX,
            IndicatorType::Obv,
        ]
    }
}

/// Parameterisations of the standard snapshot indicators.
pub mod standard {
    use super::IndicatorType;

    pub const SMA_SHORT: IndicatorType = IndicatorType::Sma(20);
    pub const SMA_MEDIUM: IndicatorType = IndicatorType::Sma(50);
    pub const SMA_LONG: IndicatorType = IndicatorType::Sma(200);
    pub const RSI: IndicatorType = IndicatorType::Rsi(14);
    pub const MACD: IndicatorType = IndicatorType::Macd {
        fast: 12,
        slow: 26,
        signal: 9,
    };
    pub const BOLLINGER: IndicatorType = IndicatorType::Bollinger {
        period: 20,
        stddev_mult_x100: 200,
    };
    pub const STOCHASTIC: IndicatorType = IndicatorType::Stochastic {
        k_period: 14,
        d_period: 3,
    };
    pub const WILLIAMS_R: IndicatorType = IndicatorType::WilliamsR(14);
    pub const ATR: IndicatorType = IndicatorType::Atr(14);
    pub const CCI: IndicatorType = IndicatorType::Cci(20);
    pub const MFI: IndicatorType = IndicatorType::Mfi(14);
    pub const ADX: IndicatorType = IndicatorType::Adx(14);
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::Stochastic { k_period, d_period } => {
                write!(f, "STOCHASTIC({},{})", k_period, d_period)
            }
            IndicatorType::WilliamsR(period) => write!(f, "WILLIAMS_R({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::Cci(period) => write!(f, "CCI({})", period),
            IndicatorType::Mfi(period) => write!(f, "MFI({})", period),
            IndicatorType::Obv => write!(f, "OBV"),
        }
    }
}

impl fmt::Display for IndicatorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorField::Value => "value",
            IndicatorField::MacdLine => "line",
            IndicatorField::MacdSignal => "signal",
            IndicatorField::MacdHistogram => "histogram",
            IndicatorField::BollingerUpper => "upper",
            IndicatorField::BollingerMiddle => "middle",
            IndicatorField::BollingerLower => "lower",
            IndicatorField::StochasticK => "k",
            IndicatorField::StochasticD => "d",
            IndicatorField::PlusDi => "plus_di",
            IndicatorField::MinusDi => "minus_di",
        };
        f.write_str(name)
    }
}

impl fmt::Display for IndicatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            IndicatorField::Value => write!(f, "{}", self.indicator_type),
            field => write!(f, "{}.{}", self.indicator_type, field),
        }
    }
}

/// Indicator values available at a single bar.
///
/// Absence of a key means "not yet computable" (insufficient warm-up), never zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSnapshot {
    values: HashMap<IndicatorRef, f64>,
}

impl IndicatorSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`; non-finite values are treated as not computable.
    pub fn insert(&mut self, key: IndicatorRef, value: f64) {
        if value.is_finite() {
            self.values.insert(key, value);
        }
    }

    pub fn get(&self, key: IndicatorRef) -> Option<f64> {
        self.values.get(&key).copied()
    }

    /// Shorthand for the single-valued output of `indicator_type`.
    pub fn value(&self, indicator_type: IndicatorType) -> Option<f64> {
        self.get(IndicatorRef::value(indicator_type))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Display-keyed, sorted view for reports.
    pub fn to_named(&self) -> BTreeMap<String, f64> {
        self.values
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect()
    }
}

impl FromIterator<(IndicatorRef, f64)> for IndicatorSnapshot {
    fn from_iter<I: IntoIterator<Item = (IndicatorRef, f64)>>(iter: I) -> Self {
        let mut snapshot = IndicatorSnapshot::new();
        for (key, value) in iter {
            snapshot.insert(key, value);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display_sma() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
    }

    #[test]
    fn indicator_type_display_macd() {
        assert_eq!(standard::MACD.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn indicator_type_display_bollinger() {
        assert_eq!(standard::BOLLINGER.to_string(), "BOLLINGER(20,2)");
    }

    #[test]
    fn indicator_ref_display_includes_field() {
        let r = IndicatorRef::new(standard::MACD, IndicatorField::MacdHistogram);
        assert_eq!(r.to_string(), "MACD(12,26,9).histogram");
        assert_eq!(IndicatorRef::value(IndicatorType::Obv).to_string(), "OBV");
    }

    #[test]
    fn multi_output_fields() {
        assert_eq!(standard::MACD.fields().len(), 3);
        assert_eq!(standard::BOLLINGER.fields().len(), 3);
        assert_eq!(standard::STOCHASTIC.fields().len(), 2);
        assert_eq!(standard::ADX.fields().len(), 3);
        assert_eq!(IndicatorType::Rsi(14).fields(), &[IndicatorField::Value]);
    }

    #[test]
    fn snapshot_absent_is_none_not_zero() {
        let mut snapshot = IndicatorSnapshot::new();
        snapshot.insert(IndicatorRef::value(standard::RSI), 42.0);

        assert_eq!(snapshot.value(standard::RSI), Some(42.0));
        assert_eq!(snapshot.value(standard::CCI), None);
    }

    #[test]
    fn snapshot_drops_non_finite() {
        let mut snapshot = IndicatorSnapshot::new();
        snapshot.insert(IndicatorRef::value(standard::RSI), f64::NAN);
        snapshot.insert(IndicatorRef::value(standard::CCI), f64::INFINITY);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn snapshot_to_named_is_sorted() {
        let snapshot: IndicatorSnapshot = [
            (IndicatorRef::value(IndicatorType::Sma(50)), 2.0),
            (IndicatorRef::value(IndicatorType::Atr(14)), 1.0),
        ]
        .into_iter()
        .collect();
        let names: Vec<String> = snapshot.to_named().into_keys().collect();
        assert_eq!(names, vec!["ATR(14)".to_string(), "SMA(50)".to_string()]);
    }

    #[test]
    fn standard_set_has_unique_entries() {
        let set = IndicatorType::standard_set();
        let unique: std::collections::HashSet<_> = set.iter().collect();
        assert_eq!(unique.len(), set.len());
    }
}
