//! Built-in strategy catalog.
//!
//! Every strategy is rebuilt from a parameter map: defaults overlaid with
//! caller overrides. Periods must be positive integers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::{QuantError, RuleError};
use crate::domain::indicator::{AnalyzedBar, IndicatorField, IndicatorRef, IndicatorType, standard};
use crate::domain::strategy::{Strategy, StrategyBuilder};

pub const DEFAULT_NOTIONAL: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    MovingAverageCross,
    Rsi,
    Macd,
    Bollinger,
    MultiSignal,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::MovingAverageCross,
        StrategyKind::Rsi,
        StrategyKind::Macd,
        StrategyKind::Bollinger,
        StrategyKind::MultiSignal,
    ];

    /// Catalog key used in config files and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            StrategyKind::MovingAverageCross => "ma_cross",
            StrategyKind::Rsi => "rsi",
            StrategyKind::Macd => "macd",
            StrategyKind::Bollinger => "bollinger",
            StrategyKind::MultiSignal => "multi_signal",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StrategyKind::MovingAverageCross => {
                "Hold while the fast SMA is above the slow SMA"
            }
            StrategyKind::Rsi => "Buy when RSI is oversold, sell when overbought",
            StrategyKind::Macd => "Follow the sign of the MACD histogram",
            StrategyKind::Bollinger => {
                "Buy below the lower Bollinger band, sell above the middle band"
            }
            StrategyKind::MultiSignal => {
                "Vote across RSI, MACD and trend; act when enough signals agree"
            }
        }
    }

    pub fn default_parameters(self) -> BTreeMap<String, f64> {
        let pairs: &[(&str, f64)] = match self {
            StrategyKind::MovingAverageCross => &[("fast_period", 50.0), ("slow_period", 200.0)],
            StrategyKind::Rsi => &[("period", 14.0), ("oversold", 30.0), ("overbought", 70.0)],
            StrategyKind::Macd => &[
                ("fast_period", 12.0),
                ("slow_period", 26.0),
                ("signal_period", 9.0),
            ],
            StrategyKind::Bollinger => &[("period", 20.0), ("stddev", 2.0)],
            StrategyKind::MultiSignal => &[
                ("rsi_period", 14.0),
                ("rsi_buy", 40.0),
                ("rsi_sell", 60.0),
                ("trend_period", 50.0),
                ("min_votes", 2.0),
            ],
        };

        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v))
            .chain(std::iter::once(("notional".to_string(), DEFAULT_NOTIONAL)))
            .collect()
    }

    /// Builds the strategy from its defaults overlaid with `overrides`.
    pub fn build(self, overrides: &BTreeMap<String, f64>) -> Result<Strategy, QuantError> {
        let mut params = Params::resolve(self, overrides)?;
        let notional = params.positive("notional")?;

        let builder = match self {
            StrategyKind::MovingAverageCross => {
                let fast = IndicatorType::Sma(params.period("fast_period")?);
                let slow = IndicatorType::Sma(params.period("slow_period")?);
                params.ordered("fast_period", "slow_period")?;

                Strategy::builder(self.key())
                    .indicator(fast)
                    .indicator(slow)
                    .entry(move |bar| Ok(compare(bar.value(fast), bar.value(slow)) == Some(true)))
                    .exit(move |bar| Ok(compare(bar.value(slow), bar.value(fast)) == Some(true)))
            }
            StrategyKind::Rsi => {
                let rsi = IndicatorType::Rsi(params.period("period")?);
                let oversold = params.bounded("oversold", 0.0, 100.0)?;
                let overbought = params.bounded("overbought", 0.0, 100.0)?;
                params.ordered("oversold", "overbought")?;

                Strategy::builder(self.key())
                    .indicator(rsi)
                    .entry(move |bar| Ok(bar.value(rsi).is_some_and(|v| v < oversold)))
                    .exit(move |bar| Ok(bar.value(rsi).is_some_and(|v| v > overbought)))
            }
            StrategyKind::Macd => {
                let macd = IndicatorType::Macd {
                    fast: params.period("fast_period")?,
                    slow: params.period("slow_period")?,
                    signal: params.period("signal_period")?,
                };
                params.ordered("fast_period", "slow_period")?;
                let histogram = IndicatorRef::new(macd, IndicatorField::MacdHistogram);

                Strategy::builder(self.key())
                    .indicator(macd)
                    .entry(move |bar| Ok(bar.get(histogram).is_some_and(|h| h > 0.0)))
                    .exit(move |bar| Ok(bar.get(histogram).is_some_and(|h| h < 0.0)))
            }
            StrategyKind::Bollinger => {
                let bands = IndicatorType::Bollinger {
                    period: params.period("period")?,
                    stddev_mult_x100: params.hundredths("stddev")?,
                };
                let lower = IndicatorRef::new(bands, IndicatorField::BollingerLower);
                let middle = IndicatorRef::new(bands, IndicatorField::BollingerMiddle);

                Strategy::builder(self.key())
                    .indicator(bands)
                    .entry(move |bar| Ok(bar.get(lower).is_some_and(|l| bar.close() < l)))
                    .exit(move |bar| Ok(bar.get(middle).is_some_and(|m| bar.close() > m)))
            }
            StrategyKind::MultiSignal => multi_signal(&params)?,
        };

        Ok(builder
            .description(self.description())
            .parameters(params.values)
            .position_size(move |bar| Ok(notional / bar.close()))
            .build())
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StrategyKind {
    type Err = QuantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| QuantError::UnknownStrategy {
                name: s.to_string(),
            })
    }
}

/// `Some(left > right)` when both values are computable.
fn compare(left: Option<f64>, right: Option<f64>) -> Option<bool> {
    Some(left? > right?)
}

fn multi_signal(params: &Params) -> Result<StrategyBuilder, QuantError> {
    let rsi = IndicatorType::Rsi(params.period("rsi_period")?);
    let trend = IndicatorType::Sma(params.period("trend_period")?);
    let rsi_buy = params.bounded("rsi_buy", 0.0, 100.0)?;
    let rsi_sell = params.bounded("rsi_sell", 0.0, 100.0)?;
    let min_votes = params.bounded("min_votes", 1.0, 3.0)?;
    params.ordered("rsi_buy", "rsi_sell")?;

    let macd = standard::MACD;
    let histogram = IndicatorRef::new(macd, IndicatorField::MacdHistogram);

    let votes = move |bar: &AnalyzedBar, bullish: bool| -> Result<bool, RuleError> {
        let signals = [
            bar.value(rsi)
                .map(|v| if bullish { v < rsi_buy } else { v > rsi_sell }),
            bar.get(histogram)
                .map(|h| if bullish { h > 0.0 } else { h < 0.0 }),
            bar.value(trend).map(|sma| {
                if bullish {
                    bar.close() > sma
                } else {
                    bar.close() < sma
                }
            }),
        ];
        let count = signals.iter().filter(|s| **s == Some(true)).count();
        Ok(count as f64 >= min_votes)
    };

    Ok(Strategy::builder(StrategyKind::MultiSignal.key())
        .indicator(rsi)
        .indicator(macd)
        .indicator(trend)
        .entry(move |bar| votes(bar, true))
        .exit(move |bar| votes(bar, false)))
}

/// Resolved parameter map with typed, validated accessors.
struct Params {
    kind: StrategyKind,
    values: BTreeMap<String, f64>,
}

impl Params {
    fn resolve(kind: StrategyKind, overrides: &BTreeMap<String, f64>) -> Result<Self, QuantError> {
        let mut values = kind.default_parameters();
        for (name, &value) in overrides {
            if !values.contains_key(name) {
                return Err(invalid(kind, format!("unknown parameter {name}")));
            }
            if !value.is_finite() {
                return Err(invalid(kind, format!("{name} must be finite")));
            }
            values.insert(name.clone(), value);
        }
        Ok(Params { kind, values })
    }

    fn get(&self, name: &str) -> Result<f64, QuantError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| invalid(self.kind, format!("missing parameter {name}")))
    }

    fn period(&self, name: &str) -> Result<usize, QuantError> {
        let value = self.get(name)?;
        if value < 1.0 || value.fract() != 0.0 {
            return Err(invalid(
                self.kind,
                format!("{name} must be a positive integer, got {value}"),
            ));
        }
        Ok(value as usize)
    }

    fn positive(&self, name: &str) -> Result<f64, QuantError> {
        let value = self.get(name)?;
        if value <= 0.0 {
            return Err(invalid(self.kind, format!("{name} must be positive, got {value}")));
        }
        Ok(value)
    }

    fn non_negative(&self, name: &str) -> Result<f64, QuantError> {
        let value = self.get(name)?;
        if value < 0.0 {
            return Err(invalid(self.kind, format!("{name} must not be negative, got {value}")));
        }
        Ok(value)
    }

    /// Non-negative value in hundredths. The stored value is rounded to
    /// match, so the descriptor reports what the indicator uses.
    fn hundredths(&mut self, name: &str) -> Result<u32, QuantError> {
        let scaled = (self.non_negative(name)? * 100.0).round();
        self.values.insert(name.to_string(), scaled / 100.0);
        Ok(scaled as u32)
    }

    fn bounded(&self, name: &str, min: f64, max: f64) -> Result<f64, QuantError> {
        let value = self.get(name)?;
        if !(min..=max).contains(&value) {
            return Err(invalid(
                self.kind,
                format!("{name} must be within [{min}, {max}], got {value}"),
            ));
        }
        Ok(value)
    }

    /// Requires `lower < upper`.
    fn ordered(&self, lower: &str, upper: &str) -> Result<(), QuantError> {
        if self.get(lower)? >= self.get(upper)? {
            return Err(invalid(self.kind, format!("{lower} must be less than {upper}")));
        }
        Ok(())
    }
}

fn invalid(kind: StrategyKind, reason: String) -> QuantError {
    QuantError::InvalidParameters {
        strategy: kind.key().to_string(),
        reason,
    }
}
