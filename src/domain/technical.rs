//! Technical scoring: maps the latest indicator snapshot to a bounded
//! composite score and a qualitative signal list.
//!
//! Each available indicator contributes a sub-score of 1.0 (bullish), 0.0
//! (bearish) or 0.5 (neutral). The composite is the weighted mean over the
//! indicators that are actually present; missing indicators are excluded from
//! both numerator and denominator. With no indicators at all the score is 0.5.

use serde::Serialize;

use crate::domain::indicator::{IndicatorField, IndicatorRef, IndicatorSnapshot, standard};

const NEUTRAL: f64 = 0.5;

/// Per-indicator weights of the composite technical score.
#[derive(Debug, Clone, PartialEq)]
pub struct TechnicalWeights {
    pub rsi: f64,
    pub macd: f64,
    pub bollinger: f64,
    pub moving_average: f64,
    pub stochastic: f64,
    pub williams_r: f64,
    pub cci: f64,
    pub mfi: f64,
    pub adx: f64,
}

impl Default for TechnicalWeights {
    fn default() -> Self {
        TechnicalWeights {
            rsi: 0.20,
            macd: 0.20,
            bollinger: 0.15,
            moving_average: 0.20,
            stochastic: 0.10,
            williams_r: 0.05,
            cci: 0.05,
            mfi: 0.05,
            adx: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStrength {
    Weak,
    Moderate,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalDirection {
    Bullish,
    Bearish,
    Neutral,
}

/// Human-readable signal summary for the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalSignals {
    pub reasons: Vec<String>,
    pub bullish: usize,
    pub bearish: usize,
    pub strength: SignalStrength,
    pub direction: SignalDirection,
}

#[derive(Debug, Clone, Default)]
pub struct TechnicalScorer {
    weights: TechnicalWeights,
}

/// One indicator's directional reading.
struct Reading {
    weight: f64,
    score: f64,
    bullish_reason: &'static str,
    bearish_reason: &'static str,
}

impl TechnicalScorer {
    pub fn new(weights: TechnicalWeights) -> Self {
        Self { weights }
    }

    /// Composite technical score in [0, 1].
    pub fn score(&self, snapshot: &IndicatorSnapshot, price: f64) -> f64 {
        let readings = self.readings(snapshot, price);
        let total_weight: f64 = readings.iter().map(|r| r.weight).sum();
        if total_weight <= 0.0 {
            return NEUTRAL;
        }

        let weighted: f64 = readings.iter().map(|r| r.weight * r.score).sum();
        (weighted / total_weight).clamp(0.0, 1.0)
    }

    /// Directional votes with reasons. Neutral readings cast no vote.
    pub fn signals(&self, snapshot: &IndicatorSnapshot, price: f64) -> TechnicalSignals {
        let mut reasons = Vec::new();
        let mut bullish = 0;
        let mut bearish = 0;

        for reading in self.readings(snapshot, price) {
            if reading.score > NEUTRAL {
                bullish += 1;
                reasons.push(reading.bullish_reason.to_string());
            } else if reading.score < NEUTRAL {
                bearish += 1;
                reasons.push(reading.bearish_reason.to_string());
            }
        }

        let dominant = bullish.max(bearish);
        let strength = if dominant >= 3 {
            SignalStrength::Strong
        } else if dominant >= 2 {
            SignalStrength::Moderate
        } else {
            SignalStrength::Weak
        };

        let direction = if bullish > bearish {
            SignalDirection::Bullish
        } else if bearish > bullish {
            SignalDirection::Bearish
        } else {
            SignalDirection::Neutral
        };

        TechnicalSignals {
            reasons,
            bullish,
            bearish,
            strength,
            direction,
        }
    }

    fn readings(&self, snapshot: &IndicatorSnapshot, price: f64) -> Vec<Reading> {
        let w = &self.weights;
        let mut readings = Vec::new();

        if let Some(rsi) = snapshot.value(standard::RSI) {
            readings.push(Reading {
                weight: w.rsi,
                score: band_score(rsi, 30.0, 70.0),
                bullish_reason: "RSI oversold (below 30)",
                bearish_reason: "RSI overbought (above 70)",
            });
        }

        let macd_line = snapshot.get(IndicatorRef::new(standard::MACD, IndicatorField::MacdLine));
        let macd_signal =
            snapshot.get(IndicatorRef::new(standard::MACD, IndicatorField::MacdSignal));
        if let (Some(line), Some(signal)) = (macd_line, macd_signal) {
            readings.push(Reading {
                weight: w.macd,
                score: compare_score(line, signal),
                bullish_reason: "MACD line above signal line",
                bearish_reason: "MACD line below signal line",
            });
        }

        let upper = snapshot.get(IndicatorRef::new(
            standard::BOLLINGER,
            IndicatorField::BollingerUpper,
        ));
        let lower = snapshot.get(IndicatorRef::new(
            standard::BOLLINGER,
            IndicatorField::BollingerLower,
        ));
        if let (Some(upper), Some(lower)) = (upper, lower) {
            let score = if price < lower {
                1.0
            } else if price > upper {
                0.0
            } else {
                NEUTRAL
            };
            readings.push(Reading {
                weight: w.bollinger,
                score,
                bullish_reason: "Price below lower Bollinger Band",
                bearish_reason: "Price above upper Bollinger Band",
            });
        }

        let fast_ma = snapshot.value(standard::SMA_SHORT);
        let slow_ma = snapshot.value(standard::SMA_MEDIUM);
        if let (Some(fast), Some(slow)) = (fast_ma, slow_ma) {
            readings.push(Reading {
                weight: w.moving_average,
                score: compare_score(fast, slow),
                bullish_reason: "Short-term moving average above long-term",
                bearish_reason: "Short-term moving average below long-term",
            });
        }

        if let Some(k) = snapshot.get(IndicatorRef::new(
            standard::STOCHASTIC,
            IndicatorField::StochasticK,
        )) {
            readings.push(Reading {
                weight: w.stochastic,
                score: band_score(k, 20.0, 80.0),
                bullish_reason: "Stochastic oversold (below 20)",
                bearish_reason: "Stochastic overbought (above 80)",
            });
        }

        if let Some(wr) = snapshot.value(standard::WILLIAMS_R) {
            readings.push(Reading {
                weight: w.williams_r,
                score: band_score(wr, -80.0, -20.0),
                bullish_reason: "Williams %R oversold (below -80)",
                bearish_reason: "Williams %R overbought (above -20)",
            });
        }

        if let Some(cci) = snapshot.value(standard::CCI) {
            readings.push(Reading {
                weight: w.cci,
                score: band_score(cci, -100.0, 100.0),
                bullish_reason: "CCI oversold (below -100)",
                bearish_reason: "CCI overbought (above 100)",
            });
        }

        if let Some(mfi) = snapshot.value(standard::MFI) {
            readings.push(Reading {
                weight: w.mfi,
                score: band_score(mfi, 20.0, 80.0),
                bullish_reason: "Money flow oversold (below 20)",
                bearish_reason: "Money flow overbought (above 80)",
            });
        }

        let adx = snapshot.value(standard::ADX);
        let plus_di = snapshot.get(IndicatorRef::new(standard::ADX, IndicatorField::PlusDi));
        let minus_di = snapshot.get(IndicatorRef::new(standard::ADX, IndicatorField::MinusDi));
        if let (Some(adx), Some(plus), Some(minus)) = (adx, plus_di, minus_di) {
            let score = if adx > 25.0 {
                compare_score(plus, minus)
            } else {
                NEUTRAL
            };
            readings.push(Reading {
                weight: w.adx,
                score,
                bullish_reason: "Strong uptrend (ADX above 25, +DI leading)",
                bearish_reason: "Strong downtrend (ADX above 25, -DI leading)",
            });
        }

        readings
    }
}

/// Oscillator reading: below `oversold` is bullish, above `overbought` bearish.
fn band_score(value: f64, oversold: f64, overbought: f64) -> f64 {
    if value < oversold {
        1.0
    } else if value > overbought {
        0.0
    } else {
        NEUTRAL
    }
}

fn compare_score(fast: f64, slow: f64) -> f64 {
    if fast > slow {
        1.0
    } else if fast < slow {
        0.0
    } else {
        NEUTRAL
    }
}
