//! Recommendation engine: combines the four analysis dimensions into an
//! overall score, a discrete recommendation, risk level, time horizon and
//! generated reasoning.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::QuantError;

/// Per-dimension scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisScores {
    pub technical: f64,
    pub fundamental: f64,
    pub sentiment: f64,
    #[serde(rename = "macro")]
    pub macro_score: f64,
}

impl AnalysisScores {
    /// Validates that every score lies in [0, 1].
    pub fn new(
        technical: f64,
        fundamental: f64,
        sentiment: f64,
        macro_score: f64,
    ) -> Result<Self, QuantError> {
        for (name, value) in [
            ("technical", technical),
            ("fundamental", fundamental),
            ("sentiment", sentiment),
            ("macro", macro_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(QuantError::InvalidScore { name, value });
            }
        }
        Ok(Self {
            technical,
            fundamental,
            sentiment,
            macro_score,
        })
    }

    fn as_array(&self) -> [f64; 4] {
        [
            self.technical,
            self.fundamental,
            self.sentiment,
            self.macro_score,
        ]
    }
}

/// Ordered from most bearish to most bullish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongSell,
    Sell,
    Hold,
    Buy,
    StrongBuy,
}

impl Recommendation {
    /// Monotonic threshold map on the overall score.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Recommendation::StrongBuy
        } else if score >= 0.6 {
            Recommendation::Buy
        } else if score >= 0.4 {
            Recommendation::Hold
        } else if score >= 0.2 {
            Recommendation::Sell
        } else {
            Recommendation::StrongSell
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recommendation::StrongBuy => "strong_buy",
            Recommendation::Buy => "buy",
            Recommendation::Hold => "hold",
            Recommendation::Sell => "sell",
            Recommendation::StrongSell => "strong_sell",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeHorizon {
    Short,
    Medium,
    Long,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub recommendation: Recommendation,
    pub overall_score: f64,
    pub confidence: f64,
    pub reasoning: String,
    pub risk_level: RiskLevel,
    pub time_horizon: TimeHorizon,
}

/// Dimension weights; the defaults sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationWeights {
    pub technical: f64,
    pub fundamental: f64,
    pub sentiment: f64,
    pub macro_score: f64,
}

impl Default for RecommendationWeights {
    fn default() -> Self {
        RecommendationWeights {
            technical: 0.25,
            fundamental: 0.35,
            sentiment: 0.20,
            macro_score: 0.20,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    weights: RecommendationWeights,
}

impl RecommendationEngine {
    pub fn new(weights: RecommendationWeights) -> Self {
        Self { weights }
    }

    pub fn overall_score(&self, scores: &AnalysisScores) -> f64 {
        let w = &self.weights;
        w.technical * scores.technical
            + w.fundamental * scores.fundamental
            + w.sentiment * scores.sentiment
            + w.macro_score * scores.macro_score
    }

    /// 0.6 × data completeness + 0.4 × (1 − variance of the scores).
    ///
    /// Completeness counts a dimension as present when its score is > 0, so
    /// a legitimate score of exactly zero reads as missing data.
    pub fn confidence(&self, scores: &AnalysisScores) -> f64 {
        let values = scores.as_array();
        let n = values.len() as f64;

        let completeness = values.iter().filter(|&&v| v > 0.0).count() as f64 / n;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        (0.6 * completeness + 0.4 * (1.0 - variance)).clamp(0.0, 1.0)
    }

    pub fn recommend(&self, scores: &AnalysisScores) -> RecommendationResult {
        let overall_score = self.overall_score(scores);
        let confidence = self.confidence(scores);
        let recommendation = Recommendation::from_score(overall_score);
        let risk_level = risk_level(scores, confidence);
        let time_horizon = time_horizon(scores);

        tracing::debug!(
            overall_score,
            confidence,
            %recommendation,
            "generated recommendation"
        );

        RecommendationResult {
            recommendation,
            overall_score,
            confidence,
            reasoning: reasoning(scores, recommendation),
            risk_level,
            time_horizon,
        }
    }

    /// Risk caveats for a generated recommendation; never empty.
    pub fn risk_warnings(
        &self,
        scores: &AnalysisScores,
        result: &RecommendationResult,
    ) -> Vec<String> {
        let mut warnings = Vec::new();

        if result.confidence < 0.5 {
            warnings.push(
                "Low confidence: the analysis is based on incomplete or conflicting data."
                    .to_string(),
            );
        }
        if result.risk_level == RiskLevel::High {
            warnings.push(
                "High risk: signals are uncertain and outcomes may vary widely.".to_string(),
            );
        }
        if (scores.technical - scores.fundamental).abs() > 0.3 {
            warnings.push(
                "Technical and fundamental signals diverge significantly.".to_string(),
            );
        }
        if scores.sentiment < 0.3 {
            warnings.push("Market sentiment is negative and may pressure the price.".to_string());
        }

        if warnings.is_empty() {
            warnings.push(
                "Past performance does not guarantee future results; \
                 invest according to your own risk tolerance."
                    .to_string(),
            );
        }
        warnings
    }
}

fn risk_level(scores: &AnalysisScores, confidence: f64) -> RiskLevel {
    if confidence >= 0.8 && (scores.technical - scores.fundamental).abs() < 0.2 {
        RiskLevel::Low
    } else if confidence >= 0.6 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

fn time_horizon(scores: &AnalysisScores) -> TimeHorizon {
    if scores.technical > 0.7 && scores.sentiment > 0.6 {
        TimeHorizon::Short
    } else if scores.fundamental > 0.7 {
        TimeHorizon::Long
    } else {
        TimeHorizon::Medium
    }
}

/// Picks the phrase for a score bucket: (> 0.7, > 0.5, < 0.3, otherwise).
fn bucket(score: f64, phrases: [&'static str; 4]) -> &'static str {
    if score > 0.7 {
        phrases[0]
    } else if score > 0.5 {
        phrases[1]
    } else if score < 0.3 {
        phrases[2]
    } else {
        phrases[3]
    }
}

fn reasoning(scores: &AnalysisScores, recommendation: Recommendation) -> String {
    let parts = [
        bucket(
            scores.technical,
            [
                "Technical indicators are strongly bullish.",
                "Technical indicators lean positive.",
                "Technical indicators are bearish.",
                "Technical indicators are mixed.",
            ],
        ),
        bucket(
            scores.fundamental,
            [
                "Fundamentals are strong.",
                "Fundamentals are solid.",
                "Fundamentals are weak.",
                "Fundamentals are average.",
            ],
        ),
        bucket(
            scores.sentiment,
            [
                "Market sentiment is very positive.",
                "Market sentiment is favorable.",
                "Market sentiment is negative.",
                "Market sentiment is neutral.",
            ],
        ),
        bucket(
            scores.macro_score,
            [
                "The macroeconomic backdrop is supportive.",
                "The macroeconomic backdrop is stable.",
                "The macroeconomic backdrop is unfavorable.",
                "The macroeconomic backdrop is uncertain.",
            ],
        ),
        match recommendation {
            Recommendation::StrongBuy => {
                "Overall, the stock shows compelling strength across dimensions."
            }
            Recommendation::Buy => "Overall, the positives outweigh the risks.",
            Recommendation::Hold => {
                "Overall, the signals are balanced; waiting for clarity is prudent."
            }
            Recommendation::Sell => "Overall, the risks outweigh the positives.",
            Recommendation::StrongSell => {
                "Overall, the stock shows broad weakness across dimensions."
            }
        },
    ];

    parts.join(" ")
}
