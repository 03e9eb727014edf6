//! Single-symbol analysis: indicators, scores and the recommendation.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::error::QuantError;
use crate::domain::fundamental::{
    FinancialRatios, FundamentalReport, FundamentalScorer, IndustryAverages,
};
use crate::domain::indicator::{IndicatorType, latest_snapshot};
use crate::domain::ohlcv::PriceBar;
use crate::domain::recommendation::{AnalysisScores, RecommendationEngine, RecommendationResult};
use crate::domain::technical::{TechnicalScorer, TechnicalSignals};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub price: f64,
    pub indicators: BTreeMap<String, f64>,
    pub technical_score: f64,
    pub signals: TechnicalSignals,
    /// `None` when no fundamentals were supplied.
    pub ratios: Option<FinancialRatios>,
    pub scores: AnalysisScores,
    pub recommendation: RecommendationResult,
    pub risk_warnings: Vec<String>,
}

/// Externally supplied inputs that the core does not compute.
#[derive(Debug, Clone, Default)]
pub struct ExternalInputs {
    pub sentiment: f64,
    pub macro_score: f64,
    pub industry: Option<IndustryAverages>,
}

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    pub technical: TechnicalScorer,
    pub fundamental: FundamentalScorer,
    pub engine: RecommendationEngine,
}

impl Analyzer {
    /// Analyzes `bars` (oldest first) and `reports` for `symbol`.
    ///
    /// Without fundamentals the fundamental score is 0, which the
    /// recommendation's completeness measure reads as missing.
    pub fn analyze(
        &self,
        symbol: &str,
        bars: &[PriceBar],
        reports: &[FundamentalReport],
        external: &ExternalInputs,
    ) -> Result<AnalysisReport, QuantError> {
        let last = bars.last().ok_or_else(|| QuantError::NoData {
            symbol: symbol.to_string(),
        })?;

        let snapshot = latest_snapshot(bars, &IndicatorType::standard_set());
        let technical_score = self.technical.score(&snapshot, last.close);
        let signals = self.technical.signals(&snapshot, last.close);

        let ratios = (!reports.is_empty()).then(|| FinancialRatios::from_reports(reports));
        let fundamental_score = ratios.as_ref().map_or(0.0, |ratios| {
            let score = self.fundamental.score(ratios);
            match &external.industry {
                Some(industry) => self.fundamental.adjust_for_industry(score, ratios, industry),
                None => score,
            }
        });

        let scores = AnalysisScores::new(
            technical_score,
            fundamental_score,
            external.sentiment,
            external.macro_score,
        )?;
        let recommendation = self.engine.recommend(&scores);
        let risk_warnings = self.engine.risk_warnings(&scores, &recommendation);

        tracing::info!(
            symbol,
            technical_score,
            fundamental_score,
            recommendation = %recommendation.recommendation,
            "analysis complete"
        );

        Ok(AnalysisReport {
            symbol: symbol.to_string(),
            as_of: last.date,
            price: last.close,
            indicators: snapshot.to_named(),
            technical_score,
            signals,
            ratios,
            scores,
            recommendation,
            risk_warnings,
        })
    }
}
