//! Fundamental ratio derivation and scoring.
//!
//! Ratios come from the most recent report; growth ratios additionally need
//! the same fiscal quarter of the prior year. A ratio is `None` when a source
//! field is absent or a required denominator is not positive.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const NEUTRAL: f64 = 0.5;
const MAX_INDUSTRY_ADJUSTMENT: f64 = 0.05;

/// One periodic (quarterly) fundamentals report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalReport {
    pub period_end: NaiveDate,
    pub fiscal_year: i32,
    pub fiscal_quarter: u8,
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub eps: Option<f64>,
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    pub roe: Option<f64>,
    pub debt_to_equity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialRatios {
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    pub roe: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub net_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub eps_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
}

/// Industry average ratios used for the optional comparison nudge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndustryAverages {
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    pub roe: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub net_margin: Option<f64>,
}

impl FinancialRatios {
    /// Derives ratios from a time-ordered (oldest-first) report sequence.
    pub fn from_reports(reports: &[FundamentalReport]) -> Self {
        let Some(latest) = reports.last() else {
            return FinancialRatios::default();
        };

        let prior_year = reports.iter().rev().find(|r| {
            r.fiscal_year == latest.fiscal_year - 1 && r.fiscal_quarter == latest.fiscal_quarter
        });

        let growth = |current: Option<f64>, prior: Option<f64>| match (current, prior) {
            (Some(c), Some(p)) if p > 0.0 => Some((c - p) / p),
            _ => None,
        };

        FinancialRatios {
            pe: latest.pe.filter(|v| *v > 0.0),
            pb: latest.pb.filter(|v| *v > 0.0),
            roe: latest.roe,
            debt_to_equity: latest.debt_to_equity.filter(|v| *v >= 0.0),
            net_margin: match (latest.net_income, latest.revenue) {
                (Some(income), Some(revenue)) if revenue > 0.0 => Some(income / revenue),
                _ => None,
            },
            revenue_growth: prior_year.and_then(|p| growth(latest.revenue, p.revenue)),
            eps_growth: prior_year.and_then(|p| growth(latest.eps, p.eps)),
            earnings_growth: prior_year.and_then(|p| growth(latest.net_income, p.net_income)),
        }
    }
}

/// Per-ratio weights of the composite fundamental score.
#[derive(Debug, Clone, PartialEq)]
pub struct FundamentalWeights {
    pub pe: f64,
    pub pb: f64,
    pub roe: f64,
    pub debt_to_equity: f64,
    pub net_margin: f64,
    pub revenue_growth: f64,
    pub eps_growth: f64,
    pub earnings_growth: f64,
}

impl Default for FundamentalWeights {
    fn default() -> Self {
        FundamentalWeights {
            pe: 0.20,
            pb: 0.10,
            roe: 0.15,
            debt_to_equity: 0.15,
            net_margin: 0.10,
            revenue_growth: 0.10,
            eps_growth: 0.10,
            earnings_growth: 0.10,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FundamentalScorer {
    weights: FundamentalWeights,
}

impl FundamentalScorer {
    pub fn new(weights: FundamentalWeights) -> Self {
        Self { weights }
    }

    /// Composite score in [0, 1], weighted over the ratios that are present.
    pub fn score(&self, ratios: &FinancialRatios) -> f64 {
        let w = &self.weights;
        let components = [
            (w.pe, ratios.pe.map(pe_bucket)),
            (w.pb, ratios.pb.map(pb_bucket)),
            (w.roe, ratios.roe.map(roe_bucket)),
            (w.debt_to_equity, ratios.debt_to_equity.map(debt_bucket)),
            (w.net_margin, ratios.net_margin.map(margin_bucket)),
            (w.revenue_growth, ratios.revenue_growth.map(growth_bucket)),
            (w.eps_growth, ratios.eps_growth.map(growth_bucket)),
            (w.earnings_growth, ratios.earnings_growth.map(growth_bucket)),
        ];

        let (weighted, total_weight) = components
            .iter()
            .filter_map(|(weight, score)| score.map(|s| (weight * s, *weight)))
            .fold((0.0, 0.0), |(ws, tw), (s, w)| (ws + s, tw + w));

        if total_weight <= 0.0 {
            return NEUTRAL;
        }
        (weighted / total_weight).clamp(0.0, 1.0)
    }

    /// Nudges `score` by at most ±0.05 according to how the company's ratios
    /// stand against industry averages. Ratios whose average is zero or
    /// missing are skipped.
    pub fn adjust_for_industry(
        &self,
        score: f64,
        ratios: &FinancialRatios,
        industry: &IndustryAverages,
    ) -> f64 {
        // (value, average, higher_is_better)
        let pairs = [
            (ratios.pe, industry.pe, false),
            (ratios.pb, industry.pb, false),
            (ratios.roe, industry.roe, true),
            (ratios.debt_to_equity, industry.debt_to_equity, false),
            (ratios.net_margin, industry.net_margin, true),
        ];

        let standings: Vec<f64> = pairs
            .iter()
            .filter_map(|&(value, average, higher_is_better)| {
                let (value, average) = (value?, average?);
                if average == 0.0 {
                    return None;
                }
                let relative = (value - average) / average.abs();
                let standing = if higher_is_better { relative } else { -relative };
                Some(standing.clamp(-1.0, 1.0))
            })
            .collect();

        if standings.is_empty() {
            return score;
        }

        let mean = standings.iter().sum::<f64>() / standings.len() as f64;
        (score + MAX_INDUSTRY_ADJUSTMENT * mean).clamp(0.0, 1.0)
    }
}

fn pe_bucket(pe: f64) -> f64 {
    if pe < 15.0 {
        1.0
    } else if pe < 25.0 {
        0.7
    } else if pe < 40.0 {
        0.4
    } else {
        0.1
    }
}

fn pb_bucket(pb: f64) -> f64 {
    if pb < 1.0 {
        1.0
    } else if pb < 3.0 {
        0.7
    } else if pb < 5.0 {
        0.4
    } else {
        0.2
    }
}

fn roe_bucket(roe: f64) -> f64 {
    if roe > 0.20 {
        1.0
    } else if roe > 0.15 {
        0.8
    } else if roe > 0.10 {
        0.6
    } else if roe > 0.0 {
        0.4
    } else {
        0.1
    }
}

fn debt_bucket(de: f64) -> f64 {
    if de < 0.5 {
        1.0
    } else if de < 1.0 {
        0.7
    } else if de < 2.0 {
        0.4
    } else {
        0.1
    }
}

fn margin_bucket(margin: f64) -> f64 {
    if margin > 0.20 {
        1.0
    } else if margin > 0.10 {
        0.7
    } else if margin > 0.0 {
        0.5
    } else {
        0.1
    }
}

fn growth_bucket(growth: f64) -> f64 {
    if growth > 0.20 {
        1.0
    } else if growth > 0.10 {
        0.8
    } else if growth > 0.0 {
        0.6
    } else if growth > -0.10 {
        0.3
    } else {
        0.1
    }
}
