//! Exhaustive parameter grid search, maximizing the Sharpe ratio.
//!
//! Combinations run in parallel; results are reduced in grid order so the
//! outcome matches a sequential run and ties go to the earliest combination.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::backtest::{BacktestEngine, BacktestResult};
use crate::domain::error::QuantError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::strategy::Strategy;

/// Tolerance when deciding whether `max` is reached by a whole number of steps.
const STEP_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParameterRange {
    pub fn new(name: impl Into<String>, min: f64, max: f64, step: f64) -> Result<Self, QuantError> {
        let range = ParameterRange {
            name: name.into(),
            min,
            max,
            step,
        };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), QuantError> {
        let reason = if !(self.min.is_finite() && self.max.is_finite() && self.step.is_finite()) {
            Some("bounds and step must be finite".to_string())
        } else if self.step <= 0.0 {
            Some(format!("step must be positive, got {}", self.step))
        } else if self.min > self.max {
            Some(format!("min {} exceeds max {}", self.min, self.max))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(QuantError::InvalidParameterRange {
                name: self.name.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }

    /// `min + k·step` for every k keeping the value within `max`.
    pub fn values(&self) -> Vec<f64> {
        let count = ((self.max - self.min) / self.step + STEP_TOLERANCE).floor() as usize + 1;
        (0..count).map(|k| self.min + k as f64 * self.step).collect()
    }
}

/// Cartesian product of `ranges`; the first range varies slowest.
pub fn parameter_grid(ranges: &[ParameterRange]) -> Vec<BTreeMap<String, f64>> {
    ranges.iter().fold(vec![BTreeMap::new()], |grid, range| {
        let values = range.values();
        grid.into_iter()
            .flat_map(|combination| {
                values.iter().map(move |&value| {
                    let mut next = combination.clone();
                    next.insert(range.name.clone(), value);
                    next
                })
            })
            .collect()
    })
}

/// Summary of one evaluated combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationRun {
    pub parameters: BTreeMap<String, f64>,
    pub sharpe_ratio: f64,
    pub total_return: f64,
}

/// A combination whose backtest aborted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationFailure {
    pub parameters: BTreeMap<String, f64>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub best_parameters: BTreeMap<String, f64>,
    pub best: BacktestResult,
    /// Evaluated combinations in grid order.
    pub runs: Vec<OptimizationRun>,
    /// Combinations whose run failed, in grid order.
    pub failures: Vec<OptimizationFailure>,
    /// Combinations the strategy builder rejected.
    pub skipped: usize,
}

/// Outcome of one grid combination, reduced to its summary.
enum Evaluation {
    Skipped,
    Failed(QuantError),
    Ran(OptimizationRun),
}

impl BacktestEngine {
    /// Runs the full backtest for every grid combination and keeps the one
    /// with the highest Sharpe ratio.
    ///
    /// `build` turns a combination into a strategy; combinations it rejects
    /// are skipped. A failing run is recorded and the search continues; the
    /// search fails only when no combination completes. Only summaries are
    /// kept per combination; the winner is re-run once for its full result.
    pub fn optimize<F>(
        &self,
        bars: &[PriceBar],
        ranges: &[ParameterRange],
        build: F,
    ) -> Result<OptimizationResult, QuantError>
    where
        F: Fn(&BTreeMap<String, f64>) -> Result<Strategy, QuantError> + Sync,
    {
        for range in ranges {
            range.validate()?;
        }
        let grid = parameter_grid(ranges);
        tracing::info!(combinations = grid.len(), "starting grid search");

        let evaluations: Vec<Evaluation> = grid
            .par_iter()
            .map(|params| self.evaluate(params, bars, &build))
            .collect();

        let mut runs: Vec<OptimizationRun> = Vec::new();
        let mut failures = Vec::new();
        let mut first_error = None;
        let mut skipped = 0;
        let mut best: Option<usize> = None;

        for (params, evaluation) in grid.into_iter().zip(evaluations) {
            match evaluation {
                Evaluation::Skipped => skipped += 1,
                Evaluation::Failed(err) => {
                    failures.push(OptimizationFailure {
                        parameters: params,
                        error: err.to_string(),
                    });
                    first_error.get_or_insert(err);
                }
                Evaluation::Ran(run) => {
                    let improves = best.is_none_or(|i| run.sharpe_ratio > runs[i].sharpe_ratio);
                    if improves {
                        best = Some(runs.len());
                    }
                    runs.push(run);
                }
            }
        }

        let Some(best_index) = best else {
            return Err(first_error.unwrap_or_else(|| QuantError::InvalidParameterRange {
                name: ranges
                    .iter()
                    .map(|r| r.name.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
                reason: "no valid parameter combination".to_string(),
            }));
        };

        let best_parameters = runs[best_index].parameters.clone();
        let best = self.run(&build(&best_parameters)?, bars)?;

        tracing::info!(
            evaluated = runs.len(),
            failed = failures.len(),
            skipped,
            sharpe_ratio = best.metrics.sharpe_ratio,
            ?best_parameters,
            "grid search complete"
        );

        Ok(OptimizationResult {
            best_parameters,
            best,
            runs,
            failures,
            skipped,
        })
    }

    fn evaluate<F>(
        &self,
        params: &BTreeMap<String, f64>,
        bars: &[PriceBar],
        build: &F,
    ) -> Evaluation
    where
        F: Fn(&BTreeMap<String, f64>) -> Result<Strategy, QuantError>,
    {
        let strategy = match build(params) {
            Ok(strategy) => strategy,
            Err(err) => {
                tracing::warn!(?params, %err, "skipping parameter combination");
                return Evaluation::Skipped;
            }
        };
        match self.run(&strategy, bars) {
            Ok(result) => Evaluation::Ran(OptimizationRun {
                parameters: params.clone(),
                sharpe_ratio: result.metrics.sharpe_ratio,
                total_return: result.metrics.total_return,
            }),
            Err(err) => {
                tracing::warn!(?params, %err, "parameter combination failed");
                Evaluation::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::BacktestConfig;
    use crate::domain::catalog::StrategyKind;
    use crate::domain::error::RuleError;
    use chrono::{Duration, NaiveDate};

    fn make_bars(prices: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + 10.0 * (i as f64 / 7.0).sin() + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn range_values_by_index() {
        let r = ParameterRange::new("p", 0.1, 0.5, 0.1).unwrap();
        let values = r.values();
        assert_eq!(values.len(), 5);
        assert!((values[4] - 0.5).abs() < 1e-12);

        let single = ParameterRange::new("p", 3.0, 3.0, 1.0).unwrap();
        assert_eq!(single.values(), vec![3.0]);
    }

    #[test]
    fn invalid_ranges_rejected() {
        assert!(ParameterRange::new("p", 1.0, 5.0, 0.0).is_err());
        assert!(ParameterRange::new("p", 5.0, 1.0, 1.0).is_err());
        assert!(ParameterRange::new("p", f64::NAN, 1.0, 1.0).is_err());
    }

    #[test]
    fn grid_is_cartesian_product_in_order() {
        let ranges = vec![
            ParameterRange::new("a", 1.0, 2.0, 1.0).unwrap(),
            ParameterRange::new("b", 10.0, 30.0, 10.0).unwrap(),
        ];
        let grid = parameter_grid(&ranges);
        assert_eq!(grid.len(), 6);
        assert_eq!(grid[0]["a"], 1.0);
        assert_eq!(grid[0]["b"], 10.0);
        assert_eq!(grid[2]["b"], 30.0);
        assert_eq!(grid[3]["a"], 2.0);
        assert_eq!(grid[3]["b"], 10.0);
    }

    #[test]
    fn empty_ranges_give_single_default_combination() {
        assert_eq!(parameter_grid(&[]), vec![BTreeMap::new()]);
    }

    #[test]
    fn optimize_picks_highest_sharpe_and_skips_invalid() {
        let bars = make_bars(&wave(120));
        let engine = BacktestEngine::new(BacktestConfig::default());
        let ranges = vec![
            ParameterRange::new("fast_period", 5.0, 15.0, 5.0).unwrap(),
            ParameterRange::new("slow_period", 10.0, 20.0, 10.0).unwrap(),
        ];

        let result = engine
            .optimize(&bars, &ranges, |p| StrategyKind::MovingAverageCross.build(p))
            .unwrap();

        // (10, 10) and (15, 10) violate fast < slow.
        assert_eq!(result.skipped, 2);
        assert_eq!(result.runs.len(), 4);

        let max_sharpe = result
            .runs
            .iter()
            .map(|r| r.sharpe_ratio)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(result.best.metrics.sharpe_ratio, max_sharpe);
        let first_best = result
            .runs
            .iter()
            .find(|r| r.sharpe_ratio == max_sharpe)
            .unwrap();
        assert_eq!(result.best_parameters, first_best.parameters);
    }

    #[test]
    fn optimize_is_deterministic() {
        let bars = make_bars(&wave(90));
        let engine = BacktestEngine::new(BacktestConfig::default());
        let ranges = vec![ParameterRange::new("period", 5.0, 20.0, 5.0).unwrap()];
        let build = |p: &BTreeMap<String, f64>| StrategyKind::Rsi.build(p);

        let a = engine.optimize(&bars, &ranges, build).unwrap();
        let b = engine.optimize(&bars, &ranges, build).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn optimize_fails_when_every_combination_rejected() {
        let bars = make_bars(&wave(30));
        let engine = BacktestEngine::default();
        let ranges = vec![ParameterRange::new("bogus", 1.0, 2.0, 1.0).unwrap()];
        let err = engine
            .optimize(&bars, &ranges, |p| StrategyKind::Rsi.build(p))
            .unwrap_err();
        assert!(matches!(err, QuantError::InvalidParameterRange { .. }));
    }

    fn threshold_strategy(params: &BTreeMap<String, f64>) -> Result<Strategy, QuantError> {
        let threshold = params["threshold"];
        Ok(Strategy::builder("threshold")
            .parameter("threshold", threshold)
            .entry(move |bar| {
                if threshold >= 3.0 {
                    Err(RuleError::new("boom"))
                } else {
                    Ok(bar.close() > 100.0 + threshold)
                }
            })
            .exit(move |bar| Ok(bar.close() < 100.0 - threshold))
            .build())
    }

    #[test]
    fn failing_combination_does_not_abort_search() {
        let bars = make_bars(&wave(60));
        let engine = BacktestEngine::new(BacktestConfig::default());
        let ranges = vec![ParameterRange::new("threshold", 1.0, 3.0, 1.0).unwrap()];

        let result = engine.optimize(&bars, &ranges, threshold_strategy).unwrap();

        assert_eq!(result.runs.len(), 2);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].parameters["threshold"], 3.0);
        assert!(result.failures[0].error.contains("boom"));
        assert!(result.best_parameters["threshold"] < 3.0);
    }

    #[test]
    fn search_fails_when_every_run_fails() {
        let bars = make_bars(&wave(30));
        let engine = BacktestEngine::default();
        let ranges = vec![ParameterRange::new("threshold", 3.0, 4.0, 1.0).unwrap()];

        let err = engine.optimize(&bars, &ranges, threshold_strategy).unwrap_err();
        assert!(matches!(
            err,
            QuantError::StrategyRule { ref strategy, .. } if strategy == "threshold"
        ));
    }

    #[test]
    fn best_result_matches_a_standalone_run() {
        let bars = make_bars(&wave(120));
        let engine = BacktestEngine::new(BacktestConfig::default());
        let ranges = vec![ParameterRange::new("period", 5.0, 20.0, 5.0).unwrap()];

        let result = engine
            .optimize(&bars, &ranges, |p| StrategyKind::Rsi.build(p))
            .unwrap();
        let standalone = engine
            .run(&StrategyKind::Rsi.build(&result.best_parameters).unwrap(), &bars)
            .unwrap();

        assert_eq!(result.best, standalone);
        let summary = result
            .runs
            .iter()
            .find(|r| r.parameters == result.best_parameters)
            .unwrap();
        assert_eq!(summary.sharpe_ratio, result.best.metrics.sharpe_ratio);
    }
}
