//! Performance metrics over a completed backtest.
//!
//! Trade statistics use closed trades only; drawdown comes from the equity curve.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::portfolio::EquityPoint;
use super::position::Trade;

const DAYS_PER_YEAR: f64 = 365.0;
const MIN_VARIANCE: f64 = 1e-18;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Winning trades / total trades, in [0, 1].
    pub win_rate: f64,
    pub total_pnl: f64,
    pub average_win: f64,
    /// Mean of the losing P&Ls; negative or zero.
    pub average_loss: f64,
    pub largest_win: f64,
    /// Most negative P&L; negative or zero.
    pub largest_loss: f64,
    /// Mean holding period in calendar days.
    pub average_trade_duration: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub profit_factor: f64,
    pub max_drawdown: f64,
}

/// Realized P&L for one calendar month, keyed by exit date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    pub pnl: f64,
    /// pnl / initial capital.
    pub return_fraction: f64,
}

impl Metrics {
    pub fn compute(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        initial_capital: f64,
        final_capital: f64,
    ) -> Self {
        let closed: Vec<(&Trade, f64)> = trades
            .iter()
            .filter_map(|t| t.pnl.map(|pnl| (t, pnl)))
            .collect();

        let wins: Vec<f64> = closed.iter().map(|&(_, p)| p).filter(|&p| p > 0.0).collect();
        let losses: Vec<f64> = closed.iter().map(|&(_, p)| p).filter(|&p| p < 0.0).collect();

        let total_trades = closed.len();
        let total_wins: f64 = wins.iter().sum();
        let total_losses: f64 = losses.iter().sum::<f64>().abs();

        let total_return = if initial_capital > 0.0 {
            (final_capital - initial_capital) / initial_capital
        } else {
            0.0
        };

        let durations: Vec<f64> = closed
            .iter()
            .filter_map(|(t, _)| t.duration_days())
            .map(|d| d as f64)
            .collect();

        Metrics {
            total_trades,
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            win_rate: ratio(wins.len() as f64, total_trades as f64),
            total_pnl: closed.iter().map(|&(_, p)| p).sum(),
            average_win: mean(&wins),
            average_loss: mean(&losses),
            largest_win: wins.iter().copied().fold(0.0, f64::max),
            largest_loss: losses.iter().copied().fold(0.0, f64::min),
            average_trade_duration: mean(&durations),
            total_return,
            annualized_return: annualize(total_return, period_days(trades)),
            sharpe_ratio: sharpe(trades),
            profit_factor: ratio(total_wins, total_losses),
            max_drawdown: equity_curve
                .iter()
                .map(|p| p.drawdown)
                .fold(0.0, f64::max),
        }
    }

    /// Flat name → value view.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("total_trades", self.total_trades as f64),
            ("winning_trades", self.winning_trades as f64),
            ("losing_trades", self.losing_trades as f64),
            ("win_rate", self.win_rate),
            ("total_pnl", self.total_pnl),
            ("average_win", self.average_win),
            ("average_loss", self.average_loss),
            ("largest_win", self.largest_win),
            ("largest_loss", self.largest_loss),
            ("average_trade_duration", self.average_trade_duration),
            ("total_return", self.total_return),
            ("annualized_return", self.annualized_return),
            ("sharpe_ratio", self.sharpe_ratio),
            ("profit_factor", self.profit_factor),
            ("max_drawdown", self.max_drawdown),
        ])
    }
}

/// Realized P&L grouped by exit month, oldest first.
pub fn monthly_returns(trades: &[Trade], initial_capital: f64) -> Vec<MonthlyReturn> {
    let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for trade in trades {
        if let (Some(exit), Some(pnl)) = (trade.exit_date, trade.pnl) {
            *by_month.entry((exit.year(), exit.month())).or_insert(0.0) += pnl;
        }
    }

    by_month
        .into_iter()
        .map(|((year, month), pnl)| MonthlyReturn {
            year,
            month,
            pnl,
            return_fraction: ratio(pnl, initial_capital),
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Days from the first entry to the last exit; `None` without closed trades.
fn period_days(trades: &[Trade]) -> Option<i64> {
    let first_entry = trades.iter().map(|t| t.entry_date).min()?;
    let last_exit = trades.iter().filter_map(|t| t.exit_date).max()?;
    Some((last_exit - first_entry).num_days().max(1))
}

fn annualize(total_return: f64, days: Option<i64>) -> f64 {
    let days = days.map_or(DAYS_PER_YEAR, |d| d as f64);
    let growth = 1.0 + total_return;
    if growth <= 0.0 {
        return -1.0;
    }
    growth.powf(DAYS_PER_YEAR / days) - 1.0
}

/// Mean over population standard deviation of per-trade returns.
fn sharpe(trades: &[Trade]) -> f64 {
    let returns: Vec<f64> = trades
        .iter()
        .filter_map(|t| t.pnl_percent)
        .map(|p| p / 100.0)
        .collect();
    if returns.is_empty() {
        return 0.0;
    }

    let avg = mean(&returns);
    let variance = returns.iter().map(|r| (r - avg).powi(2)).sum::<f64>() / returns.len() as f64;
    if variance < MIN_VARIANCE {
        0.0
    } else {
        avg / variance.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::Direction;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn closed(entry: NaiveDate, exit: NaiveDate, entry_price: f64, exit_price: f64) -> Trade {
        Trade::open(entry, entry_price, Direction::Long, 10.0).close(exit, exit_price, 0.0)
    }

    fn point(d: u32, equity: f64, drawdown: f64) -> EquityPoint {
        EquityPoint {
            date: date(2024, 1, d),
            equity,
            drawdown,
        }
    }

    #[test]
    fn empty_run_has_default_metrics() {
        let m = Metrics::compute(&[], &[], 10_000.0, 10_000.0);
        assert_eq!(m, Metrics::default());
    }

    #[test]
    fn trade_counts_and_averages() {
        let trades = vec![
            closed(date(2024, 1, 1), date(2024, 1, 11), 100.0, 110.0), // +100
            closed(date(2024, 1, 12), date(2024, 1, 15), 100.0, 95.0), // -50
            closed(date(2024, 1, 16), date(2024, 1, 18), 100.0, 100.0), // 0
            closed(date(2024, 1, 19), date(2024, 1, 21), 100.0, 130.0), // +300
        ];
        let m = Metrics::compute(&trades, &[], 10_000.0, 10_350.0);

        assert_eq!(m.total_trades, 4);
        assert_eq!(m.winning_trades, 2);
        assert_eq!(m.losing_trades, 1);
        assert!((m.win_rate - 0.5).abs() < 1e-12);
        assert!((m.total_pnl - 350.0).abs() < 1e-9);
        assert!((m.average_win - 200.0).abs() < 1e-9);
        assert!((m.average_loss + 50.0).abs() < 1e-9);
        assert!((m.largest_win - 300.0).abs() < 1e-9);
        assert!((m.largest_loss + 50.0).abs() < 1e-9);
        assert!((m.profit_factor - 8.0).abs() < 1e-9);
        assert!((m.average_trade_duration - 4.25).abs() < 1e-12);
        assert!((m.total_return - 0.035).abs() < 1e-12);
    }

    #[test]
    fn profit_factor_zero_without_losses() {
        let trades = vec![closed(date(2024, 1, 1), date(2024, 1, 5), 100.0, 110.0)];
        let m = Metrics::compute(&trades, &[], 10_000.0, 10_100.0);
        assert_eq!(m.profit_factor, 0.0);
    }

    #[test]
    fn sharpe_zero_for_identical_returns() {
        let trades = vec![
            closed(date(2024, 1, 1), date(2024, 1, 5), 100.0, 110.0),
            closed(date(2024, 1, 6), date(2024, 1, 9), 100.0, 110.0),
        ];
        let m = Metrics::compute(&trades, &[], 10_000.0, 10_200.0);
        assert_eq!(m.sharpe_ratio, 0.0);
    }

    #[test]
    fn sharpe_mean_over_population_stddev() {
        let trades = vec![
            closed(date(2024, 1, 1), date(2024, 1, 5), 100.0, 110.0), // 0.10
            closed(date(2024, 1, 6), date(2024, 1, 9), 100.0, 130.0), // 0.30
        ];
        let m = Metrics::compute(&trades, &[], 10_000.0, 10_400.0);
        // mean 0.2, population stddev 0.1
        assert!((m.sharpe_ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn annualized_over_trade_span() {
        let trades = vec![closed(date(2023, 1, 1), date(2024, 1, 1), 100.0, 110.0)];
        let m = Metrics::compute(&trades, &[], 1_000.0, 1_100.0);
        assert!((m.annualized_return - 0.1).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_from_curve() {
        let curve = vec![point(1, 100.0, 0.0), point(2, 80.0, 0.2), point(3, 90.0, 0.1)];
        let m = Metrics::compute(&[], &curve, 100.0, 100.0);
        assert!((m.max_drawdown - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn monthly_returns_grouped_and_sorted() {
        let trades = vec![
            closed(date(2024, 2, 1), date(2024, 2, 20), 100.0, 110.0),
            closed(date(2024, 1, 2), date(2024, 1, 20), 100.0, 90.0),
            closed(date(2024, 2, 21), date(2024, 2, 25), 100.0, 105.0),
        ];
        let months = monthly_returns(&trades, 1_000.0);

        assert_eq!(months.len(), 2);
        assert_eq!((months[0].year, months[0].month), (2024, 1));
        assert!((months[0].pnl + 100.0).abs() < 1e-9);
        assert!((months[0].return_fraction + 0.1).abs() < 1e-12);
        assert_eq!((months[1].year, months[1].month), (2024, 2));
        assert!((months[1].pnl - 150.0).abs() < 1e-9);
    }

    #[test]
    fn metrics_map_has_every_field() {
        let map = Metrics::default().to_map();
        assert_eq!(map.len(), 15);
        assert_eq!(map["sharpe_ratio"], 0.0);
    }
}
