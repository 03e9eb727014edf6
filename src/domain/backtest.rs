//! Backtest engine: a single chronological pass over indicator-augmented bars
//! holding at most one position at a time.

use serde::{Deserialize, Serialize};

use crate::domain::error::{QuantError, RuleError};
use crate::domain::execution::ExecutionCosts;
use crate::domain::indicator::{AnalyzedBar, augment};
use crate::domain::metrics::{Metrics, MonthlyReturn, monthly_returns};
use crate::domain::ohlcv::PriceBar;
use crate::domain::portfolio::{EquityPoint, Portfolio};
use crate::domain::position::Trade;
use crate::domain::strategy::{Strategy, StrategyDescriptor};

/// Engine parameters. Commission and slippage are fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub commission: f64,
    pub slippage: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 100_000.0,
            commission: 0.001,
            slippage: 0.0005,
        }
    }
}

impl BacktestConfig {
    pub fn costs(&self) -> ExecutionCosts {
        ExecutionCosts {
            commission: self.commission,
            slippage: self.slippage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub strategy: StrategyDescriptor,
    /// Closed trades in the order they were closed.
    pub trades: Vec<Trade>,
    pub metrics: Metrics,
    /// One point per bar.
    pub equity_curve: Vec<EquityPoint>,
    pub monthly_returns: Vec<MonthlyReturn>,
    pub initial_capital: f64,
    pub final_capital: f64,
}

/// Independently constructed engine; runs share no state.
#[derive(Debug, Clone, Default)]
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Self {
        BacktestEngine { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Augments `bars` (oldest first) with the strategy's indicators and runs it.
    pub fn run(
        &self,
        strategy: &Strategy,
        bars: &[PriceBar],
    ) -> Result<BacktestResult, QuantError> {
        let analyzed = augment(bars, &strategy.indicators);
        self.run_analyzed(strategy, &analyzed)
    }

    /// Runs `strategy` over an already augmented series.
    ///
    /// A failing rule or an invalid position size aborts this run only.
    pub fn run_analyzed(
        &self,
        strategy: &Strategy,
        bars: &[AnalyzedBar],
    ) -> Result<BacktestResult, QuantError> {
        let costs = self.config.costs();
        let mut portfolio = Portfolio::new(self.config.initial_capital);

        for bar in bars {
            let date = bar.bar.date;
            let close = bar.close();
            portfolio.mark(date, close);

            if let Some(direction) = portfolio.position.as_ref().map(|t| t.direction) {
                if check(strategy, bar, strategy.should_exit(bar))? {
                    let exit_price = costs.exit_price(close, direction);
                    if let Some(trade) = portfolio.close(date, exit_price, costs.commission) {
                        tracing::debug!(
                            strategy = %strategy.name,
                            %date,
                            exit_price,
                            pnl = trade.pnl.unwrap_or(0.0),
                            "closed position"
                        );
                    }
                }
            } else if check(strategy, bar, strategy.should_enter(bar))? {
                let size = check(strategy, bar, strategy.position_size(bar))?;
                if !size.is_finite() || size <= 0.0 {
                    return Err(QuantError::InvalidPositionSize {
                        strategy: strategy.name.clone(),
                        date,
                        size,
                    });
                }

                let (direction, entry_price) = costs.entry_fill(close, size, portfolio.capital);
                portfolio.open(Trade::open(date, entry_price, direction, size));
                tracing::debug!(
                    strategy = %strategy.name,
                    %date,
                    ?direction,
                    entry_price,
                    size,
                    "opened position"
                );
            }
        }

        if let (Some(last), Some(direction)) = (
            bars.last(),
            portfolio.position.as_ref().map(|t| t.direction),
        ) {
            let exit_price = costs.exit_price(last.close(), direction);
            portfolio.close(last.bar.date, exit_price, costs.commission);
            tracing::debug!(
                strategy = %strategy.name,
                date = %last.bar.date,
                "force-closed open position"
            );
        }

        let final_capital = portfolio.capital;
        let metrics = Metrics::compute(
            &portfolio.trades,
            &portfolio.equity_curve,
            self.config.initial_capital,
            final_capital,
        );
        tracing::debug!(
            strategy = %strategy.name,
            bars = bars.len(),
            trades = metrics.total_trades,
            total_return = metrics.total_return,
            "backtest complete"
        );

        Ok(BacktestResult {
            strategy: strategy.descriptor(),
            monthly_returns: monthly_returns(&portfolio.trades, self.config.initial_capital),
            trades: portfolio.trades,
            metrics,
            equity_curve: portfolio.equity_curve,
            initial_capital: self.config.initial_capital,
            final_capital,
        })
    }
}

/// Wraps a rule failure with the strategy name and bar date.
fn check<T>(
    strategy: &Strategy,
    bar: &AnalyzedBar,
    outcome: Result<T, RuleError>,
) -> Result<T, QuantError> {
    outcome.map_err(|source| QuantError::StrategyRule {
        strategy: strategy.name.clone(),
        date: bar.bar.date,
        source,
    })
}
