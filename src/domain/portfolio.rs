//! Capital, the single open position, the trade ledger and the equity curve.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::position::Trade;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
    /// (peak − equity) / peak, with the peak including this point.
    pub drawdown: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub initial_capital: f64,
    /// Realized capital: initial capital plus realized P&L.
    pub capital: f64,
    pub position: Option<Trade>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    peak_equity: f64,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            initial_capital,
            capital: initial_capital,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            peak_equity: initial_capital,
        }
    }

    /// Realized capital plus unrealized P&L of the open position at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.capital
            + self
                .position
                .as_ref()
                .map_or(0.0, |trade| trade.unrealized_pnl(price))
    }

    /// Appends the equity point for `date` marked at `price`.
    pub fn mark(&mut self, date: NaiveDate, price: f64) -> &EquityPoint {
        let equity = self.equity(price);
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
        let drawdown = if self.peak_equity > 0.0 {
            (self.peak_equity - equity) / self.peak_equity
        } else {
            0.0
        };
        self.equity_curve.push(EquityPoint {
            date,
            equity,
            drawdown,
        });
        &self.equity_curve[self.equity_curve.len() - 1]
    }

    /// Opens `trade` if flat. Returns false, leaving state untouched, when a
    /// position is already held.
    pub fn open(&mut self, trade: Trade) -> bool {
        if self.position.is_some() {
            return false;
        }
        self.position = Some(trade);
        true
    }

    /// Closes the open position, realizing its P&L into capital and
    /// appending it to the ledger.
    pub fn close(&mut self, date: NaiveDate, exit_price: f64, commission: f64) -> Option<&Trade> {
        let trade = self.position.take()?.close(date, exit_price, commission);
        self.capital += trade.pnl.unwrap_or(0.0);
        self.trades.push(trade);
        self.trades.last()
    }
}
