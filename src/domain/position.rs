//! Trade records for the single-position backtest.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::execution::calculate_commission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, −1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// One round trip. Exit fields are `Some` exactly when `status` is `Closed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub direction: Direction,
    pub size: f64,
    pub pnl: Option<f64>,
    pub pnl_percent: Option<f64>,
    pub status: TradeStatus,
}

impl Trade {
    pub fn open(entry_date: NaiveDate, entry_price: f64, direction: Direction, size: f64) -> Self {
        Trade {
            entry_date,
            exit_date: None,
            entry_price,
            exit_price: None,
            direction,
            size,
            pnl: None,
            pnl_percent: None,
            status: TradeStatus::Open,
        }
    }

    /// Mark-to-market P&L at `price`, before costs.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.direction.sign() * (price - self.entry_price) * self.size
    }

    /// Closes the trade at `exit_price`, charging `commission` (a fraction)
    /// on both the entry and the exit notional.
    pub fn close(mut self, exit_date: NaiveDate, exit_price: f64, commission: f64) -> Trade {
        let gross = self.direction.sign() * (exit_price - self.entry_price) * self.size;
        let costs = calculate_commission(self.entry_price, exit_price, self.size, commission);
        let pnl = gross - costs;
        let cost_basis = self.entry_price * self.size;

        self.exit_date = Some(exit_date);
        self.exit_price = Some(exit_price);
        self.pnl = Some(pnl);
        self.pnl_percent = Some(if cost_basis > 0.0 {
            pnl / cost_basis * 100.0
        } else {
            0.0
        });
        self.status = TradeStatus::Closed;
        self
    }

    /// Calendar days held; `None` while open.
    pub fn duration_days(&self) -> Option<i64> {
        self.exit_date
            .map(|exit| (exit - self.entry_date).num_days())
    }
}
