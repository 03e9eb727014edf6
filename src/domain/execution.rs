//! Fill simulation: slippage, commission and the entry direction policy.
//!
//! Slippage and commission are fractions (0.001 = 0.1%).

use serde::{Deserialize, Serialize};

use super::position::Direction;

/// Execution cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionCosts {
    pub commission: f64,
    pub slippage: f64,
}

impl Default for ExecutionCosts {
    fn default() -> Self {
        ExecutionCosts {
            commission: 0.001,
            slippage: 0.0005,
        }
    }
}

/// Long entry (buy): close * (1 + slippage).
pub fn apply_slippage_long_entry(close: f64, slippage: f64) -> f64 {
    close * (1.0 + slippage)
}

/// Short entry (sell short): close * (1 - slippage).
pub fn apply_slippage_short_entry(close: f64, slippage: f64) -> f64 {
    close * (1.0 - slippage)
}

/// Long exit (sell): close * (1 - slippage).
pub fn apply_slippage_long_exit(close: f64, slippage: f64) -> f64 {
    close * (1.0 - slippage)
}

/// Short exit (buy to cover): close * (1 + slippage).
pub fn apply_slippage_short_exit(close: f64, slippage: f64) -> f64 {
    close * (1.0 + slippage)
}

/// Round-trip commission charged on entry and exit notional.
pub fn calculate_commission(entry_price: f64, exit_price: f64, size: f64, commission: f64) -> f64 {
    commission * (entry_price + exit_price) * size
}

impl ExecutionCosts {
    pub fn entry_price(&self, close: f64, direction: Direction) -> f64 {
        match direction {
            Direction::Long => apply_slippage_long_entry(close, self.slippage),
            Direction::Short => apply_slippage_short_entry(close, self.slippage),
        }
    }

    pub fn exit_price(&self, close: f64, direction: Direction) -> f64 {
        match direction {
            Direction::Long => apply_slippage_long_exit(close, self.slippage),
            Direction::Short => apply_slippage_short_exit(close, self.slippage),
        }
    }

    /// Direction and fill price for a new position of `size` units.
    ///
    /// Long unless the long fill notional exceeds `capital`, in which case the
    /// position is opened short instead.
    pub fn entry_fill(&self, close: f64, size: f64, capital: f64) -> (Direction, f64) {
        let long_price = self.entry_price(close, Direction::Long);
        if size * long_price > capital {
            (Direction::Short, self.entry_price(close, Direction::Short))
        } else {
            (Direction::Long, long_price)
        }
    }
}
