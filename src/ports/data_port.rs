//! Data access port trait.

use crate::domain::error::QuantError;
use crate::domain::fundamental::FundamentalReport;
use crate::domain::ohlcv::PriceBar;

pub trait DataPort {
    /// Price history for `symbol`, oldest first.
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PriceBar>, QuantError>;

    /// Periodic fundamentals for `symbol`, oldest first; empty when none exist.
    fn fetch_fundamentals(&self, symbol: &str) -> Result<Vec<FundamentalReport>, QuantError>;
}
