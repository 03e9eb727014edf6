//! CSV file data adapter.
//!
//! Prices live in `<SYMBOL>.csv` (`date,open,high,low,close,volume`) and
//! fundamentals in `<SYMBOL>_fundamentals.csv`. Rows may appear in any order;
//! both are returned sorted oldest first.

use crate::domain::error::QuantError;
use crate::domain::fundamental::FundamentalReport;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn prices_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }

    fn fundamentals_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}_fundamentals.csv"))
    }
}

/// Reads every row of `path`; `Ok(None)` when the file does not exist.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>, QuantError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let rows = rdr
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| QuantError::DataParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(Some(rows))
}

impl DataPort for CsvAdapter {
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PriceBar>, QuantError> {
        let mut bars: Vec<PriceBar> = read_rows(&self.prices_path(symbol))?
            .filter(|bars: &Vec<PriceBar>| !bars.is_empty())
            .ok_or_else(|| QuantError::NoData {
                symbol: symbol.to_string(),
            })?;

        bars.sort_by_key(|b| b.date);
        tracing::debug!(symbol, bars = bars.len(), "loaded price history");
        Ok(bars)
    }

    fn fetch_fundamentals(&self, symbol: &str) -> Result<Vec<FundamentalReport>, QuantError> {
        let mut reports: Vec<FundamentalReport> =
            read_rows(&self.fundamentals_path(symbol))?.unwrap_or_default();

        reports.sort_by_key(|r| r.period_end);
        tracing::debug!(symbol, reports = reports.len(), "loaded fundamentals");
        Ok(reports)
    }
}
