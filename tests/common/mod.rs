#![allow(dead_code)]

use chrono::NaiveDate;
use quantcore::domain::error::QuantError;
use quantcore::domain::fundamental::FundamentalReport;
pub use quantcore::domain::ohlcv::PriceBar;
use quantcore::ports::data_port::DataPort;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

pub struct MockDataPort {
    pub prices: HashMap<String, Vec<PriceBar>>,
    pub fundamentals: HashMap<String, Vec<FundamentalReport>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            fundamentals: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.prices.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_fundamentals(mut self, symbol: &str, reports: Vec<FundamentalReport>) -> Self {
        self.fundamentals.insert(symbol.to_string(), reports);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PriceBar>, QuantError> {
        match self.prices.get(symbol) {
            Some(bars) if !bars.is_empty() => Ok(bars.clone()),
            _ => Err(QuantError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn fetch_fundamentals(&self, symbol: &str) -> Result<Vec<FundamentalReport>, QuantError> {
        Ok(self.fundamentals.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, close: f64) -> PriceBar {
    PriceBar {
        date,
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

/// One bar per day starting at `start`, closing at each of `closes`.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(start + chrono::Duration::days(i as i64), close))
        .collect()
}

/// Strictly increasing series: close = start_price + i.
pub fn generate_bars(start: NaiveDate, count: usize, start_price: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    bars_from_closes(start, &closes)
}

/// Oscillating series with drift, enough to trigger crossovers and RSI extremes.
pub fn wave_bars(start: NaiveDate, count: usize) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| 100.0 + 12.0 * (i as f64 / 8.0).sin() + i as f64 * 0.03)
        .collect();
    bars_from_closes(start, &closes)
}

pub fn write_prices_csv(dir: &Path, symbol: &str, bars: &[PriceBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
