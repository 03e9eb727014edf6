//! JSON report adapter implementing ReportPort.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::domain::analysis::AnalysisReport;
use crate::domain::backtest::BacktestResult;
use crate::domain::error::QuantError;
use crate::domain::optimizer::OptimizationResult;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Clone, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        JsonReportAdapter
    }

    /// Pretty-printed JSON for `value`.
    pub fn render<T: Serialize>(&self, value: &T) -> Result<String, QuantError> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    fn write_json<T: Serialize>(&self, value: &T, output_path: &Path) -> Result<(), QuantError> {
        let mut json = self.render(value)?;
        json.push('\n');
        fs::write(output_path, json)?;
        tracing::info!(path = %output_path.display(), "wrote report");
        Ok(())
    }
}

impl ReportPort for JsonReportAdapter {
    fn write_analysis(
        &self,
        report: &AnalysisReport,
        output_path: &Path,
    ) -> Result<(), QuantError> {
        self.write_json(report, output_path)
    }

    fn write_backtest(
        &self,
        result: &BacktestResult,
        output_path: &Path,
    ) -> Result<(), QuantError> {
        self.write_json(result, output_path)
    }

    fn write_optimization(
        &self,
        result: &OptimizationResult,
        output_path: &Path,
    ) -> Result<(), QuantError> {
        self.write_json(result, output_path)
    }
}
