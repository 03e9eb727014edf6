//! Report generation port trait.

use std::path::Path;

use crate::domain::analysis::AnalysisReport;
use crate::domain::backtest::BacktestResult;
use crate::domain::error::QuantError;
use crate::domain::optimizer::OptimizationResult;

/// Port for writing analysis, backtest and optimization reports.
pub trait ReportPort {
    fn write_analysis(
        &self,
        report: &AnalysisReport,
        output_path: &Path,
    ) -> Result<(), QuantError>;

    fn write_backtest(
        &self,
        result: &BacktestResult,
        output_path: &Path,
    ) -> Result<(), QuantError>;

    fn write_optimization(
        &self,
        result: &OptimizationResult,
        output_path: &Path,
    ) -> Result<(), QuantError>;
}
