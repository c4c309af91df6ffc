//! Report generation port trait.

use crate::domain::backtest::BacktestSummary;
use crate::domain::error::DiptraderError;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(&self, summary: &BacktestSummary, output_path: &str) -> Result<(), DiptraderError>;
}
