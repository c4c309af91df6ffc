//! JSON report adapter.
//!
//! Serializes the full backtest summary, history and trade log included, so
//! results can be inspected or charted by external tooling.

use crate::domain::backtest::BacktestSummary;
use crate::domain::error::DiptraderError;
use crate::ports::report_port::ReportPort;
use std::fs;

pub struct JsonReport;

impl ReportPort for JsonReport {
    fn write(&self, summary: &BacktestSummary, output_path: &str) -> Result<(), DiptraderError> {
        let json = serde_json::to_string_pretty(summary).map_err(|e| DiptraderError::Report {
            reason: format!("failed to serialize summary: {}", e),
        })?;
        fs::write(output_path, json).map_err(|e| DiptraderError::Report {
            reason: format!("failed to write {}: {}", output_path, e),
        })?;
        Ok(())
    }
}
