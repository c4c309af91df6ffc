//! CSV file data adapter.
//!
//! Reads one `{SYMBOL}.csv` file per symbol from a base directory, with a
//! header row and `date,close` columns.

use crate::domain::error::DiptraderError;
use crate::domain::series::{PricePoint, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_points(
        &self,
        symbol: &str,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<PricePoint>, DiptraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| DiptraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| DiptraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| DiptraderError::Data {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                DiptraderError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            if let Some((start, end)) = range {
                if date < start || date > end {
                    continue;
                }
            }

            let price: f64 = record
                .get(1)
                .ok_or_else(|| DiptraderError::Data {
                    reason: "missing close column".into(),
                })?
                .parse()
                .map_err(|e| DiptraderError::Data {
                    reason: format!("invalid close value: {}", e),
                })?;

            points.push(PricePoint { date, price });
        }

        Ok(points)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, DiptraderError> {
        let points = self.read_points(symbol, Some((start_date, end_date)))?;
        Ok(PriceSeries::new(points))
    }

    fn list_symbols(&self) -> Result<Vec<String>, DiptraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| DiptraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DiptraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DiptraderError> {
        let series = PriceSeries::new(self.read_points(symbol, None)?);
        match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => Ok(Some((first, last, series.len()))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,close\n\
            2024-01-15,105.0\n\
            2024-01-16,110.0\n\
            2024-01-17,115.0\n";

        fs::write(path.join("AAPL.csv"), csv_content).unwrap();
        fs::write(path.join("MSFT.csv"), "date,close\n").unwrap();
        fs::write(path.join("notes.txt"), "not price data").unwrap();

        (dir, path)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fetch_prices_returns_sorted_series() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch_prices("AAPL", date(2024, 1, 15), date(2024, 1, 17))
            .unwrap();

        assert_eq!(series.len(), 3);
        let points = series.points();
        assert_eq!(points[0].date, date(2024, 1, 15));
        assert_eq!(points[0].price, 105.0);
        assert_eq!(points[2].price, 115.0);
    }

    #[test]
    fn fetch_prices_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch_prices("AAPL", date(2024, 1, 16), date(2024, 1, 16))
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].date, date(2024, 1, 16));
    }

    #[test]
    fn fetch_prices_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch_prices("XYZ", date(2024, 1, 1), date(2024, 1, 31));
        assert!(result.is_err());
    }

    #[test]
    fn fetch_prices_empty_for_out_of_range_dates() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch_prices("AAPL", date(2023, 1, 1), date(2023, 12, 31))
            .unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn list_symbols_skips_non_csv_files() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let symbols = adapter.list_symbols().unwrap();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn get_data_range_reports_span_and_count() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let range = adapter.get_data_range("AAPL").unwrap();
        assert_eq!(range, Some((date(2024, 1, 15), date(2024, 1, 17), 3)));
    }

    #[test]
    fn get_data_range_none_for_empty_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        assert_eq!(adapter.get_data_range("MSFT").unwrap(), None);
    }
}
