#![allow(dead_code)]

use chrono::NaiveDate;
use diptrader::domain::error::DiptraderError;
use diptrader::domain::series::{PricePoint, PriceSeries};
use diptrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, symbol: &str, series: PriceSeries) -> Self {
        self.data.insert(symbol.to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, DiptraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(DiptraderError::Data {
                reason: reason.clone(),
            });
        }
        let series = self.data.get(symbol).cloned().unwrap_or_default();
        let points = series
            .points()
            .iter()
            .copied()
            .filter(|p| p.date >= start_date && p.date <= end_date)
            .collect();
        Ok(PriceSeries::new(points))
    }

    fn list_symbols(&self) -> Result<Vec<String>, DiptraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DiptraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(DiptraderError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(series) if !series.is_empty() => Ok(Some((
                series.first_date().unwrap(),
                series.last_date().unwrap(),
                series.len(),
            ))),
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_series(start_date: &str, prices: &[f64]) -> PriceSeries {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    PriceSeries::new(
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                price,
            })
            .collect(),
    )
}

/// Daily series of `count` observations, each `factor` times the previous.
pub fn generate_series(start_date: &str, count: usize, start_price: f64, factor: f64) -> PriceSeries {
    let mut prices = Vec::with_capacity(count);
    let mut price = start_price;
    for _ in 0..count {
        prices.push(price);
        price *= factor;
    }
    make_series(start_date, &prices)
}

pub fn csv_for(prices: &[(&str, f64)]) -> String {
    let mut content = String::from("date,close\n");
    for (date, price) in prices {
        content.push_str(&format!("{},{}\n", date, price));
    }
    content
}
